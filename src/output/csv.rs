//! CSV job export
//!
//! The export is a two-column `Field,Value` sheet followed by optional
//! `Links` and `Images` sections, each capped at [`MAX_CSV_ROWS`] rows.
//! Records end with CRLF and fields are quoted per RFC 4180.

use crate::storage::JobRecord;
use serde_json::Value;

/// Rows exported per section
pub const MAX_CSV_ROWS: usize = 100;

/// Formats a job record as CSV
pub fn export_csv(job: &JobRecord) -> String {
    let mut out = String::new();

    write_row(&mut out, &["Field", "Value"]);
    write_row(&mut out, &["Job ID", &job.job_id.to_string()]);
    write_row(&mut out, &["URL", &job.request.url]);
    write_row(&mut out, &["Status", job.status.to_db_string()]);
    write_row(&mut out, &["Created At", &job.created_at.to_rfc3339()]);

    if let Some(data) = &job.data {
        if let Some(title) = data.get("title").and_then(Value::as_str) {
            write_row(&mut out, &["Title", title]);
        }

        write_section(&mut out, data, "links", "Links", ["Text", "URL"], ["text", "href"]);
        write_section(&mut out, data, "images", "Images", ["Alt", "Source"], ["alt", "src"]);
    }

    out
}

fn write_section(
    out: &mut String,
    data: &Value,
    key: &str,
    heading: &str,
    columns: [&str; 2],
    fields: [&str; 2],
) {
    let Some(items) = data.get(key).and_then(Value::as_array) else {
        return;
    };
    if items.is_empty() {
        return;
    }

    write_row(out, &[]);
    write_row(out, &[heading]);
    write_row(out, &columns);

    for item in items.iter().take(MAX_CSV_ROWS) {
        let cell = |name: &str| item.get(name).and_then(Value::as_str).unwrap_or("");
        write_row(out, &[cell(fields[0]), cell(fields[1])]);
    }
}

fn write_row(out: &mut String, fields: &[&str]) {
    let row: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
    out.push_str(&row.join(","));
    out.push_str("\r\n");
}

/// Quotes a field when it contains a delimiter, quote or line break
pub fn escape_field(field: &str) -> String {
    if field.contains(&[',', '"', '\r', '\n'][..]) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::ScrapeRequest;
    use serde_json::json;

    fn job_with(data: Value) -> JobRecord {
        let mut job = JobRecord::new(ScrapeRequest::new("https://example.com/"));
        job.data = Some(data);
        job
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_header_rows() {
        let job = JobRecord::new(ScrapeRequest::new("https://example.com/"));
        let csv = export_csv(&job);
        let lines: Vec<&str> = csv.split("\r\n").collect();

        assert_eq!(lines[0], "Field,Value");
        assert_eq!(lines[1], format!("Job ID,{}", job.job_id));
        assert_eq!(lines[2], "URL,https://example.com/");
        assert_eq!(lines[3], "Status,pending");
        assert!(lines[4].starts_with("Created At,"));
        assert_eq!(lines[5], "");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_links_and_images_sections() {
        let job = job_with(json!({
            "title": "Shop, Inc.",
            "links": [{"text": "Home", "href": "https://example.com/", "title": ""}],
            "images": [{"alt": "Logo", "src": "https://example.com/logo.png"}]
        }));
        let csv = export_csv(&job);

        assert!(csv.contains("Title,\"Shop, Inc.\"\r\n"));
        assert!(csv.contains("\r\n\r\nLinks\r\nText,URL\r\nHome,https://example.com/\r\n"));
        assert!(csv.contains(
            "\r\n\r\nImages\r\nAlt,Source\r\nLogo,https://example.com/logo.png\r\n"
        ));
    }

    #[test]
    fn test_sections_capped() {
        let links: Vec<Value> = (0..150)
            .map(|i| json!({"text": format!("l{i}"), "href": format!("https://example.com/{i}")}))
            .collect();
        let csv = export_csv(&job_with(json!({ "links": links })));

        assert!(csv.contains("l99,"));
        assert!(!csv.contains("l100,"));
    }

    #[test]
    fn test_empty_sections_omitted() {
        let csv = export_csv(&job_with(json!({"title": null, "links": [], "images": []})));

        assert!(!csv.contains("Links"));
        assert!(!csv.contains("Images"));
        assert!(!csv.contains("Title"));
    }
}
