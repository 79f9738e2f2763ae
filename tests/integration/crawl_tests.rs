//! Integration tests for the scrape pipeline
//!
//! These tests use wiremock to create mock HTTP servers and test
//! single-page scrapes, site crawls and stored jobs end-to-end.

use site_harvester::config::HarvesterConfig;
use site_harvester::crawler::SITE_WIDE;
use site_harvester::output::{export_job, ExportFormat, JobAnalytics};
use site_harvester::storage::{run_job, JobStatus, JobStore, MemoryJobStore};
use site_harvester::{Coordinator, ScrapeOutput, ScrapeRequest};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A configuration with short timeouts and near-instant retries
fn test_config() -> HarvesterConfig {
    let mut config = HarvesterConfig::default();
    config.fetch.timeout_secs = 5;
    config.fetch.max_retries = 2;
    config.fetch.retry_backoff_ms = 10;
    config.crawl.default_max_pages = 10;
    config
}

fn coordinator() -> Coordinator {
    Coordinator::new(test_config()).expect("Failed to create coordinator")
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

fn linked_page(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{href}">{href}</a>"#))
        .collect();
    format!(
        "<html><head><title>{title}</title></head><body><h1>{title}</h1>{anchors}</body></html>"
    )
}

#[tokio::test]
async fn test_single_page_scrape() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<html><head>
            <title>Example</title>
            <meta property="og:title" content="Example OG">
            <meta name="description" content="A test page">
        </head><body>
            <h1>Welcome</h1>
            <p>Write to hello@example.com for anything at all.</p>
            <a href="/about">About</a>
            <a href="https://other.example.org/">Elsewhere</a>
        </body></html>"#
            .to_string(),
    )
    .await;

    let coordinator = coordinator();
    let output = coordinator
        .scrape(&ScrapeRequest::new(format!("{}/", server.uri())))
        .await
        .expect("Scrape failed");

    let page = output.as_page().expect("Expected a single-page result");
    assert_eq!(page.title.as_deref(), Some("Example"));
    assert_eq!(page.status_code, 200);
    assert!(page.content_type.starts_with("text/html"));
    assert_eq!(page.links().len(), 2);
    assert_eq!(page.links()[0].href, format!("{}/about", server.uri()));
    assert_eq!(
        page.metadata.open_graph.get("og:title").map(String::as_str),
        Some("Example OG")
    );
    assert_eq!(page.contact_info.emails, vec!["hello@example.com"]);
    assert!(page.social_links.is_empty());
}

#[tokio::test]
async fn test_selector_scrape() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/product",
        r#"<html><body>
            <h1 class="name">Widget</h1>
            <span class="price" data-currency="EUR">9.99</span>
        </body></html>"#
            .to_string(),
    )
    .await;

    let request = ScrapeRequest::new(format!("{}/product", server.uri()))
        .with_selectors([".price", ".missing"]);
    let output = coordinator().scrape(&request).await.expect("Scrape failed");

    let page = output.as_page().expect("Expected a single-page result");
    assert!(page.is_selector_mode());
    assert!(page.links().is_empty());

    let json = serde_json::to_value(&output).unwrap();
    assert_eq!(json["extracted"][".price"][0]["text"], "9.99");
    assert_eq!(
        json["extracted"][".price"][0]["attributes"]["data-currency"],
        "EUR"
    );
    assert_eq!(json["extracted"][".missing"], serde_json::json!([]));
    assert!(json.get("links").is_none());
}

#[tokio::test]
async fn test_site_crawl_respects_page_cap() {
    let server = MockServer::start().await;
    mount_page(&server, "/", linked_page("Home", &["/a"])).await;
    mount_page(&server, "/a", linked_page("A", &["/b"])).await;
    mount_page(&server, "/b", linked_page("B", &[])).await;

    let request = ScrapeRequest::new(format!("{}/", server.uri())).crawl(2);
    let output = coordinator().scrape(&request).await.expect("Crawl failed");

    let crawl = output.as_crawl().expect("Expected a crawl result");
    assert_eq!(crawl.crawl_type, SITE_WIDE);
    assert_eq!(crawl.pages_crawled, 2);
    assert_eq!(crawl.pages.len(), 2);

    let titles: Vec<_> = crawl.pages.iter().map(|p| p.title.as_deref()).collect();
    assert_eq!(titles, vec![Some("Home"), Some("A")]);

    let requested: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    assert!(!requested.contains(&"/b".to_string()));
}

#[tokio::test]
async fn test_site_crawl_stays_on_site_and_skips_failures() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        linked_page(
            "Home",
            &["/missing", "/ok", "/ok#section", "https://elsewhere.example.net/"],
        ),
    )
    .await;
    mount_page(&server, "/ok", linked_page("Ok", &["/"])).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let request = ScrapeRequest::new(server.uri()).crawl(10);
    let output = coordinator().scrape(&request).await.expect("Crawl failed");

    let crawl = output.as_crawl().expect("Expected a crawl result");
    assert_eq!(crawl.pages_crawled, 2);

    let titles: Vec<_> = crawl.pages.iter().map(|p| p.title.as_deref()).collect();
    assert_eq!(titles, vec![Some("Home"), Some("Ok")]);

    let ok_requests = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/ok")
        .count();
    assert_eq!(ok_requests, 1);
}

#[tokio::test]
async fn test_crawl_follows_links_after_cross_host_redirect() {
    let server = MockServer::start().await;
    let port = server.address().port();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("http://127.0.0.1:{port}/home").as_str()),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/home", linked_page("Home", &["/about"])).await;
    mount_page(&server, "/about", linked_page("About", &[])).await;

    let request = ScrapeRequest::new(format!("http://localhost:{port}/")).crawl(5);
    let output = coordinator().scrape(&request).await.expect("Crawl failed");

    let crawl = output.as_crawl().expect("Expected a crawl result");
    assert_eq!(crawl.pages_crawled, 2);

    let urls: Vec<_> = crawl.pages.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            format!("http://localhost:{port}/"),
            format!("http://localhost:{port}/about"),
        ]
    );
}

#[tokio::test]
async fn test_crawl_flag_ignored_for_non_root() {
    let server = MockServer::start().await;
    mount_page(&server, "/about", linked_page("About", &["/"])).await;

    let request = ScrapeRequest::new(format!("{}/about", server.uri())).crawl(5);
    let output = coordinator().scrape(&request).await.expect("Scrape failed");

    assert!(matches!(output, ScrapeOutput::Page(_)));
    assert_eq!(output.title(), Some("About"));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(&server, "/flaky", linked_page("Recovered", &[])).await;

    let output = coordinator()
        .scrape(&ScrapeRequest::new(format!("{}/flaky", server.uri())))
        .await
        .expect("Scrape failed after retry");

    assert_eq!(output.title(), Some("Recovered"));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = coordinator()
        .scrape(&ScrapeRequest::new(format!("{}/gone", server.uri())))
        .await;

    assert!(result.is_err());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_jobs_run_and_export() {
    let server = MockServer::start().await;
    mount_page(&server, "/", linked_page("Example", &["/next"])).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let coordinator = coordinator();
    let mut store = MemoryJobStore::new();

    let ok = store
        .create_job(ScrapeRequest::new(format!("{}/", server.uri())))
        .unwrap();
    let broken = store
        .create_job(ScrapeRequest::new(format!("{}/broken", server.uri())))
        .unwrap();

    let ok = run_job(&mut store, &coordinator, ok.job_id).await.unwrap();
    assert_eq!(ok.status, JobStatus::Completed);
    assert!(ok.completed_at.is_some());
    assert!(ok.duration_seconds.is_some());
    assert_eq!(ok.data.as_ref().unwrap()["title"], "Example");

    let broken = run_job(&mut store, &coordinator, broken.job_id)
        .await
        .unwrap();
    assert_eq!(broken.status, JobStatus::Failed);
    assert!(broken.error.as_deref().unwrap().contains("404"));
    assert!(broken.data.is_none());

    let csv = export_job(&ok, ExportFormat::Csv).unwrap();
    assert!(csv.contains("Title,Example\r\n"));
    assert!(csv.contains(&format!("Links\r\nText,URL\r\n/next,{}/next\r\n", server.uri())));

    let analytics = JobAnalytics::load(&store).unwrap();
    assert_eq!(analytics.total_jobs, 2);
    assert_eq!(analytics.completed_jobs, 1);
    assert_eq!(analytics.failed_jobs, 1);
    assert_eq!(analytics.success_rate, 50.0);

    coordinator.shutdown().await;
}
