use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host, it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_harvester::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the scoping key of a URL: lowercase host plus explicit port
///
/// Two URLs belong to the same crawl scope when their keys are equal.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_harvester::url::site_key;
///
/// let url = Url::parse("http://127.0.0.1:8080/a").unwrap();
/// assert_eq!(site_key(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn site_key(url: &Url) -> Option<String> {
    let host = extract_domain(url)?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_domain() {
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_subdomain() {
        let url = Url::parse("https://blog.example.com/post").unwrap();
        assert_eq!(extract_domain(&url), Some("blog.example.com".to_string()));
    }

    #[test]
    fn test_extract_with_port() {
        let url = Url::parse("https://example.com:8080/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_site_key_default_port_omitted() {
        let url = Url::parse("https://example.com:443/").unwrap();
        assert_eq!(site_key(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_site_key_distinguishes_ports_and_subdomains() {
        let a = Url::parse("https://example.com/a").unwrap();
        let b = Url::parse("https://EXAMPLE.com/b?x=1").unwrap();
        let c = Url::parse("https://blog.example.com/").unwrap();
        let d = Url::parse("https://example.com:8443/").unwrap();

        assert_eq!(site_key(&a), site_key(&b));
        assert_ne!(site_key(&a), site_key(&c));
        assert_ne!(site_key(&a), site_key(&d));
    }
}
