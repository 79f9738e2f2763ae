/// Checks if a host belongs to a registered domain
///
/// A host matches when it equals the domain or is any subdomain of it:
/// `"github.com"` matches `"github.com"` and `"gist.github.com"` but not
/// `"notgithub.com"`. Both sides are compared case-insensitively.
///
/// # Examples
///
/// ```
/// use site_harvester::url::matches_domain;
///
/// assert!(matches_domain("x.com", "x.com"));
/// assert!(matches_domain("facebook.com", "m.facebook.com"));
/// assert!(!matches_domain("x.com", "dropbox.com"));
/// ```
pub fn matches_domain(domain: &str, host: &str) -> bool {
    if domain.is_empty() || host.is_empty() {
        return false;
    }

    let domain = domain.to_ascii_lowercase();
    let host = host.to_ascii_lowercase();

    host == domain || host.ends_with(&format!(".{}", domain))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(matches_domain("example.com", "example.com"));
        assert!(matches_domain("youtu.be", "youtu.be"));
    }

    #[test]
    fn test_subdomain_match() {
        assert!(matches_domain("linkedin.com", "www.linkedin.com"));
        assert!(matches_domain("github.com", "api.v2.github.com"));
    }

    #[test]
    fn test_no_match_different_domain() {
        assert!(!matches_domain("example.com", "example.org"));
        assert!(!matches_domain("example.com", "notexample.com"));
    }

    #[test]
    fn test_no_match_partial() {
        // "x.com" must not claim every host ending in "x.com"
        assert!(!matches_domain("x.com", "box.com"));
        assert!(!matches_domain("example.com", "example.com.evil.org"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(matches_domain("github.com", "GitHub.COM"));
    }

    #[test]
    fn test_empty_strings() {
        assert!(!matches_domain("example.com", ""));
        assert!(!matches_domain("", "example.com"));
        assert!(!matches_domain("", ""));
    }
}
