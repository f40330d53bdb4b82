use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use reachcheck::url::extract_domain;
///
/// let url = Url::parse("https://NEWS.sohu.com/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("news.sohu.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks whether a host belongs to a domain
///
/// A host belongs to `suffix` when it equals it or is any subdomain of it.
/// Matching is label-aligned and case-insensitive: `news.sohu.com` belongs to
/// `sohu.com`, `evilsohu.com` does not.
///
/// # Examples
///
/// ```
/// use reachcheck::url::matches_domain_suffix;
///
/// assert!(matches_domain_suffix("sohu.com", "sohu.com"));
/// assert!(matches_domain_suffix("www.sohu.com", "sohu.com"));
/// assert!(matches_domain_suffix("a.b.sohu.com", "sohu.com"));
/// assert!(!matches_domain_suffix("evilsohu.com", "sohu.com"));
/// assert!(!matches_domain_suffix("sohu.com.cn", "sohu.com"));
/// ```
pub fn matches_domain_suffix(host: &str, suffix: &str) -> bool {
    let host = host.trim_end_matches('.');
    let suffix = suffix.trim_end_matches('.');
    if suffix.is_empty() || host.len() < suffix.len() {
        return false;
    }

    let split = host.len() - suffix.len();
    if !host.is_char_boundary(split) {
        return false;
    }

    let (head, tail) = host.split_at(split);
    if !tail.eq_ignore_ascii_case(suffix) {
        return false;
    }

    head.is_empty() || head.ends_with('.')
}
