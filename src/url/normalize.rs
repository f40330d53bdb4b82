use crate::UrlError;
use url::Url;

/// Normalizes a URL into the form stored in the frontier
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or relative
/// 2. Require an `http` or `https` scheme
/// 3. Require a host
/// 4. Remove the fragment (everything after `#`)
///
/// Host lowercasing, default-port removal and dot-segment resolution come from
/// the WHATWG parser itself. Query strings are kept: they address different
/// resources on most sites.
///
/// # Examples
///
/// ```
/// use reachcheck::url::normalize_url;
///
/// let url = normalize_url("http://WWW.SOHU.COM/a#sec1").unwrap();
/// assert_eq!(url.as_str(), "http://www.sohu.com/a");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(strip_fragment(url))
}

/// Drops the fragment component, so `/a#sec1` and `/a#sec2` become the same URL
pub fn strip_fragment(mut url: Url) -> Url {
    url.set_fragment(None);
    url
}
