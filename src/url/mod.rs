//! URL handling module for Reachcheck
//!
//! This module provides URL normalization, domain-suffix matching, and the
//! scope filter that decides which discovered links the crawl may follow.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, matches_domain_suffix};
pub use normalize::{normalize_url, strip_fragment};

use url::Url;

/// Decides whether a candidate link belongs to the crawl
///
/// A link is in scope when, after resolution against the page it was found on,
/// it is an absolute `http`/`https` URL whose host is the target domain or one
/// of its subdomains. The filter is pure: malformed input simply fails it.
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    domain_suffix: String,
}

impl ScopeFilter {
    /// Creates a filter for `domain_suffix` (e.g. `sohu.com`)
    pub fn new(domain_suffix: impl Into<String>) -> Self {
        Self {
            domain_suffix: domain_suffix.into().to_lowercase(),
        }
    }

    /// Returns the domain suffix this filter admits
    pub fn domain_suffix(&self) -> &str {
        &self.domain_suffix
    }

    /// Returns true if `candidate`, resolved against `base`, may be crawled
    pub fn in_scope(&self, candidate: &str, base: &Url) -> bool {
        self.admit(candidate, base).is_some()
    }

    /// Resolves `candidate` against `base` and returns the normalized URL if in scope
    ///
    /// # Examples
    ///
    /// ```
    /// use reachcheck::url::ScopeFilter;
    /// use url::Url;
    ///
    /// let filter = ScopeFilter::new("sohu.com");
    /// let base = Url::parse("http://www.sohu.com/home").unwrap();
    ///
    /// let url = filter.admit("/about#team", &base).unwrap();
    /// assert_eq!(url.as_str(), "http://www.sohu.com/about");
    /// assert!(filter.admit("mailto:x@sohu.com", &base).is_none());
    /// assert!(filter.admit("http://example.com/", &base).is_none());
    /// ```
    pub fn admit(&self, candidate: &str, base: &Url) -> Option<Url> {
        let resolved = base.join(candidate.trim()).ok()?;
        self.admit_url(resolved)
    }

    /// Applies the scope rules to an already absolute URL
    pub fn admit_url(&self, url: Url) -> Option<Url> {
        if url.scheme() != "http" && url.scheme() != "https" {
            return None;
        }

        let host = url.host_str()?;
        if !matches_domain_suffix(host, &self.domain_suffix) {
            return None;
        }

        Some(strip_fragment(url))
    }
}
