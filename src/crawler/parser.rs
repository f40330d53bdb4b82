//! Link extraction from fetched pages
//!
//! Links are pulled out of `href` attribute values with a pattern match rather
//! than a full HTML parse. Crawled markup is uncontrolled and often broken; the
//! pattern keeps working where a tree builder would have to guess.

use regex::bytes::{CaptureMatches, Regex};
use std::sync::OnceLock;
use url::Url;

/// Matches `href="..."` / `href='...'` as a standalone attribute name, ASCII
/// case-insensitive, with optional spaces around `=`. The name may follow
/// whitespace, a `/`, or the closing quote of the previous attribute.
fn href_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i-u)(?:^|[\s/"'])href\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
            .expect("href pattern is valid")
    })
}

/// Returns true if a Content-Type header declares a markup document
///
/// Accepts `text/html` and `application/xhtml+xml`; parameters such as
/// `charset` are ignored. Unparseable values are not markup.
///
/// # Examples
///
/// ```
/// use reachcheck::crawler::is_markup;
///
/// assert!(is_markup("text/html; charset=utf-8"));
/// assert!(is_markup("application/xhtml+xml"));
/// assert!(!is_markup("image/png"));
/// assert!(!is_markup(""));
/// ```
pub fn is_markup(content_type: &str) -> bool {
    let Ok(parsed) = content_type.trim().parse::<mime::Mime>() else {
        return false;
    };

    if parsed.type_() == mime::TEXT {
        parsed.subtype() == mime::HTML
    } else if parsed.type_() == mime::APPLICATION {
        parsed.subtype().as_str() == "xhtml" && parsed.suffix() == Some(mime::XML)
    } else {
        false
    }
}

/// Extracts the absolute URLs referenced by a page's `href` attributes
///
/// Returns an empty sequence unless `content_type` is markup. Each raw href is
/// resolved against `final_url`, the post-redirect address of the page, so
/// relative links land where the browser would send them. Hrefs that are not
/// valid UTF-8 or cannot be resolved are skipped.
///
/// The returned iterator is lazy and borrows the body; scope filtering is left
/// to the caller.
///
/// # Example
///
/// ```
/// use reachcheck::crawler::extract_links;
/// use url::Url;
///
/// let body = br#"<a href="/about">About</a> <a href="mailto:x@sohu.com">Mail</a>"#;
/// let base = Url::parse("http://www.sohu.com/home").unwrap();
/// let links: Vec<Url> = extract_links(body, "text/html", &base).collect();
/// assert_eq!(links[0].as_str(), "http://www.sohu.com/about");
/// assert_eq!(links[1].scheme(), "mailto");
/// ```
pub fn extract_links<'a>(body: &'a [u8], content_type: &str, final_url: &'a Url) -> Links<'a> {
    let captures = is_markup(content_type).then(|| href_pattern().captures_iter(body));
    Links {
        captures,
        base: final_url,
    }
}

/// Lazy iterator over the links of one page, see [`extract_links`]
pub struct Links<'a> {
    captures: Option<CaptureMatches<'static, 'a>>,
    base: &'a Url,
}

impl Iterator for Links<'_> {
    type Item = Url;

    fn next(&mut self) -> Option<Url> {
        let captures = self.captures.as_mut()?;
        for caps in captures {
            let Some(raw) = caps.get(1).or_else(|| caps.get(2)) else {
                continue;
            };
            if let Some(url) = resolve_href(raw.as_bytes(), self.base) {
                return Some(url);
            }
        }
        None
    }
}

/// Decodes and resolves a single raw href, returning None for anything unusable
fn resolve_href(raw: &[u8], base: &Url) -> Option<Url> {
    let href = std::str::from_utf8(raw).ok()?.trim();
    if href.is_empty() {
        return None;
    }

    if href.contains("&amp;") {
        base.join(&href.replace("&amp;", "&")).ok()
    } else {
        base.join(href).ok()
    }
}
