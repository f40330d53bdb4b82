//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client with the configured request headers
//! - Following redirects and reporting the final URL
//! - Classifying failures as protocol, network, timeout or unknown

use crate::config::Config;
use crate::crawler::parser::is_markup;
use crate::url::ScopeFilter;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum redirect hops followed for a single fetch
const MAX_REDIRECTS: usize = 10;

/// Redirect stopped because its target is outside the crawl domain
#[derive(Debug, Error)]
#[error("redirected out of scope to {0}")]
struct OutOfScopeRedirect(String);

/// Redirect chain longer than `MAX_REDIRECTS`
#[derive(Debug, Error)]
#[error("too many redirects")]
struct TooManyRedirects;

/// A successfully fetched response
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP status code of the final response
    pub status_code: u16,

    /// Content-Type header value (empty if absent)
    pub content_type: String,

    /// Response body; left empty for non-markup responses
    pub body: Vec<u8>,

    /// URL after following redirects
    pub final_url: Url,
}

/// Why a fetch attempt did not produce a usable response
///
/// The `Display` form is the reason string written to the error log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    /// Non-success HTTP status or a broken redirect chain
    #[error("{reason}")]
    Protocol { status: Option<u16>, reason: String },

    /// Connection, DNS, TLS or body transfer failure
    #[error("{0}")]
    Network(String),

    /// No response within the configured timeout
    #[error("timeout")]
    Timeout,

    /// Anything the other variants do not anticipate, including panics
    #[error("unknown error: {0}")]
    Unknown(String),
}

impl FetchFailure {
    /// Builds a protocol failure for an HTTP status, using its reason phrase
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        let reason = match status.canonical_reason() {
            Some(phrase) => format!("{} {}", status.as_u16(), phrase),
            None => format!("HTTP {}", status.as_u16()),
        };
        FetchFailure::Protocol {
            status: Some(status.as_u16()),
            reason,
        }
    }

    /// Short category label used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            FetchFailure::Protocol { .. } => "protocol",
            FetchFailure::Network(_) => "network",
            FetchFailure::Timeout => "timeout",
            FetchFailure::Unknown(_) => "unknown",
        }
    }
}

/// Result of one fetch attempt; produced once and never mutated
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Success(FetchedPage),
    Failure(FetchFailure),
}

/// Capability that retrieves a URL
///
/// Implementations resolve redirects, report the final URL, and map every
/// error onto a [`FetchFailure`]. They must not panic on network errors; a
/// panic is still caught by the worker and recorded as `Unknown`.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(&self, url: &Url) -> impl Future<Output = FetchOutcome> + Send;
}

/// Builds an HTTP client with the configured headers and timeouts
///
/// Redirects are followed only while every hop stays inside the crawl domain;
/// a hop leaving it ends the fetch without requesting the foreign URL.
///
/// # Arguments
///
/// * `config` - The crawler configuration; `[headers]` entries are layered over
///   the defaults, `timeout-seconds` bounds both connect and whole-request
///   time, and `domain-suffix` bounds redirects
///
/// # Example
///
/// ```no_run
/// use reachcheck::config::Config;
/// use reachcheck::crawler::build_http_client;
///
/// let config = Config::from_seed("http://www.sohu.com/").unwrap();
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    for (name, value) in config.effective_headers() {
        // Configs built in code skip validation
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!("Ignoring invalid request header '{}'", name),
        }
    }

    let timeout = Duration::from_secs(config.crawl.timeout_seconds);

    Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(scoped_redirect_policy(ScopeFilter::new(
            config.crawl.domain_suffix.as_str(),
        )))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Follows up to `MAX_REDIRECTS` hops, refusing any hop the scope rejects
fn scoped_redirect_policy(scope: ScopeFilter) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error(TooManyRedirects);
        }
        if scope.admit_url(attempt.url().clone()).is_none() {
            let target = attempt.url().to_string();
            return attempt.error(OutOfScopeRedirect(target));
        }
        attempt.follow()
    })
}

/// Fetcher backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher from the crawler configuration
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> FetchOutcome {
        fetch_url(&self.client, url).await
    }
}

/// Fetches a URL and classifies the outcome
///
/// # Request Flow
///
/// 1. Send a GET; in-scope redirects are followed by the client (max 10 hops)
/// 2. Non-2xx final status → `Protocol` failure with the reason phrase
/// 3. Markup content → read the body
/// 4. Anything else → success with an empty body; it is reachable but not
///    traversed
pub async fn fetch_url(client: &Client, url: &Url) -> FetchOutcome {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => return FetchOutcome::Failure(classify_error(&e)),
    };

    let status = response.status();
    let final_url = response.url().clone();

    if !status.is_success() {
        return FetchOutcome::Failure(FetchFailure::from_status(status));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let body = if is_markup(&content_type) {
        match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => return FetchOutcome::Failure(classify_error(&e)),
        }
    } else {
        Vec::new()
    };

    FetchOutcome::Success(FetchedPage {
        status_code: status.as_u16(),
        content_type,
        body,
        final_url,
    })
}

/// Maps a `reqwest` error onto the failure taxonomy
fn classify_error(e: &reqwest::Error) -> FetchFailure {
    if e.is_timeout() {
        FetchFailure::Timeout
    } else if e.is_redirect() {
        let reason = if has_source::<OutOfScopeRedirect>(e) {
            "redirected out of scope"
        } else {
            "too many redirects"
        };
        FetchFailure::Protocol {
            status: None,
            reason: reason.to_string(),
        }
    } else if let Some(status) = e.status() {
        FetchFailure::from_status(status)
    } else if e.is_connect() || e.is_request() || e.is_body() || e.is_decode() {
        FetchFailure::Network(root_cause(e))
    } else {
        FetchFailure::Unknown(root_cause(e))
    }
}

/// Returns true if any error in the source chain is a `T`
fn has_source<T: std::error::Error + 'static>(e: &reqwest::Error) -> bool {
    let mut source = std::error::Error::source(e);
    while let Some(inner) = source {
        if inner.is::<T>() {
            return true;
        }
        source = inner.source();
    }
    false
}

/// Walks the source chain to the innermost error message
///
/// reqwest's own message only says "error sending request"; the interesting
/// part (connection refused, DNS failure, certificate error) sits underneath.
fn root_cause(e: &reqwest::Error) -> String {
    let mut message = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(inner) = source {
        message = inner.to_string();
        source = inner.source();
    }
    message
}
