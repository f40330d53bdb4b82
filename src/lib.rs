//! Reachcheck: a scoped reachability crawler
//!
//! This crate walks every page reachable from a seed URL inside a target domain
//! (subdomains included), checks that each one can be fetched, and records every
//! unreachable link with its URL, failure reason and timestamp.

pub mod config;
pub mod crawler;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for Reachcheck operations
///
/// Only startup and shutdown problems surface here. Per-URL fetch failures are
/// recorded in the error log and never propagate.
#[derive(Debug, Error)]
pub enum ReachError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Seed URL {url} is outside the crawl domain {domain}")]
    SeedOutOfScope { url: String, domain: String },

    #[error("Error log writer failed: {0}")]
    Sink(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Reachcheck operations
pub type Result<T> = std::result::Result<T, ReachError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, Coordinator, CrawlReport};
pub use url::{normalize_url, ScopeFilter};
