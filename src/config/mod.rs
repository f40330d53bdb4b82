//! Configuration module for Reachcheck
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use reachcheck::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("reachcheck.toml")).unwrap();
//! println!("Crawling {} with {} workers", config.crawl.domain_suffix, config.crawl.worker_count);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    default_headers, Config, CrawlConfig, OutputConfig, DEFAULT_LOG_PATH, DEFAULT_TIMEOUT_SECONDS,
    DEFAULT_WORKER_COUNT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
