use crate::config::types::{Config, CrawlConfig, OutputConfig};
use crate::url::matches_domain_suffix;
use crate::ConfigError;
use reqwest::header::{HeaderName, HeaderValue};
use std::collections::BTreeMap;
use url::Url;

const MAX_WORKER_COUNT: usize = 256;
const MAX_TIMEOUT_SECONDS: u64 = 600;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_config(&config.crawl)?;
    validate_output_config(&config.output)?;
    validate_headers(&config.headers)?;
    Ok(())
}

/// Validates crawl configuration
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.worker_count < 1 || config.worker_count > MAX_WORKER_COUNT {
        return Err(ConfigError::Validation(format!(
            "worker-count must be between 1 and {}, got {}",
            MAX_WORKER_COUNT, config.worker_count
        )));
    }

    if config.timeout_seconds < 1 || config.timeout_seconds > MAX_TIMEOUT_SECONDS {
        return Err(ConfigError::Validation(format!(
            "timeout-seconds must be between 1 and {}, got {}",
            MAX_TIMEOUT_SECONDS, config.timeout_seconds
        )));
    }

    validate_domain_string(&config.domain_suffix)?;
    validate_seed(&config.seed_url, &config.domain_suffix)?;

    Ok(())
}

/// Validates the seed URL: absolute http(s) with a host inside the crawl domain
fn validate_seed(seed: &str, domain_suffix: &str) -> Result<(), ConfigError> {
    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Seed URL '{}' must use http or https",
            seed
        )));
    }

    let host = url
        .host_str()
        .ok_or_else(|| ConfigError::InvalidUrl(format!("Seed URL '{}' has no host", seed)))?;

    if !matches_domain_suffix(host, domain_suffix) {
        return Err(ConfigError::Validation(format!(
            "Seed URL '{}' is outside domain '{}'",
            seed, domain_suffix
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.log_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "log-path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates that every configured header can be sent on the wire
fn validate_headers(headers: &BTreeMap<String, String>) -> Result<(), ConfigError> {
    for (name, value) in headers {
        HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
            ConfigError::Validation(format!("Invalid header name '{}'", name))
        })?;
        HeaderValue::from_str(value).map_err(|_| {
            ConfigError::Validation(format!("Invalid value for header '{}'", name))
        })?;
    }
    Ok(())
}

/// Validates a domain suffix such as `sohu.com` or `localhost`
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain suffix cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    Ok(())
}
