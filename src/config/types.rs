use crate::url::extract_domain;
use serde::Deserialize;
use std::collections::BTreeMap;

pub const DEFAULT_WORKER_COUNT: usize = 4;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_LOG_PATH: &str = "url_error.log";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/60.0.3112.101 Safari/537.36";
const DEFAULT_ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.8,en;q=0.6";

/// Main configuration structure for Reachcheck
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Request headers attached to every fetch; missing entries fall back to
    /// [`default_headers`] when the client is built
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// URL the crawl starts from
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Hosts equal to this suffix or ending in `.<suffix>` are in scope
    #[serde(rename = "domain-suffix")]
    pub domain_suffix: String,

    /// Number of concurrent fetch workers
    #[serde(rename = "worker-count", default = "default_worker_count")]
    pub worker_count: usize,

    /// Connect/read timeout for a single fetch, in seconds
    #[serde(rename = "timeout-seconds", default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Whether to draw the rolling progress line on stdout
    #[serde(default = "default_progress")]
    pub progress: bool,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the append-only error log
    #[serde(rename = "log-path", default = "default_log_path")]
    pub log_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            log_path: default_log_path(),
        }
    }
}

impl Config {
    /// Builds a configuration for a seed URL with every other option at its default
    ///
    /// The domain suffix is the seed's host with a leading `www.` removed, so
    /// `http://www.sohu.com/` crawls `sohu.com` and all of its subdomains.
    /// Returns None if the seed has no host.
    pub fn from_seed(seed_url: &str) -> Option<Self> {
        let parsed = ::url::Url::parse(seed_url).ok()?;
        let host = extract_domain(&parsed)?;
        let domain_suffix = host.strip_prefix("www.").unwrap_or(&host).to_string();

        Some(Self {
            crawl: CrawlConfig {
                seed_url: seed_url.to_string(),
                domain_suffix,
                worker_count: DEFAULT_WORKER_COUNT,
                timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
                progress: true,
            },
            output: OutputConfig::default(),
            headers: BTreeMap::new(),
        })
    }

    /// Returns the configured headers layered over the defaults
    pub fn effective_headers(&self) -> BTreeMap<String, String> {
        let mut headers = default_headers(&self.crawl.seed_url);
        for (name, value) in &self.headers {
            // Header names are case-insensitive; drop a default spelled differently
            headers.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
            headers.insert(name.clone(), value.clone());
        }
        headers
    }
}

/// Default request headers, mimicking an ordinary browser visit from the seed
pub fn default_headers(referer: &str) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    headers.insert("Connection".to_string(), "keep-alive".to_string());
    headers.insert("Referer".to_string(), referer.to_string());
    headers.insert(
        "Accept-Language".to_string(),
        DEFAULT_ACCEPT_LANGUAGE.to_string(),
    );
    headers.insert("User-Agent".to_string(), DEFAULT_USER_AGENT.to_string());
    headers
}

fn default_worker_count() -> usize {
    DEFAULT_WORKER_COUNT
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_progress() -> bool {
    true
}

fn default_log_path() -> String {
    DEFAULT_LOG_PATH.to_string()
}
