//! Reachcheck main entry point
//!
//! This is the command-line interface for the Reachcheck dead-link crawler.

use clap::Parser;
use reachcheck::config::{load_config_with_hash, validate, Config};
use reachcheck::crawler::crawl;
use reachcheck::output::print_report;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Reachcheck: a scoped reachability crawler
///
/// Reachcheck walks every page reachable from a seed URL inside one domain
/// and its subdomains, and appends each URL that cannot be fetched to an
/// error log together with the reason and a timestamp.
#[derive(Parser, Debug)]
#[command(name = "reachcheck")]
#[command(version = "1.0.0")]
#[command(about = "A scoped reachability crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Seed URL to start from (required without a config file)
    #[arg(long, value_name = "URL")]
    seed: Option<String>,

    /// Domain suffix to stay inside (defaults to the seed host without "www.")
    #[arg(long, value_name = "DOMAIN")]
    domain: Option<String>,

    /// Number of concurrent fetch workers
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Fetch timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Path of the error log
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,

    /// Disable the rolling progress line
    #[arg(long)]
    no_progress: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    tracing::info!(
        "Crawling {} within {}",
        config.crawl.seed_url,
        config.crawl.domain_suffix
    );

    let log_path = PathBuf::from(&config.output.log_path);
    match crawl(config).await {
        Ok(report) => {
            if !cli.quiet {
                print_report(&report, &log_path);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Diagnostics go to stderr; stdout belongs to the progress line and summary.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("reachcheck=info,warn"),
            1 => EnvFilter::new("reachcheck=debug,info"),
            2 => EnvFilter::new("reachcheck=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (if any) and applies command-line overrides
fn build_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => load_from_file(path)?,
        None => {
            let seed = cli
                .seed
                .as_deref()
                .ok_or("either a CONFIG file or --seed is required")?;
            Config::from_seed(seed).ok_or_else(|| format!("Invalid seed URL: {}", seed))?
        }
    };

    if let Some(seed) = &cli.seed {
        config.crawl.seed_url = seed.clone();
    }
    if let Some(domain) = &cli.domain {
        config.crawl.domain_suffix = domain.clone();
    }
    if let Some(workers) = cli.workers {
        config.crawl.worker_count = workers;
    }
    if let Some(timeout) = cli.timeout {
        config.crawl.timeout_seconds = timeout;
    }
    if let Some(log) = &cli.log {
        config.output.log_path = log.display().to_string();
    }
    if cli.no_progress || cli.quiet {
        config.crawl.progress = false;
    }

    // Overrides may have broken what the file got right
    validate(&config)?;
    Ok(config)
}

fn load_from_file(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}
