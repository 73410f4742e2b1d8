//! hostcrawl main entry point
//!
//! This is the command-line interface for the hostcrawl same-host crawler.

use anyhow::{Context, Result};
use clap::Parser;
use hostcrawl::config::{
    apply_env_overrides, compute_config_hash, parse_config, validate, Config, LedgerBackend,
};
use hostcrawl::crawler::crawl;
use hostcrawl::output::{print_ledger, print_report};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// hostcrawl: a bounded-concurrency same-host crawler
///
/// hostcrawl crawls a site from its root page, following only links that
/// stay on the root's host, and records every visited page in a ledger.
#[derive(Parser, Debug)]
#[command(name = "hostcrawl")]
#[command(version)]
#[command(about = "A bounded-concurrency same-host web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Root URL to crawl (overrides config and HOSTCRAWL_ROOT_URL)
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Number of concurrent workers (overrides config and HOSTCRAWL_WORKERS)
    #[arg(long, value_name = "N")]
    workers: Option<u32>,

    /// Ledger location for the file and sqlite backends
    #[arg(long, value_name = "PATH")]
    ledger: Option<String>,

    /// Ledger backend
    #[arg(long, value_name = "BACKEND", value_parser = ["memory", "file", "sqlite"])]
    ledger_backend: Option<String>,

    /// Forget visits recorded by earlier runs before crawling
    #[arg(long)]
    fresh: bool,

    /// Print the ledger contents after the crawl
    #[arg(long)]
    show_ledger: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;

    if cli.dry_run {
        print_dry_run(&config);
        return Ok(());
    }

    tokio::select! {
        result = handle_crawl(config, cli.fresh, cli.show_ledger) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, abandoning in-flight pages");
            Ok(())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("hostcrawl=info,warn"),
            1 => EnvFilter::new("hostcrawl=debug,info"),
            2 => EnvFilter::new("hostcrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Layers config file, environment and flags, then validates the result
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let config = parse_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            let hash = compute_config_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    apply_env_overrides(&mut config);

    if let Some(url) = &cli.url {
        config.crawler.root_url = url.clone();
    }
    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }
    if let Some(backend) = cli.ledger_backend.as_deref().and_then(LedgerBackend::from_name) {
        config.ledger.backend = backend;
    }
    if let Some(path) = &cli.ledger {
        config.ledger.path = Some(path.clone());
        // A bare --ledger means a file ledger unless a backend was chosen
        if cli.ledger_backend.is_none() && config.ledger.backend == LedgerBackend::Memory {
            config.ledger.backend = LedgerBackend::File;
        }
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows the resolved configuration
fn print_dry_run(config: &Config) {
    println!("=== hostcrawl Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Root URL: {}", config.crawler.root_url);
    println!("  Workers: {}", config.crawler.workers);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);

    println!("\nUser Agent:");
    println!("  Header: {}", config.user_agent.header_value());

    println!("\nLedger:");
    println!("  Backend: {}", config.ledger.backend.as_str());
    if let Some(path) = &config.ledger.path {
        println!("  Path: {}", path);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, fresh: bool, show_ledger: bool) -> Result<()> {
    let report = crawl(config, fresh).await.context("Crawl failed to start")?;

    print_report(&report);

    if show_ledger {
        println!();
        print_ledger(&report.visited_sites);
    }

    Ok(())
}
