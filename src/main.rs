//! Shelf-Crawler main entry point
//!
//! This is the command-line interface for the Shelf-Crawler catalogue crawler.

use anyhow::Context;
use clap::Parser;
use shelf_crawler::config::{load_config_with_hash, validate, Config};
use shelf_crawler::crawler::run_crawl;
use shelf_crawler::resolve_url;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Shelf-Crawler: a paginated catalogue crawler
///
/// Shelf-Crawler walks the list pages of a book catalogue, visits every
/// listed item's detail page and writes the extracted records as JSON.
#[derive(Parser, Debug)]
#[command(name = "shelf-crawler")]
#[command(version)]
#[command(about = "A paginated catalogue crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Override the number of list pages to visit
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Override the output data directory
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Stop at the first list page with no entries
    #[arg(long)]
    stop_on_empty_page: bool,

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
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_effective_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shelf_crawler=info,warn"),
            1 => EnvFilter::new("shelf_crawler=debug,info"),
            2 => EnvFilter::new("shelf_crawler=trace,debug"),
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

/// Loads the config file (or defaults), applies CLI overrides and validates
fn load_effective_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.data_dir = dir.to_string_lossy().into_owned();
    }
    if cli.stop_on_empty_page {
        config.crawler.stop_on_empty_page = true;
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows the effective config and the pages to visit
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Shelf-Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Base URL: {}", config.crawler.base_url);
    println!("  Catalogue URL: {}", config.crawler.catalogue_url);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Item delay: {}ms", config.crawler.item_delay_ms);
    println!("  Page delay: {}ms", config.crawler.page_delay_ms);
    println!("  Stop on empty page: {}", config.crawler.stop_on_empty_page);

    println!("\nBrowser:");
    println!("  Navigation timeout: {}ms", config.browser.navigation_timeout_ms);
    println!("  Wait until: {}", config.browser.wait_until);
    println!("  User agent: {}", config.browser.user_agent);
    println!("  Blocked resources: {}", config.browser.blocked_resources.join(", "));

    println!("\nRetry:");
    println!("  Max retries: {}", config.retry.max_retries);
    if config.retry.max_retries > 0 {
        println!("  Initial backoff: {}ms", config.retry.initial_backoff_ms);
        println!("  Backoff multiplier: {}", config.retry.backoff_multiplier);
    }

    println!("\nOutput:");
    println!("  Data directory: {}", config.output.data_dir);
    println!("  Books subdirectory: {}", config.output.books_subdir);

    println!("\nList pages ({}):", config.crawler.max_pages);
    for page in 1..=config.crawler.max_pages {
        let url = resolve_url(&config.crawler.page_path(page), &config.crawler.base_url)?;
        println!("  - {}", url);
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    match run_crawl(config).await {
        Ok(report) => {
            tracing::info!(
                "Crawl completed: {} books from {} pages",
                report.result.metadata.total_books,
                report.result.metadata.pages_scraped
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
