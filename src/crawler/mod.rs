//! Crawler module for catalogue fetching and extraction
//!
//! This module contains the core crawling logic, including:
//! - Page fetching through a browser context
//! - Summary and detail extraction from loaded documents
//! - List and detail scrapers with an optional retry policy
//! - Overall crawl coordination

mod coordinator;
mod extract;
mod fetcher;
mod retry;
mod scraper;

pub use coordinator::{run_crawl, Coordinator};
pub use extract::{extract_detail, extract_summaries, parse_availability};
pub use fetcher::{fetch_page, LoadedDocument};
pub use retry::{
    fetch_with_retry, retry_policy_from_config, ExponentialBackoff, NoRetry, RetryPolicy,
};
pub use scraper::{scrape_detail, scrape_page, DetailOutcome, ScrapeOptions};
