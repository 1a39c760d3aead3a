//! List and detail scrapers
//!
//! Both scrapers fetch a page through the retry policy, run an extractor
//! over the loaded document, then make every URL field absolute. A failed
//! fetch is handed back verbatim as a [`FetchFailure`]; no records are
//! returned from a page that did not load.

use crate::browser::{BrowserContext, NavigationOptions};
use crate::config::Config;
use crate::crawler::extract::{extract_detail, extract_summaries};
use crate::crawler::retry::{fetch_with_retry, retry_policy_from_config, RetryPolicy};
use crate::records::{DetailRecord, FetchFailure, SummaryRecord};
use crate::url::{resolve_thumbnail, resolve_url};
use crate::{ConfigError, CrawlError};
use std::sync::Arc;
use std::time::Duration;

/// Outcome of a detail scrape: the record, or the fetch failure value
pub type DetailOutcome = Result<DetailRecord, FetchFailure>;

/// Settings shared by every scrape of a run
#[derive(Clone)]
pub struct ScrapeOptions {
    /// Timeout and quiescence condition for each navigation
    pub navigation: NavigationOptions,
    /// Base for list-page item links
    pub catalogue_url: String,
    /// Site root, base for detail thumbnails
    pub base_url: String,
    /// Re-fetch strategy wrapped around the page fetcher
    pub retry: Arc<dyn RetryPolicy>,
}

impl ScrapeOptions {
    /// Derives scrape options from a validated configuration
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let wait_until = config
            .browser
            .wait_until
            .parse()
            .map_err(ConfigError::Validation)?;

        Ok(Self {
            navigation: NavigationOptions {
                timeout: Duration::from_millis(config.browser.navigation_timeout_ms),
                wait_until,
            },
            catalogue_url: config.crawler.catalogue_url.clone(),
            base_url: config.crawler.base_url.clone(),
            retry: retry_policy_from_config(&config.retry),
        })
    }
}

/// Scrapes the catalogue entries of one list page
///
/// # Arguments
///
/// * `context` - The list browsing context
/// * `page_url` - Absolute URL of the list page
/// * `options` - Shared scrape options
///
/// # Returns
///
/// * `Ok(Vec<SummaryRecord>)` - Entries with absolute links (possibly empty)
/// * `Err(FetchFailure)` - The page did not load
pub async fn scrape_page(
    context: &dyn BrowserContext,
    page_url: &str,
    options: &ScrapeOptions,
) -> Result<Vec<SummaryRecord>, FetchFailure> {
    let document =
        fetch_with_retry(context, page_url, &options.navigation, options.retry.as_ref()).await?;

    let entries = document.evaluate(extract_summaries);
    let mut summaries = Vec::with_capacity(entries.len());

    for mut summary in entries {
        summary.link = match resolve_url(&summary.link, &options.catalogue_url) {
            Ok(link) => link,
            Err(e) => {
                tracing::warn!(
                    "Skipping '{}' on {}: unusable link ({})",
                    summary.title,
                    page_url,
                    e
                );
                continue;
            }
        };

        // List thumbnails are relative to the page they appear on
        summary.thumbnail = summary
            .thumbnail
            .and_then(|src| resolve_url(&src, document.url()).ok());

        summaries.push(summary);
    }

    tracing::debug!("Extracted {} entries from {}", summaries.len(), page_url);
    Ok(summaries)
}

/// Scrapes the detail page of one item
///
/// `item_url` is made absolute against the catalogue root first, which is
/// a no-op for links coming out of [`scrape_page`].
///
/// # Returns
///
/// * `Ok(Ok(DetailRecord))` - The detail record with an absolute thumbnail
/// * `Ok(Err(FetchFailure))` - The page did not load
/// * `Err(CrawlError)` - The item URL could not be resolved
pub async fn scrape_detail(
    context: &dyn BrowserContext,
    item_url: &str,
    options: &ScrapeOptions,
) -> Result<DetailOutcome, CrawlError> {
    let url = resolve_url(item_url, &options.catalogue_url)?;

    let document =
        match fetch_with_retry(context, &url, &options.navigation, options.retry.as_ref()).await {
            Ok(document) => document,
            Err(failure) => return Ok(Err(failure)),
        };

    let mut detail = document.evaluate(extract_detail);

    detail.thumbnail = match detail.thumbnail.take() {
        Some(src) => match resolve_thumbnail(&src, &options.base_url) {
            Ok(thumbnail) => Some(thumbnail),
            Err(e) => {
                tracing::warn!("Dropping thumbnail of {}: {}", url, e);
                None
            }
        },
        None => None,
    };

    Ok(Ok(detail))
}
