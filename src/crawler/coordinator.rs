//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the page loop that drives a whole run:
//! - Walking list pages `1..=max_pages` through one long-lived list context
//! - Visiting every listed item through a detail context opened per page
//! - Merging summaries with details, or degrading them when details fail
//! - Pacing requests between items and pages
//! - Finalizing the run and closing the browser on every exit path

use crate::browser::{Browser, BrowserContext, BrowserSession, HttpBrowser, InterceptionPolicy};
use crate::config::Config;
use crate::crawler::scraper::{scrape_detail, scrape_page, ScrapeOptions};
use crate::output::{finalize, print_report, CrawlProgress, CrawlReport, JsonFileSink, RecordSink};
use crate::records::{BookEntry, MergedRecord, SummaryRecord};
use crate::url::{resolve_url, slugify};
use crate::{ConfigError, CrawlError};
use std::future::Future;
use std::time::Duration;

/// How one list page ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageOutcome {
    /// Entries were read and their items visited
    Scraped(usize),
    /// The page loaded but listed nothing
    Empty,
    /// The list page did not load
    Failed,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    session: BrowserSession,
    sink: Box<dyn RecordSink>,
    options: ScrapeOptions,
    policy: InterceptionPolicy,
}

impl Coordinator {
    /// Creates a coordinator backed by the HTTP browser and JSON file sink
    ///
    /// # Arguments
    ///
    /// * `config` - A validated crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CrawlError)` - The browser could not be launched or the config is unusable
    pub fn new(config: Config) -> Result<Self, CrawlError> {
        let browser = HttpBrowser::launch(&config.browser)?;
        let sink = JsonFileSink::new(&config.output.data_dir, &config.output.books_subdir);
        Self::with_parts(config, Box::new(browser), Box::new(sink))
    }

    /// Creates a coordinator from an explicit browser and sink
    pub fn with_parts(
        config: Config,
        browser: Box<dyn Browser>,
        sink: Box<dyn RecordSink>,
    ) -> Result<Self, CrawlError> {
        let options = ScrapeOptions::from_config(&config)?;
        let policy = InterceptionPolicy::from_names(&config.browser.blocked_resources)
            .map_err(ConfigError::Validation)?;

        Ok(Self {
            config,
            session: BrowserSession::new(browser),
            sink,
            options,
            policy,
        })
    }

    /// Runs the crawl to completion, or until Ctrl-C
    ///
    /// Page and item failures are absorbed inside the loop. Whatever ends the
    /// loop, the browser is closed and the run is finalized exactly once
    /// before this returns. A fatal error is returned after finalization.
    pub async fn run(self) -> Result<CrawlReport, CrawlError> {
        self.run_until(interrupt_signal()).await
    }

    /// Runs the crawl until the page loop ends or `shutdown` resolves
    ///
    /// On shutdown the page loop is abandoned where it stands; books already
    /// collected are finalized as for a normal run.
    pub async fn run_until<F>(mut self, shutdown: F) -> Result<CrawlReport, CrawlError>
    where
        F: Future<Output = ()>,
    {
        tracing::info!(
            "Starting crawl of {} ({} pages max)",
            self.config.crawler.base_url,
            self.config.crawler.max_pages
        );

        let mut progress = CrawlProgress::new();
        let outcome = tokio::select! {
            outcome = self.crawl_pages(&mut progress) => outcome,
            () = shutdown => {
                tracing::warn!("Interrupted, finalizing what was collected so far");
                Ok(())
            }
        };

        if let Err(e) = &outcome {
            tracing::error!("Fatal error, stopping crawl: {}", e);
        }

        if let Err(e) = self.session.close().await {
            tracing::warn!("Failed to close browser: {}", e);
        }

        let report = finalize(self.sink.as_ref(), progress);
        print_report(&report);

        outcome.map(|()| report)
    }

    /// The page loop; an error here is fatal to the run
    async fn crawl_pages(&self, progress: &mut CrawlProgress) -> Result<(), CrawlError> {
        let max_pages = self.config.crawler.max_pages;
        let page_delay = Duration::from_millis(self.config.crawler.page_delay_ms);

        let mut list = self.session.open_context(self.policy.clone()).await?;

        for page in 1..=max_pages {
            tracing::info!("Scraping page {}/{}", page, max_pages);

            let outcome = match self.crawl_page(list.context(), page, progress).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("Error processing page {}: {}", page, e);
                    PageOutcome::Failed
                }
            };

            match outcome {
                PageOutcome::Scraped(count) => {
                    progress.page_scraped();
                    tracing::info!("Page {} done: {} items", page, count);
                }
                PageOutcome::Empty => {
                    progress.page_scraped();
                    if self.config.crawler.stop_on_empty_page {
                        tracing::info!("Page {} listed nothing, stopping early", page);
                        break;
                    }
                }
                PageOutcome::Failed => progress.page_failed(page),
            }

            if page < max_pages && !page_delay.is_zero() {
                tokio::time::sleep(page_delay).await;
            }
        }

        if let Err(e) = list.close().await {
            tracing::warn!("Failed to close list context: {}", e);
        }

        Ok(())
    }

    /// Scrapes one list page and every item it lists
    async fn crawl_page(
        &self,
        list: &dyn BrowserContext,
        page: u32,
        progress: &mut CrawlProgress,
    ) -> Result<PageOutcome, CrawlError> {
        let page_url = resolve_url(
            &self.config.crawler.page_path(page),
            &self.config.crawler.base_url,
        )?;

        let summaries = match scrape_page(list, &page_url, &self.options).await {
            Ok(summaries) => summaries,
            Err(failure) => {
                tracing::error!("Failed to scrape page {}: {}", page, failure);
                return Ok(PageOutcome::Failed);
            }
        };

        if summaries.is_empty() {
            tracing::warn!("No books found on page {}", page);
            return Ok(PageOutcome::Empty);
        }

        let mut detail = self.session.open_context(self.policy.clone()).await?;

        for (index, summary) in summaries.iter().enumerate() {
            tracing::debug!(
                "Item {}/{} on page {}: {}",
                index + 1,
                summaries.len(),
                page,
                summary.title
            );

            let entry = match self.process_item(detail.context(), summary).await {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::error!("Error processing '{}': {}", summary.title, e);
                    BookEntry::Degraded(summary.clone())
                }
            };
            progress.push(entry);
        }

        if let Err(e) = detail.close().await {
            tracing::warn!("Failed to close detail context for page {}: {}", page, e);
        }

        Ok(PageOutcome::Scraped(summaries.len()))
    }

    /// Visits one item's detail page and persists its record
    async fn process_item(
        &self,
        detail: &dyn BrowserContext,
        summary: &SummaryRecord,
    ) -> Result<BookEntry, CrawlError> {
        match scrape_detail(detail, &summary.link, &self.options).await? {
            Ok(details) => {
                let path = self.sink.write_detail(&slugify(&details.title), &details)?;
                tracing::info!("Scraped '{}' -> {}", details.title, path.display());

                let item_delay = Duration::from_millis(self.config.crawler.item_delay_ms);
                if !item_delay.is_zero() {
                    tokio::time::sleep(item_delay).await;
                }

                Ok(BookEntry::Detailed(MergedRecord::new(summary, details)))
            }
            Err(failure) => {
                tracing::warn!("Keeping summary only for '{}': {}", summary.title, failure);
                Ok(BookEntry::Degraded(summary.clone()))
            }
        }
    }
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn interrupt_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Runs a complete crawl with the default browser and sink
///
/// # Example
///
/// ```no_run
/// use shelf_crawler::config::Config;
/// use shelf_crawler::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_crawl(Config::default()).await?;
/// println!("{} books", report.result.metadata.total_books);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlReport, CrawlError> {
    Coordinator::new(config)?.run().await
}
