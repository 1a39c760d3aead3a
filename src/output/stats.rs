//! End-of-run reporting
//!
//! Counts are always reported, however many pages or items failed.

use crate::output::aggregator::{ArtifactStatus, CrawlReport};

/// Summary counts of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlStatistics {
    pub pages_attempted: u32,
    pub pages_scraped: u32,
    pub pages_failed: usize,
    pub books_total: usize,
    pub books_detailed: usize,
    pub books_degraded: usize,
    pub duration_seconds: f64,
}

impl CrawlStatistics {
    pub fn from_report(report: &CrawlReport) -> Self {
        let metadata = &report.result.metadata;
        Self {
            pages_attempted: report.pages_attempted,
            pages_scraped: metadata.pages_scraped,
            pages_failed: metadata.failed_pages.len(),
            books_total: metadata.total_books,
            books_detailed: metadata.total_books - metadata.degraded_books,
            books_degraded: metadata.degraded_books,
            duration_seconds: metadata.duration_seconds,
        }
    }

    /// Share of collected books that carry detail data, as a percentage
    pub fn detail_rate(&self) -> f64 {
        if self.books_total == 0 {
            return 0.0;
        }
        (self.books_detailed as f64 / self.books_total as f64) * 100.0
    }
}

/// Logs the statistics of a finished run
pub fn print_report(report: &CrawlReport) {
    let stats = CrawlStatistics::from_report(report);

    tracing::info!("=== Crawl Summary ===");
    tracing::info!(
        "Pages: {} scraped, {} failed ({} attempted)",
        stats.pages_scraped,
        stats.pages_failed,
        stats.pages_attempted
    );
    if !report.result.metadata.failed_pages.is_empty() {
        tracing::warn!("Failed pages: {:?}", report.result.metadata.failed_pages);
    }
    tracing::info!(
        "Books: {} collected, {} with details, {} summary only ({:.1}% detailed)",
        stats.books_total,
        stats.books_detailed,
        stats.books_degraded,
        stats.detail_rate()
    );
    tracing::info!("Duration: {:.2}s", stats.duration_seconds);

    match &report.artifact {
        ArtifactStatus::Written(path) => tracing::info!("Output: {}", path.display()),
        ArtifactStatus::Skipped => tracing::info!("Output: nothing to save"),
        ArtifactStatus::Failed(message) => tracing::error!("Output: not saved ({})", message),
    }
}
