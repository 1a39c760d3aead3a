//! Run accumulation and finalization
//!
//! The orchestrator owns a [`CrawlProgress`] for the whole run and hands it
//! to [`finalize`] exactly once, whichever way the page loop ended.

use crate::output::sink::RecordSink;
use crate::records::{now_timestamp, BookEntry, RunMetadata, RunResult};
use crate::url::timestamp_slug;
use std::path::PathBuf;
use std::time::Instant;

/// Mutable accumulator of a crawl in progress
#[derive(Debug)]
pub struct CrawlProgress {
    books: Vec<BookEntry>,
    pages_attempted: u32,
    pages_scraped: u32,
    failed_pages: Vec<u32>,
    started: Instant,
}

impl CrawlProgress {
    /// Starts the run clock
    pub fn new() -> Self {
        Self {
            books: Vec::new(),
            pages_attempted: 0,
            pages_scraped: 0,
            failed_pages: Vec::new(),
            started: Instant::now(),
        }
    }

    /// Records a list page whose entries were read
    pub fn page_scraped(&mut self) {
        self.pages_attempted += 1;
        self.pages_scraped += 1;
    }

    /// Records a list page that failed to load or to process
    pub fn page_failed(&mut self, page: u32) {
        self.pages_attempted += 1;
        self.failed_pages.push(page);
    }

    /// Appends an entry, keeping page-then-item encounter order
    pub fn push(&mut self, entry: BookEntry) {
        self.books.push(entry);
    }

    pub fn books(&self) -> &[BookEntry] {
        &self.books
    }

    pub fn pages_attempted(&self) -> u32 {
        self.pages_attempted
    }

    pub fn pages_scraped(&self) -> u32 {
        self.pages_scraped
    }

    pub fn failed_pages(&self) -> &[u32] {
        &self.failed_pages
    }

    pub fn degraded_count(&self) -> usize {
        self.books.iter().filter(|b| b.is_degraded()).count()
    }
}

impl Default for CrawlProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// What happened to the combined artifact
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactStatus {
    /// Written to the given location
    Written(PathBuf),
    /// Nothing was collected, so nothing was written
    Skipped,
    /// The write failed; the message is reported, not raised
    Failed(String),
}

/// Final outcome of a run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub result: RunResult,
    pub artifact: ArtifactStatus,
    pub pages_attempted: u32,
}

/// Freezes the accumulator into a [`RunResult`]
pub fn build_run_result(progress: CrawlProgress) -> RunResult {
    let degraded_books = progress.degraded_count();
    RunResult {
        metadata: RunMetadata {
            total_books: progress.books.len(),
            pages_scraped: progress.pages_scraped,
            scraped_at: now_timestamp(),
            duration_seconds: progress.started.elapsed().as_secs_f64(),
            failed_pages: progress.failed_pages,
            degraded_books,
        },
        books: progress.books,
    }
}

/// Builds the run result and writes the combined artifact
///
/// The artifact is keyed `books_<timestamp>` with colons replaced. An
/// empty run writes nothing; a failed write is logged and reported in the
/// returned [`ArtifactStatus`].
pub fn finalize(sink: &dyn RecordSink, progress: CrawlProgress) -> CrawlReport {
    let pages_attempted = progress.pages_attempted;
    let result = build_run_result(progress);

    let artifact = if result.books.is_empty() {
        tracing::warn!("No books were collected, skipping combined output");
        ArtifactStatus::Skipped
    } else {
        let key = format!("books_{}", timestamp_slug(&result.metadata.scraped_at));
        match sink.write_run(&key, &result) {
            Ok(path) => {
                tracing::info!(
                    "Saved {} books to {}",
                    result.metadata.total_books,
                    path.display()
                );
                ArtifactStatus::Written(path)
            }
            Err(e) => {
                tracing::error!("Failed to save combined output: {}", e);
                ArtifactStatus::Failed(e.to_string())
            }
        }
    };

    CrawlReport {
        result,
        artifact,
        pages_attempted,
    }
}
