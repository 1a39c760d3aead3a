//! Output module for crawl artifacts and reports
//!
//! This module handles:
//! - Persisting per-item detail records and the combined run result
//! - Accumulating books in encounter order during the crawl
//! - Reporting run statistics at the end

mod aggregator;
mod sink;
pub mod stats;

pub use aggregator::{build_run_result, finalize, ArtifactStatus, CrawlProgress, CrawlReport};
pub use sink::{JsonFileSink, RecordSink, SinkError, SinkResult};
pub use stats::{print_report, CrawlStatistics};
