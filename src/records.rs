//! Record types produced by the crawl pipeline
//!
//! All records serialize to camelCase JSON; these names form the data
//! contract of the output artifacts.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Sentinel used when a title element is missing
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Sentinel used when a price element is missing
pub const UNKNOWN_PRICE: &str = "Unknown Price";

/// Sentinel used when a star-rating element is missing
pub const NO_RATING: &str = "No Rating";

/// Sentinel used when the breadcrumb has no category entry
pub const UNKNOWN_CATEGORY: &str = "Unknown Category";

/// Sentinel used when a detail page has no description paragraph
pub const NO_DESCRIPTION: &str = "No description available";

/// Quantity reported for items that are not in stock
pub const OUT_OF_STOCK: &str = "Out of Stock";

/// Returns the current UTC time as an ISO-8601 string with milliseconds
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Stock state shown on a list page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockStatus {
    #[serde(rename = "In Stock")]
    InStock,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
}

/// One catalogue entry as read from a list page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub title: String,
    pub price: String,
    pub stock: StockStatus,
    pub rate: String,
    /// Always absolute once it leaves the list scraper
    pub link: String,
    pub thumbnail: Option<String>,
}

/// Availability block of a detail page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockInfo {
    pub in_stock: bool,
    /// Digits of the availability text, or [`OUT_OF_STOCK`]
    pub quantity: String,
    pub availability: String,
}

/// Full record of one item's detail page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailRecord {
    pub thumbnail: Option<String>,
    pub title: String,
    pub price: String,
    pub stock_info: StockInfo,
    pub rate: String,
    pub category: String,
    pub product_info: BTreeMap<String, String>,
    pub description: String,
    pub scraped_at: String,
}

/// A list entry joined with its detail record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedRecord {
    pub book_title: String,
    pub book_link: String,
    pub book_details: DetailRecord,
}

impl MergedRecord {
    pub fn new(summary: &SummaryRecord, details: DetailRecord) -> Self {
        Self {
            book_title: summary.title.clone(),
            book_link: summary.link.clone(),
            book_details: details,
        }
    }
}

/// One element of the combined output
///
/// A failed detail scrape degrades the entry to the bare summary; the
/// absence of `bookDetails` in the JSON marks it as partial data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BookEntry {
    Detailed(MergedRecord),
    Degraded(SummaryRecord),
}

impl BookEntry {
    /// Returns true if this entry carries only summary fields
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }

    /// Title of the entry, whichever form it takes
    pub fn title(&self) -> &str {
        match self {
            Self::Detailed(merged) => &merged.book_title,
            Self::Degraded(summary) => &summary.title,
        }
    }
}

/// Run-level metadata written alongside the books
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetadata {
    pub total_books: usize,
    /// Pages whose list scrape succeeded
    pub pages_scraped: u32,
    pub scraped_at: String,
    pub duration_seconds: f64,
    /// Page indices whose list scrape failed
    pub failed_pages: Vec<u32>,
    pub degraded_books: usize,
}

/// The combined artifact of one crawl
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub metadata: RunMetadata,
    pub books: Vec<BookEntry>,
}

/// Failure value returned in place of a record
///
/// Fetch and scrape functions hand this back as a value; it is never
/// raised past a component boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub error: bool,
    pub message: String,
    pub url: String,
    pub timestamp: String,
}

impl FetchFailure {
    pub fn new(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            url: url.into(),
            timestamp: now_timestamp(),
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.url)
    }
}
