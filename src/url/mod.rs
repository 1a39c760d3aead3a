//! URL handling module for Shelf-Crawler
//!
//! This module turns the relative paths found in catalogue markup into
//! absolute URLs, and derives filesystem-safe names for output artifacts.

mod resolve;
mod slug;

// Re-export main functions
pub use resolve::{resolve_thumbnail, resolve_url, strip_parent_segments};
pub use slug::{slugify, timestamp_slug};
