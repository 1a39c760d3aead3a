//! Page fetcher
//!
//! This module navigates a browser context to a URL and turns the outcome
//! into either a loaded document or a [`FetchFailure`] value:
//! - 2xx main-document response → [`LoadedDocument`]
//! - Non-2xx response → failure naming the status code
//! - Missing response → failure
//! - Timeout or transport error → failure carrying the browser's message
//!
//! The fetcher never retries; see [`super::retry`] for the opt-in policy.

use crate::browser::{BrowserContext, NavigationOptions};
use crate::records::FetchFailure;
use scraper::Html;

/// A document that finished loading
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    url: String,
    status: u16,
    html: String,
}

impl LoadedDocument {
    /// Wraps markup served from `url` with a 200 status
    pub fn from_html(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: 200,
            html: html.into(),
        }
    }

    /// Final URL of the document
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Status code of the main-document response
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Raw markup
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Evaluates a DOM query against the loaded document
    ///
    /// The parsed tree lives only for the duration of the query, so the
    /// result must own its data.
    pub fn evaluate<T, F>(&self, query: F) -> T
    where
        F: FnOnce(&Html) -> T,
    {
        let document = Html::parse_document(&self.html);
        query(&document)
    }
}

/// Navigates `context` to `url` and returns the loaded document
///
/// # Arguments
///
/// * `context` - The browsing context to navigate
/// * `url` - Absolute URL of the page
/// * `options` - Timeout and quiescence condition
///
/// # Returns
///
/// * `Ok(LoadedDocument)` - The page loaded with a 2xx status
/// * `Err(FetchFailure)` - Exactly one failure value for a failed navigation
pub async fn fetch_page(
    context: &dyn BrowserContext,
    url: &str,
    options: &NavigationOptions,
) -> Result<LoadedDocument, FetchFailure> {
    match context.navigate(url, options).await {
        Ok(Some(response)) if response.ok() => {
            tracing::debug!("Loaded {} (HTTP {})", response.url, response.status);
            Ok(LoadedDocument {
                url: response.url,
                status: response.status,
                html: response.body,
            })
        }
        Ok(Some(response)) => {
            tracing::debug!("Non-OK response for {}: HTTP {}", url, response.status);
            Err(FetchFailure::new(
                url,
                format!("Failed to load page: HTTP {}", response.status),
            ))
        }
        Ok(None) => Err(FetchFailure::new(
            url,
            "Failed to load page: no response received",
        )),
        Err(e) => Err(FetchFailure::new(url, e.to_string())),
    }
}
