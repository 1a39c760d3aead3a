//! Browser capability boundary
//!
//! The crawl pipeline only needs three things from a rendering engine:
//! open an isolated browsing context with an interception policy, navigate
//! that context to a URL, and hand back the loaded document. This module
//! defines those capabilities as traits and ships an HTTP-backed browser.
//!
//! - [`Browser`] / [`BrowserContext`] - the traits the crawler is written against
//! - [`HttpBrowser`] - reqwest implementation for server-rendered catalogues
//! - [`BrowserSession`] / [`ContextGuard`] - scoped close-on-exit wrappers

mod http;
mod intercept;

pub use http::{build_http_client, HttpBrowser};
pub use intercept::{InterceptDecision, InterceptionPolicy, ResourceType};

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a browser implementation
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Navigation to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Browser context is closed")]
    Closed,
}

/// Quiescence condition a navigation waits for before it completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitUntil {
    /// The `load` event fired
    Load,
    /// The `DOMContentLoaded` event fired
    DomContentLoaded,
    /// No network connections for 500ms
    NetworkIdle0,
    /// At most two network connections for 500ms
    NetworkIdle2,
}

impl WaitUntil {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::DomContentLoaded => "domcontentloaded",
            Self::NetworkIdle0 => "networkidle0",
            Self::NetworkIdle2 => "networkidle2",
        }
    }
}

impl fmt::Display for WaitUntil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WaitUntil {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "load" => Ok(Self::Load),
            "domcontentloaded" => Ok(Self::DomContentLoaded),
            "networkidle0" => Ok(Self::NetworkIdle0),
            "networkidle2" => Ok(Self::NetworkIdle2),
            other => Err(format!("Unknown wait-until condition: '{}'", other)),
        }
    }
}

/// Options applied to a single navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationOptions {
    pub timeout: Duration,
    pub wait_until: WaitUntil,
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            wait_until: WaitUntil::NetworkIdle2,
        }
    }
}

/// Main-document response of a navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse {
    /// Final URL after redirects
    pub url: String,
    /// HTTP status code
    pub status: u16,
    /// Document markup once the wait condition was met
    pub body: String,
}

impl PageResponse {
    /// Returns true for a 2xx status
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A browser able to open isolated browsing contexts
#[async_trait]
pub trait Browser: Send + Sync {
    /// Opens a new context; `policy` applies to every request it issues
    async fn new_context(
        &self,
        policy: InterceptionPolicy,
    ) -> Result<Box<dyn BrowserContext>, BrowserError>;

    /// Shuts the browser down, closing any context still open
    async fn close(&self) -> Result<(), BrowserError>;
}

/// An isolated browsing context (cookies, cache, interception policy)
#[async_trait]
pub trait BrowserContext: Send + Sync {
    /// Navigates to `url` and waits for the configured condition
    ///
    /// `Ok(None)` means the navigation produced no main-document response.
    async fn navigate(
        &self,
        url: &str,
        options: &NavigationOptions,
    ) -> Result<Option<PageResponse>, BrowserError>;

    /// Closes the context; further navigations fail with [`BrowserError::Closed`]
    async fn close(&self) -> Result<(), BrowserError>;
}

/// Scoped owner of a browser for the whole crawl
///
/// `close()` is idempotent. A session dropped without being closed logs a
/// warning, which only happens if a caller bypassed the finalization path.
pub struct BrowserSession {
    browser: Box<dyn Browser>,
    closed: bool,
}

impl BrowserSession {
    pub fn new(browser: Box<dyn Browser>) -> Self {
        Self {
            browser,
            closed: false,
        }
    }

    /// Opens a context guarded by [`ContextGuard`]
    pub async fn open_context(
        &self,
        policy: InterceptionPolicy,
    ) -> Result<ContextGuard, BrowserError> {
        if self.closed {
            return Err(BrowserError::Closed);
        }
        let context = self.browser.new_context(policy).await?;
        Ok(ContextGuard::new(context))
    }

    /// Closes the browser; calling it again is a no-op
    pub async fn close(&mut self) -> Result<(), BrowserError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.browser.close().await
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if !self.closed {
            tracing::warn!("Browser session dropped without being closed");
        }
    }
}

/// Scoped owner of one browsing context
pub struct ContextGuard {
    context: Box<dyn BrowserContext>,
    closed: bool,
}

impl ContextGuard {
    pub fn new(context: Box<dyn BrowserContext>) -> Self {
        Self {
            context,
            closed: false,
        }
    }

    /// The guarded context
    pub fn context(&self) -> &dyn BrowserContext {
        self.context.as_ref()
    }

    /// Closes the context; calling it again is a no-op
    pub async fn close(&mut self) -> Result<(), BrowserError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.context.close().await
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        if !self.closed {
            tracing::warn!("Browser context dropped without being closed");
        }
    }
}
