//! HTTP-backed browser
//!
//! Server-rendered catalogues deliver their full markup in the document
//! response, so a plain HTTP client is enough to "render" them:
//! - Subresources are never requested, so every category an interception
//!   policy may block stays blocked; the document itself is never blockable
//! - The per-navigation timeout covers headers and body
//! - Reading the body to completion is the quiescence point for every
//!   [`WaitUntil`](super::WaitUntil) condition

use super::{
    Browser, BrowserContext, BrowserError, InterceptionPolicy, NavigationOptions, PageResponse,
    ResourceType,
};
use crate::config::BrowserConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The browser configuration (user agent)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &BrowserConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Browser whose contexts fetch documents over HTTP
pub struct HttpBrowser {
    client: Client,
    closed: AtomicBool,
}

impl HttpBrowser {
    /// Launches the browser with the configured user agent
    pub fn launch(config: &BrowserConfig) -> Result<Self, BrowserError> {
        let client =
            build_http_client(config).map_err(|e| BrowserError::Launch(e.to_string()))?;
        Ok(Self::with_client(client))
    }

    /// Wraps an already-built client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            closed: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Browser for HttpBrowser {
    async fn new_context(
        &self,
        policy: InterceptionPolicy,
    ) -> Result<Box<dyn BrowserContext>, BrowserError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(BrowserError::Closed);
        }
        tracing::trace!(
            "Opening HTTP context (images blocked: {})",
            policy.blocks(ResourceType::Image)
        );
        Ok(Box::new(HttpContext {
            client: self.client.clone(),
            closed: AtomicBool::new(false),
        }))
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.closed.store(true, Ordering::SeqCst);
        tracing::debug!("HTTP browser closed");
        Ok(())
    }
}

/// One browsing context of an [`HttpBrowser`]
struct HttpContext {
    client: Client,
    closed: AtomicBool,
}

#[async_trait]
impl BrowserContext for HttpContext {
    async fn navigate(
        &self,
        url: &str,
        options: &NavigationOptions,
    ) -> Result<Option<PageResponse>, BrowserError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(BrowserError::Closed);
        }

        tracing::trace!("Navigating to {} (wait until {})", url, options.wait_until);

        let timeout_ms = options.timeout.as_millis() as u64;
        let classify = |e: reqwest::Error| {
            if e.is_timeout() {
                BrowserError::Timeout {
                    url: url.to_string(),
                    timeout_ms,
                }
            } else if e.is_connect() {
                BrowserError::Navigation {
                    url: url.to_string(),
                    message: format!("Connection refused: {}", e),
                }
            } else {
                BrowserError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        };

        let response = self
            .client
            .get(url)
            .timeout(options.timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response.text().await.map_err(classify)?;

        Ok(Some(PageResponse {
            url: final_url,
            status,
            body,
        }))
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
