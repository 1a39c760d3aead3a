use serde::Deserialize;

/// Main configuration structure for Shelf-Crawler
///
/// Every section is optional in the TOML file; missing sections and keys
/// fall back to the defaults for the books.toscrape.com catalogue.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub browser: BrowserConfig,
    pub output: OutputConfig,
    pub retry: RetryConfig,
}

/// Catalogue traversal configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Site root; detail thumbnails are joined against it
    pub base_url: String,

    /// Catalogue root; list-page item links are joined against it
    pub catalogue_url: String,

    /// List page path relative to `base_url`, `{n}` is the page index
    pub page_path_template: String,

    /// Fixed upper bound on list pages visited
    pub max_pages: u32,

    /// Pause after every successfully detailed item (milliseconds)
    pub item_delay_ms: u64,

    /// Pause after every list page (milliseconds)
    pub page_delay_ms: u64,

    /// Stop the page loop at the first list page with zero entries
    pub stop_on_empty_page: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://books.toscrape.com/".to_string(),
            catalogue_url: "https://books.toscrape.com/catalogue/".to_string(),
            page_path_template: "catalogue/page-{n}.html".to_string(),
            max_pages: 20,
            item_delay_ms: 1000,
            page_delay_ms: 2000,
            stop_on_empty_page: false,
        }
    }
}

impl CrawlerConfig {
    /// Builds the list page path for a 1-based page index
    pub fn page_path(&self, page: u32) -> String {
        self.page_path_template.replace("{n}", &page.to_string())
    }
}

/// Browser/navigation configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BrowserConfig {
    /// Per-navigation timeout (milliseconds)
    pub navigation_timeout_ms: u64,

    /// Quiescence condition a navigation waits for
    pub wait_until: String,

    /// User agent sent with every navigation
    pub user_agent: String,

    /// Subresource categories aborted by the interception policy
    pub blocked_resources: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_ms: 30_000,
            wait_until: "networkidle2".to_string(),
            user_agent: format!("shelf-crawler/{}", env!("CARGO_PKG_VERSION")),
            blocked_resources: ["image", "stylesheet", "font", "media"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory receiving the combined run artifact
    pub data_dir: String,

    /// Subdirectory of `data_dir` receiving one artifact per detailed item
    pub books_subdir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            books_subdir: "books".to_string(),
        }
    }
}

/// Retry configuration; zero retries matches a single-shot crawl
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_backoff_ms: 1000,
            backoff_multiplier: 2.0,
        }
    }
}
