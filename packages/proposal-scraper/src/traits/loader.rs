//! PageLoader trait for turning a URL into raw markup.
//!
//! The pipeline treats loaders as opaque and unreliable: whatever a loader
//! returns is read once, and any error it raises is fatal to the job.
//!
//! # Usage
//!
//! ```rust,ignore
//! use proposal_scraper::traits::loader::{LoadOptions, PageLoader};
//!
//! let page = loader.load("https://example.com/opportunity", &LoadOptions::default()).await?;
//! println!("{} bytes of markup", page.content_length());
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::error::LoadResult;

/// Markup for one page, as returned by a loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPage {
    /// URL the page was requested from
    pub url: String,

    /// Full page markup
    pub content: String,

    /// Page title if the loader reported one
    pub title: Option<String>,

    /// MIME type (e.g., "text/html")
    pub content_type: Option<String>,

    /// When the page was fetched
    pub fetched_at: DateTime<Utc>,

    /// Loader-specific metadata (HTTP status, headers, source)
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl RawPage {
    pub fn new(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content: content.into(),
            title: None,
            content_type: None,
            fetched_at: Utc::now(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_fetched_at(mut self, fetched_at: DateTime<Utc>) -> Self {
        self.fetched_at = fetched_at;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Content length in bytes.
    pub fn content_length(&self) -> usize {
        self.content.len()
    }

    /// Check if this page has any non-whitespace markup.
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

/// When a rendering loader considers navigation finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitUntil {
    /// The `load` event fired
    Load,

    /// No network activity for a short settle period
    #[default]
    NetworkIdle,
}

/// Fetch options handed to the loader for every page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Render in a headless browser when the loader supports it
    pub headless: bool,

    pub wait_until: WaitUntil,

    /// Upper bound for the whole load, in seconds
    pub timeout_secs: u64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            headless: true,
            wait_until: WaitUntil::NetworkIdle,
            timeout_secs: 60,
        }
    }
}

impl LoadOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn with_wait_until(mut self, wait_until: WaitUntil) -> Self {
        self.wait_until = wait_until;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Loads a URL into raw markup.
///
/// Implementations:
/// - `HttpLoader` - plain HTTP GET, no script execution
/// - `FirecrawlLoader` - Firecrawl API with headless rendering (feature `firecrawl`)
/// - `MockLoader` - canned pages for tests
#[async_trait]
pub trait PageLoader: Send + Sync {
    /// Fetch one page.
    async fn load(&self, url: &str, options: &LoadOptions) -> LoadResult<RawPage>;

    /// Loader name (for logging).
    fn name(&self) -> &str {
        "unknown"
    }
}

#[async_trait]
impl<T: PageLoader + ?Sized> PageLoader for Box<T> {
    async fn load(&self, url: &str, options: &LoadOptions) -> LoadResult<RawPage> {
        (**self).load(url, options).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<T: PageLoader + ?Sized> PageLoader for Arc<T> {
    async fn load(&self, url: &str, options: &LoadOptions) -> LoadResult<RawPage> {
        (**self).load(url, options).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_page_builder() {
        let page = RawPage::new("https://example.com", "<html></html>")
            .with_title("Example")
            .with_content_type("text/html")
            .with_metadata("http_status", "200");

        assert_eq!(page.title.as_deref(), Some("Example"));
        assert_eq!(page.content_type.as_deref(), Some("text/html"));
        assert_eq!(page.metadata.get("http_status").map(String::as_str), Some("200"));
        assert_eq!(page.content_length(), 13);
        assert!(page.has_content());
    }

    #[test]
    fn test_empty_content_detection() {
        assert!(!RawPage::new("https://example.com", " \n\t ").has_content());
    }

    #[test]
    fn test_default_options_render_headless_until_idle() {
        let options = LoadOptions::default();
        assert!(options.headless);
        assert_eq!(options.wait_until, WaitUntil::NetworkIdle);
        assert_eq!(options.timeout(), Duration::from_secs(60));
    }
}
