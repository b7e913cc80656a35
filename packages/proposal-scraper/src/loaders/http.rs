//! Plain HTTP page loader.
//!
//! Fetches the page with a single GET and returns the body untouched. No
//! scripts run, so client-rendered pages come back with whatever the server
//! sent; use `FirecrawlLoader` for those.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, USER_AGENT};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::{LoadError, LoadResult};
use crate::traits::loader::{LoadOptions, PageLoader, RawPage, WaitUntil};

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// HTTP loader backed by `reqwest`.
///
/// # Example
///
/// ```rust,ignore
/// use proposal_scraper::loaders::HttpLoader;
///
/// let loader = HttpLoader::new()?.with_user_agent("MyBot/1.0");
/// let page = loader.load("https://example.com", &LoadOptions::default()).await?;
/// ```
#[derive(Clone)]
pub struct HttpLoader {
    client: reqwest::Client,
    user_agent: String,
}

impl HttpLoader {
    /// Create a loader with browser-like default headers.
    pub fn new() -> LoadResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| LoadError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        })
    }

    /// Set a custom user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set a custom HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

/// Requested options a plain GET cannot honour.
fn unrendered_options(options: &LoadOptions) -> Vec<&'static str> {
    let mut ignored = Vec::new();
    if options.headless {
        ignored.push("headless");
    }
    if options.wait_until == WaitUntil::NetworkIdle {
        ignored.push("wait_until=network_idle");
    }
    ignored
}

#[async_trait]
impl PageLoader for HttpLoader {
    async fn load(&self, url: &str, options: &LoadOptions) -> LoadResult<RawPage> {
        let ignored = unrendered_options(options);
        if !ignored.is_empty() {
            debug!(
                url = %url,
                ignored = ?ignored,
                "HTTP loader does not render pages, returning server markup as-is"
            );
        }
        debug!(url = %url, timeout_secs = options.timeout_secs, "HTTP fetch starting");

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .timeout(options.timeout())
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "HTTP request failed");
                LoadError::Http(Box::new(e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LoadError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let mut metadata: HashMap<String, String> = HashMap::new();
        metadata.insert("http_status".to_string(), status.as_u16().to_string());
        metadata.insert("final_url".to_string(), response.url().to_string());
        metadata.insert("loader".to_string(), "http".to_string());

        let html = response
            .text()
            .await
            .map_err(|e| LoadError::Http(Box::new(e)))?;

        debug!(url = %url, bytes = html.len(), "HTTP fetch complete");

        let mut page = RawPage::new(url, html).with_fetched_at(Utc::now());
        if let Some(ct) = content_type {
            page = page.with_content_type(ct);
        }
        page.metadata = metadata;

        Ok(page)
    }

    fn name(&self) -> &str {
        "http"
    }
}
