//! Firecrawl-based page loader.
//!
//! Renders the page in Firecrawl's headless browser and returns the raw
//! post-render HTML, so client-side content is present before extraction.
//!
//! Requires the `firecrawl` feature to be enabled.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LoadError, LoadResult};
use crate::traits::loader::{LoadOptions, PageLoader, RawPage, WaitUntil};

const FIRECRAWL_API_URL: &str = "https://api.firecrawl.dev/v1";

/// Extra settle time requested when waiting for network idle.
const NETWORK_IDLE_WAIT_MS: u64 = 2000;

/// Firecrawl loader for script-heavy pages.
///
/// # Example
///
/// ```rust,ignore
/// use proposal_scraper::loaders::FirecrawlLoader;
///
/// let loader = FirecrawlLoader::from_env()?;
/// let page = loader.load("https://example.com", &LoadOptions::default()).await?;
/// ```
#[derive(Clone)]
pub struct FirecrawlLoader {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: Vec<&'static str>,
    #[serde(rename = "onlyMainContent")]
    only_main_content: bool,
    #[serde(rename = "waitFor")]
    wait_for: u64,
    timeout: u64,
}

#[derive(Deserialize)]
struct ScrapeResponse {
    success: bool,
    data: Option<ScrapeData>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct ScrapeData {
    #[serde(rename = "rawHtml")]
    raw_html: Option<String>,
    metadata: Option<PageMetadata>,
}

#[derive(Deserialize)]
struct PageMetadata {
    title: Option<String>,
    #[serde(rename = "statusCode")]
    status_code: Option<u16>,
}

impl FirecrawlLoader {
    /// Create a new Firecrawl loader with the given API key.
    pub fn new(api_key: impl Into<String>) -> LoadResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| LoadError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: FIRECRAWL_API_URL.to_string(),
        })
    }

    /// Create from environment variable `FIRECRAWL_API_KEY`.
    pub fn from_env() -> LoadResult<Self> {
        let api_key = std::env::var("FIRECRAWL_API_KEY")
            .map_err(|_| LoadError::Config("FIRECRAWL_API_KEY not set".into()))?;
        Self::new(api_key)
    }

    /// Set a custom base URL (self-hosted Firecrawl, proxies).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl PageLoader for FirecrawlLoader {
    async fn load(&self, url: &str, options: &LoadOptions) -> LoadResult<RawPage> {
        let request = ScrapeRequest {
            url,
            formats: vec!["rawHtml"],
            only_main_content: false,
            wait_for: match options.wait_until {
                WaitUntil::Load => 0,
                WaitUntil::NetworkIdle => NETWORK_IDLE_WAIT_MS,
            },
            timeout: options.timeout_secs * 1000,
        };

        debug!(url = %url, wait_for = request.wait_for, "Firecrawl scrape starting");

        let response = self
            .client
            .post(format!("{}/scrape", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .timeout(options.timeout())
            .send()
            .await
            .map_err(|e| LoadError::Http(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LoadError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let response: ScrapeResponse = response
            .json()
            .await
            .map_err(|e| LoadError::Http(Box::new(e)))?;

        if !response.success {
            return Err(LoadError::Status {
                status: status.as_u16(),
                body: response
                    .error
                    .unwrap_or_else(|| "Firecrawl scrape failed".to_string()),
            });
        }

        let data = response.data.ok_or_else(|| LoadError::EmptyPage {
            url: url.to_string(),
        })?;
        let html = data.raw_html.unwrap_or_default();

        let mut page = RawPage::new(url, html)
            .with_fetched_at(Utc::now())
            .with_content_type("text/html")
            .with_metadata("loader", "firecrawl");

        if let Some(metadata) = data.metadata {
            if let Some(title) = metadata.title {
                page = page.with_title(title);
            }
            if let Some(code) = metadata.status_code {
                page = page.with_metadata("http_status", code.to_string());
            }
        }

        Ok(page)
    }

    fn name(&self) -> &str {
        "firecrawl"
    }
}
