use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

use crate::types::config::{PipelineConfig, SplitConfig};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_service_role_key: Option<String>,
    pub proposal_table: Option<String>,
    pub proposal_markdown_column: Option<String>,
    pub firecrawl_api_key: Option<String>,
    pub merge_threshold: Option<usize>,
    pub max_chunk_chars: Option<usize>,
    pub section_delay_ms: Option<u64>,
    pub port: u16,
    pub max_concurrent_jobs: usize,
    pub job_timeout_secs: u64,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            openai_api_key: var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?,
            openai_model: var("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o".to_string()),
            openai_base_url: var("OPENAI_BASE_URL"),
            supabase_url: var("SUPABASE_URL"),
            supabase_service_role_key: var("SUPABASE_SERVICE_ROLE_KEY"),
            proposal_table: var("PROPOSAL_TABLE"),
            proposal_markdown_column: var("PROPOSAL_MARKDOWN_COLUMN"),
            firecrawl_api_key: var("FIRECRAWL_API_KEY"),
            merge_threshold: parse(var("SCRAPER_MERGE_THRESHOLD"), "SCRAPER_MERGE_THRESHOLD")?,
            max_chunk_chars: parse(var("SCRAPER_MAX_CHUNK_CHARS"), "SCRAPER_MAX_CHUNK_CHARS")?,
            section_delay_ms: parse(var("SCRAPER_SECTION_DELAY_MS"), "SCRAPER_SECTION_DELAY_MS")?,
            port: parse(var("PORT"), "PORT")?.unwrap_or(9080),
            max_concurrent_jobs: parse(
                var("SCRAPER_MAX_CONCURRENT_JOBS"),
                "SCRAPER_MAX_CONCURRENT_JOBS",
            )?
            .unwrap_or(4),
            job_timeout_secs: parse(var("SCRAPER_JOB_TIMEOUT_SECS"), "SCRAPER_JOB_TIMEOUT_SECS")?
                .unwrap_or(900),
        })
    }

    /// Record store URL and key, required for persisting to the record store.
    pub fn record_store(&self) -> Result<(&str, &str)> {
        let url = self
            .supabase_url
            .as_deref()
            .context("SUPABASE_URL must be set")?;
        let key = self
            .supabase_service_role_key
            .as_deref()
            .context("SUPABASE_SERVICE_ROLE_KEY must be set")?;
        Ok((url, key))
    }

    /// Pipeline settings, starting from `base` and applying any overrides.
    pub fn pipeline_config(&self, base: PipelineConfig) -> PipelineConfig {
        let mut split: SplitConfig = base.split;
        if let Some(threshold) = self.merge_threshold {
            split = split.with_merge_threshold(threshold);
        }
        if let Some(max) = self.max_chunk_chars {
            split = split.with_max_chunk_chars(max);
        }

        let mut config = base.with_split(split);
        if let Some(ms) = self.section_delay_ms {
            config = config.with_section_delay_ms(ms);
        }
        config
    }
}

fn parse<T>(value: Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .map(|v| {
            v.trim()
                .parse::<T>()
                .with_context(|| format!("{key} must be a valid number"))
        })
        .transpose()
}
