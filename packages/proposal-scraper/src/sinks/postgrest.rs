//! Record-store sink over a PostgREST endpoint (e.g. Supabase).
//!
//! Updates one column of one row, keyed by the job id:
//!
//! ```text
//! PATCH {base_url}/rest/v1/{table}?id=eq.{job_id}
//! apikey: {key}
//! Authorization: Bearer {key}
//! Prefer: return=representation
//!
//! { "{column}": "<document>" }
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{SinkError, SinkResult};
use crate::traits::sink::{DocumentSink, StoredRecord};

/// Default table holding funding opportunities.
pub const DEFAULT_TABLE: &str = "call_for_proposal";

/// Default column receiving the document.
pub const DEFAULT_COLUMN: &str = "description_markdown";

/// Sink that writes the document into a PostgREST table row.
///
/// # Example
///
/// ```rust,ignore
/// use proposal_scraper::sinks::PostgrestSink;
///
/// let sink = PostgrestSink::new("https://xyz.supabase.co", service_key)?;
/// let record = sink.store("42", "# Grant").await?;
/// ```
#[derive(Clone)]
pub struct PostgrestSink {
    client: Client,
    base_url: String,
    api_key: String,
    table: String,
    column: String,
}

impl PostgrestSink {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> SinkResult<Self> {
        let base_url = base_url.into();
        let api_key = api_key.into();
        if base_url.trim().is_empty() {
            return Err(SinkError::Config("record store URL is empty".into()));
        }
        if api_key.trim().is_empty() {
            return Err(SinkError::Config("record store key is empty".into()));
        }

        Ok(Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            table: DEFAULT_TABLE.to_string(),
            column: DEFAULT_COLUMN.to_string(),
        })
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    /// Row URL for a job id.
    fn record_url(&self, job_id: &str) -> String {
        format!(
            "{}/rest/v1/{}?id=eq.{}",
            self.base_url,
            self.table,
            url::form_urlencoded::byte_serialize(job_id.as_bytes()).collect::<String>()
        )
    }
}

#[async_trait]
impl DocumentSink for PostgrestSink {
    async fn store(&self, job_id: &str, document: &str) -> SinkResult<StoredRecord> {
        let location = self.record_url(job_id);

        let mut body = Map::new();
        body.insert(self.column.clone(), Value::String(document.to_string()));

        debug!(job_id, table = %self.table, bytes = document.len(), "Updating record");

        let response = self
            .client
            .patch(&location)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await
            .map_err(|e| SinkError::Http(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let updated: Value = response
            .json()
            .await
            .map_err(|e| SinkError::Decode(e.to_string()))?;

        if updated.as_array().is_some_and(|rows| rows.is_empty()) {
            warn!(job_id, table = %self.table, "Record update matched no rows");
        }

        Ok(StoredRecord::new(job_id, location).with_record(updated))
    }

    fn name(&self) -> &str {
        "postgrest"
    }
}
