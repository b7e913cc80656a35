//! DocumentSink trait for persisting the assembled document.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use crate::error::SinkResult;

/// Confirmation returned by a sink after a successful write.
#[derive(Debug, Clone, Serialize)]
pub struct StoredRecord {
    /// Job id the document was stored against
    pub job_id: String,

    /// Where the document went (record URL, file path, ...)
    pub location: String,

    /// The record's updated representation, when the store returns one
    pub record: Option<serde_json::Value>,
}

impl StoredRecord {
    pub fn new(job_id: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            location: location.into(),
            record: None,
        }
    }

    pub fn with_record(mut self, record: serde_json::Value) -> Self {
        self.record = Some(record);
        self
    }
}

/// Stores a final document against a job id.
///
/// Called exactly once per successful run. Any error is fatal to the job.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    async fn store(&self, job_id: &str, document: &str) -> SinkResult<StoredRecord>;

    /// Sink name (for logging).
    fn name(&self) -> &str {
        "unknown"
    }
}

#[async_trait]
impl<T: DocumentSink + ?Sized> DocumentSink for Box<T> {
    async fn store(&self, job_id: &str, document: &str) -> SinkResult<StoredRecord> {
        (**self).store(job_id, document).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<T: DocumentSink + ?Sized> DocumentSink for Arc<T> {
    async fn store(&self, job_id: &str, document: &str) -> SinkResult<StoredRecord> {
        (**self).store(job_id, document).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
