//! Job payloads and the validated job they become.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Event name the managed job runner sends for a scrape.
pub const SCRAPE_EVENT: &str = "call_for_proposal.scrape";

/// Trigger event as delivered by the job runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEvent {
    /// Event name; absent for direct invocations
    #[serde(default)]
    pub name: Option<String>,

    /// Event data carrying the record id and page URL. An absent envelope
    /// reads as an empty payload and fails validation.
    #[serde(default)]
    pub data: JobPayload,
}

impl JobEvent {
    /// Build a scrape event for an id and URL.
    pub fn scrape(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: Some(SCRAPE_EVENT.to_string()),
            data: JobPayload::new(id, url),
        }
    }
}

/// Raw `{ id, url }` payload. Either field may be missing until validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobPayload {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub url: Option<String>,
}

impl JobPayload {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            url: Some(url.into()),
        }
    }

    /// Payload with only a URL (no record id).
    pub fn url_only(url: impl Into<String>) -> Self {
        Self {
            id: None,
            url: Some(url.into()),
        }
    }

    /// Payload with only an id (no URL).
    pub fn id_only(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            url: None,
        }
    }
}

/// One pipeline run for a single source URL.
///
/// The id is the persistence key for the produced document. A `Job` can only
/// be obtained through validation, so holding one means both fields are usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    id: String,
    url: String,
}

impl Job {
    /// Validate an id and URL into a job.
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Result<Self, ValidationError> {
        JobPayload::new(id, url).try_into()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl TryFrom<JobPayload> for Job {
    type Error = ValidationError;

    fn try_from(payload: JobPayload) -> Result<Self, Self::Error> {
        let id = required(payload.id, "id")?;
        let url = required(payload.url, "url")?;

        let parsed = url::Url::parse(&url).map_err(|e| ValidationError::InvalidUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ValidationError::InvalidUrl {
                reason: format!("unsupported scheme {}", parsed.scheme()),
                url,
            });
        }

        Ok(Self { id, url })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::MissingField(field))
}
