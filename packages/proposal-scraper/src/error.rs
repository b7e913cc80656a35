//! Typed errors for the scraping pipeline.
//!
//! Every external collaborator has its own error enum so callers can tell a
//! bad page load from a failed record update. Only [`ModelError`] is ever
//! recovered inside the pipeline; the rest surface through [`PipelineError`].

use thiserror::Error;

/// Errors raised while turning a job payload into a [`Job`](crate::types::job::Job).
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required payload field was absent or blank
    #[error("missing {0}")]
    MissingField(&'static str),

    /// The URL could not be used as a page address
    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Errors raised by a [`PageLoader`](crate::traits::loader::PageLoader).
#[derive(Debug, Error)]
pub enum LoadError {
    /// Transport-level failure (DNS, TLS, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The remote answered with a non-success status
    #[error("page load failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The page loaded but carried no markup
    #[error("page at {url} returned no content")]
    EmptyPage { url: String },

    /// Loader is misconfigured (missing key, bad client settings)
    #[error("loader config error: {0}")]
    Config(String),
}

/// Errors raised by a [`CompletionModel`](crate::traits::model::CompletionModel).
#[derive(Debug, Error)]
pub enum ModelError {
    /// Missing API key or invalid settings
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection failed or timed out
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx response (rate limit, invalid request, outage)
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("parse error: {0}")]
    Parse(String),

    /// The completion came back without any content
    #[error("model returned an empty completion")]
    EmptyResponse,
}

/// Errors raised by a [`DocumentSink`](crate::traits::sink::DocumentSink).
#[derive(Debug, Error)]
pub enum SinkError {
    /// Transport-level failure talking to the record store
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The record store rejected the update
    #[error("record update failed: {status} {body}")]
    Status { status: u16, body: String },

    /// Writing to local storage failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store's response could not be decoded
    #[error("decode error: {0}")]
    Decode(String),

    /// Sink is misconfigured
    #[error("sink config error: {0}")]
    Config(String),
}

/// Fatal errors for one job run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid job: {0}")]
    Validation(#[from] ValidationError),

    #[error("fetch failed: {0}")]
    Load(#[from] LoadError),

    #[error("persist failed: {0}")]
    Persist(#[from] SinkError),

    /// The run was cancelled between two section transformations
    #[error("cancelled after {completed} of {total} sections")]
    Cancelled { completed: usize, total: usize },
}

/// Result type alias for page loads.
pub type LoadResult<T> = std::result::Result<T, LoadError>;

/// Result type alias for model calls.
pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// Result type alias for sink writes.
pub type SinkResult<T> = std::result::Result<T, SinkError>;

/// Result type alias for a whole job run.
pub type Result<T> = std::result::Result<T, PipelineError>;
