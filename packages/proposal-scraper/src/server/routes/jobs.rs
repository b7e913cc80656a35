//! Managed scrape job endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::error::PipelineError;
use crate::pipeline::Pipeline;
use crate::server::app::AppState;
use crate::types::job::{JobEvent, SCRAPE_EVENT};

#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    /// Updated record as returned by the store
    pub updated: Option<Value>,
    pub sections: usize,
    pub fallback_sections: Vec<usize>,
}

/// Error response for the job endpoint.
#[derive(Debug)]
pub struct JobError {
    status: StatusCode,
    message: String,
}

impl JobError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<PipelineError> for JobError {
    fn from(e: PipelineError) -> Self {
        let status = match &e {
            PipelineError::Validation(_) => StatusCode::BAD_REQUEST,
            PipelineError::Load(_) | PipelineError::Persist(_) => StatusCode::BAD_GATEWAY,
            PipelineError::Cancelled { .. } => StatusCode::GATEWAY_TIMEOUT,
        };
        Self::new(status, e.to_string())
    }
}

impl IntoResponse for JobError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<JsonRejection> for JobError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

/// Run one scrape job from a trigger event.
///
/// An event without a name is accepted as a direct invocation; any other
/// name is rejected. Each job gets its own model client.
pub async fn scrape_handler(
    State(state): State<AppState>,
    payload: Result<Json<JobEvent>, JsonRejection>,
) -> Result<Json<ScrapeResponse>, JobError> {
    let Json(event) = payload?;

    if let Some(name) = event.name.as_deref().filter(|n| *n != SCRAPE_EVENT) {
        return Err(JobError::new(
            StatusCode::BAD_REQUEST,
            format!("unsupported event {name}"),
        ));
    }

    let pipeline = Pipeline::new(state.loader.clone(), state.new_model(), state.sink.clone())
        .with_config(state.pipeline_config.clone());

    let report = pipeline
        .run_with_deadline(event.data, state.job_timeout)
        .await
        .map_err(|e| {
            error!(error = %e, "Scrape job failed");
            JobError::from(e)
        })?;

    info!(
        job_id = %report.job_id,
        sections = report.section_count,
        fallbacks = report.fallback_sections.len(),
        "Scrape job finished"
    );

    Ok(Json(ScrapeResponse {
        updated: report.record.record,
        sections: report.section_count,
        fallback_sections: report.fallback_sections,
    }))
}
