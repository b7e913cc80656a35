//! Application setup for the managed job endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::server::routes::{health_handler, scrape_handler};
use crate::traits::{loader::PageLoader, model::CompletionModel, sink::DocumentSink};
use crate::types::config::PipelineConfig;

/// Builds the completion model for one job.
pub type ModelFactory = Arc<dyn Fn() -> Arc<dyn CompletionModel> + Send + Sync>;

/// Shared application state.
///
/// Holds the capabilities each job's pipeline is built from. A fresh
/// pipeline, with its own model client, is assembled per request; nothing
/// job-specific lives here.
#[derive(Clone)]
pub struct AppState {
    pub loader: Arc<dyn PageLoader>,
    pub model_factory: ModelFactory,
    pub sink: Arc<dyn DocumentSink>,
    pub pipeline_config: PipelineConfig,
    pub job_timeout: Duration,
}

impl AppState {
    pub fn new<F>(loader: Arc<dyn PageLoader>, model_factory: F, sink: Arc<dyn DocumentSink>) -> Self
    where
        F: Fn() -> Arc<dyn CompletionModel> + Send + Sync + 'static,
    {
        Self {
            loader,
            model_factory: Arc::new(model_factory),
            sink,
            pipeline_config: PipelineConfig::managed(),
            job_timeout: Duration::from_secs(900),
        }
    }

    pub fn with_pipeline_config(mut self, config: PipelineConfig) -> Self {
        self.pipeline_config = config;
        self
    }

    /// Model client for a new job.
    pub fn new_model(&self) -> Arc<dyn CompletionModel> {
        (self.model_factory)()
    }

    pub fn with_job_timeout(mut self, timeout: Duration) -> Self {
        self.job_timeout = timeout;
        self
    }
}

/// Build the Axum application router.
///
/// At most `max_concurrent_jobs` scrape requests run at once; the rest wait.
pub fn build_app(state: AppState, max_concurrent_jobs: usize) -> Router {
    Router::new()
        .route(
            "/api/jobs/scrape",
            post(scrape_handler).layer(ConcurrencyLimitLayer::new(max_concurrent_jobs.max(1))),
        )
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
