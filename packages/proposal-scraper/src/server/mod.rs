//! Managed job endpoint.
//!
//! `POST /api/jobs/scrape` accepts a [`JobEvent`](crate::types::job::JobEvent),
//! runs the pipeline with the record-store sink and answers with the updated
//! record. `GET /health` reports liveness.

pub mod app;
pub mod routes;

pub use app::{build_app, AppState};
