//! Core trait abstractions for the pipeline's external collaborators.
//!
//! Applications inject one implementation of each to drive a job.

pub mod loader;
pub mod model;
pub mod sink;
