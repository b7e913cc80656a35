//! Funding Opportunity Page Scraper
//!
//! Turns one funding-opportunity web page into a single clean markdown
//! document and stores it against the opportunity's record.
//!
//! # How It Works
//!
//! 1. Load the page markup through a [`PageLoader`]
//! 2. Keep only the main content region (`<main>`, else `<body>`, else all)
//! 3. Split it into sections at headings, or pack paragraphs when the page
//!    has no usable headings
//! 4. Rewrite each section through a [`CompletionModel`], one at a time;
//!    a failed section keeps its original content behind an error marker
//! 5. Join the sections and hand the document to a [`DocumentSink`]
//!
//! # Usage
//!
//! ```rust,ignore
//! use proposal_scraper::{FileSink, HttpLoader, JobPayload, OpenAiModel, Pipeline, PipelineConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let pipeline = Pipeline::new(HttpLoader::new()?, OpenAiModel::from_env()?, FileSink::default())
//!     .with_config(PipelineConfig::standalone());
//!
//! let report = pipeline
//!     .run(JobPayload::new("local", "https://example.com/grant"), &CancellationToken::new())
//!     .await?;
//! println!("{} sections, {} fell back", report.section_count, report.fallback_sections.len());
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Loader, model and sink abstractions
//! - [`types`] - Jobs, sections, configuration and run reports
//! - [`pipeline`] - Extraction, splitting, transformation and assembly
//! - [`loaders`] - Page loaders (HTTP, Firecrawl)
//! - [`models`] - Completion models (OpenAI)
//! - [`sinks`] - Document sinks (record store, file)
//! - [`server`] - Managed job endpoint
//! - [`testing`] - Mock implementations for testing

pub mod config;
pub mod error;
pub mod loaders;
pub mod models;
pub mod pipeline;
pub mod server;
pub mod sinks;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{
    LoadError, ModelError, PipelineError, Result, SinkError, ValidationError,
};
pub use traits::{
    loader::{LoadOptions, PageLoader, RawPage, WaitUntil},
    model::CompletionModel,
    sink::{DocumentSink, StoredRecord},
};
pub use types::{
    config::{PipelineConfig, SplitConfig},
    job::{Job, JobEvent, JobPayload, SCRAPE_EVENT},
    report::ScrapeReport,
    section::{Section, TransformOutcome, TransformedSection},
};

pub use config::AppConfig;
pub use pipeline::{assemble_document, extract_main_content, split_content, Pipeline};

pub use loaders::HttpLoader;
#[cfg(feature = "firecrawl")]
pub use loaders::FirecrawlLoader;
pub use models::OpenAiModel;
pub use sinks::{FileSink, PostgrestSink};

pub use testing::{MemorySink, MockLoader, MockModel};
