//! Job orchestration: validate → load → extract → split → transform →
//! assemble → store.
//!
//! A [`Pipeline`] is built once per job from injected capabilities. Stages
//! run strictly in sequence, and sections are transformed one at a time in
//! index order. Cancellation is honoured only between sections, so every
//! section either completes its transformation or is never started.

use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{LoadError, PipelineError, Result};
use crate::pipeline::assemble::assemble_document;
use crate::pipeline::extract::extract_main_content;
use crate::pipeline::split::split_content;
use crate::pipeline::transform::transform_section;
use crate::traits::{loader::PageLoader, model::CompletionModel, sink::DocumentSink};
use crate::types::{
    config::PipelineConfig,
    job::{Job, JobPayload},
    report::ScrapeReport,
    section::{Section, TransformedSection},
};

/// One scrape pipeline over a loader, a completion model and a sink.
///
/// # Example
///
/// ```rust,ignore
/// use proposal_scraper::{HttpLoader, FileSink, JobPayload, OpenAiModel, Pipeline, PipelineConfig};
/// use tokio_util::sync::CancellationToken;
///
/// let pipeline = Pipeline::new(HttpLoader::new()?, OpenAiModel::from_env()?, FileSink::new("out.md"))
///     .with_config(PipelineConfig::standalone());
///
/// let report = pipeline
///     .run(JobPayload::new("local", "https://example.com/opportunity"), &CancellationToken::new())
///     .await?;
/// ```
pub struct Pipeline<L, M, S> {
    loader: L,
    model: M,
    sink: S,
    config: PipelineConfig,
}

impl<L, M, S> Pipeline<L, M, S>
where
    L: PageLoader,
    M: CompletionModel,
    S: DocumentSink,
{
    pub fn new(loader: L, model: M, sink: S) -> Self {
        Self {
            loader,
            model,
            sink,
            config: PipelineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Run one job to completion.
    ///
    /// Validation happens before any collaborator is called. Load and store
    /// failures are fatal; model failures are recovered per section.
    pub async fn run(&self, payload: JobPayload, cancel: &CancellationToken) -> Result<ScrapeReport> {
        let job = Job::try_from(payload)?;
        let started = Instant::now();

        info!(
            job_id = %job.id(),
            url = %job.url(),
            loader = self.loader.name(),
            model = self.model.name(),
            sink = self.sink.name(),
            "Starting scrape job"
        );

        let page = self.loader.load(job.url(), &self.config.load).await?;
        if !page.has_content() {
            return Err(LoadError::EmptyPage {
                url: job.url().to_string(),
            }
            .into());
        }
        info!(job_id = %job.id(), bytes = page.content_length(), "Page loaded");

        let fragment = extract_main_content(&page.content);
        let sections = split_content(fragment, &self.config.split);
        if sections.is_empty() {
            warn!(job_id = %job.id(), "Page has no content to transform");
        }
        info!(job_id = %job.id(), sections = sections.len(), "Split content into sections");

        let transformed = self.transform_all(&job, &sections, cancel).await?;
        let fallback_sections: Vec<usize> = transformed
            .iter()
            .filter(|s| s.is_fallback())
            .map(|s| s.index)
            .collect();
        if !fallback_sections.is_empty() {
            warn!(
                job_id = %job.id(),
                failed = fallback_sections.len(),
                total = transformed.len(),
                "Some sections kept their original content"
            );
        }

        let document = assemble_document(&transformed);
        let record = self.sink.store(job.id(), &document).await?;

        info!(
            job_id = %job.id(),
            location = %record.location,
            document_len = document.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Scrape job complete"
        );

        Ok(ScrapeReport {
            job_id: job.id().to_string(),
            url: job.url().to_string(),
            section_count: transformed.len(),
            fallback_sections,
            document_len: document.len(),
            record,
        })
    }

    /// Run one job, cancelling between sections once `deadline` has elapsed.
    pub async fn run_with_deadline(
        &self,
        payload: JobPayload,
        deadline: Duration,
    ) -> Result<ScrapeReport> {
        let cancel = CancellationToken::new();
        let timer_token = cancel.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            timer_token.cancel();
        });

        let result = self.run(payload, &cancel).await;
        timer.abort();
        result
    }

    async fn transform_all(
        &self,
        job: &Job,
        sections: &[Section],
        cancel: &CancellationToken,
    ) -> Result<Vec<TransformedSection>> {
        let total = sections.len();
        let mut transformed = Vec::with_capacity(total);

        for section in sections {
            if !transformed.is_empty() {
                if let Some(delay) = self.config.section_delay() {
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = cancel.cancelled() => {}
                    }
                }
            }

            if cancel.is_cancelled() {
                warn!(
                    job_id = %job.id(),
                    completed = transformed.len(),
                    total,
                    "Scrape job cancelled between sections"
                );
                return Err(PipelineError::Cancelled {
                    completed: transformed.len(),
                    total,
                });
            }

            transformed.push(transform_section(&self.model, section, total).await);
        }

        Ok(transformed)
    }
}
