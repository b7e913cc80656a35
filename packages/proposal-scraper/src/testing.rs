//! Testing utilities including mock implementations.
//!
//! These let applications (and this crate's own tests) drive the pipeline
//! without a browser, a model provider or a record store.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::error::{LoadError, LoadResult, ModelError, ModelResult, SinkError, SinkResult};
use crate::traits::{
    loader::{LoadOptions, PageLoader, RawPage},
    model::CompletionModel,
    sink::{DocumentSink, StoredRecord},
};

/// A mock page loader serving canned markup by URL.
///
/// Unknown URLs fail with a 404 [`LoadError::Status`].
#[derive(Default, Clone)]
pub struct MockLoader {
    pages: Arc<RwLock<HashMap<String, String>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for `url`.
    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.write().unwrap().insert(url.into(), html.into());
        self
    }

    /// Number of times `load` was called.
    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// URLs requested, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl PageLoader for MockLoader {
    async fn load(&self, url: &str, _options: &LoadOptions) -> LoadResult<RawPage> {
        self.calls.write().unwrap().push(url.to_string());

        let pages = self.pages.read().unwrap();
        pages
            .get(url)
            .map(|html| RawPage::new(url, html.clone()).with_content_type("text/html"))
            .ok_or_else(|| LoadError::Status {
                status: 404,
                body: format!("no mock page for {}", url),
            })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A mock completion model.
///
/// By default it answers every prompt with `Rewritten: <section>`, where
/// `<section>` is the text interpolated into the section prompt. Calls can be
/// made to fail by their 0-based call number.
#[derive(Default, Clone)]
pub struct MockModel {
    fixed_response: Option<String>,
    failing_calls: HashSet<usize>,
    prompts: Arc<RwLock<Vec<String>>>,
    responses: Arc<RwLock<Vec<String>>>,
}

impl MockModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every prompt with the same text.
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.fixed_response = Some(response.into());
        self
    }

    /// Fail the `call`-th invocation (0-based) with an API error.
    pub fn failing_on_call(mut self, call: usize) -> Self {
        self.failing_calls.insert(call);
        self
    }

    /// Number of times `complete` was called.
    pub fn call_count(&self) -> usize {
        self.prompts.read().unwrap().len()
    }

    /// Prompts received, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.read().unwrap().clone()
    }

    /// Successful responses returned, in order.
    pub fn responses(&self) -> Vec<String> {
        self.responses.read().unwrap().clone()
    }

    fn default_response(prompt: &str) -> String {
        let section = prompt
            .split_once("Section content:\n")
            .map(|(_, rest)| rest)
            .and_then(|rest| rest.split_once("\n\nIMPORTANT: Return only"))
            .map(|(section, _)| section.trim())
            .unwrap_or(prompt);
        format!("Rewritten: {}", section)
    }
}

#[async_trait]
impl CompletionModel for MockModel {
    async fn complete(&self, prompt: &str) -> ModelResult<String> {
        let call = {
            let mut prompts = self.prompts.write().unwrap();
            prompts.push(prompt.to_string());
            prompts.len() - 1
        };

        if self.failing_calls.contains(&call) {
            return Err(ModelError::Api {
                status: 500,
                body: format!("mock failure on call {}", call),
            });
        }

        let response = self
            .fixed_response
            .clone()
            .unwrap_or_else(|| Self::default_response(prompt));
        self.responses.write().unwrap().push(response.clone());
        Ok(response)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A sink that keeps documents in memory.
#[derive(Default, Clone)]
pub struct MemorySink {
    writes: Arc<RwLock<Vec<(String, String)>>>,
    failure: Option<(u16, String)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every write with the given status and body.
    pub fn failing_with(mut self, status: u16, body: impl Into<String>) -> Self {
        self.failure = Some((status, body.into()));
        self
    }

    /// `(job_id, document)` pairs stored, in order.
    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.read().unwrap().clone()
    }

    /// Most recent document stored for a job.
    pub fn document(&self, job_id: &str) -> Option<String> {
        self.writes
            .read()
            .unwrap()
            .iter()
            .rev()
            .find(|(id, _)| id == job_id)
            .map(|(_, doc)| doc.clone())
    }
}

#[async_trait]
impl DocumentSink for MemorySink {
    async fn store(&self, job_id: &str, document: &str) -> SinkResult<StoredRecord> {
        if let Some((status, body)) = &self.failure {
            return Err(SinkError::Status {
                status: *status,
                body: body.clone(),
            });
        }

        self.writes
            .write()
            .unwrap()
            .push((job_id.to_string(), document.to_string()));

        Ok(StoredRecord::new(job_id, format!("memory://{}", job_id)).with_record(
            serde_json::json!({ "id": job_id, "description_markdown": document }),
        ))
    }

    fn name(&self) -> &str {
        "memory"
    }
}
