//! CompletionModel trait for the text-transformation capability.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ModelResult;

/// A language model that turns one prompt into one text completion.
///
/// The pipeline calls [`complete`](CompletionModel::complete) once per
/// section, sequentially. Errors are recovered per section by the caller, so
/// implementations should not retry internally.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Complete a prompt (returns the raw text response).
    async fn complete(&self, prompt: &str) -> ModelResult<String>;

    /// Model name (for logging).
    fn name(&self) -> &str {
        "unknown"
    }
}

#[async_trait]
impl<T: CompletionModel + ?Sized> CompletionModel for Box<T> {
    async fn complete(&self, prompt: &str) -> ModelResult<String> {
        (**self).complete(prompt).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<T: CompletionModel + ?Sized> CompletionModel for Arc<T> {
    async fn complete(&self, prompt: &str) -> ModelResult<String> {
        (**self).complete(prompt).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
