//! Completion model implementations.

mod openai;

pub use openai::{OpenAiModel, DEFAULT_MODEL};

pub use crate::traits::model::CompletionModel;
