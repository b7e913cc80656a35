//! OpenAI chat-completions model.
//!
//! Sends each prompt as a single user message with deterministic sampling
//! (temperature 0) and returns the first choice's text.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ModelError, ModelResult};
use crate::traits::model::CompletionModel;

const OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// OpenAI-backed [`CompletionModel`].
///
/// # Example
///
/// ```rust,ignore
/// use proposal_scraper::models::OpenAiModel;
///
/// let model = OpenAiModel::from_env()?.with_model("gpt-4o-mini");
/// let text = model.complete("Say hi").await?;
/// ```
#[derive(Clone)]
pub struct OpenAiModel {
    client: Client,
    api_key: String,
    model: String,
    temperature: f32,
    base_url: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl OpenAiModel {
    /// Create a new model client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            base_url: OPENAI_API_URL.to_string(),
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> ModelResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ModelError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set the chat model (default: gpt-4o).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Get the current model name.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionModel for OpenAiModel {
    async fn complete(&self, prompt: &str) -> ModelResult<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "OpenAI request failed");
                ModelError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %body, "OpenAI API error");
            return Err(ModelError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Parse(e.to_string()))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ModelError::EmptyResponse)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_sends_single_user_message_at_temperature_zero() {
        let base = serve(Router::new().route(
            "/chat/completions",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["model"], "gpt-4o");
                assert_eq!(body["temperature"], json!(0.0));
                assert_eq!(body["messages"][0]["role"], "user");
                assert_eq!(body["messages"].as_array().map(Vec::len), Some(1));
                Json(json!({
                    "choices": [{ "message": { "role": "assistant", "content": "# Done" } }]
                }))
            }),
        ))
        .await;

        let model = OpenAiModel::new("sk-test").with_base_url(base);
        assert_eq!(model.complete("prompt").await.unwrap(), "# Done");
    }

    #[tokio::test]
    async fn test_api_error_keeps_status() {
        let base = serve(Router::new().route(
            "/chat/completions",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        ))
        .await;

        let model = OpenAiModel::new("sk-test").with_base_url(base);
        let err = model.complete("prompt").await.unwrap_err();

        assert!(matches!(err, ModelError::Api { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_missing_content_is_empty_response() {
        let base = serve(Router::new().route(
            "/chat/completions",
            post(|| async { Json(json!({ "choices": [] })) }),
        ))
        .await;

        let model = OpenAiModel::new("sk-test").with_base_url(base);
        assert!(matches!(
            model.complete("prompt").await.unwrap_err(),
            ModelError::EmptyResponse
        ));
    }
}
