//! Chat-completion client for the extraction model.

pub mod errors;
pub mod types;

pub use errors::ModelApiError;
pub use types::{ChatRequest, Message, Usage};

use async_trait::async_trait;
use reqwest::{Client, header};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// A model that answers a chat request with plain text.
#[async_trait]
pub trait CompletionModel: Send + Sync + 'static {
    async fn complete(&self, request: ChatRequest) -> Result<String, ModelApiError>;
}

/// OpenAI-compatible `/chat/completions` client.
#[derive(Clone)]
pub struct OpenAiClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ModelApiError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ModelApiError::from_reqwest_error)?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CompletionModel for OpenAiClient {
    #[instrument(skip_all, fields(model = %request.model))]
    async fn complete(&self, request: ChatRequest) -> Result<String, ModelApiError> {
        let start = Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "model request failed");
                ModelApiError::from_reqwest_error(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %body, "model api error");
            return Err(ModelApiError::Api { status, body });
        }

        let raw: types::ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| ModelApiError::Decode(e.to_string()))?;

        let usage = raw.usage.unwrap_or_default();
        let content = raw
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ModelApiError::EmptyResponse)?;

        debug!(
            duration_ms = start.elapsed().as_millis(),
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "chat completion"
        );

        Ok(content)
    }
}
