use async_trait::async_trait;
use http::header;

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::models::completion::{CompletionRequest, CompletionResponse};

/// Text-generation backend used to produce reply content.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Run one completion and return the first choice's text, whitespace-trimmed.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, RelayError>;
}

/// OpenAI legacy Completions endpoint (`POST {base}/completions`).
pub struct OpenAiCompletionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiCompletionClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(http: reqwest::Client, config: &RelayConfig) -> Self {
        Self::new(http, &config.openai_base_url, &config.openai_api_key)
    }

    fn url(&self) -> String {
        format!("{}/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, RelayError> {
        let resp = self
            .http
            .post(self.url())
            .header(header::CONTENT_TYPE, "application/json")
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| RelayError::Completion(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RelayError::Completion(format!("{status}: {body}")));
        }

        let parsed: CompletionResponse = resp
            .json()
            .await
            .map_err(|e| RelayError::Completion(format!("invalid response body: {e}")))?;

        tracing::debug!(
            id = parsed.id.as_deref().unwrap_or("-"),
            model = parsed.model.as_deref().unwrap_or("-"),
            choices = parsed.choices.len(),
            "completion received"
        );
        if parsed.is_truncated() {
            tracing::warn!(max_tokens = request.max_tokens, "completion truncated at max_tokens");
        }

        parsed
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| RelayError::Completion("response contained no choices".into()))
    }
}
