use async_trait::async_trait;
use http::header;

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::models::line::{ReplyMessage, ReplyRequest};

/// Messaging-platform side of the relay: sends replies bound to a reply token.
#[async_trait]
pub trait ReplyClient: Send + Sync {
    /// Reply to the interaction identified by `reply_token`. Returns the platform's response body.
    async fn reply_message(
        &self,
        reply_token: &str,
        messages: Vec<ReplyMessage>,
    ) -> Result<serde_json::Value, RelayError>;
}

/// LINE Messaging API client (`POST {base}/v2/bot/message/reply`).
pub struct LineMessagingClient {
    http: reqwest::Client,
    base_url: String,
    channel_access_token: String,
}

impl LineMessagingClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        channel_access_token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            channel_access_token: channel_access_token.into(),
        }
    }

    pub fn from_config(http: reqwest::Client, config: &RelayConfig) -> Self {
        Self::new(http, &config.line_api_base_url, &config.channel_access_token)
    }

    fn reply_url(&self) -> String {
        format!("{}/v2/bot/message/reply", self.base_url)
    }
}

#[async_trait]
impl ReplyClient for LineMessagingClient {
    async fn reply_message(
        &self,
        reply_token: &str,
        messages: Vec<ReplyMessage>,
    ) -> Result<serde_json::Value, RelayError> {
        let body = ReplyRequest {
            reply_token: reply_token.to_string(),
            messages,
        };

        let resp = self
            .http
            .post(self.reply_url())
            .header(header::CONTENT_TYPE, "application/json")
            .bearer_auth(&self.channel_access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| RelayError::Reply(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let bytes = resp.bytes().await.unwrap_or_default();
            return Err(RelayError::Reply(format!(
                "{status}: {}",
                String::from_utf8_lossy(&bytes)
            )));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| RelayError::Reply(format!("failed to read response body: {e}")))?;

        // The platform answers `{}` (older API versions send an empty body).
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::json!({}));
        }
        serde_json::from_slice(&bytes)
            .map_err(|e| RelayError::Reply(format!("invalid response body: {e}")))
    }
}
