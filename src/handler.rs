//! Webhook batch handling: filter to text messages, complete, reply.
//!
//! Every event in a batch is driven concurrently and the results come back in input order.
//! A failure in any event fails the whole batch.

use std::sync::Arc;

use futures_util::future::try_join_all;
use serde_json::Value;

use crate::completion::CompletionClient;
use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::messaging::ReplyClient;
use crate::models::completion::CompletionRequest;
use crate::models::line::{EventMessage, MessageEvent, ReplyMessage, WebhookEvent};

/// Outcome of one event: `None` when the event is ignored, otherwise the reply call's response.
pub type EventOutcome = Option<Value>;

/// Relays text messages to the completion backend and replies with the generated text.
#[derive(Clone)]
pub struct Relay {
    completion: Arc<dyn CompletionClient>,
    replies: Arc<dyn ReplyClient>,
    model: String,
    max_tokens: u32,
}

impl Relay {
    pub fn new(
        completion: Arc<dyn CompletionClient>,
        replies: Arc<dyn ReplyClient>,
        model: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            completion,
            replies,
            model: model.into(),
            max_tokens,
        }
    }

    pub fn from_config(
        completion: Arc<dyn CompletionClient>,
        replies: Arc<dyn ReplyClient>,
        config: &RelayConfig,
    ) -> Self {
        Self::new(completion, replies, &config.model, config.max_tokens)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Handle a whole batch. Output is positionally aligned with `events`.
    pub async fn handle_events(
        &self,
        events: &[WebhookEvent],
    ) -> Result<Vec<EventOutcome>, RelayError> {
        try_join_all(events.iter().map(|event| self.handle_event(event))).await
    }

    /// Handle a single event.
    pub async fn handle_event(&self, event: &WebhookEvent) -> Result<EventOutcome, RelayError> {
        let (reply_token, text) = match event {
            WebhookEvent::Message(MessageEvent {
                reply_token,
                message: EventMessage::Text { text, .. },
            }) => (reply_token, text),
            other => {
                tracing::debug!(event = other.kind(), "ignoring non-text event");
                return Ok(None);
            }
        };
        let request = CompletionRequest {
            model: self.model.clone(),
            prompt: text.clone(),
            max_tokens: self.max_tokens,
        };
        let completion = self.completion.complete(&request).await?;

        // Standby-mode deliveries carry no token; the reply attempt fails like any other.
        let Some(reply_token) = reply_token.as_deref() else {
            return Err(RelayError::Reply("missing reply token".into()));
        };
        // Clients already trim; keep the guarantee for any implementation.
        let reply_text = completion.trim().to_string();

        tracing::info!(
            prompt_chars = text.chars().count(),
            reply_chars = reply_text.chars().count(),
            "sending reply"
        );
        let sent = self
            .replies
            .reply_message(reply_token, vec![ReplyMessage::text(reply_text)])
            .await?;
        Ok(Some(sent))
    }
}
