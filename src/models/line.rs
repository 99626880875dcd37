use serde::{Deserialize, Serialize};

/// Webhook request body delivered by the LINE platform.
///
/// Example:
/// {
///   "destination": "U0123...",
///   "events": [ { "type": "message", "replyToken": "...", "message": { "type": "text", "text": "Hi" } } ]
/// }
///
/// `events` may be empty; the platform sends an empty batch when verifying a webhook URL.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookBody {
    /// Bot user id the events were delivered to.
    #[serde(default)]
    pub destination: Option<String>,
    pub events: Vec<WebhookEvent>,
}

/// One user activity notification.
///
/// Only `message` carries a payload we act on. Event types added by the platform
/// later deserialize as `Other` instead of failing the batch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WebhookEvent {
    Message(MessageEvent),
    Follow,
    Unfollow,
    Join,
    Leave,
    Postback,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    /// Absent for events delivered while the channel is in standby mode.
    #[serde(default)]
    pub reply_token: Option<String>,
    pub message: EventMessage,
}

/// Message content carried by a `message` event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EventMessage {
    Text {
        #[serde(default)]
        id: Option<String>,
        text: String,
    },
    Image,
    Video,
    Audio,
    File,
    Location,
    Sticker,
    #[serde(other)]
    Other,
}

impl WebhookEvent {
    /// Build a text `message` event; mostly useful in tests and tooling.
    pub fn text(reply_token: impl Into<String>, text: impl Into<String>) -> Self {
        WebhookEvent::Message(MessageEvent {
            reply_token: Some(reply_token.into()),
            message: EventMessage::Text {
                id: None,
                text: text.into(),
            },
        })
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            WebhookEvent::Message(_) => "message",
            WebhookEvent::Follow => "follow",
            WebhookEvent::Unfollow => "unfollow",
            WebhookEvent::Join => "join",
            WebhookEvent::Leave => "leave",
            WebhookEvent::Postback => "postback",
            WebhookEvent::Other => "other",
        }
    }
}

/// Outbound message object for the reply endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReplyMessage {
    Text { text: String },
}

impl ReplyMessage {
    pub fn text(text: impl Into<String>) -> Self {
        ReplyMessage::Text { text: text.into() }
    }
}

/// Body of `POST /v2/bot/message/reply`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    pub reply_token: String,
    pub messages: Vec<ReplyMessage>,
}
