//! Data models for the LINE Messaging API and the OpenAI Completions API.
//!
//! - `line`: webhook body, inbound events, and the reply request.
//! - `completion`: completion request and response.
//!
//! The relay logic that connects the two lives in `crate::handler`.

pub mod completion;
pub mod line;

pub use completion::{CompletionChoice, CompletionRequest, CompletionResponse};
pub use line::{EventMessage, MessageEvent, ReplyMessage, ReplyRequest, WebhookBody, WebhookEvent};
