#![forbid(unsafe_code)]
#![doc = r#"
Line2Completion

Relay LINE Messaging API text messages to an OpenAI completion model and reply with the generated text.

Crate highlights
- Library: `Relay::handle_events` runs a webhook batch against any `CompletionClient` / `ReplyClient`.
- HTTP server (in `server`): `/webhook` (signature-checked) and `/status`.
- Models: webhook events and reply payloads for LINE, request/response for Completions.

Modules
- `config`: Environment-sourced `RelayConfig`.
- `models`: Data structures for LINE and Completions.
- `signature`: `x-line-signature` verification middleware.
- `completion` / `messaging`: Outbound clients behind traits.
- `handler`: Per-event relay and batch fan-out.
- `server`: Axum router/handlers (the binary uses this).
- `util`: Shared helpers (tracing, env, HTTP client).

Note: a failure in any event of a batch fails the whole webhook request with HTTP 500.
"#]

pub mod completion;
pub mod config;
pub mod error;
pub mod handler;
pub mod messaging;
pub mod models;
pub mod server;
pub mod signature;
pub mod util;

pub use crate::config::RelayConfig;
pub use crate::error::RelayError;
pub use crate::handler::{EventOutcome, Relay};

// Re-export model namespaces for convenience (downstream users can do `use line2completion::line::WebhookEvent`).
pub use crate::models::line;
