use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use http::StatusCode;
use tracing_subscriber::{fmt, EnvFilter};

use crate::completion::OpenAiCompletionClient;
use crate::config::RelayConfig;
use crate::handler::Relay;
use crate::messaging::LineMessagingClient;

/// Load the environment file and initialize structured tracing based on RUST_LOG.
///
/// Lookup order (first hit wins, existing variables are never overwritten):
/// - explicit path in ENV_FILE or DOTENV_PATH
/// - `.envfile` in the working directory
/// - `.env` discovered from the working directory upward
pub fn init_tracing() {
    let env_source = load_env_file();

    // RUST_LOG may come from the env file, so read it afterwards.
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=info".into());
    let subscriber = fmt().with_env_filter(EnvFilter::new(filter)).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    tracing::info!("Environment loaded from: {}", env_source);
}

fn load_env_file() -> String {
    for key in ["ENV_FILE", "DOTENV_PATH"] {
        if let Ok(p) = std::env::var(key) {
            let p = p.trim();
            if !p.is_empty()
                && std::path::Path::new(p).is_file()
                && dotenvy::from_filename(p).is_ok()
            {
                return format!("{p} ({key})");
            }
        }
    }

    if std::path::Path::new(".envfile").is_file() && dotenvy::from_filename(".envfile").is_ok() {
        return ".envfile".into();
    }

    match dotenvy::dotenv() {
        Ok(path) => path.display().to_string(),
        Err(_) => "none".into(),
    }
}

/// Shared application state used by the HTTP server and handlers.
pub struct AppState {
    pub config: RelayConfig,
    pub relay: Relay,
}

impl AppState {
    /// Wire the real LINE and OpenAI clients from configuration, sharing one HTTP client.
    pub fn from_config(config: RelayConfig) -> Self {
        let http = build_http_client_from_env();
        let completion = Arc::new(OpenAiCompletionClient::from_config(http.clone(), &config));
        let replies = Arc::new(LineMessagingClient::from_config(http, &config));
        let relay = Relay::from_config(completion, replies, &config);
        Self { config, relay }
    }

    /// State with caller-provided clients (used by tests and embedders).
    pub fn with_relay(config: RelayConfig, relay: Relay) -> Self {
        Self { config, relay }
    }
}

/// Build an HTTP client honoring proxy and timeout environment variables.
///
/// Environment:
/// - RELAY_NO_PROXY = 1|true|yes|on       -> disable all proxies
/// - RELAY_PROXY_URL = <url>              -> proxy for all schemes
/// - RELAY_HTTP_TIMEOUT_SECONDS           -> overall request timeout (u64)
///
/// HTTP_PROXY / HTTPS_PROXY are picked up by reqwest itself unless proxies are disabled.
pub fn build_http_client_from_env() -> reqwest::Client {
    let mut builder = reqwest::Client::builder();

    if let Ok(secs) = std::env::var("RELAY_HTTP_TIMEOUT_SECONDS") {
        if let Ok(n) = secs.trim().parse::<u64>() {
            builder = builder.timeout(std::time::Duration::from_secs(n));
        }
    }

    if env_flag("RELAY_NO_PROXY") {
        builder = builder.no_proxy();
    } else if let Ok(url) = std::env::var("RELAY_PROXY_URL") {
        let u = url.trim();
        if !u.is_empty() {
            match reqwest::Proxy::all(u) {
                Ok(p) => builder = builder.proxy(p),
                Err(e) => tracing::warn!(error = %e, "ignoring invalid RELAY_PROXY_URL"),
            }
        }
    }

    builder = builder.user_agent(format!("line2completion/{}", env!("CARGO_PKG_VERSION")));

    builder.build().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "falling back to default HTTP client");
        reqwest::Client::new()
    })
}

/// Truthy environment flag: 1, true, yes, on.
fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| {
            let v = v.trim().to_ascii_lowercase();
            v == "1" || v == "true" || v == "yes" || v == "on"
        })
        .unwrap_or(false)
}

/// Build a JSON error response with the given HTTP status and message.
pub fn error_response(status: StatusCode, msg: &str) -> Response {
    let body = serde_json::json!({ "error": { "message": msg } });
    (status, axum::Json(body)).into_response()
}
