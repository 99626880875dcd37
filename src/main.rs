use std::sync::Arc;

use anyhow::Context;
use line2completion::config::RelayConfig;
use line2completion::server::build_router;
use line2completion::util::{init_tracing, AppState};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = RelayConfig::from_env().context("Failed to load configuration")?;
    tracing::info!(
        model = %config.model,
        max_tokens = config.max_tokens,
        openai_base_url = %config.openai_base_url,
        line_api_base_url = %config.line_api_base_url,
        "Configuration loaded"
    );

    let addr = config.bind_addr();
    let port = config.port;
    let app = build_router(Arc::new(AppState::from_config(config)));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Linebot is running on port {}", port);

    axum::serve(listener, app.into_make_service())
        .await
        .context("HTTP server error")?;
    Ok(())
}
