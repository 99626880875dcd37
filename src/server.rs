use axum::{
    extract::State,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use crate::error::RelayError;
use crate::handler::EventOutcome;
use crate::models::line::WebhookBody;
use crate::signature::require_line_signature;
use crate::util::AppState;

/// Build the Axum router with `/webhook` (signature-checked) and `/status`.
pub fn build_router(state: Arc<AppState>) -> Router {
    let webhook_routes = Router::new()
        .route("/webhook", post(webhook))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_line_signature,
        ));

    Router::new()
        .route("/status", get(status))
        .merge(webhook_routes)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Service status endpoint exposing the configured model and available routes.
async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let routes = vec!["/status", "/webhook"];
    Json(serde_json::json!({
        "name": "line2completion",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.relay.model(),
        "routes": routes
    }))
}

/// Receive a verified webhook batch, relay every text message, and return per-event outcomes.
/// - 200: JSON array aligned with the inbound `events` (`null` for ignored events)
/// - 500: empty body when any event's completion or reply fails
async fn webhook(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Vec<EventOutcome>>, RelayError> {
    let body: WebhookBody =
        serde_json::from_slice(&body).map_err(|e| RelayError::InvalidBody(e.to_string()))?;

    let batch_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!(
        "webhook_batch",
        %batch_id,
        destination = body.destination.as_deref().unwrap_or("-"),
        events = body.events.len()
    );

    async {
        tracing::info!("handling webhook batch");
        let outcomes = state
            .relay
            .handle_events(&body.events)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "webhook batch failed"))?;
        Ok::<_, RelayError>(Json(outcomes))
    }
    .instrument(span)
    .await
}
