use axum::{Json, extract::State, http::HeaderMap, response::IntoResponse};
use tracing::debug;

use super::error::ApiError;
use super::models::{EventResponse, HealthResponse};
use super::state::AppState;
use super::utils::{read_body, require_json};
use crate::handlers::LifecycleEvent;

/// Lifecycle event endpoint (POST /events)
///
/// Accepts one lifecycle event, dispatches it to the matching resource
/// handler and delivers the result envelope to the event's `ResponseURL`.
/// Handler failures still answer 200: the envelope carries `FAILED` and the
/// reason. Only malformed requests are rejected here.
pub async fn post_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Body,
) -> Result<impl IntoResponse, ApiError> {
    require_json(&headers)?;
    let bytes = read_body(&headers, body, state.config.server.max_event_bytes).await?;
    let event: LifecycleEvent = serde_json::from_slice(&bytes)?;
    debug!(request_id = %event.request_id, bytes = bytes.len(), "Accepted event");

    let outcome = state.dispatcher.handle(&event).await;
    let response = EventResponse {
        delivered: outcome.delivery.is_ok(),
        delivery_error: outcome.delivery.err().map(|e| e.to_string()),
        envelope: outcome.envelope,
    };

    Ok(Json(response))
}

/// Health check endpoint (GET /health)
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        backend: state.config.backend.provider.to_string(),
    })
}

/// Counter snapshot (GET /metrics)
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.snapshot())
}
