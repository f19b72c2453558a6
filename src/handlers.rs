use crate::consts::APOLOGY_REPLY;
use crate::conversation;
use crate::twilio_types::{message_response, TwilioMessagePayload};
use crate::types::AppState;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, trace};
use uuid::Uuid;

pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhook", post(webhook_handler))
        .route("/api/guests", get(list_guests_handler))
        .route("/api/guests/:guest_id", get(guest_detail_handler))
        .route("/test", get(test_handler))
        .with_state(app_state)
}

/// Twilio expects 200 + TwiML on every webhook response, errors included.
fn twiml_reply(text: &str) -> (StatusCode, HeaderMap, String) {
    let twiml = message_response(text);
    trace!("twiml: '{}'", twiml);
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, "text/xml".parse().unwrap());
    (StatusCode::OK, headers, twiml)
}

pub async fn webhook_handler(
    State(app_state): State<Arc<AppState>>,
    body: String,
) -> impl IntoResponse {
    trace!(body=%body, "webhook request body");
    let payload = match serde_urlencoded::from_str::<TwilioMessagePayload>(&body) {
        Ok(payload) => payload,
        Err(e) => {
            error!(error=%e, "failed to deserialize Twilio message payload");
            return twiml_reply(APOLOGY_REPLY);
        }
    };

    // Any failure inside the turn collapses to the fixed apology; the cause
    // is logged where it happened and never surfaced to the guest.
    let reply = match conversation::handle_message(
        app_state.store.as_ref(),
        app_state.llm.as_ref(),
        &payload.from,
        &payload.body,
    )
    .await
    {
        Ok(reply) => reply,
        Err(e) => {
            error!(error=%e, from=%payload.from, "webhook turn failed");
            APOLOGY_REPLY.to_string()
        }
    };

    twiml_reply(&reply)
}

pub async fn list_guests_handler(State(app_state): State<Arc<AppState>>) -> Response {
    match app_state.store.list_guests().await {
        Ok(guests) => Json(guests).into_response(),
        Err(e) => {
            error!(error=%e, "failed to list guests");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

pub async fn guest_detail_handler(
    State(app_state): State<Arc<AppState>>,
    Path(guest_id): Path<Uuid>,
) -> Response {
    match app_state.store.guest_detail(guest_id).await {
        Ok(Some(detail)) => Json(detail).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "guest not found" })),
        )
            .into_response(),
        Err(e) => {
            error!(error=%e, guest_id=%guest_id, "failed to load guest detail");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

pub async fn test_handler() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Wedding bot server is running!",
        "version": "full",
    }))
}
