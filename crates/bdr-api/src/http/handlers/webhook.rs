//! Webhook receivers.
//!
//! `POST /webhook/hubspot` parses the delivery, normalizes each sub-event,
//! hands the valid ones to the dispatcher and answers immediately. Workflow
//! execution happens in the background; its outcome never changes the reply.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use bdr_core::event::{normalize_delivery, parse_delivery};

use crate::http::error::AppError;
use crate::state::AppState;

/// Reply to a HubSpot delivery.
#[derive(Debug, Serialize, Deserialize)]
pub struct HubSpotAck {
    pub status: String,
    pub message: String,
    pub delivery_id: Uuid,
    /// Sub-events handed to a workflow.
    pub scheduled: usize,
    /// Sub-events no rule matched.
    pub skipped: usize,
    /// Sub-events that could not be normalized.
    pub rejected: usize,
}

/// POST /webhook/hubspot
///
/// A body that is not JSON (or not an object/array) is a 400. Individual
/// malformed sub-events are counted as `rejected` and do not fail the
/// delivery.
pub async fn hubspot_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<HubSpotAck>, AppError> {
    let raw = parse_delivery(&body)?;
    let batch = normalize_delivery(&raw);
    let rejected = batch.rejected.len();

    let ack = state.dispatcher.submit(batch.events);

    tracing::info!(
        delivery_id = %ack.delivery_id,
        events = raw.len(),
        scheduled = ack.scheduled(),
        skipped = ack.skipped(),
        rejected,
        "received hubspot delivery"
    );

    Ok(Json(HubSpotAck {
        status: "received".to_string(),
        message: "Webhook processing started".to_string(),
        delivery_id: ack.delivery_id,
        scheduled: ack.scheduled(),
        skipped: ack.skipped(),
        rejected,
    }))
}

/// POST /webhook/slack
///
/// Answers Slack's `url_verification` handshake; every other event is
/// acknowledged and logged.
pub async fn slack_webhook(body: Bytes) -> Result<Json<Value>, AppError> {
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("slack payload is not valid JSON: {e}")))?;

    let event_type = payload.get("type").and_then(Value::as_str).unwrap_or("unknown");

    if event_type == "url_verification" {
        let challenge = payload
            .get("challenge")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::Validation("url_verification without challenge".to_string()))?;
        tracing::info!("answered slack url verification");
        return Ok(Json(json!({ "challenge": challenge })));
    }

    tracing::info!(event_type, "received slack event");
    Ok(Json(json!({
        "status": "received",
        "message": "Slack event received",
    })))
}
