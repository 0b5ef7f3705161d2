//! Liveness endpoint.

use axum::Json;
use serde_json::{Value, json};

/// GET / and GET /health
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "BDR Assistant",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
