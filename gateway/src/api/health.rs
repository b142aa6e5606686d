//! Health check endpoint.

use axum::Json;
use serde_json::Value;

use crate::service;

/// GET /health
pub async fn health() -> Json<Value> {
    Json(service::health().into_json())
}
