use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use mesh_gateway_common::EchoRequest;
use serde_json::Value;

use super::body::JsonBody;
use crate::context::DeviceContext;
use crate::service::{self, Command};

/// POST /echo
pub async fn echo(
    State(ctx): State<Arc<DeviceContext>>,
    JsonBody(req): JsonBody<EchoRequest>,
) -> Json<Value> {
    Json(service::dispatch(&ctx, &Command::from(req)).into_json())
}
