use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use mesh_gateway_common::CommandRequest;
use serde_json::Value;

use super::body::JsonBody;
use crate::context::DeviceContext;
use crate::service::{self, Command};

/// POST /command
///
/// Unknown commands answer 200 with `ok: false`; the failure lives in the payload.
pub async fn command(
    State(ctx): State<Arc<DeviceContext>>,
    JsonBody(req): JsonBody<CommandRequest>,
) -> Json<Value> {
    Json(service::dispatch(&ctx, &Command::from(req)).into_json())
}
