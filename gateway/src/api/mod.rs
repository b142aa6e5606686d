//! HTTP/JSON surface of the command service.

pub mod body;
pub mod command;
pub mod echo;
pub mod health;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{middleware, Router};
use mesh_gateway_common::{COMMAND_PATH, ECHO_PATH, HEALTH_PATH};
use tower_http::cors::CorsLayer;

use crate::context::DeviceContext;
use crate::logging::request_logger;

/// Build the gateway router.
pub fn router(context: Arc<DeviceContext>) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(health::health))
        .route(ECHO_PATH, post(echo::echo))
        .route(COMMAND_PATH, post(command::command))
        .layer(middleware::from_fn(request_logger))
        .layer(CorsLayer::permissive())
        .with_state(context)
}
