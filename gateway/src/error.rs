//! Error types for the gateway command service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mesh_gateway_common::INVALID_REQUEST;
use serde_json::json;

use crate::netif::NetifError;

/// Errors raised by the gateway.
///
/// Only `InvalidRequest` reaches a client during normal operation; the
/// others stop startup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("USB network bring-up failed: {0}")]
    BringUp(#[from] NetifError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            Error::InvalidRequest(_) => (StatusCode::BAD_REQUEST, INVALID_REQUEST),
            Error::BringUp(_) | Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = Json(json!({
            "ok": false,
            "error": error_type,
            "message": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
