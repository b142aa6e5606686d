//! HTTP client for the gateway REST API.

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::Client;
use serde_json::{Map, Value};

use crate::error::{error_chain, CtlError};
use crate::request::GatewayRequest;

/// Client for one gateway. No retries: every failure goes straight back to the caller.
pub struct GatewayClient {
    http_client: Client,
    base_url: String,
}

impl GatewayClient {
    /// `timeout` bounds each request from connect to the end of the body.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CtlError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CtlError::Transport(error_chain(&e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send `request` and return the decoded JSON body.
    pub async fn send(&self, request: &GatewayRequest) -> Result<Value, CtlError> {
        let url = format!("{}{}", self.base_url, request.path());
        tracing::debug!("{} {}", request.method(), url);

        let mut builder = self
            .http_client
            .request(request.method(), &url)
            .header(ACCEPT, "application/json");
        if let Some(body) = request.body() {
            builder = builder.json(&body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| CtlError::Transport(error_chain(&e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CtlError::Transport(error_chain(&e)))?;
        tracing::debug!("{} returned {} ({} bytes)", url, status, text.len());

        if !status.is_success() {
            return Err(CtlError::Protocol {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_body(&text)
    }
}

/// Decode a success body. Empty (or all whitespace) means `{}`.
pub fn parse_body(text: &str) -> Result<Value, CtlError> {
    if text.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_str(text).map_err(|e| CtlError::Decode(e.to_string()))
}
