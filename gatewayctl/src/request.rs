//! Request construction. Pure: nothing here touches the network.

use mesh_gateway_common::{CommandRequest, EchoRequest, COMMAND_PATH, ECHO_PATH, HEALTH_PATH};
use reqwest::Method;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::CtlError;

/// One of the four requests `gatewayctl` can send.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayRequest {
    Health,
    Status,
    Echo { message: String },
    Call { cmd: String, args: Map<String, Value> },
}

/// Wire payload of a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestBody {
    Echo(EchoRequest),
    Command(CommandRequest),
}

impl GatewayRequest {
    pub fn echo(message: impl Into<String>) -> Self {
        GatewayRequest::Echo {
            message: message.into(),
        }
    }

    /// Build a custom command from a JSON object string.
    ///
    /// Fails with [`CtlError::Validation`] unless `args_json` decodes to an object.
    pub fn call(cmd: impl Into<String>, args_json: &str) -> Result<Self, CtlError> {
        let value: Value = serde_json::from_str(args_json)
            .map_err(|e| CtlError::Validation(format!("Invalid --args JSON: {}", e)))?;

        match value {
            Value::Object(args) => Ok(GatewayRequest::Call {
                cmd: cmd.into(),
                args,
            }),
            _ => Err(CtlError::Validation(
                "Invalid --args JSON: --args must decode to JSON object".to_string(),
            )),
        }
    }

    pub fn method(&self) -> Method {
        match self {
            GatewayRequest::Health => Method::GET,
            _ => Method::POST,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            GatewayRequest::Health => HEALTH_PATH,
            GatewayRequest::Echo { .. } => ECHO_PATH,
            GatewayRequest::Status | GatewayRequest::Call { .. } => COMMAND_PATH,
        }
    }

    pub fn body(&self) -> Option<RequestBody> {
        match self {
            GatewayRequest::Health => None,
            GatewayRequest::Status => Some(RequestBody::Command(CommandRequest::new("status", Map::new()))),
            GatewayRequest::Echo { message } => Some(RequestBody::Echo(EchoRequest::new(message.clone()))),
            GatewayRequest::Call { cmd, args } => {
                Some(RequestBody::Command(CommandRequest::new(cmd.clone(), args.clone())))
            }
        }
    }
}
