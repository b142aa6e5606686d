//! HTTP/JSON protocol between `gatewayctl` and the gateway command service.
//!
//! # Endpoints
//!
//! | Method | Path       | Request body                   | Response body            |
//! |--------|------------|--------------------------------|--------------------------|
//! | GET    | `/health`  | none                           | [`HealthReport`]         |
//! | POST   | `/echo`    | [`EchoRequest`]                | `{ok, echo}`             |
//! | POST   | `/command` | [`CommandRequest`]             | `{ok, result}` or `{ok: false, error, cmd}` |
//!
//! Every response is `application/json`. An unknown `cmd` is not a transport
//! failure: it comes back with HTTP 200 and `ok: false` in the payload.
//!
//! `/echo` takes `message` at the top level while `/command` nests arguments
//! under `args`. Both shapes are part of the contract.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const HEALTH_PATH: &str = "/health";
pub const ECHO_PATH: &str = "/echo";
pub const COMMAND_PATH: &str = "/command";

/// In-band error code for a `cmd` the gateway does not know.
pub const UNKNOWN_COMMAND: &str = "unknown_command";

/// Error code for a request body the gateway could not interpret.
pub const INVALID_REQUEST: &str = "invalid_request";

/// Body of `POST /echo`.
///
/// `message` is kept as raw JSON: the gateway echoes whatever it was sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EchoRequest {
    /// Value to echo back. Missing means empty; an explicit `null` is echoed.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub message: Option<Value>,
}

impl EchoRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(Value::String(message.into())),
        }
    }
}

/// Body of `POST /command`.
///
/// Fields are raw JSON so that a request with odd field types still gets an
/// in-band answer: a `cmd` that is not a string is an unknown command, and
/// `args` is only looked at by commands that take arguments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandRequest {
    /// Command name. Missing is routed like any other unknown command.
    #[serde(default)]
    pub cmd: Option<Value>,
    /// Command arguments, an object when well formed. Missing is `null`.
    #[serde(default)]
    pub args: Value,
}

impl CommandRequest {
    pub fn new(cmd: impl Into<String>, args: Map<String, Value>) -> Self {
        Self {
            cmd: Some(Value::String(cmd.into())),
            args: Value::Object(args),
        }
    }

    /// `cmd` when it is a string.
    pub fn name(&self) -> Option<&str> {
        self.cmd.as_ref().and_then(Value::as_str)
    }
}

/// `Some` for any value present in the body, `null` included.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub ok: bool,
    pub service: String,
    pub version: String,
}

/// Device state returned as `result` of the `status` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    /// Milliseconds since the service started. Wraps after ~49.7 days.
    pub uptime_ms: u32,
    /// Current IPv4 address, or a fixed fallback when it cannot be determined.
    pub ip: String,
    pub hostname: String,
}
