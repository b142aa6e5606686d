//! Mesh Gateway Common Types
//!
//! The wire contract shared by the gateway command service and `gatewayctl`.
//! Neither side depends on the other's internals; they only agree on what is here.

pub mod identity;
pub mod protocol;

pub use identity::{DEFAULT_PORT, DEVICE_HOSTNAME, SERVICE_NAME};
pub use protocol::{
    CommandRequest, EchoRequest, HealthReport, StatusReport, COMMAND_PATH, ECHO_PATH, HEALTH_PATH,
    INVALID_REQUEST, UNKNOWN_COMMAND,
};
