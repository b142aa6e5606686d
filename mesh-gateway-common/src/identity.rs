//! Fixed identity of a mesh gateway device.

/// Service name reported by `/health`.
pub const SERVICE_NAME: &str = "mesh-gateway";

/// mDNS hostname reported by the `status` command.
pub const DEVICE_HOSTNAME: &str = "mesh-gateway.local";

/// Port the gateway listens on unless configured otherwise.
pub const DEFAULT_PORT: u16 = 8080;
