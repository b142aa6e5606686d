//! USB network interface capability.
//!
//! Builds without the capability carry [`InterfaceState::Absent`] and skip
//! bring-up entirely. With it, the interface is configured once at startup
//! and only if it is not already up.

#[cfg(all(feature = "usbnet", target_os = "linux"))]
pub mod iproute;

use std::net::Ipv4Addr;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::UsbNetConfig;

/// Static address of the gateway on the USB link.
pub const DEVICE_IP: &str = "192.168.137.2";

/// Reported when the build has no network capability.
pub const UNASSIGNED_IP: &str = "0.0.0.0";

/// Errors from the network interface backend.
#[derive(Debug, thiserror::Error)]
pub enum NetifError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("`{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("No IPv4 address on {0}")]
    NoAddress(String),

    #[error("Interface I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Static IPv4 configuration applied on bring-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetifParams {
    /// Name the interface announces itself with.
    pub hostname: String,
    pub ip: String,
    pub netmask: String,
    pub gateway: String,
}

impl NetifParams {
    /// The fixed link configuration of a mesh gateway: the device is
    /// `192.168.137.2/24` behind a host sharing its connection at `.1`.
    pub fn mesh_gateway() -> Self {
        Self {
            hostname: "mesh-gateway".to_string(),
            ip: DEVICE_IP.to_string(),
            netmask: "255.255.255.0".to_string(),
            gateway: "192.168.137.1".to_string(),
        }
    }
}

/// A network interface that can report whether it is up and be started.
#[async_trait]
pub trait UsbNetif: Send + Sync {
    fn is_up(&self) -> bool;

    /// Configure and start the interface. Called at most once per process.
    async fn start(&self, params: &NetifParams) -> Result<(), NetifError>;

    fn current_ip(&self) -> Result<Ipv4Addr, NetifError>;
}

/// What bring-up did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BringUp {
    /// No network capability in this build.
    Absent,
    /// Interface was already up; left untouched.
    AlreadyUp,
    Started,
}

/// Network capability of this process.
#[derive(Clone)]
pub enum InterfaceState {
    Absent,
    Present(Arc<dyn UsbNetif>),
}

impl InterfaceState {
    /// Select the backend compiled into this build, honoring `usbnet.enabled`.
    pub fn from_config(config: &UsbNetConfig) -> Self {
        if !config.enabled {
            return Self::Absent;
        }

        #[cfg(all(feature = "usbnet", target_os = "linux"))]
        {
            return Self::Present(Arc::new(iproute::IpRouteNetif::new(&config.interface)));
        }

        #[cfg(not(all(feature = "usbnet", target_os = "linux")))]
        {
            tracing::warn!(
                "USB network requested on {} but this build has no usbnet backend",
                config.interface
            );
            return Self::Absent;
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Start the interface unless it is absent or already up.
    ///
    /// There is no retry. A failure here must stop startup.
    pub async fn bring_up(&self, params: &NetifParams) -> Result<BringUp, NetifError> {
        let netif = match self {
            Self::Absent => return Ok(BringUp::Absent),
            Self::Present(netif) => netif,
        };

        if netif.is_up() {
            return Ok(BringUp::AlreadyUp);
        }

        netif.start(params).await?;
        Ok(BringUp::Started)
    }
}

impl std::fmt::Debug for InterfaceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absent => f.write_str("Absent"),
            Self::Present(_) => f.write_str("Present"),
        }
    }
}

/// Current IPv4 address of the gateway. Never fails.
///
/// This is the one place lookup errors are discarded: an absent interface
/// reports [`UNASSIGNED_IP`], a failed lookup reports [`DEVICE_IP`].
pub fn best_effort_ip(state: &InterfaceState) -> String {
    let netif = match state {
        InterfaceState::Absent => return UNASSIGNED_IP.to_string(),
        InterfaceState::Present(netif) => netif,
    };

    match netif.current_ip() {
        Ok(ip) => ip.to_string(),
        Err(e) => {
            tracing::debug!("IP lookup failed, reporting static address: {}", e);
            DEVICE_IP.to_string()
        }
    }
}
