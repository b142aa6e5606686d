//! Linux USB gadget network backend driven through `ip(8)`.

use std::fmt;
use std::net::Ipv4Addr;
use std::sync::Arc;

use async_trait::async_trait;
use nix::ifaddrs::getifaddrs;
use nix::net::if_::InterfaceFlags;
use tokio::process::Command;

use super::{NetifError, NetifParams, UsbNetif};

const IP_BINARY: &str = "ip";

/// Runs one `ip` invocation.
#[async_trait]
pub trait IpRunner: Send + Sync {
    async fn run(&self, args: &[String]) -> Result<(), NetifError>;
}

/// Runs the system `ip` binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemIp;

#[async_trait]
impl IpRunner for SystemIp {
    async fn run(&self, args: &[String]) -> Result<(), NetifError> {
        tracing::debug!("Running {} {}", IP_BINARY, args.join(" "));

        let output = Command::new(IP_BINARY).args(args).output().await?;
        if !output.status.success() {
            return Err(NetifError::CommandFailed {
                command: format!("{} {}", IP_BINARY, args.join(" ")),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// USB network interface (e.g. `usb0`) configured with a static address.
#[derive(Clone)]
pub struct IpRouteNetif {
    interface: String,
    runner: Arc<dyn IpRunner>,
}

impl fmt::Debug for IpRouteNetif {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IpRouteNetif")
            .field("interface", &self.interface)
            .finish_non_exhaustive()
    }
}

impl IpRouteNetif {
    pub fn new(interface: impl Into<String>) -> Self {
        Self::with_runner(interface, Arc::new(SystemIp))
    }

    pub fn with_runner(interface: impl Into<String>, runner: Arc<dyn IpRunner>) -> Self {
        Self {
            interface: interface.into(),
            runner,
        }
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// IPv4 addresses on the interface while it is flagged UP.
    fn up_ipv4_addresses(&self) -> Result<Vec<Ipv4Addr>, NetifError> {
        let addrs = getifaddrs().map_err(std::io::Error::from)?;

        Ok(addrs
            .filter(|a| a.interface_name == self.interface)
            .filter(|a| a.flags.contains(InterfaceFlags::IFF_UP))
            .filter_map(|a| {
                a.address
                    .as_ref()
                    .and_then(|addr| addr.as_sockaddr_in())
                    .map(|sin| Ipv4Addr::from(sin.ip()))
            })
            .collect())
    }
}

#[async_trait]
impl UsbNetif for IpRouteNetif {
    fn is_up(&self) -> bool {
        match self.up_ipv4_addresses() {
            Ok(addrs) => !addrs.is_empty(),
            Err(e) => {
                tracing::warn!("Cannot read addresses of {}: {}", self.interface, e);
                false
            }
        }
    }

    async fn start(&self, params: &NetifParams) -> Result<(), NetifError> {
        let commands = bring_up_commands(&self.interface, params)?;

        for args in &commands {
            if let Err(e) = self.runner.run(args).await {
                // Leave no half-configured address behind.
                let flush = flush_command(&self.interface);
                if let Err(cleanup) = self.runner.run(&flush).await {
                    tracing::warn!("Cleanup of {} failed: {}", self.interface, cleanup);
                }
                return Err(e);
            }
        }

        tracing::info!(
            interface = %self.interface,
            hostname = %params.hostname,
            ip = %params.ip,
            "USB netif started"
        );
        Ok(())
    }

    fn current_ip(&self) -> Result<Ipv4Addr, NetifError> {
        self.up_ipv4_addresses()?
            .into_iter()
            .next()
            .ok_or_else(|| NetifError::NoAddress(self.interface.clone()))
    }
}

fn parse_ipv4(field: &str, value: &str) -> Result<Ipv4Addr, NetifError> {
    value
        .parse()
        .map_err(|_| NetifError::InvalidArgument(format!("{} '{}' is not an IPv4 address", field, value)))
}

/// Prefix length of a contiguous netmask (`255.255.255.0` -> 24).
pub fn prefix_len(netmask: Ipv4Addr) -> Option<u32> {
    let bits = u32::from(netmask);
    let ones = bits.leading_ones();
    if bits.checked_shl(ones).unwrap_or(0) == 0 {
        Some(ones)
    } else {
        None
    }
}

fn flush_command(interface: &str) -> Vec<String> {
    argv(&["addr", "flush", "dev", interface])
}

/// `ip` invocations that apply `params` to `interface`, in order.
pub fn bring_up_commands(interface: &str, params: &NetifParams) -> Result<Vec<Vec<String>>, NetifError> {
    if params.hostname.is_empty() {
        return Err(NetifError::InvalidArgument("hostname is empty".to_string()));
    }
    let ip = parse_ipv4("ip", &params.ip)?;
    let netmask = parse_ipv4("netmask", &params.netmask)?;
    let gateway = parse_ipv4("gateway", &params.gateway)?;
    let prefix = prefix_len(netmask).ok_or_else(|| {
        NetifError::InvalidArgument(format!("netmask {} is not contiguous", netmask))
    })?;

    let address = format!("{}/{}", ip, prefix);
    let gateway = gateway.to_string();

    Ok(vec![
        flush_command(interface),
        argv(&["link", "set", "dev", interface, "alias", &params.hostname]),
        argv(&["addr", "add", &address, "dev", interface]),
        argv(&["link", "set", "dev", interface, "up"]),
        argv(&["route", "replace", "default", "via", &gateway, "dev", interface]),
    ])
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every invocation and fails the first one starting with `fail_on`.
    #[derive(Default)]
    struct ScriptedIp {
        fail_on: Option<Vec<&'static str>>,
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl ScriptedIp {
        fn failing_on(prefix: &[&'static str]) -> Self {
            Self {
                fail_on: Some(prefix.to_vec()),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl IpRunner for ScriptedIp {
        async fn run(&self, args: &[String]) -> Result<(), NetifError> {
            self.calls.lock().unwrap().push(args.to_vec());
            match &self.fail_on {
                Some(prefix) if args.starts_with(&argv(prefix)) => Err(NetifError::CommandFailed {
                    command: format!("ip {}", args.join(" ")),
                    stderr: "RTNETLINK answers: File exists".to_string(),
                }),
                _ => Ok(()),
            }
        }
    }

    #[tokio::test]
    async fn test_start_runs_every_step_in_order() {
        let runner = Arc::new(ScriptedIp::default());
        let netif = IpRouteNetif::with_runner("usb0", runner.clone());

        netif.start(&NetifParams::mesh_gateway()).await.unwrap();

        let expected = bring_up_commands("usb0", &NetifParams::mesh_gateway()).unwrap();
        assert_eq!(runner.calls(), expected);
    }

    #[tokio::test]
    async fn test_failed_step_flushes_interface_and_returns_error() {
        let runner = Arc::new(ScriptedIp::failing_on(&["addr", "add"]));
        let netif = IpRouteNetif::with_runner("usb0", runner.clone());

        let err = netif.start(&NetifParams::mesh_gateway()).await.unwrap_err();

        match err {
            NetifError::CommandFailed { command, .. } => {
                assert_eq!(command, "ip addr add 192.168.137.2/24 dev usb0");
            }
            other => panic!("expected command failure, got {:?}", other),
        }

        let calls = runner.calls();
        assert_eq!(calls.len(), 4, "no step runs after the failing one");
        assert_eq!(calls[2], ["addr", "add", "192.168.137.2/24", "dev", "usb0"]);
        assert_eq!(calls[3], ["addr", "flush", "dev", "usb0"]);
    }

    #[tokio::test]
    async fn test_failed_cleanup_keeps_original_error() {
        let runner = Arc::new(ScriptedIp::failing_on(&["addr", "flush"]));
        let netif = IpRouteNetif::with_runner("usb0", runner.clone());

        let err = netif.start(&NetifParams::mesh_gateway()).await.unwrap_err();

        assert!(matches!(
            err,
            NetifError::CommandFailed { ref command, .. } if command == "ip addr flush dev usb0"
        ));
        // The initial flush fails, then cleanup flushes once more.
        assert_eq!(runner.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_params_run_nothing() {
        let runner = Arc::new(ScriptedIp::default());
        let netif = IpRouteNetif::with_runner("usb0", runner.clone());
        let mut params = NetifParams::mesh_gateway();
        params.gateway = "not-an-ip".to_string();

        let err = netif.start(&params).await.unwrap_err();

        assert!(matches!(err, NetifError::InvalidArgument(_)));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_prefix_len() {
        assert_eq!(prefix_len(Ipv4Addr::new(255, 255, 255, 0)), Some(24));
        assert_eq!(prefix_len(Ipv4Addr::new(255, 255, 255, 255)), Some(32));
        assert_eq!(prefix_len(Ipv4Addr::new(255, 255, 240, 0)), Some(20));
        assert_eq!(prefix_len(Ipv4Addr::new(0, 0, 0, 0)), Some(0));
        assert_eq!(prefix_len(Ipv4Addr::new(255, 0, 255, 0)), None);
    }

    #[test]
    fn test_bring_up_commands_for_mesh_gateway() {
        let commands = bring_up_commands("usb0", &NetifParams::mesh_gateway()).unwrap();

        assert_eq!(commands.len(), 5);
        assert_eq!(commands[0], ["addr", "flush", "dev", "usb0"]);
        assert_eq!(commands[1], ["link", "set", "dev", "usb0", "alias", "mesh-gateway"]);
        assert_eq!(commands[2], ["addr", "add", "192.168.137.2/24", "dev", "usb0"]);
        assert_eq!(commands[3], ["link", "set", "dev", "usb0", "up"]);
        assert_eq!(
            commands[4],
            ["route", "replace", "default", "via", "192.168.137.1", "dev", "usb0"]
        );
    }

    #[test]
    fn test_bring_up_commands_reject_bad_addresses() {
        let mut params = NetifParams::mesh_gateway();
        params.ip = "192.168.137".to_string();
        assert!(matches!(
            bring_up_commands("usb0", &params),
            Err(NetifError::InvalidArgument(_))
        ));

        let mut params = NetifParams::mesh_gateway();
        params.netmask = "255.0.255.0".to_string();
        assert!(matches!(
            bring_up_commands("usb0", &params),
            Err(NetifError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_missing_interface_is_down() {
        let netif = IpRouteNetif::new("mesh-gw-test-missing0");
        assert!(!netif.is_up());
        assert!(matches!(netif.current_ip(), Err(NetifError::NoAddress(_))));
    }
}
