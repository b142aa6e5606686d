//! Mesh Gateway command service.
//!
//! Reports device health and status and dispatches JSON commands over HTTP.

pub mod api;
pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod netif;
pub mod server;
pub mod service;
pub mod test_util;

pub use clock::{DeviceClock, SystemTicks, TickSource};
pub use config::Config;
pub use context::DeviceContext;
pub use error::{Error, Result};
pub use netif::{best_effort_ip, InterfaceState, NetifError, NetifParams, UsbNetif};
pub use server::{Initializing, Serving};
pub use service::{Command, CommandResult, VERSION};
