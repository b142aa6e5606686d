//! Process-wide device state shared with every handler.

use crate::clock::DeviceClock;
use crate::netif::InterfaceState;

/// Read-only state built once at startup and handed to handlers by reference.
#[derive(Debug, Clone)]
pub struct DeviceContext {
    pub clock: DeviceClock,
    pub netif: InterfaceState,
}

impl DeviceContext {
    pub fn new(clock: DeviceClock, netif: InterfaceState) -> Self {
        Self { clock, netif }
    }
}
