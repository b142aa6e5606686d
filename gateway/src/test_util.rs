//! Deterministic stand-ins for the clock and the USB interface.

use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::clock::TickSource;
use crate::netif::{NetifError, NetifParams, UsbNetif};

/// Tick counter moved by hand. Wraps like the real one.
#[derive(Debug, Default)]
pub struct ManualTicks(AtomicU32);

impl ManualTicks {
    pub fn new(start: u32) -> Self {
        Self(AtomicU32::new(start))
    }

    pub fn set(&self, tick: u32) {
        self.0.store(tick, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: u32) {
        // fetch_add wraps on overflow.
        self.0.fetch_add(ms, Ordering::SeqCst);
    }
}

impl TickSource for ManualTicks {
    fn now_ms(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Interface that records every `start` call.
#[derive(Debug, Default)]
pub struct RecordingNetif {
    up: AtomicBool,
    fail_start: bool,
    ip: Option<Ipv4Addr>,
    starts: Mutex<Vec<NetifParams>>,
}

impl RecordingNetif {
    pub fn down() -> Self {
        Self::default()
    }

    pub fn up() -> Self {
        Self {
            up: AtomicBool::new(true),
            ..Self::default()
        }
    }

    /// Down, and every `start` fails.
    pub fn failing() -> Self {
        Self {
            fail_start: true,
            ..Self::default()
        }
    }

    pub fn with_ip(mut self, ip: Ipv4Addr) -> Self {
        self.ip = Some(ip);
        self
    }

    pub fn start_calls(&self) -> Vec<NetifParams> {
        self.starts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl UsbNetif for RecordingNetif {
    fn is_up(&self) -> bool {
        self.up.load(Ordering::SeqCst)
    }

    async fn start(&self, params: &NetifParams) -> Result<(), NetifError> {
        self.starts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(params.clone());

        if self.fail_start {
            return Err(NetifError::CommandFailed {
                command: "start".to_string(),
                stderr: "simulated failure".to_string(),
            });
        }
        self.up.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn current_ip(&self) -> Result<Ipv4Addr, NetifError> {
        self.ip
            .ok_or_else(|| NetifError::NoAddress("recording0".to_string()))
    }
}
