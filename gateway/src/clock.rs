//! Device uptime clock.
//!
//! The device exposes a 32-bit millisecond tick counter that wraps at 2^32
//! (about 49.7 days). Elapsed time is always computed with modular
//! subtraction so a wrap between two readings still yields the true delta.

use std::sync::Arc;
use std::time::Instant;

/// Source of raw millisecond ticks.
pub trait TickSource: Send + Sync {
    /// Current tick value. Monotonic modulo 2^32.
    fn now_ms(&self) -> u32;
}

/// Ticks derived from the process monotonic clock.
#[derive(Debug, Clone)]
pub struct SystemTicks {
    origin: Instant,
}

impl SystemTicks {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemTicks {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for SystemTicks {
    fn now_ms(&self) -> u32 {
        // Truncation is the wrap.
        self.origin.elapsed().as_millis() as u32
    }
}

/// Millisecond clock with the tick captured when the service started.
#[derive(Clone)]
pub struct DeviceClock {
    ticks: Arc<dyn TickSource>,
    start_tick: u32,
}

impl DeviceClock {
    /// Capture the start tick from `ticks`. Call once, at process start.
    pub fn start(ticks: Arc<dyn TickSource>) -> Self {
        let start_tick = ticks.now_ms();
        Self { ticks, start_tick }
    }

    pub fn start_tick(&self) -> u32 {
        self.start_tick
    }

    pub fn now(&self) -> u32 {
        self.ticks.now_ms()
    }

    /// Ticks elapsed from `earlier` to `later`, modulo 2^32.
    pub const fn diff(later: u32, earlier: u32) -> u32 {
        later.wrapping_sub(earlier)
    }

    pub fn uptime_ms(&self) -> u32 {
        Self::diff(self.now(), self.start_tick)
    }
}

impl std::fmt::Debug for DeviceClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceClock")
            .field("start_tick", &self.start_tick)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::ManualTicks;

    #[test]
    fn test_diff_without_wrap() {
        assert_eq!(DeviceClock::diff(1_500, 1_000), 500);
        assert_eq!(DeviceClock::diff(42, 42), 0);
    }

    #[test]
    fn test_diff_across_wraparound() {
        // Start just before u32::MAX, now just after the counter wrapped.
        let start = u32::MAX - 10;
        let now = 20;
        assert_eq!(DeviceClock::diff(now, start), 31);
    }

    #[test]
    fn test_uptime_is_zero_right_after_start() {
        let ticks = Arc::new(ManualTicks::new(7_000));
        let clock = DeviceClock::start(ticks);
        assert_eq!(clock.start_tick(), 7_000);
        assert_eq!(clock.uptime_ms(), 0);
    }

    #[test]
    fn test_uptime_survives_counter_wrap() {
        let ticks = Arc::new(ManualTicks::new(u32::MAX - 99));
        let clock = DeviceClock::start(ticks.clone());

        ticks.advance(250);
        assert_eq!(clock.now(), 150);
        assert_eq!(clock.uptime_ms(), 250);
    }

    #[test]
    fn test_system_ticks_do_not_go_backwards() {
        let ticks = SystemTicks::new();
        let a = ticks.now_ms();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let b = ticks.now_ms();
        assert!(b >= a + 5, "{} then {}", a, b);
    }
}
