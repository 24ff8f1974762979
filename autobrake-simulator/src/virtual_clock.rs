//! # Virtual Clock for Simulation
//!
//! A deterministic clock used in simulation and replay. Time only moves
//! forward, and only when told to.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared nanosecond counter. Clones observe the same time.
#[derive(Clone, Debug, Default)]
pub struct VirtualClock {
    now: Arc<AtomicU64>,
}

impl VirtualClock {
    /// Creates a clock starting at `start_ns`.
    pub fn new(start_ns: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ns)),
        }
    }

    #[inline]
    pub fn now_ns(&self) -> u64 {
        self.now.load(Ordering::Acquire)
    }

    /// Advances the clock by `ns` nanoseconds and returns the new time.
    #[inline]
    pub fn advance(&self, ns: u64) -> u64 {
        self.now.fetch_add(ns, Ordering::AcqRel) + ns
    }

    /// Moves the clock to `timestamp_ns` unless it is already past it.
    /// Returns the resulting time.
    #[inline]
    pub fn advance_to(&self, timestamp_ns: u64) -> u64 {
        self.now
            .fetch_max(timestamp_ns, Ordering::AcqRel)
            .max(timestamp_ns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_given_time() {
        assert_eq!(VirtualClock::new(100).now_ns(), 100);
        assert_eq!(VirtualClock::default().now_ns(), 0);
    }

    #[test]
    fn advance_accumulates() {
        let clock = VirtualClock::new(0);
        assert_eq!(clock.advance(500), 500);
        assert_eq!(clock.advance(250), 750);
        assert_eq!(clock.now_ns(), 750);
    }

    #[test]
    fn advance_to_never_goes_backwards() {
        let clock = VirtualClock::new(1_000);
        assert_eq!(clock.advance_to(400), 1_000);
        assert_eq!(clock.advance_to(2_000), 2_000);
        assert_eq!(clock.now_ns(), 2_000);
    }

    #[test]
    fn clones_share_time() {
        let clock = VirtualClock::new(0);
        let other = clock.clone();
        clock.advance(10);
        assert_eq!(other.now_ns(), 10);
    }
}
