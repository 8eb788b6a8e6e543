//! Emission policy for high-frequency signals.
//!
//! Only cursor motion is throttled. Every other notification is emitted once
//! per host event, in host order. Compound flags (maximize) are coalesced at
//! the source by emitting a single payload per notification, see
//! [`crate::normalize::Field::Maximized`].

use std::cell::Cell;

/// Emit every N-th event.
///
/// The counter lives as long as the bridge and is never reset; it starts at
/// zero when the bridge is created. The startup snapshot bypasses the
/// throttle entirely.
#[derive(Debug)]
pub struct FixedRatioThrottle {
    interval: u64,
    counter: Cell<u64>,
}

impl FixedRatioThrottle {
    /// Create a throttle passing one event in `interval`. Zero behaves as one.
    pub fn new(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
            counter: Cell::new(0),
        }
    }

    /// Count an event and report whether it should be emitted.
    pub fn admit(&self) -> bool {
        let count = self.counter.get().wrapping_add(1);
        self.counter.set(count);
        count % self.interval == 0
    }

    /// Events seen so far.
    pub fn count(&self) -> u64 {
        self.counter.get()
    }

    /// The effective interval.
    pub fn interval(&self) -> u64 {
        self.interval
    }
}
