//! Bridge counters.
//!
//! Plain relaxed atomics: written from either core, read from anywhere
//! without taking a lock. Values wrap on overflow.

use portable_atomic::{AtomicU32, Ordering};

/// Shared counters for the channel store and the capture loop.
pub struct Stats {
    captures: AtomicU32,
    dropped_bytes: AtomicU32,
    contended: AtomicU32,
}

/// Point-in-time copy of [`Stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatsSnapshot {
    /// Completed capture cycles
    pub captures: u32,
    /// Bytes discarded by truncating appends or short frame writes
    pub dropped_bytes: u32,
    /// Buffer operations skipped because the lock was held elsewhere
    pub contended: u32,
}

impl Stats {
    /// All counters at zero.
    pub const fn new() -> Self {
        Self {
            captures: AtomicU32::new(0),
            dropped_bytes: AtomicU32::new(0),
            contended: AtomicU32::new(0),
        }
    }

    /// Count one completed capture cycle.
    pub fn record_capture(&self) {
        self.captures.fetch_add(1, Ordering::Relaxed);
    }

    /// Count bytes that were dropped instead of queued.
    #[allow(clippy::cast_possible_truncation)] // counters wrap
    pub fn record_dropped(&self, bytes: usize) {
        if bytes > 0 {
            self.dropped_bytes.fetch_add(bytes as u32, Ordering::Relaxed);
        }
    }

    /// Count one try-lock miss.
    pub fn record_contended(&self) {
        self.contended.fetch_add(1, Ordering::Relaxed);
    }

    /// Read every counter.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            captures: self.captures.load(Ordering::Relaxed),
            dropped_bytes: self.dropped_bytes.load(Ordering::Relaxed),
            contended: self.contended.load(Ordering::Relaxed),
        }
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}
