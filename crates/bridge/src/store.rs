//! Channel Buffer Store
//!
//! One fixed table of channel records shared by both cores, addressed by
//! channel index. Every record owns two byte FIFOs:
//!
//! ```text
//!            host ──▶ inbound  ──▶ peer
//!            host ◀── outbound ◀── peer
//! ```
//!
//! Each FIFO sits behind its own mutex that is only ever *tried*. A caller
//! that loses the race gets `0` back immediately and retries on its next
//! tick; no call in this module waits. An index past the table is treated
//! the same way as a lost race.
//!
//! Line coding values are stored for each side and never applied here.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::mutex::{Mutex, MutexGuard};
use platform::{HostPort, LineCoding, PeerPort};

use crate::fifo::Fifo;
use crate::stats::Stats;

/// Guard over one channel FIFO, held while it is being mutated.
pub type FifoGuard<'a, const CAP: usize> = MutexGuard<'a, CriticalSectionRawMutex, Fifo<CAP>>;

/// State for one virtual serial channel.
pub struct ChannelRecord<const CAP: usize> {
    host_line_coding: BlockingMutex<CriticalSectionRawMutex, Cell<LineCoding>>,
    peer_line_coding: BlockingMutex<CriticalSectionRawMutex, Cell<LineCoding>>,
    /// peer → host
    outbound: Mutex<CriticalSectionRawMutex, Fifo<CAP>>,
    /// host → peer
    inbound: Mutex<CriticalSectionRawMutex, Fifo<CAP>>,
}

impl<const CAP: usize> ChannelRecord<CAP> {
    /// Empty buffers, default line coding on both sides.
    pub const fn new() -> Self {
        Self {
            host_line_coding: BlockingMutex::new(Cell::new(LineCoding::DEFAULT)),
            peer_line_coding: BlockingMutex::new(Cell::new(LineCoding::DEFAULT)),
            outbound: Mutex::new(Fifo::new()),
            inbound: Mutex::new(Fifo::new()),
        }
    }
}

impl<const CAP: usize> Default for ChannelRecord<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

/// Table of `N` channel records with `CAP`-byte buffers.
///
/// Built once, typically as a `static`, and never torn down.
pub struct ChannelStore<const N: usize, const CAP: usize> {
    channels: [ChannelRecord<CAP>; N],
    stats: Stats,
}

impl<const N: usize, const CAP: usize> ChannelStore<N, CAP> {
    /// Create the table with every buffer empty.
    pub const fn new() -> Self {
        Self {
            channels: [const { ChannelRecord::new() }; N],
            stats: Stats::new(),
        }
    }

    /// Number of channels.
    pub const fn channel_count(&self) -> usize {
        N
    }

    /// Capacity of each buffer in bytes.
    pub const fn buffer_capacity(&self) -> usize {
        CAP
    }

    /// Shared counters.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    // ── Host direction ──────────────────────────────────────────────────

    /// Append host bytes to the inbound buffer of `index`.
    ///
    /// Returns `0` without side effects when the buffer is locked elsewhere.
    /// Otherwise appends as much as fits; the remainder is dropped.
    pub fn try_append_inbound(&self, index: usize, bytes: &[u8]) -> usize {
        let Some(mut fifo) = self.try_lock_inbound(index) else {
            return 0;
        };
        let appended = fifo.push(bytes);
        self.stats.record_dropped(bytes.len().saturating_sub(appended));
        appended
    }

    /// Read step of the I/O pump: move bytes the host has sent on `port`
    /// into the inbound buffer of `index`, bounded by its free space.
    ///
    /// Bytes that do not fit stay in the port's receive queue.
    pub fn try_fill_inbound<P: HostPort + ?Sized>(&self, index: usize, port: &mut P) -> usize {
        let pending = port.available();
        if pending == 0 {
            return 0;
        }
        let Some(mut fifo) = self.try_lock_inbound(index) else {
            return 0;
        };
        fifo.fill_with(|tail| {
            let take = pending.min(tail.len());
            tail.get_mut(..take).map_or(0, |dst| port.read(dst))
        })
    }

    /// Write step of the I/O pump: hand the outbound buffer of `index` to
    /// `port` in one write and keep whatever it did not accept.
    ///
    /// The port is flushed only when at least one byte was written.
    pub fn try_drain_outbound<P: HostPort + ?Sized>(&self, index: usize, port: &mut P) -> usize {
        let Some(mut fifo) = self.try_lock_outbound(index) else {
            return 0;
        };
        if fifo.is_empty() {
            return 0;
        }
        let written = fifo.drain_with(|data| port.write(data));
        if written > 0 {
            port.flush();
        }
        written
    }

    // ── Peer direction ──────────────────────────────────────────────────

    /// Append peer bytes to the outbound buffer of `index`. Same policy as
    /// [`try_append_inbound`](Self::try_append_inbound).
    pub fn try_append_outbound(&self, index: usize, bytes: &[u8]) -> usize {
        let Some(mut fifo) = self.try_lock_outbound(index) else {
            return 0;
        };
        let appended = fifo.push(bytes);
        self.stats.record_dropped(bytes.len().saturating_sub(appended));
        appended
    }

    /// Pull whatever `peer` has produced into the outbound buffer of
    /// `index`, bounded by its free space.
    pub fn try_fill_outbound<Q: PeerPort + ?Sized>(&self, index: usize, peer: &mut Q) -> usize {
        let Some(mut fifo) = self.try_lock_outbound(index) else {
            return 0;
        };
        fifo.fill_with(|tail| peer.read(tail))
    }

    /// Hand the inbound buffer of `index` to `peer` and keep the rest.
    pub fn try_drain_inbound<Q: PeerPort + ?Sized>(&self, index: usize, peer: &mut Q) -> usize {
        let Some(mut fifo) = self.try_lock_inbound(index) else {
            return 0;
        };
        if fifo.is_empty() {
            return 0;
        }
        fifo.drain_with(|data| peer.write(data))
    }

    // ── Locks ───────────────────────────────────────────────────────────

    /// Try to take the inbound buffer lock of `index`.
    ///
    /// A miss on an existing channel counts as contention.
    pub fn try_lock_inbound(&self, index: usize) -> Option<FifoGuard<'_, CAP>> {
        let record = self.channels.get(index)?;
        match record.inbound.try_lock() {
            Ok(guard) => Some(guard),
            Err(_) => {
                self.stats.record_contended();
                trace!("inbound {} busy", index);
                None
            }
        }
    }

    /// Try to take the outbound buffer lock of `index`.
    pub fn try_lock_outbound(&self, index: usize) -> Option<FifoGuard<'_, CAP>> {
        let record = self.channels.get(index)?;
        match record.outbound.try_lock() {
            Ok(guard) => Some(guard),
            Err(_) => {
                self.stats.record_contended();
                trace!("outbound {} busy", index);
                None
            }
        }
    }

    // ── Line coding ─────────────────────────────────────────────────────

    /// Line coding last requested by the host on `index`.
    pub fn host_line_coding(&self, index: usize) -> Option<LineCoding> {
        self.channels
            .get(index)
            .map(|record| record.host_line_coding.lock(Cell::get))
    }

    /// Store the host's requested line coding. Returns `false` for an
    /// unknown channel.
    pub fn set_host_line_coding(&self, index: usize, coding: LineCoding) -> bool {
        self.channels.get(index).is_some_and(|record| {
            record.host_line_coding.lock(|cell| cell.set(coding));
            true
        })
    }

    /// Line coding last reported by the peer on `index`.
    pub fn peer_line_coding(&self, index: usize) -> Option<LineCoding> {
        self.channels
            .get(index)
            .map(|record| record.peer_line_coding.lock(Cell::get))
    }

    /// Store the peer's line coding. Returns `false` for an unknown channel.
    pub fn set_peer_line_coding(&self, index: usize, coding: LineCoding) -> bool {
        self.channels.get(index).is_some_and(|record| {
            record.peer_line_coding.lock(|cell| cell.set(coding));
            true
        })
    }
}

impl<const N: usize, const CAP: usize> Default for ChannelStore<N, CAP> {
    fn default() -> Self {
        Self::new()
    }
}
