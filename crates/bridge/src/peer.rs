//! Peer side of the generic bridge channels.
//!
//! A [`PeerLink`] moves bytes between one channel's buffers and a
//! [`PeerPort`] using the store's non-blocking peer-direction operations.
//! [`LoopbackPeer`] is an in-memory peer that echoes whatever it receives,
//! standing in for a physical line. [`SinkPeer`] sits behind the
//! output-only channels and throws host bytes away, so a host typing into
//! the sample or diagnostic port cannot fill their inbound buffers and
//! stall the USB receive path.

use platform::PeerPort;

use crate::fifo::Fifo;
use crate::store::ChannelStore;

/// Bytes moved by one [`PeerLink::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeerTick {
    /// Inbound bytes handed to the peer
    pub to_peer: usize,
    /// Peer bytes queued outbound
    pub from_peer: usize,
}

/// Shuttles bytes between one store channel and its peer.
pub struct PeerLink<'a, Q, const N: usize, const CAP: usize> {
    store: &'a ChannelStore<N, CAP>,
    index: usize,
    peer: Q,
}

impl<'a, Q: PeerPort, const N: usize, const CAP: usize> PeerLink<'a, Q, N, CAP> {
    /// Link channel `index` of `store` to `peer`.
    pub fn new(store: &'a ChannelStore<N, CAP>, index: usize, peer: Q) -> Self {
        Self { store, index, peer }
    }

    /// Channel this link serves.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Drain inbound into the peer, then pull the peer's output outbound.
    pub fn tick(&mut self) -> PeerTick {
        let to_peer = self.store.try_drain_inbound(self.index, &mut self.peer);
        let from_peer = self.store.try_fill_outbound(self.index, &mut self.peer);
        PeerTick { to_peer, from_peer }
    }

    /// The peer.
    pub fn peer(&self) -> &Q {
        &self.peer
    }
}

/// Echoes every byte written to it, up to `N` bytes in flight.
pub struct LoopbackPeer<const N: usize> {
    pending: Fifo<N>,
}

impl<const N: usize> LoopbackPeer<N> {
    /// Empty loopback.
    pub const fn new() -> Self {
        Self { pending: Fifo::new() }
    }

    /// Bytes written but not read back yet.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl<const N: usize> Default for LoopbackPeer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PeerPort for LoopbackPeer<N> {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        self.pending.drain_with(|data| {
            let count = data.len().min(buf.len());
            match (buf.get_mut(..count), data.get(..count)) {
                (Some(dst), Some(src)) => {
                    dst.copy_from_slice(src);
                    count
                }
                _ => 0,
            }
        })
    }

    fn write(&mut self, data: &[u8]) -> usize {
        self.pending.push(data)
    }
}

/// Accepts and discards every byte; never produces any.
#[derive(Debug, Default)]
pub struct SinkPeer {
    discarded: usize,
}

impl SinkPeer {
    /// Sink that has discarded nothing yet.
    pub const fn new() -> Self {
        Self { discarded: 0 }
    }

    /// Bytes thrown away so far.
    pub fn discarded(&self) -> usize {
        self.discarded
    }
}

impl PeerPort for SinkPeer {
    fn read(&mut self, _buf: &mut [u8]) -> usize {
        0
    }

    fn write(&mut self, data: &[u8]) -> usize {
        self.discarded = self.discarded.saturating_add(data.len());
        data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::mocks::MockHostPort;

    #[test]
    fn test_loopback_echoes_in_order() {
        let mut peer = LoopbackPeer::<4>::new();
        assert_eq!(peer.write(b"abcdef"), 4);
        let mut buf = [0u8; 3];
        assert_eq!(peer.read(&mut buf), 3);
        assert_eq!(&buf, b"abc");
        assert_eq!(peer.pending(), 1);
    }

    #[test]
    fn test_link_round_trips_host_bytes() {
        let store = ChannelStore::<4, 16>::new();
        let mut host = MockHostPort::connected();
        let mut link = PeerLink::new(&store, 2, LoopbackPeer::<16>::new());

        host.push_from_host(b"ping");
        store.try_fill_inbound(2, &mut host);

        let moved = link.tick();
        assert_eq!(moved, PeerTick { to_peer: 4, from_peer: 4 });

        store.try_drain_outbound(2, &mut host);
        assert_eq!(host.written(), b"ping");
    }

    #[test]
    fn test_link_skips_when_inbound_is_held() {
        let store = ChannelStore::<4, 16>::new();
        store.try_append_inbound(3, b"data");
        let mut link = PeerLink::new(&store, 3, LoopbackPeer::<16>::new());

        let guard = store.try_lock_inbound(3).unwrap();
        assert_eq!(link.tick().to_peer, 0);
        drop(guard);

        assert_eq!(link.tick().to_peer, 4);
        assert_eq!(link.index(), 3);
    }

    #[test]
    fn test_sink_empties_inbound_and_sends_nothing() {
        let store = ChannelStore::<4, 16>::new();
        let mut host = MockHostPort::connected();
        let mut link = PeerLink::new(&store, 0, SinkPeer::new());

        for _ in 0..3 {
            host.push_from_host(b"0123456789");
            store.try_fill_inbound(0, &mut host);
            assert_eq!(link.tick(), PeerTick { to_peer: 10, from_peer: 0 });
        }

        assert_eq!(link.peer().discarded(), 30);
        assert_eq!(store.try_drain_outbound(0, &mut host), 0);
        assert!(store.try_lock_inbound(0).unwrap().is_empty());
    }
}
