//! Host transport FIFOs, one pair per CDC channel.
//!
//! The USB tasks own the endpoints; the bridge loops only ever see a
//! [`HostChannel`], a cheap handle that implements [`platform::HostPort`]
//! on top of two byte pipes:
//!
//! ```text
//!  OUT endpoint ──▶ rx pipe ──▶ HostChannel::read      (I/O pump)
//!  IN  endpoint ◀── tx pipe ◀── HostChannel::write     (pump, capture, diag)
//!                       ▲
//!                       └── drained when HostChannel::flush signals
//! ```
//!
//! Bytes written without a flush stay queued in the tx pipe. Both pipes
//! keep their contents across a disconnect.
//!
//! [`HostLink::receive`] never parks the OUT task on a full rx pipe for
//! longer than the host session lasts: it re-reads the session between
//! attempts and drops what is left once the host has gone.

use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::pipe::Pipe;
use embassy_sync::signal::Signal;
use platform::config::{HOST_RX_FIFO, HOST_TX_FIFO, NUM_CHANNELS};
use platform::HostPort;
use portable_atomic::{AtomicBool, Ordering};

/// Per-channel host FIFOs and session flag.
pub struct HostLink {
    rx: Pipe<CriticalSectionRawMutex, HOST_RX_FIFO>,
    tx: Pipe<CriticalSectionRawMutex, HOST_TX_FIFO>,
    connected: AtomicBool,
    flush: Signal<CriticalSectionRawMutex, ()>,
}

/// Host FIFOs for every channel, shared by both cores.
pub static HOST_LINKS: [HostLink; NUM_CHANNELS] = [const { HostLink::new() }; NUM_CHANNELS];

/// Handles to every channel in [`HOST_LINKS`], in channel order.
pub fn host_channels() -> [HostChannel<'static>; NUM_CHANNELS] {
    HOST_LINKS.each_ref().map(HostChannel::new)
}

/// Handle to channel `index`, if it exists.
pub fn host_channel(index: usize) -> Option<HostChannel<'static>> {
    HOST_LINKS.get(index).map(HostChannel::new)
}

impl HostLink {
    /// Empty FIFOs, no session.
    pub const fn new() -> Self {
        Self {
            rx: Pipe::new(),
            tx: Pipe::new(),
            connected: AtomicBool::new(false),
            flush: Signal::new(),
        }
    }

    /// Record whether a host session is attached (terminal opened the port).
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Relaxed);
    }

    /// Whether a host session is attached.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// Queue bytes received on the OUT endpoint and return how many were
    /// kept.
    ///
    /// While the rx pipe is full this yields and retries, asking `session`
    /// before each retry whether the host is still attached and publishing
    /// the answer. When it reports the session closed, the bytes not yet
    /// queued are dropped.
    pub async fn receive(&self, data: &[u8], mut session: impl FnMut() -> bool) -> usize {
        let mut queued = write_until_full(&self.rx, data);
        while let Some(rest) = data.get(queued..).filter(|rest| !rest.is_empty()) {
            let attached = session();
            self.set_connected(attached);
            if !attached {
                break;
            }
            yield_now().await;
            queued = queued.saturating_add(write_until_full(&self.rx, rest));
        }
        queued
    }

    /// Wait until a writer asks for the tx pipe to be pushed out.
    pub async fn wait_flush(&self) {
        self.flush.wait().await;
    }

    /// Take up to `buf.len()` queued bytes for the IN endpoint.
    pub fn take_outgoing(&self, buf: &mut [u8]) -> usize {
        if buf.is_empty() {
            return 0;
        }
        self.tx.try_read(buf).unwrap_or(0)
    }

    /// Bytes waiting for the IN endpoint.
    pub fn outgoing_len(&self) -> usize {
        self.tx.len()
    }
}

impl Default for HostLink {
    fn default() -> Self {
        Self::new()
    }
}

/// One channel's host side as seen by the bridge loops.
#[derive(Clone, Copy)]
pub struct HostChannel<'a> {
    link: &'a HostLink,
}

impl<'a> HostChannel<'a> {
    /// Handle onto `link`.
    pub const fn new(link: &'a HostLink) -> Self {
        Self { link }
    }
}

/// Move as much of `data` into `pipe` as it has room for.
///
/// The pipe is a ring; a single `try_write` stops at the wrap point, so
/// keep going until it refuses.
fn write_until_full<const N: usize>(pipe: &Pipe<CriticalSectionRawMutex, N>, data: &[u8]) -> usize {
    let mut written = 0;
    while let Some(rest) = data.get(written..).filter(|rest| !rest.is_empty()) {
        match pipe.try_write(rest) {
            Ok(n) if n > 0 => written = written.saturating_add(n),
            _ => break,
        }
    }
    written
}

fn read_until_empty<const N: usize>(pipe: &Pipe<CriticalSectionRawMutex, N>, buf: &mut [u8]) -> usize {
    let mut read = 0;
    while let Some(rest) = buf.get_mut(read..).filter(|rest| !rest.is_empty()) {
        match pipe.try_read(rest) {
            Ok(n) if n > 0 => read = read.saturating_add(n),
            _ => break,
        }
    }
    read
}

impl HostPort for HostChannel<'_> {
    fn is_connected(&self) -> bool {
        self.link.is_connected()
    }

    fn available(&self) -> usize {
        self.link.rx.len()
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        read_until_empty(&self.link.rx, buf)
    }

    fn write(&mut self, data: &[u8]) -> usize {
        if !self.link.is_connected() {
            return 0;
        }
        write_until_full(&self.link.tx, data)
    }

    fn free_capacity(&self) -> usize {
        if !self.link.is_connected() {
            return 0;
        }
        self.link.tx.free_capacity()
    }

    fn flush(&mut self) {
        self.link.flush.signal(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_requires_session() {
        let link = HostLink::new();
        let mut channel = HostChannel::new(&link);

        assert_eq!(channel.write(b"lost"), 0);
        assert_eq!(link.outgoing_len(), 0);

        link.set_connected(true);
        assert_eq!(channel.write(b"kept"), 4);
        assert_eq!(link.outgoing_len(), 4);
    }

    #[test]
    fn test_unflushed_bytes_stay_queued() {
        let link = HostLink::new();
        link.set_connected(true);
        let mut channel = HostChannel::new(&link);

        channel.write(b"abc");
        assert!(!link.flush.signaled());
        channel.flush();
        assert!(link.flush.signaled());

        let mut packet = [0u8; 64];
        assert_eq!(link.take_outgoing(&mut packet), 3);
        assert_eq!(&packet[..3], b"abc");
    }

    #[test]
    fn test_full_frame_fits_across_ring_wrap() {
        let link = HostLink::new();
        link.set_connected(true);
        let mut channel = HostChannel::new(&link);
        let mut sink = [0u8; HOST_TX_FIFO];

        // advance the ring so the next frame straddles the end
        channel.write(&[0u8; 700]);
        link.take_outgoing(&mut sink);

        let frame = [7u8; 500];
        assert_eq!(channel.write(&frame), 500);
        assert_eq!(link.outgoing_len(), 500);
    }

    #[test]
    fn test_write_is_cut_at_capacity() {
        let link = HostLink::new();
        link.set_connected(true);
        let mut channel = HostChannel::new(&link);

        assert_eq!(channel.write(&[1u8; HOST_TX_FIFO + 10]), HOST_TX_FIFO);
        assert_eq!(channel.write(b"x"), 0);
    }

    #[tokio::test]
    async fn test_received_bytes_are_readable() {
        let link = HostLink::new();
        let mut channel = HostChannel::new(&link);

        assert_eq!(link.receive(b"hello", || true).await, 5);
        assert_eq!(channel.available(), 5);

        let mut buf = [0u8; 3];
        assert_eq!(channel.read(&mut buf), 3);
        assert_eq!(&buf, b"hel");
        assert_eq!(channel.available(), 2);
    }

    #[tokio::test]
    async fn test_receive_drops_the_rest_once_the_host_closes() {
        let link = HostLink::new();
        link.set_connected(true);
        let data = [9u8; HOST_RX_FIFO + 40];

        let mut polls = 0;
        let kept = link
            .receive(&data, || {
                polls += 1;
                polls < 3
            })
            .await;

        assert_eq!(kept, HOST_RX_FIFO);
        assert_eq!(polls, 3);
        assert!(!link.is_connected());
    }

    #[tokio::test]
    async fn test_receive_waits_for_room_while_attached() {
        let link = HostLink::new();
        let mut channel = HostChannel::new(&link);
        let data = [3u8; HOST_RX_FIFO + 64];
        let mut spill = [0u8; 64];

        // the reader frees room on the first retry
        let kept = link
            .receive(&data, || {
                if link.rx.len() == HOST_RX_FIFO {
                    read_until_empty(&link.rx, &mut spill);
                }
                true
            })
            .await;

        assert_eq!(kept, data.len());
        assert_eq!(channel.available(), HOST_RX_FIFO);
        assert!(link.is_connected());
    }

    #[test]
    fn test_free_capacity_tracks_the_tx_pipe() {
        let link = HostLink::new();
        let mut channel = HostChannel::new(&link);
        assert_eq!(channel.free_capacity(), 0);

        link.set_connected(true);
        assert_eq!(channel.free_capacity(), HOST_TX_FIFO);
        channel.write(&[0u8; 300]);
        assert_eq!(channel.free_capacity(), HOST_TX_FIFO - 300);

        link.set_connected(false);
        assert_eq!(channel.free_capacity(), 0);
    }

    #[test]
    fn test_disconnect_keeps_fifos() {
        let link = HostLink::new();
        link.set_connected(true);
        let mut channel = HostChannel::new(&link);
        channel.write(b"pending");

        link.set_connected(false);
        assert!(!channel.is_connected());
        assert_eq!(link.outgoing_len(), 7);
    }

    #[test]
    fn test_static_table_has_every_channel() {
        let channels = host_channels();
        assert_eq!(channels.len(), NUM_CHANNELS);
        assert!(host_channel(NUM_CHANNELS - 1).is_some());
        assert!(host_channel(NUM_CHANNELS).is_none());
    }
}
