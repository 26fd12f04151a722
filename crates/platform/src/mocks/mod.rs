//! Mock implementations for testing
//!
//! This module provides mock implementations of all platform traits
//! for use in unit and integration tests.

#![cfg(any(test, feature = "std"))]
#![allow(clippy::arithmetic_side_effects)] // test doubles: counters never approach usize::MAX

use core::cell::Cell;
use core::convert::Infallible;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use crate::*;

/// Capacity of the mock host receive queue.
pub const MOCK_RX_CAPACITY: usize = 4096;

/// Capacity of the mock host transmit log.
pub const MOCK_TX_CAPACITY: usize = 16 * 1024;

/// Mock host-side channel
///
/// Bytes pushed with [`MockHostPort::push_from_host`] become readable;
/// bytes the device writes are appended to a transmit log.
pub struct MockHostPort {
    connected: bool,
    rx: heapless::Deque<u8, MOCK_RX_CAPACITY>,
    tx: heapless::Vec<u8, MOCK_TX_CAPACITY>,
    write_limit: Option<usize>,
    write_calls: usize,
    last_write_len: usize,
    flushes: usize,
    polls: Cell<usize>,
}

impl MockHostPort {
    /// Create a disconnected port
    pub fn new() -> Self {
        Self {
            connected: false,
            rx: heapless::Deque::new(),
            tx: heapless::Vec::new(),
            write_limit: None,
            write_calls: 0,
            last_write_len: 0,
            flushes: 0,
            polls: Cell::new(0),
        }
    }

    /// Create a port with a host session attached
    pub fn connected() -> Self {
        let mut port = Self::new();
        port.connected = true;
        port
    }

    /// Attach or detach the host session
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Queue bytes as if the host had sent them. Returns bytes queued.
    pub fn push_from_host(&mut self, data: &[u8]) -> usize {
        let mut queued = 0;
        for &byte in data {
            if self.rx.push_back(byte).is_err() {
                break;
            }
            queued += 1;
        }
        queued
    }

    /// Accept at most `limit` bytes per write call (`None` = unlimited)
    pub fn set_write_limit(&mut self, limit: Option<usize>) {
        self.write_limit = limit;
    }

    /// Everything the device has written so far
    pub fn written(&self) -> &[u8] {
        &self.tx
    }

    /// Forget the transmit log
    pub fn clear_written(&mut self) {
        self.tx.clear();
    }

    /// Number of `write` calls
    pub fn write_calls(&self) -> usize {
        self.write_calls
    }

    /// Length of the data passed to the most recent `write`
    pub fn last_write_len(&self) -> usize {
        self.last_write_len
    }

    /// Number of `flush` calls
    pub fn flushes(&self) -> usize {
        self.flushes
    }

    /// Number of `available` polls
    pub fn polls(&self) -> usize {
        self.polls.get()
    }
}

impl Default for MockHostPort {
    fn default() -> Self {
        Self::new()
    }
}

impl HostPort for MockHostPort {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn available(&self) -> usize {
        self.polls.set(self.polls.get() + 1);
        self.rx.len()
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        let mut count = 0;
        for slot in buf.iter_mut() {
            match self.rx.pop_front() {
                Some(byte) => {
                    *slot = byte;
                    count += 1;
                }
                None => break,
            }
        }
        count
    }

    fn write(&mut self, data: &[u8]) -> usize {
        self.write_calls += 1;
        self.last_write_len = data.len();
        if !self.connected {
            return 0;
        }
        let limit = self.write_limit.unwrap_or(usize::MAX).min(data.len());
        let mut accepted = 0;
        for &byte in data.iter().take(limit) {
            if self.tx.push(byte).is_err() {
                break;
            }
            accepted += 1;
        }
        accepted
    }

    fn free_capacity(&self) -> usize {
        if !self.connected {
            return 0;
        }
        let room = MOCK_TX_CAPACITY - self.tx.len();
        self.write_limit.map_or(room, |limit| limit.min(room))
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }
}

/// Mock indicator pin
pub struct MockPin {
    high: bool,
    rises: usize,
    falls: usize,
}

impl MockPin {
    /// Create a pin that starts low
    pub fn new() -> Self {
        Self {
            high: false,
            rises: 0,
            falls: 0,
        }
    }

    /// Current level
    pub fn is_high(&self) -> bool {
        self.high
    }

    /// Number of low→high transitions
    pub fn rises(&self) -> usize {
        self.rises
    }

    /// Number of high→low transitions
    pub fn falls(&self) -> usize {
        self.falls
    }
}

impl Default for MockPin {
    fn default() -> Self {
        Self::new()
    }
}

impl embedded_hal::digital::ErrorType for MockPin {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        if self.high {
            self.falls += 1;
        }
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        if !self.high {
            self.rises += 1;
        }
        self.high = true;
        Ok(())
    }
}

/// Stand-in for the converter's data register.
static MOCK_DATA_REGISTER: u8 = 0;

/// Mock pacing peripheral (converter)
pub struct MockPacing {
    running: bool,
    drains: usize,
    stops: usize,
    starts: usize,
}

impl MockPacing {
    /// Data-request line reported by the mock
    pub const PACING: PacingSignal = PacingSignal(36);

    /// Create an idle peripheral
    pub fn new() -> Self {
        Self {
            running: false,
            drains: 0,
            stops: 0,
            starts: 0,
        }
    }

    /// Whether conversions are running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of queue drains
    pub fn drains(&self) -> usize {
        self.drains
    }

    /// Number of stop requests
    pub fn stops(&self) -> usize {
        self.stops
    }

    /// Number of start requests
    pub fn starts(&self) -> usize {
        self.starts
    }
}

impl Default for MockPacing {
    fn default() -> Self {
        Self::new()
    }
}

impl PacingPeripheral for MockPacing {
    fn drain(&mut self) {
        self.drains += 1;
    }

    fn stop(&mut self) {
        self.stops += 1;
        self.running = false;
    }

    fn start(&mut self) {
        self.starts += 1;
        self.running = true;
    }

    fn pacing_signal(&self) -> PacingSignal {
        Self::PACING
    }

    fn data_register(&self) -> DataRegister {
        // SAFETY: a static byte is readable for the whole program.
        unsafe { DataRegister::new(&MOCK_DATA_REGISTER) }
    }
}

/// Mock transfer engine channel
///
/// Fills the destination with a running byte counter and completes after a
/// configurable number of polls, one per simulated pacing event.
pub struct MockTransfer {
    programs: usize,
    last_config: Option<TransferConfig>,
    next_sample: u8,
    pending_polls: usize,
}

impl MockTransfer {
    /// Create a channel whose transfers complete on first poll
    pub fn new() -> Self {
        Self {
            programs: 0,
            last_config: None,
            next_sample: 0,
            pending_polls: 0,
        }
    }

    /// Make each transfer stay pending for `polls` polls before completing
    pub fn with_pending_polls(mut self, polls: usize) -> Self {
        self.pending_polls = polls;
        self
    }

    /// Number of times the channel was programmed
    pub fn programs(&self) -> usize {
        self.programs
    }

    /// Configuration of the most recent transfer
    pub fn last_config(&self) -> Option<TransferConfig> {
        self.last_config
    }
}

impl Default for MockTransfer {
    fn default() -> Self {
        Self::new()
    }
}

/// Completion future returned by [`MockTransfer`]
pub struct MockCompletion {
    remaining: usize,
}

impl Future for MockCompletion {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.remaining == 0 {
            return Poll::Ready(());
        }
        self.remaining -= 1;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

impl PacedTransfer for MockTransfer {
    type Transfer<'a> = MockCompletion;

    fn program<'a>(
        &'a mut self,
        config: &TransferConfig,
        _source: DataRegister,
        dst: &'a mut [u8],
    ) -> Self::Transfer<'a> {
        self.programs += 1;
        self.last_config = Some(*config);
        for slot in dst.iter_mut().take(config.count) {
            *slot = self.next_sample;
            self.next_sample = self.next_sample.wrapping_add(1);
        }
        MockCompletion {
            remaining: self.pending_polls,
        }
    }
}

/// Mock pool of transfer engine channels
pub struct MockTransferPool {
    free: usize,
}

impl MockTransferPool {
    /// Create a pool with `free` unclaimed channels
    pub fn new(free: usize) -> Self {
        Self { free }
    }

    /// Channels still unclaimed
    pub fn free(&self) -> usize {
        self.free
    }
}

impl TransferPool for MockTransferPool {
    type Engine = MockTransfer;

    fn claim_unused(&mut self) -> Option<MockTransfer> {
        if self.free == 0 {
            return None;
        }
        self.free -= 1;
        Some(MockTransfer::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::OutputPin;

    #[test]
    fn test_mock_host_port() {
        let mut port = MockHostPort::connected();
        assert_eq!(port.push_from_host(b"hello"), 5);
        assert_eq!(port.available(), 5);

        let mut buf = [0u8; 3];
        assert_eq!(port.read(&mut buf), 3);
        assert_eq!(&buf, b"hel");
        assert_eq!(port.available(), 2);

        port.set_write_limit(Some(2));
        assert_eq!(port.write(b"abc"), 2);
        assert_eq!(port.written(), b"ab");
        assert_eq!(port.last_write_len(), 3);
    }

    #[test]
    fn test_mock_host_port_drops_writes_when_detached() {
        let mut port = MockHostPort::new();
        assert_eq!(port.write(b"abc"), 0);
        assert!(port.written().is_empty());
        assert_eq!(port.write_calls(), 1);
        assert_eq!(port.free_capacity(), 0);
    }

    #[test]
    fn test_mock_host_port_free_capacity_follows_limit_and_log() {
        let mut port = MockHostPort::connected();
        assert_eq!(port.free_capacity(), MOCK_TX_CAPACITY);

        port.write(&[0u8; 100]);
        assert_eq!(port.free_capacity(), MOCK_TX_CAPACITY - 100);

        port.set_write_limit(Some(7));
        assert_eq!(port.free_capacity(), 7);
    }

    #[test]
    fn test_mock_pin_counts_edges() {
        let mut pin = MockPin::new();
        pin.set_high().unwrap();
        pin.set_high().unwrap();
        pin.set_low().unwrap();
        assert_eq!(pin.rises(), 1);
        assert_eq!(pin.falls(), 1);
        assert!(!pin.is_high());
    }

    #[tokio::test]
    async fn test_mock_transfer_fills_and_completes() {
        let mut engine = MockTransfer::new().with_pending_polls(3);
        let pacing = MockPacing::new();
        let config = TransferConfig::peripheral_to_memory(4, pacing.pacing_signal());
        let mut buf = [0xFFu8; 6];

        engine.program(&config, pacing.data_register(), &mut buf).await;

        assert_eq!(buf, [0, 1, 2, 3, 0xFF, 0xFF]);
        assert_eq!(engine.programs(), 1);
        assert_eq!(engine.last_config(), Some(config));
    }

    #[test]
    fn test_mock_pool_runs_dry() {
        let mut pool = MockTransferPool::new(1);
        assert!(pool.claim_unused().is_some());
        assert!(pool.claim_unused().is_none());
        assert_eq!(pool.free(), 0);
    }
}
