//! Host-Facing I/O Pump
//!
//! Each tick visits every channel once, in index order. For a channel with
//! a host session attached it runs, in this order:
//!
//! 1. read step: host receive queue → inbound buffer (bounded by free space)
//! 2. write step: outbound buffer → host transmit queue, flushed if non-empty
//!
//! A buffer whose lock is held by the other core is skipped this tick.
//! After the last channel the shared status flag and the status indicator
//! are set to whether any channel was connected.
//!
//! Buffers are left as they are when a session goes away, so bytes queued
//! before a disconnect are delivered after the next connect.

use core::convert::Infallible;

use embassy_futures::yield_now;
use embedded_hal::digital::{OutputPin, PinState};
use platform::HostPort;

use crate::status::{drive, StatusSignal};
use crate::store::ChannelStore;

/// Host session state of one channel, as last seen by the pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Session {
    /// No host attached
    Disconnected,
    /// Host attached
    Connected,
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// Channels with a host session this tick
    pub connected: usize,
    /// Bytes moved from host queues into inbound buffers
    pub received: usize,
    /// Bytes moved from outbound buffers into host queues
    pub sent: usize,
}

/// Drains and fills the channel store against the host transport.
pub struct IoPump<'a, P, L, const N: usize, const CAP: usize> {
    store: &'a ChannelStore<N, CAP>,
    ports: [P; N],
    sessions: [Session; N],
    status: &'a StatusSignal,
    indicator: L,
}

impl<'a, P, L, const N: usize, const CAP: usize> IoPump<'a, P, L, N, CAP>
where
    P: HostPort,
    L: OutputPin<Error = Infallible>,
{
    /// One host port per channel, in channel order.
    pub fn new(
        store: &'a ChannelStore<N, CAP>,
        ports: [P; N],
        status: &'a StatusSignal,
        indicator: L,
    ) -> Self {
        Self {
            store,
            ports,
            sessions: [Session::Disconnected; N],
            status,
            indicator,
        }
    }

    /// Service every channel once.
    #[allow(clippy::arithmetic_side_effects)] // Safety: connected <= N; byte totals bounded by N * CAP
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();

        for (index, (port, session)) in self
            .ports
            .iter_mut()
            .zip(self.sessions.iter_mut())
            .enumerate()
        {
            let now = if port.is_connected() {
                Session::Connected
            } else {
                Session::Disconnected
            };
            if now != *session {
                match now {
                    Session::Connected => info!("channel {} connected", index),
                    Session::Disconnected => info!("channel {} disconnected", index),
                }
                *session = now;
            }
            if now == Session::Disconnected {
                continue;
            }

            report.connected += 1;
            report.received += self.store.try_fill_inbound(index, port);
            report.sent += self.store.try_drain_outbound(index, port);
        }

        let active = report.connected > 0;
        self.status.set(active);
        drive(&mut self.indicator, PinState::from(active));

        report
    }

    /// Tick forever, yielding to the executor between ticks.
    pub async fn run(&mut self) -> ! {
        loop {
            self.tick();
            yield_now().await;
        }
    }

    /// Session state of `index` as of the last tick.
    pub fn session(&self, index: usize) -> Option<Session> {
        self.sessions.get(index).copied()
    }

    /// Host port of `index`.
    pub fn port(&self, index: usize) -> Option<&P> {
        self.ports.get(index)
    }

    /// Mutable host port of `index`.
    pub fn port_mut(&mut self, index: usize) -> Option<&mut P> {
        self.ports.get_mut(index)
    }

    /// The status indicator.
    pub fn indicator(&self) -> &L {
        &self.indicator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::mocks::{MockHostPort, MockPin};

    type TestPump<'a> = IoPump<'a, MockHostPort, MockPin, 4, 32>;

    fn ports() -> [MockHostPort; 4] {
        core::array::from_fn(|_| MockHostPort::new())
    }

    #[test]
    fn test_idle_tick_reports_inactive() {
        let store = ChannelStore::new();
        let status = StatusSignal::new();
        let mut pump: TestPump<'_> = IoPump::new(&store, ports(), &status, MockPin::new());

        assert_eq!(pump.tick(), TickReport::default());
        assert!(!status.is_active());
        assert!(!pump.indicator().is_high());
    }

    #[test]
    fn test_disconnected_channel_is_not_touched() {
        let store = ChannelStore::new();
        let status = StatusSignal::new();
        let mut pump: TestPump<'_> = IoPump::new(&store, ports(), &status, MockPin::new());
        store.try_append_outbound(2, b"queued");

        pump.tick();
        let port = pump.port(2).unwrap();
        assert_eq!(port.write_calls(), 0);
        assert_eq!(port.polls(), 0);
    }

    #[test]
    fn test_read_then_write_on_connected_channel() {
        let store = ChannelStore::new();
        let status = StatusSignal::new();
        let mut pump: TestPump<'_> = IoPump::new(&store, ports(), &status, MockPin::new());
        {
            let port = pump.port_mut(3).unwrap();
            port.set_connected(true);
            port.push_from_host(b"to device");
        }
        store.try_append_outbound(3, b"to host");

        let report = pump.tick();
        assert_eq!(
            report,
            TickReport {
                connected: 1,
                received: 9,
                sent: 7
            }
        );
        assert_eq!(pump.port(3).unwrap().written(), b"to host");
        assert_eq!(pump.session(3), Some(Session::Connected));
        assert!(status.is_active());
        assert!(pump.indicator().is_high());

        let inbound = store.try_lock_inbound(3).unwrap();
        assert_eq!(inbound.as_slice(), b"to device");
    }

    #[test]
    fn test_status_is_last_write_wins() {
        let store = ChannelStore::new();
        let status = StatusSignal::new();
        let mut pump: TestPump<'_> = IoPump::new(&store, ports(), &status, MockPin::new());

        pump.port_mut(0).unwrap().set_connected(true);
        pump.tick();
        assert!(status.is_active());

        pump.port_mut(0).unwrap().set_connected(false);
        pump.tick();
        assert!(!status.is_active());
        assert_eq!(pump.indicator().falls(), 1);
        assert_eq!(pump.session(0), Some(Session::Disconnected));
    }

    #[test]
    fn test_disconnect_keeps_buffered_bytes() {
        let store = ChannelStore::new();
        let status = StatusSignal::new();
        let mut pump: TestPump<'_> = IoPump::new(&store, ports(), &status, MockPin::new());

        store.try_append_outbound(2, b"kept");
        pump.tick();
        assert_eq!(store.try_lock_outbound(2).unwrap().len(), 4);

        pump.port_mut(2).unwrap().set_connected(true);
        pump.tick();
        assert_eq!(pump.port(2).unwrap().written(), b"kept");
    }

    #[test]
    fn test_contended_channel_is_skipped_and_retried() {
        let store = ChannelStore::new();
        let status = StatusSignal::new();
        let mut pump: TestPump<'_> = IoPump::new(&store, ports(), &status, MockPin::new());
        pump.port_mut(1).unwrap().set_connected(true);
        store.try_append_outbound(1, b"log line");

        let guard = store.try_lock_outbound(1).unwrap();
        assert_eq!(pump.tick().sent, 0);
        drop(guard);

        assert_eq!(pump.tick().sent, 8);
        assert_eq!(pump.port(1).unwrap().written(), b"log line");
    }
}
