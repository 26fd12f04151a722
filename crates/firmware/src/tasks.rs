//! State shared by both cores and the bridge tasks that run on core 1.

use bridge::{BridgeStore, ChannelRoles, LoopbackPeer, PeerLink, SinkPeer, StatusSignal};
use heapless::Vec;
use platform::config::{BUFFER_SIZE, NUM_CHANNELS};

/// Channel buffers, shared by the I/O pump and the peer links.
pub static STORE: BridgeStore = BridgeStore::new();

/// "Any channel open", set by the I/O pump.
pub static STATUS: StatusSignal = StatusSignal::new();

/// Bytes a loopback peer holds before it pushes back.
pub const LOOPBACK_CAPACITY: usize = 256;

/// Peer link for one generic bridge channel.
pub type BridgeLink = PeerLink<'static, LoopbackPeer<LOOPBACK_CAPACITY>, NUM_CHANNELS, BUFFER_SIZE>;

/// Peer link that discards host bytes on an output-only channel.
pub type SinkLink = PeerLink<'static, SinkPeer, NUM_CHANNELS, BUFFER_SIZE>;

/// One sink link per output-only channel of `roles`.
pub fn sink_links(store: &'static BridgeStore, roles: ChannelRoles) -> [SinkLink; 2] {
    roles
        .output_channels()
        .map(|index| PeerLink::new(store, index, SinkPeer::new()))
}

/// One loopback link per bridge channel of `roles`.
pub fn loopback_links(store: &'static BridgeStore, roles: ChannelRoles) -> Vec<BridgeLink, NUM_CHANNELS> {
    let mut links = Vec::new();
    for index in roles.bridge_channels() {
        if links.push(PeerLink::new(store, index, LoopbackPeer::new())).is_err() {
            break;
        }
    }
    links
}

#[cfg(feature = "hardware")]
mod hardware {
    use bridge::{ChannelRoles, IoPump};
    use embassy_futures::yield_now;
    use embassy_rp::gpio::Output;

    use super::{loopback_links, sink_links, STATUS, STORE};
    use crate::host_link::host_channels;

    /// Host-facing I/O pump over every channel. Drives the status LED.
    #[embassy_executor::task]
    pub async fn pump_task(status_led: Output<'static>) -> ! {
        let mut pump = IoPump::new(&STORE, host_channels(), &STATUS, status_led);
        pump.run().await
    }

    /// Loopback peers behind the generic bridge channels, sinks behind the
    /// output-only ones.
    #[embassy_executor::task]
    pub async fn peer_task(roles: ChannelRoles) -> ! {
        let mut links = loopback_links(&STORE, roles);
        let mut sinks = sink_links(&STORE, roles);
        defmt::info!("{} loopback bridge channels", links.len());
        loop {
            for link in links.iter_mut() {
                link.tick();
            }
            for sink in sinks.iter_mut() {
                sink.tick();
            }
            yield_now().await;
        }
    }
}

#[cfg(feature = "hardware")]
pub use hardware::{peer_task, pump_task};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_roles_link_two_channels() {
        let links = loopback_links(&STORE, ChannelRoles::DEFAULT);
        let served: std::vec::Vec<usize> = links.iter().map(BridgeLink::index).collect();
        assert_eq!(served, [2, 3]);
    }

    #[test]
    fn test_loopback_echoes_through_the_store() {
        static LOCAL: BridgeStore = BridgeStore::new();
        let mut links = loopback_links(&LOCAL, ChannelRoles::DEFAULT);
        let link = links.first_mut().unwrap();

        assert_eq!(LOCAL.try_append_inbound(link.index(), b"ping"), 4);
        let tick = link.tick();
        assert_eq!(tick.to_peer, 4);
        assert_eq!(tick.from_peer, 4);

        let guard = LOCAL.try_lock_outbound(link.index()).unwrap();
        assert_eq!(guard.as_slice(), b"ping");
    }

    #[test]
    fn test_sinks_cover_the_output_channels() {
        static LOCAL: BridgeStore = BridgeStore::new();
        let mut sinks = sink_links(&LOCAL, ChannelRoles::DEFAULT);
        assert_eq!(sinks.each_ref().map(SinkLink::index), [0, 1]);

        assert_eq!(LOCAL.try_append_inbound(0, b"typed at the sample port"), 24);
        let [sample, _] = &mut sinks;
        assert_eq!(sample.tick().to_peer, 24);
        assert_eq!(sample.peer().discarded(), 24);
        assert!(LOCAL.try_lock_inbound(0).unwrap().is_empty());
    }
}
