//! Concurrent access to one channel buffer from two threads.
//!
//! Each attempt either moves a whole chunk or is a zero-count no-op, and
//! the consumer sees every accepted chunk intact and in producer order.

#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::cast_possible_truncation)]

use std::thread;

use bridge::ChannelStore;
use platform::PeerPort;

const CHUNK: usize = 4;
const CHUNKS_PER_PRODUCER: usize = 400;

struct Collector(Vec<u8>);

impl PeerPort for Collector {
    fn read(&mut self, _buf: &mut [u8]) -> usize {
        0
    }

    fn write(&mut self, data: &[u8]) -> usize {
        self.0.extend_from_slice(data);
        data.len()
    }
}

fn chunk(producer: u8, seq: usize) -> [u8; CHUNK] {
    let seq = seq as u16;
    [producer, (seq >> 8) as u8, seq as u8, !producer]
}

#[test]
fn held_lock_turns_second_caller_into_no_op() {
    let store = ChannelStore::<1, 16>::new();

    let winner = store.try_lock_inbound(0);
    assert!(winner.is_some());
    assert!(store.try_lock_inbound(0).is_none());
    assert_eq!(store.try_append_inbound(0, b"late"), 0);
    drop(winner);

    assert_eq!(store.try_append_inbound(0, b"late"), 4);
    assert_eq!(store.stats().snapshot().contended, 2);
}

#[test]
fn concurrent_producers_and_consumer_never_corrupt_the_buffer() {
    // Capacity is a multiple of CHUNK, so an accepted append is always whole.
    let store = ChannelStore::<1, 64>::new();
    let expected_len = 2 * CHUNKS_PER_PRODUCER * CHUNK;

    let received = thread::scope(|scope| {
        for producer in [1u8, 2u8] {
            let store = &store;
            scope.spawn(move || {
                let mut seq = 0;
                while seq < CHUNKS_PER_PRODUCER {
                    match store.try_append_inbound(0, &chunk(producer, seq)) {
                        0 => thread::yield_now(),
                        CHUNK => seq += 1,
                        other => panic!("partial append of {other} bytes"),
                    }
                }
            });
        }

        let consumer = scope.spawn(|| {
            let mut sink = Collector(Vec::new());
            while sink.0.len() < expected_len {
                if store.try_drain_inbound(0, &mut sink) == 0 {
                    thread::yield_now();
                }
            }
            sink.0
        });

        consumer.join().unwrap()
    });

    assert_eq!(received.len(), expected_len);

    let mut next = [0usize; 3];
    for record in received.chunks_exact(CHUNK) {
        let producer = record[0];
        assert!(producer == 1 || producer == 2, "foreign byte {producer}");
        assert_eq!(record[3], !producer, "chunk torn: {record:?}");
        let seq = usize::from(record[1]) << 8 | usize::from(record[2]);
        assert_eq!(seq, next[usize::from(producer)], "chunk out of order");
        next[usize::from(producer)] += 1;
    }
    assert_eq!(next[1], CHUNKS_PER_PRODUCER);
    assert_eq!(next[2], CHUNKS_PER_PRODUCER);
}
