//! Channel bridge core for the Pico sample bridge
//!
//! Everything the two cores share, and the two loops that share it:
//!
//! ```text
//!   core 0                                   core 1
//!   CaptureLoop                              IoPump (+ PeerLinks)
//!     │ SampleCapture ─▶ PacedTransfer         │
//!     │                                        │ try_fill_inbound / try_drain_outbound
//!     ▼                                        ▼
//!   sample channel port          ChannelStore (per-buffer try-locks)
//!   DiagLog ─▶ diag channel port             StatusSignal ◀── set per tick
//! ```
//!
//! No call in this crate blocks on a lock. The only wait is the capture
//! loop awaiting its paced transfer.
//!
//! # Features
//!
//! - `std`: log through `tracing`, enable platform mocks
//! - `defmt`: log through `defmt`, derive `defmt::Format`

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

// Must come first so the log macros are visible to every module below.
mod fmt;

pub mod capture;
pub mod config;
pub mod diag;
pub mod error;
pub mod fifo;
pub mod peer;
pub mod pump;
pub mod scheduler;
pub mod stats;
pub mod status;
pub mod store;

pub use capture::SampleCapture;
pub use config::{CaptureConfig, ChannelRoles};
pub use diag::DiagLog;
pub use error::InitError;
pub use fifo::Fifo;
pub use peer::{LoopbackPeer, PeerLink, PeerTick, SinkPeer};
pub use pump::{IoPump, Session, TickReport};
pub use scheduler::{CaptureLoop, CycleOutcome};
pub use stats::{Stats, StatsSnapshot};
pub use status::StatusSignal;
pub use store::{ChannelRecord, ChannelStore, FifoGuard};

/// Channel store sized by the build-time configuration.
pub type BridgeStore =
    ChannelStore<{ platform::config::NUM_CHANNELS }, { platform::config::BUFFER_SIZE }>;
