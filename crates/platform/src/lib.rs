//! Hardware abstraction layer for the Pico sample bridge
//!
//! Trait-based seams between the bridge core and the RP2040 peripherals, so
//! the core can be exercised on a host without physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (firmware crate: USB device, ADC, DMA, executors)
//!         ↓
//! Bridge Core (bridge crate: channel store, I/O pump, capture loop)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Hardware Layer (Embassy HAL + PAC)
//! ```
//!
//! # Abstractions
//!
//! - [`HostPort`] - one virtual serial channel towards the host
//! - [`PeerPort`] - the far side of a bridge channel
//! - [`PacedTransfer`] - a transfer engine channel paced by a peripheral
//! - [`PacingPeripheral`] - a converter that raises data requests
//! - [`TransferPool`] - claimable transfer engine channels
//!
//! # Features
//!
//! - `std`: Enable the [`mocks`] module outside of this crate's own tests
//! - `hardware`: Physical hardware marker
//! - `defmt`: Enable defmt logging derives
//!
//! # Example
//!
//! ```no_run
//! use platform::HostPort;
//!
//! fn echo<P: HostPort>(port: &mut P) {
//!     let mut buf = [0u8; 64];
//!     let n = port.read(&mut buf);
//!     port.write(&buf[..n]);
//!     port.flush();
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
// Pedantic lints suppressed for this hardware HAL crate:
#![allow(clippy::doc_markdown)] // hex addresses and register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors, callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod dma;
pub mod host;
pub mod line_coding;
pub mod mocks;

// Re-export host-side traits
pub use host::{HostPort, PeerPort};
pub use line_coding::{LineCoding, Parity, StopBits};

// Re-export transfer types
pub use dma::{
    DataRegister, PacedTransfer, PacingPeripheral, PacingSignal, TransferConfig, TransferPool,
    TransferWidth,
};
