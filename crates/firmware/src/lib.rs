//! Pico sample bridge firmware
//!
//! RP2040 glue around the `bridge` core: a composite USB device with one
//! CDC-ACM channel per bridge channel, the ADC and DMA capture engine, and
//! the dual-core boot sequence.
//!
//! # Architecture
//!
//! ```text
//!  core 1                                   core 0
//!  ──────                                   ──────
//!  USB device ─┬─ rx/tx tasks (per channel) capture loop
//!              │        ▲                     │  ADC ─DREQ─▶ DMA ─▶ frame
//!              ▼        │                     ▼
//!        host FIFOs (host_link) ◀──────── sample + diag channels
//!              ▲
//!          I/O pump ◀──▶ channel store ◀──▶ loopback peers
//! ```
//!
//! # Features
//!
//! - `hardware` - Build for the RP2040 target (embassy-rp, embassy-usb, defmt)
//! - `std` - Host builds and tests
//!
//! # Building
//!
//! ```bash
//! cargo build --release --target thumbv6m-none-eabi -p firmware --features hardware
//! ```

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Critical correctness: deny these
#![deny(clippy::await_holding_lock)] // holding a blocking Mutex across .await is a bug
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![warn(clippy::dbg_macro)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]

pub mod boot;
pub mod host_link;
pub mod tasks;

#[cfg(feature = "hardware")]
pub mod adc;
#[cfg(feature = "hardware")]
pub mod dma;
#[cfg(feature = "hardware")]
pub mod exception_handlers;
#[cfg(feature = "hardware")]
pub mod usb;

pub use host_link::{host_channel, host_channels, HostChannel, HostLink, HOST_LINKS};
pub use tasks::{STATUS, STORE};
