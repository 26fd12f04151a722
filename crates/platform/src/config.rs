//! Application configuration and constants
//!
//! Central build-time values shared by the bridge core and the firmware.
//! Channel roles, buffer sizes and the capture cadence should reference these
//! constants rather than hardcoding values.

/// The application name
pub const APP_NAME: &str = "Pico Sample Bridge";

/// Application version (synchronized with Cargo.toml)
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Boot banner written to the defmt log and the diagnostic channel.
pub const fn boot_banner() -> &'static str {
    "Pico Sample Bridge - dual-core USB bridge with ADC capture"
}

// ── Channels ────────────────────────────────────────────────────────────────

/// Number of virtual serial channels exposed to the host.
pub const NUM_CHANNELS: usize = 4;

/// Channel that carries raw sample frames (output only).
pub const SAMPLE_CHANNEL: usize = 0;

/// Channel reserved for the best-effort text log.
pub const DIAG_CHANNEL: usize = 1;

/// Capacity of each inbound and outbound channel buffer in bytes.
pub const BUFFER_SIZE: usize = 2560;

// ── Capture ─────────────────────────────────────────────────────────────────

/// Bytes per sample frame on [`SAMPLE_CHANNEL`]. One byte per sample.
pub const N_SAMPLES: usize = 500;

/// ADC clock divider. The converter runs from a 48 MHz clock and takes
/// `1 + CLOCK_DIV` cycles per sample when the divider exceeds 96.
///
/// | Divider | Sample rate |
/// |---------|-------------|
/// | 96      | 500 kS/s    |
/// | 240     | 200 kS/s    |
/// | 480     | 100 kS/s    |
/// | 960     | 50 kS/s     |
/// | 9600    | 5 kS/s      |
pub const CLOCK_DIV: u16 = 240;

/// ADC input multiplexer selection. Input 0 is GPIO26.
pub const CAPTURE_INPUT: u8 = 0;

/// Number of external ADC inputs (GPIO26..=GPIO29). Input 4 is the
/// temperature sensor and is never used for capture.
pub const ADC_EXTERNAL_INPUTS: u8 = 4;

/// Delay between converter setup and claiming the transfer engine.
pub const ADC_SETTLE_MS: u64 = 1000;

// ── Host transport ──────────────────────────────────────────────────────────

/// Host-to-device FIFO per channel (bytes received but not yet pumped).
pub const HOST_RX_FIFO: usize = 256;

/// Device-to-host FIFO per channel. Holds two full sample frames.
pub const HOST_TX_FIFO: usize = 1024;

/// Full-speed bulk endpoint packet size.
pub const USB_PACKET_SIZE: u16 = 64;

/// USB vendor ID (Raspberry Pi).
pub const USB_VID: u16 = 0x2E8A;

/// USB product ID.
pub const USB_PID: u16 = 0x000A;

// ── Diagnostics ─────────────────────────────────────────────────────────────

/// Longest single line the diagnostic log formats; longer lines are cut.
pub const DIAG_LINE_CAPACITY: usize = 512;

// ── Board ───────────────────────────────────────────────────────────────────

/// Number of status LED blinks at power-up.
pub const BOOT_BLINKS: u32 = 10;

/// Half period of a boot blink.
pub const BOOT_BLINK_MS: u64 = 100;

/// Pin map for the Raspberry Pi Pico.
///
/// | Signal        | GPIO | Notes                              |
/// |---------------|------|------------------------------------|
/// | Status LED    | 25   | On-board LED, "any channel open"   |
/// | Busy LED      | 15   | High while a capture is in flight  |
/// | Analog input  | 26   | ADC input 0                        |
pub mod pins {
    /// On-board LED driven by the I/O pump.
    pub const STATUS_LED: u8 = 25;
    /// External LED driven by the capture engine.
    pub const BUSY_LED: u8 = 15;
    /// Analog capture input.
    pub const ANALOG_IN: u8 = 26;
}
