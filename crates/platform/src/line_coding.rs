//! Serial line coding
//!
//! Data rate and framing requested by the host for a virtual channel, or
//! reported by the peer behind it. The bridge stores these values; applying
//! them to a physical line is left to whoever owns the line.

/// Line coding for one side of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineCoding {
    /// Data rate in bits per second
    pub data_rate: u32,
    /// Data bits per character (5, 6, 7, 8 or 16)
    pub data_bits: u8,
    /// Parity
    pub parity: Parity,
    /// Stop bits
    pub stop_bits: StopBits,
}

impl LineCoding {
    /// 115200 baud, 8 data bits, no parity, 1 stop bit.
    pub const DEFAULT: Self = Self {
        data_rate: 115_200,
        data_bits: 8,
        parity: Parity::None,
        stop_bits: StopBits::One,
    };
}

impl Default for LineCoding {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Parity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    /// No parity
    None,
    /// Odd parity
    Odd,
    /// Even parity
    Even,
    /// Parity bit always 1
    Mark,
    /// Parity bit always 0
    Space,
}

/// Stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    /// 1 stop bit
    One,
    /// 1.5 stop bits
    OnePointFive,
    /// 2 stop bits
    Two,
}
