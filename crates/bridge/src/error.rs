//! Initialization errors.
//!
//! Runtime faults in the bridge are handled by policy (truncate, skip,
//! retry next tick) and never surface. Only resource or configuration
//! problems found before the loops start are reported, through this type.

use core::fmt;

/// Fatal problem found while setting up the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    /// Every transfer engine channel is already claimed.
    NoFreeTransferChannel,
    /// A channel role points past the channel table.
    ChannelOutOfRange {
        /// Requested channel
        index: usize,
        /// Channels available
        count: usize,
    },
    /// Two roles were assigned to the same channel.
    ChannelRoleConflict {
        /// Channel claimed twice
        index: usize,
    },
    /// The converter input does not exist or is not an external pin.
    InvalidCaptureInput(u8),
    /// The frame length is zero or larger than the sample buffer.
    InvalidFrameLength(usize),
    /// The clock divider is zero.
    InvalidClockDivider,
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFreeTransferChannel => write!(f, "no free transfer engine channel"),
            Self::ChannelOutOfRange { index, count } => {
                write!(f, "channel {index} out of range (have {count})")
            }
            Self::ChannelRoleConflict { index } => {
                write!(f, "channel {index} assigned more than one role")
            }
            Self::InvalidCaptureInput(input) => write!(f, "invalid capture input {input}"),
            Self::InvalidFrameLength(len) => write!(f, "invalid frame length {len}"),
            Self::InvalidClockDivider => write!(f, "clock divider must be non-zero"),
        }
    }
}

#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "std")]
impl std::error::Error for InitError {}
