//! Validated runtime configuration.
//!
//! Both types are checked once during initialization. After `validate`
//! returns `Ok`, the loops index the channel table and program the
//! transfer engine without further checks.

use platform::config::{
    ADC_EXTERNAL_INPUTS, CAPTURE_INPUT, CLOCK_DIV, DIAG_CHANNEL, NUM_CHANNELS, N_SAMPLES,
    SAMPLE_CHANNEL,
};

use crate::error::InitError;

/// Which channel carries sample frames and which carries the text log.
///
/// Every other channel is a generic byte bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelRoles {
    /// Output-only channel for raw sample frames
    pub sample: usize,
    /// Best-effort diagnostic text channel
    pub diag: usize,
}

impl ChannelRoles {
    /// Build-time defaults.
    pub const DEFAULT: Self = Self {
        sample: SAMPLE_CHANNEL,
        diag: DIAG_CHANNEL,
    };

    /// Check both roles against a table of `count` channels.
    pub fn validate(self, count: usize) -> Result<Self, InitError> {
        for index in [self.sample, self.diag] {
            if index >= count {
                return Err(InitError::ChannelOutOfRange { index, count });
            }
        }
        if self.sample == self.diag {
            return Err(InitError::ChannelRoleConflict { index: self.sample });
        }
        Ok(self)
    }

    /// `true` when `index` is neither the sample nor the diagnostic channel.
    pub fn is_bridge(&self, index: usize) -> bool {
        index != self.sample && index != self.diag
    }

    /// The output-only channels: sample first, then diagnostic.
    pub fn output_channels(self) -> [usize; 2] {
        [self.sample, self.diag]
    }

    /// Generic bridge channels in a table of [`NUM_CHANNELS`].
    pub fn bridge_channels(self) -> impl Iterator<Item = usize> {
        (0..NUM_CHANNELS).filter(move |&index| self.is_bridge(index))
    }
}

impl Default for ChannelRoles {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Capture cycle parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CaptureConfig {
    /// Bytes per frame, one byte per sample
    pub frame_len: usize,
    /// Converter clock divider; sets the sample cadence
    pub clock_divider: u16,
    /// Converter input multiplexer selection
    pub input: u8,
}

impl CaptureConfig {
    /// Build-time defaults: 500 samples from input 0 at ~200 kS/s.
    pub const DEFAULT: Self = Self {
        frame_len: N_SAMPLES,
        clock_divider: CLOCK_DIV,
        input: CAPTURE_INPUT,
    };

    /// Check the parameters against a sample buffer of `max_frame` bytes.
    pub fn validate(self, max_frame: usize) -> Result<Self, InitError> {
        if self.frame_len == 0 || self.frame_len > max_frame {
            return Err(InitError::InvalidFrameLength(self.frame_len));
        }
        if self.clock_divider == 0 {
            return Err(InitError::InvalidClockDivider);
        }
        if self.input >= ADC_EXTERNAL_INPUTS {
            return Err(InitError::InvalidCaptureInput(self.input));
        }
        Ok(self)
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
