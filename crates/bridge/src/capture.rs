//! Sample Capture Engine
//!
//! Drives one paced transfer per call: the converter's own data-request
//! line clocks each byte into the frame, so sample timing depends only on
//! the converter's clock divider and not on what either core is doing.
//!
//! Sequence for one capture:
//!
//! ```text
//! drain queue ─▶ stop conversions ─▶ program engine ─▶ busy high
//!   ─▶ start conversions ─▶ await completion ─▶ busy low ─▶ stop conversions
//! ```
//!
//! The await is the only wait in the capture path and it always ends once
//! `frame_len` paced events have occurred. There is no timeout and no
//! cancellation.

use core::convert::Infallible;

use embedded_hal::digital::{OutputPin, PinState};
use platform::{PacedTransfer, PacingPeripheral, TransferConfig, TransferPool};

use crate::config::CaptureConfig;
use crate::error::InitError;
use crate::status::drive;

/// Owns the transfer engine channel, the converter, and the busy indicator.
pub struct SampleCapture<E, A, B> {
    engine: E,
    adc: A,
    busy: B,
    transfer: TransferConfig,
}

impl<E, A, B> SampleCapture<E, A, B>
where
    E: PacedTransfer,
    A: PacingPeripheral,
    B: OutputPin<Error = Infallible>,
{
    /// Claim a transfer engine channel from `pool` and bind it to `adc`.
    ///
    /// Fails with [`InitError::NoFreeTransferChannel`] when the pool is
    /// empty, so the caller can stop before any loop starts.
    pub fn claim<T>(
        pool: &mut T,
        adc: A,
        busy: B,
        config: &CaptureConfig,
    ) -> Result<Self, InitError>
    where
        T: TransferPool<Engine = E>,
    {
        let engine = pool.claim_unused().ok_or(InitError::NoFreeTransferChannel)?;
        let transfer = TransferConfig::peripheral_to_memory(config.frame_len, adc.pacing_signal());
        debug!("transfer engine claimed, {} bytes per frame", config.frame_len);
        Ok(Self::new(engine, adc, busy, transfer))
    }

    /// Build from an already claimed engine.
    pub fn new(engine: E, mut adc: A, mut busy: B, transfer: TransferConfig) -> Self {
        adc.stop();
        drive(&mut busy, PinState::Low);
        Self {
            engine,
            adc,
            busy,
            transfer,
        }
    }

    /// Run one capture cycle into `frame` and return the bytes captured.
    ///
    /// Captures `min(frame.len(), frame_len)` bytes; the frame is never
    /// left partially filled once this returns.
    pub async fn capture(&mut self, frame: &mut [u8]) -> usize {
        let count = self.transfer.count.min(frame.len());
        let transfer = TransferConfig {
            count,
            ..self.transfer
        };
        let Some(dst) = frame.get_mut(..count) else {
            return 0;
        };

        self.adc.drain();
        self.adc.stop();

        let source = self.adc.data_register();
        let done = self.engine.program(&transfer, source, dst);

        drive(&mut self.busy, PinState::High);
        self.adc.start();
        done.await;
        drive(&mut self.busy, PinState::Low);

        self.adc.stop();
        count
    }

    /// Transfer programming used for every cycle.
    pub fn transfer_config(&self) -> &TransferConfig {
        &self.transfer
    }

    /// The transfer engine channel.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The converter.
    pub fn adc(&self) -> &A {
        &self.adc
    }

    /// The busy indicator.
    pub fn busy(&self) -> &B {
        &self.busy
    }
}
