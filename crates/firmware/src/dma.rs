//! RP2040 DMA channels as paced transfer engines.
//!
//! Capture uses one channel reading the ADC FIFO register (fixed address)
//! into the frame buffer (incrementing), paced by DREQ_ADC. embassy-rp's
//! `dma::read` programs exactly that shape: byte width from the word type,
//! read increment off, write increment on, count from the destination
//! length. The returned `Transfer` future completes on the channel's
//! completion interrupt.

use embassy_rp::dma::{self, AnyChannel, Channel as _};
use embassy_rp::PeripheralRef;
use heapless::Vec;
use platform::{DataRegister, PacedTransfer, TransferConfig, TransferPool};

/// Number of DMA channels handed to the pool at boot.
pub const POOL_CHANNELS: usize = 4;

/// DMA channels that no driver has claimed yet.
pub struct DmaPool {
    free: Vec<AnyChannel, POOL_CHANNELS>,
}

impl DmaPool {
    /// Empty pool.
    pub const fn new() -> Self {
        Self { free: Vec::new() }
    }

    /// Hand `channel` to the pool. Returns `false` when the pool is full.
    pub fn give(&mut self, channel: impl dma::Channel) -> bool {
        self.free.push(channel.degrade()).is_ok()
    }

    /// Channels still unclaimed.
    pub fn free(&self) -> usize {
        self.free.len()
    }
}

impl Default for DmaPool {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferPool for DmaPool {
    type Engine = CaptureDma;

    fn claim_unused(&mut self) -> Option<CaptureDma> {
        let channel = self.free.pop()?;
        Some(CaptureDma {
            channel: PeripheralRef::new(channel),
        })
    }
}

/// One claimed DMA channel.
pub struct CaptureDma {
    channel: PeripheralRef<'static, AnyChannel>,
}

impl PacedTransfer for CaptureDma {
    type Transfer<'a> = dma::Transfer<'a, AnyChannel>;

    fn program<'a>(
        &'a mut self,
        config: &TransferConfig,
        source: DataRegister,
        dst: &'a mut [u8],
    ) -> Self::Transfer<'a> {
        // Width and increments are fixed by `dma::read` for a `u8` buffer;
        // only the count and pacing signal are taken from `config`.
        let count = config.count.min(dst.len());
        let dst = match dst.get_mut(..count) {
            Some(dst) => dst,
            None => &mut [],
        };

        // SAFETY: `source` is the ADC FIFO register, readable for the whole
        // program. `dst` is borrowed for 'a, the lifetime of the returned
        // transfer, so it cannot be touched until the transfer completes or
        // is dropped (dropping aborts the channel).
        unsafe {
            dma::read(
                self.channel.reborrow(),
                source.as_ptr(),
                dst as *mut [u8],
                config.pacing.0,
            )
        }
    }
}
