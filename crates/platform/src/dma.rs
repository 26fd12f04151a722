//! Peripheral-paced transfer abstraction
//!
//! A paced transfer moves a fixed number of words from a peripheral data
//! register into memory. The peripheral's data-request line throttles the
//! transfer, so the cadence is set by the peripheral clock and not by how
//! fast the core runs.
//!
//! ```text
//! PacingPeripheral (ADC)          PacedTransfer (DMA channel)
//!   data register ───────────────▶ read (fixed address)
//!   data-request  ───────────────▶ trigger
//!                                  write (incrementing) ──▶ sample buffer
//! ```

use core::future::Future;

/// Width of one transferred word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferWidth {
    /// 8-bit transfers
    Byte,
    /// 16-bit transfers
    HalfWord,
    /// 32-bit transfers
    Word,
}

/// Hardware data-request line that paces a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacingSignal(pub u8);

/// Transfer engine programming
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferConfig {
    /// Number of words to move
    pub count: usize,
    /// Word width
    pub width: TransferWidth,
    /// Advance the read address after each word
    pub read_increment: bool,
    /// Advance the write address after each word
    pub write_increment: bool,
    /// Data-request line that triggers each word
    pub pacing: PacingSignal,
}

impl TransferConfig {
    /// Byte-wide peripheral-to-memory transfer: fixed source register,
    /// incrementing destination, one byte per pacing event.
    #[must_use]
    pub const fn peripheral_to_memory(count: usize, pacing: PacingSignal) -> Self {
        Self {
            count,
            width: TransferWidth::Byte,
            read_increment: false,
            write_increment: true,
            pacing,
        }
    }
}

/// Address of a peripheral data register a transfer may read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataRegister(*const u8);

impl DataRegister {
    /// Wrap a register address.
    ///
    /// # Safety
    ///
    /// `addr` must stay readable for as long as any transfer programmed with
    /// it is running. For a memory-mapped register that is the whole program.
    #[must_use]
    pub const unsafe fn new(addr: *const u8) -> Self {
        Self(addr)
    }

    /// Raw register address
    #[must_use]
    pub const fn as_ptr(self) -> *const u8 {
        self.0
    }
}

// SAFETY: the wrapped value is an address of a memory-mapped register, not a
// reference to core-owned data; moving it between cores is sound.
unsafe impl Send for DataRegister {}

/// A transfer engine channel that can be programmed for a paced transfer.
pub trait PacedTransfer {
    /// Completion of one programmed transfer.
    type Transfer<'a>: Future<Output = ()> + 'a
    where
        Self: 'a;

    /// Program and arm a transfer of `config.count` words from `source`
    /// into `dst`.
    ///
    /// The engine is armed when this returns: the first pacing event after
    /// this call moves the first word. Awaiting the returned future blocks
    /// the caller until `config.count` paced events have occurred.
    fn program<'a>(
        &'a mut self,
        config: &TransferConfig,
        source: DataRegister,
        dst: &'a mut [u8],
    ) -> Self::Transfer<'a>;
}

/// A peripheral that produces data at its own cadence and raises a
/// data-request per word.
pub trait PacingPeripheral {
    /// Discard every pending sample in the peripheral's queue.
    fn drain(&mut self);

    /// Stop free-running conversions.
    fn stop(&mut self);

    /// Start free-running conversions.
    fn start(&mut self);

    /// Data-request line raised when a word is ready.
    fn pacing_signal(&self) -> PacingSignal;

    /// Register the ready words are read from.
    fn data_register(&self) -> DataRegister;
}

/// Pool of transfer engine channels claimed at initialization.
pub trait TransferPool {
    /// Engine channel type handed out by the pool
    type Engine: PacedTransfer;

    /// Take an unused channel, or `None` when every channel is taken.
    fn claim_unused(&mut self) -> Option<Self::Engine>;
}
