//! RP2040 ADC as a pacing peripheral.
//!
//! The converter free-runs (`START_MANY`) at the rate set by its clock
//! divider and pushes each result into its 4-deep FIFO. With `DREQ_EN` and a
//! threshold of 1, every result raises DREQ_ADC, which paces the capture
//! DMA channel one byte at a time. `SHIFT` right-aligns results to 8 bits so
//! a byte-wide DMA read of the FIFO register yields one sample.
//!
//! embassy-rp's `Adc` driver powers and resets the block; the FIFO and
//! free-running mode are not exposed by it, so those are set directly on
//! the PAC registers.

use bridge::{CaptureConfig, InitError};
use embassy_rp::adc::{self, Adc, Blocking, Channel};
use embassy_rp::gpio::Pull;
use embassy_rp::pac;
use embassy_rp::peripherals::{ADC, PIN_26};
use platform::{DataRegister, PacingPeripheral, PacingSignal};

/// DREQ number of the ADC FIFO (RP2040 datasheet, DMA DREQ table).
pub const DREQ_ADC: u8 = 36;

/// The ADC configured for paced capture.
pub struct CaptureAdc {
    // Held so the block stays powered and the pad stays analog.
    _adc: Adc<'static, Blocking>,
    _input: Channel<'static>,
}

impl CaptureAdc {
    /// Power the ADC, route `pin` to it and configure FIFO, DREQ and
    /// divider from `config`.
    pub fn new(adc: ADC, pin: PIN_26, config: &CaptureConfig) -> Result<Self, InitError> {
        if config.input != 0 {
            // GPIO26 is input 0; other inputs need a different pin.
            return Err(InitError::InvalidCaptureInput(config.input));
        }
        let driver = Adc::new_blocking(adc, adc::Config::default());
        let input = Channel::new_pin(pin, Pull::None);

        let regs = pac::ADC;
        regs.cs().modify(|w| {
            w.set_ainsel(config.input);
            w.set_ts_en(false);
            w.set_start_many(false);
        });
        regs.fcs().write(|w| {
            w.set_en(true);
            w.set_dreq_en(true);
            w.set_thresh(1);
            w.set_err(false);
            w.set_shift(true);
        });
        regs.div().write(|w| {
            w.set_int(config.clock_divider);
            w.set_frac(0);
        });

        defmt::info!(
            "ADC input {} divider {} (~{} S/s)",
            config.input,
            config.clock_divider,
            crate::boot::sample_rate_hz(config.clock_divider)
        );

        Ok(Self {
            _adc: driver,
            _input: input,
        })
    }
}

impl PacingPeripheral for CaptureAdc {
    fn drain(&mut self) {
        let regs = pac::ADC;
        while !regs.fcs().read().empty() {
            let _ = regs.fifo().read();
        }
        // clear sticky over/underflow flags
        regs.fcs().modify(|w| {
            w.set_over(true);
            w.set_under(true);
        });
    }

    fn stop(&mut self) {
        pac::ADC.cs().modify(|w| w.set_start_many(false));
    }

    fn start(&mut self) {
        pac::ADC.cs().modify(|w| w.set_start_many(true));
    }

    fn pacing_signal(&self) -> PacingSignal {
        PacingSignal(DREQ_ADC)
    }

    fn data_register(&self) -> DataRegister {
        // SAFETY: the FIFO register is memory-mapped for the whole program;
        // a byte read returns the low 8 bits of the shifted result.
        unsafe { DataRegister::new(pac::ADC.fifo().as_ptr().cast::<u8>().cast_const()) }
    }
}
