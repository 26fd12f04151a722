//! Boot sequence for the Pico sample bridge.
//!
//! Initialization order:
//!   1. `embassy_rp::init` (clocks, timer driver, GPIO banks)
//!   2. Status LED blinks so a flashed board is visibly alive
//!   3. ADC: analog pad, input mux, FIFO with DMA request, clock divider
//!   4. Settle delay before the first conversion is trusted
//!   5. Claim a free DMA channel (fatal if none is left)
//!   6. Start core 1: USB device, host sessions, I/O pump, peer links
//!   7. Core 0 enters the capture scheduling loop
//!
//! Any error in steps 3-5 is reported over defmt and core 0 parks; core 1
//! is never started, so the host sees no device.

use platform::config::{BOOT_BLINKS, BOOT_BLINK_MS};

/// Ordered list of boot steps, for documentation and tests.
pub const BOOT_SEQUENCE_STEPS: &[&str] = &[
    "1. HAL: embassy_rp::init brings up clocks and the 1 MHz timer",
    "2. LED: blink the status LED BOOT_BLINKS times",
    "3. ADC: analog pad, input mux, FIFO + DREQ, clock divider",
    "4. Settle: wait ADC_SETTLE_MS before trusting conversions",
    "5. DMA: claim an unused channel, fatal InitError if none",
    "6. Core 1: USB device, CDC sessions, I/O pump, peer links",
    "7. Core 0: capture scheduling loop",
];

/// ADC reference clock on the RP2040 (USB PLL).
pub const ADC_CLOCK_HZ: u32 = 48_000_000;

/// Fastest conversion: one sample every 96 ADC clocks.
pub const ADC_MIN_CYCLES: u32 = 96;

/// Sample rate produced by an integer clock divider.
///
/// The ADC starts a conversion every `1 + divider` clocks, but never faster
/// than every [`ADC_MIN_CYCLES`].
#[allow(clippy::arithmetic_side_effects)] // Safety: cycles >= ADC_MIN_CYCLES, never zero
pub fn sample_rate_hz(divider: u16) -> u32 {
    let cycles = u32::from(divider).saturating_add(1).max(ADC_MIN_CYCLES);
    ADC_CLOCK_HZ / cycles
}

/// Status LED levels for the boot blink, one entry per `BOOT_BLINK_MS`.
pub fn blink_pattern() -> impl Iterator<Item = bool> {
    (0..BOOT_BLINKS).flat_map(|_| [true, false])
}

/// Total time spent blinking at boot.
#[allow(clippy::arithmetic_side_effects)] // Safety: small build-time constants
pub const fn blink_duration_ms() -> u64 {
    BOOT_BLINKS as u64 * 2 * BOOT_BLINK_MS
}

#[cfg(feature = "hardware")]
pub mod hardware {
    //! Board-level boot steps. Only compiled for `--features hardware`.

    use embassy_rp::gpio::Output;
    use embassy_time::{Duration, Timer};

    /// Blink the status LED per [`super::blink_pattern`] and leave it off.
    pub async fn blink_status(led: &mut Output<'_>) {
        for on in super::blink_pattern() {
            if on {
                led.set_high();
            } else {
                led.set_low();
            }
            Timer::after(Duration::from_millis(platform::config::BOOT_BLINK_MS)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::config::CLOCK_DIV;

    #[test]
    fn test_default_divider_gives_about_200k() {
        let rate = sample_rate_hz(CLOCK_DIV);
        assert!((195_000..=205_000).contains(&rate), "rate {rate}");
    }

    #[test]
    fn test_small_divider_clamps_to_500k() {
        assert_eq!(sample_rate_hz(0), 500_000);
        assert_eq!(sample_rate_hz(95), 500_000);
    }

    #[test]
    fn test_blink_pattern_alternates() {
        let pattern: Vec<bool> = blink_pattern().collect();
        assert_eq!(pattern.len(), 20);
        assert!(pattern.chunks(2).all(|pair| pair == [true, false]));
        assert_eq!(blink_duration_ms(), 2000);
    }

    #[test]
    fn test_boot_steps_claim_dma_after_adc_settle() {
        let settle = BOOT_SEQUENCE_STEPS
            .iter()
            .position(|s| s.contains("Settle"))
            .unwrap();
        let dma = BOOT_SEQUENCE_STEPS
            .iter()
            .position(|s| s.contains("DMA"))
            .unwrap();
        let core1 = BOOT_SEQUENCE_STEPS
            .iter()
            .position(|s| s.contains("Core 1"))
            .unwrap();
        assert!(settle < dma, "DMA is claimed after the ADC settles");
        assert!(dma < core1, "core 1 only starts after init succeeded");
    }
}
