//! Build-time configuration and transfer descriptor properties.

#![allow(clippy::arithmetic_side_effects)]

use platform::config::{
    ADC_EXTERNAL_INPUTS, BUFFER_SIZE, CAPTURE_INPUT, CLOCK_DIV, DIAG_CHANNEL,
    DIAG_LINE_CAPACITY, HOST_RX_FIFO, HOST_TX_FIFO, NUM_CHANNELS,
    N_SAMPLES, SAMPLE_CHANNEL, USB_PACKET_SIZE,
};
use platform::{PacingSignal, TransferConfig, TransferWidth};

#[test]
fn channel_roles_fit_the_table() {
    assert!(SAMPLE_CHANNEL < NUM_CHANNELS);
    assert!(DIAG_CHANNEL < NUM_CHANNELS);
    assert_ne!(SAMPLE_CHANNEL, DIAG_CHANNEL);
    assert!(NUM_CHANNELS > 2, "at least one bridge channel");
}

#[test]
fn queues_hold_what_the_loops_push() {
    assert!(HOST_TX_FIFO >= 2 * N_SAMPLES, "two frames in flight");
    assert!(HOST_TX_FIFO >= DIAG_LINE_CAPACITY);
    assert!(BUFFER_SIZE >= HOST_RX_FIFO);
    assert_eq!(HOST_RX_FIFO % usize::from(USB_PACKET_SIZE), 0);
}

#[test]
fn capture_defaults_are_in_range() {
    assert!(CAPTURE_INPUT < ADC_EXTERNAL_INPUTS);
    assert!(CLOCK_DIV > 0);
    assert!(N_SAMPLES > 0);
}

proptest::proptest! {
    /// Peripheral-to-memory descriptors always read a fixed register into
    /// an advancing buffer, one byte per request.
    #[test]
    fn peripheral_to_memory_shape(count in 0usize..=4096, dreq in 0u8..64) {
        let config = TransferConfig::peripheral_to_memory(count, PacingSignal(dreq));
        proptest::prop_assert_eq!(config.count, count);
        proptest::prop_assert_eq!(config.width, TransferWidth::Byte);
        proptest::prop_assert!(!config.read_increment);
        proptest::prop_assert!(config.write_increment);
        proptest::prop_assert_eq!(config.pacing, PacingSignal(dreq));
    }
}
