//! Cortex-M0+ exception handlers.
//!
//! The M0+ folds every fault (bus error, invalid instruction, unaligned
//! access, stack overrun into the peripheral region) into HardFault. The
//! handler logs the stacked PC and LR over defmt/RTT and resets the chip,
//! so the host sees the device drop and re-enumerate instead of a silent
//! hang with four dead serial ports.

/// HardFault handler.
///
/// # Safety
///
/// Must never return; returning from HardFault is undefined behavior.
#[cortex_m_rt::exception]
#[allow(unsafe_code)]
unsafe fn HardFault(ef: &cortex_m_rt::ExceptionFrame) -> ! {
    defmt::error!("HardFault: pc=0x{:08X} lr=0x{:08X}", ef.pc(), ef.lr());
    cortex_m::peripheral::SCB::sys_reset()
}
