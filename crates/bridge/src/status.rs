//! Shared "any channel connected" flag.
//!
//! Written once per pump tick, last write wins. Readers on the other core
//! may see a value one tick old; the flag is advisory only.

use core::convert::Infallible;

use embedded_hal::digital::{OutputPin, PinState};
use portable_atomic::{AtomicBool, Ordering};

/// Advisory status flag shared between the cores.
pub struct StatusSignal {
    active: AtomicBool,
}

impl StatusSignal {
    /// Start inactive.
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
        }
    }

    /// Publish the result of a pump tick.
    pub fn set(&self, active: bool) {
        self.active.store(active, Ordering::Relaxed);
    }

    /// Last published value.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }
}

impl Default for StatusSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Switch an indicator pin. Indicator pins are plain GPIO outputs whose
/// error type is uninhabited, so there is nothing to handle.
pub(crate) fn drive<P: OutputPin<Error = Infallible>>(pin: &mut P, state: PinState) {
    match pin.set_state(state) {
        Ok(()) => {}
        Err(never) => match never {},
    }
}
