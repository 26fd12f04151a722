//! Internal logging macros
//!
//! Route to `defmt` on target builds and to `tracing` on host builds. With
//! neither feature active the arguments are still type-checked but nothing
//! is emitted. Format strings must stick to plain `{}` so both backends
//! accept them.

#![macro_use]
#![allow(unused_macros)]

macro_rules! trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::trace!($($arg)*);

        #[cfg(all(feature = "std", not(feature = "defmt")))]
        ::tracing::trace!($($arg)*);

        #[cfg(not(any(feature = "std", feature = "defmt")))]
        let _ = format_args!($($arg)*);
    }};
}

macro_rules! debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::debug!($($arg)*);

        #[cfg(all(feature = "std", not(feature = "defmt")))]
        ::tracing::debug!($($arg)*);

        #[cfg(not(any(feature = "std", feature = "defmt")))]
        let _ = format_args!($($arg)*);
    }};
}

macro_rules! info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::info!($($arg)*);

        #[cfg(all(feature = "std", not(feature = "defmt")))]
        ::tracing::info!($($arg)*);

        #[cfg(not(any(feature = "std", feature = "defmt")))]
        let _ = format_args!($($arg)*);
    }};
}

macro_rules! warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::warn!($($arg)*);

        #[cfg(all(feature = "std", not(feature = "defmt")))]
        ::tracing::warn!($($arg)*);

        #[cfg(not(any(feature = "std", feature = "defmt")))]
        let _ = format_args!($($arg)*);
    }};
}

macro_rules! error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::error!($($arg)*);

        #[cfg(all(feature = "std", not(feature = "defmt")))]
        ::tracing::error!($($arg)*);

        #[cfg(not(any(feature = "std", feature = "defmt")))]
        let _ = format_args!($($arg)*);
    }};
}
