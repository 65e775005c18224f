//! Monotonic timekeeping for monotick.
//!
//! This crate builds the time facilities the timer service schedules
//! against:
//!
//! - **Monotonic clock**: [`TickClock`] rescales the platform performance
//!   counter into nanoseconds and milliseconds since clock creation using
//!   gcd-reduced integer ratios, so no floating point and no 64-bit overflow
//!   for realistic uptimes. [`ticks_ns`] / [`ticks_ms`] read a process-wide
//!   instance that starts at zero on first use.
//! - **Resolution controller**: [`ResolutionController`] watches the
//!   [`HINT_TIMER_RESOLUTION`] hint and installs or revokes the matching OS
//!   timer-resolution request.
//! - **Precise delay**: [`delay_precise`] paces a requested sleep through
//!   progressively cheaper-per-nanosecond phases so it lands close to the
//!   deadline without burning a core for the whole wait. [`delay`] and
//!   [`delay_ns`] forward straight to the platform sleep.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]

mod clock;
mod delay;
mod resolution;

pub mod prelude;

pub use clock::{TickClock, ticks_ms, ticks_ns};
pub use delay::{delay, delay_ns, delay_precise};
pub use resolution::{HINT_TIMER_RESOLUTION, ResolutionController};

/// Nanoseconds per second.
pub const NS_PER_SECOND: u64 = 1_000_000_000;

/// Nanoseconds per millisecond.
pub const NS_PER_MS: u64 = 1_000_000;

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1_000;

/// Convert milliseconds to nanoseconds, saturating on overflow.
#[inline]
#[must_use]
pub const fn ms_to_ns(ms: u64) -> u64 {
    ms.saturating_mul(NS_PER_MS)
}

/// Convert nanoseconds to whole milliseconds, rounding down.
#[inline]
#[must_use]
pub const fn ns_to_ms(ns: u64) -> u64 {
    ns / NS_PER_MS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_conversions() {
        assert_eq!(ms_to_ns(0), 0);
        assert_eq!(ms_to_ns(1), 1_000_000);
        assert_eq!(ms_to_ns(1_000), NS_PER_SECOND);
        assert_eq!(ns_to_ms(999_999), 0);
        assert_eq!(ns_to_ms(1_000_000), 1);
        assert_eq!(ns_to_ms(NS_PER_SECOND), MS_PER_SECOND);
    }

    #[test]
    fn test_ms_to_ns_saturates() {
        assert_eq!(ms_to_ns(u64::MAX), u64::MAX);
    }
}
