//! Performance-counter rescaling into nanoseconds and milliseconds.

use std::sync::OnceLock;

use monotick_platform::{perf_counter, perf_frequency};

use crate::{MS_PER_SECOND, NS_PER_SECOND};

/// Reduced rational scaler from counter ticks to a target unit.
///
/// Both sides of `unit_per_second / frequency` are divided by their gcd so
/// that `ticks * numer` stays far from 64-bit overflow: `numer` is at most
/// the unit rate (1e9 for nanoseconds) and usually collapses to a small
/// factor for real counter frequencies.
#[derive(Debug, Clone, Copy)]
struct TickScale {
    numer: u32,
    denom: u32,
}

impl TickScale {
    fn reduced(unit_per_second: u32, frequency: u32) -> Self {
        let divisor = gcd(unit_per_second, frequency);
        Self {
            numer: unit_per_second / divisor,
            denom: frequency / divisor,
        }
    }

    #[inline]
    fn rescale(self, ticks: u64) -> u64 {
        let scaled = ticks * u64::from(self.numer);
        debug_assert!(scaled >= ticks, "tick rescale overflowed 64 bits");
        scaled / u64::from(self.denom)
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Monotonic clock anchored at its creation instant.
///
/// Readings are nanoseconds (or milliseconds) since the clock was created,
/// derived from the platform performance counter by integer-rational
/// rescaling. The counter frequency must fit in 32 bits; in release builds a
/// larger frequency is clamped, trading precision for continuing.
#[derive(Debug)]
pub struct TickClock {
    start: u64,
    ns: TickScale,
    ms: TickScale,
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TickClock {
    /// Create a clock anchored at the current counter reading.
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(perf_frequency(), perf_counter())
    }

    fn from_parts(frequency: u64, now: u64) -> Self {
        debug_assert!(
            frequency > 0 && frequency <= u64::from(u32::MAX),
            "performance counter frequency {frequency} outside supported range"
        );
        let frequency = frequency.clamp(1, u64::from(u32::MAX)) as u32;

        Self {
            // A zero start tick is bumped by one so it can double as an
            // "uninitialized" sentinel elsewhere.
            start: now.max(1),
            ns: TickScale::reduced(NS_PER_SECOND as u32, frequency),
            ms: TickScale::reduced(MS_PER_SECOND as u32, frequency),
        }
    }

    /// Nanoseconds elapsed since the clock was created.
    #[inline]
    #[must_use]
    pub fn ticks_ns(&self) -> u64 {
        self.ns.rescale(perf_counter().saturating_sub(self.start))
    }

    /// Milliseconds elapsed since the clock was created.
    #[inline]
    #[must_use]
    pub fn ticks_ms(&self) -> u64 {
        self.ms.rescale(perf_counter().saturating_sub(self.start))
    }
}

fn global() -> &'static TickClock {
    static CLOCK: OnceLock<TickClock> = OnceLock::new();
    CLOCK.get_or_init(TickClock::new)
}

/// Nanoseconds since the process-wide clock was first read.
#[inline]
#[must_use]
pub fn ticks_ns() -> u64 {
    global().ticks_ns()
}

/// Milliseconds since the process-wide clock was first read.
#[inline]
#[must_use]
pub fn ticks_ms() -> u64 {
    global().ticks_ms()
}
