//! Blocking delays, including the adaptive precise delay.

use monotick_platform::{cpu_pause, sys_delay_ns};

use crate::clock::ticks_ns;
use crate::{NS_PER_MS, ms_to_ns};

/// The shortest request that still produces a real sleep everywhere.
const SHORT_SLEEP_NS: u64 = NS_PER_MS;

/// Block for at least `ms` milliseconds using a single platform sleep.
pub fn delay(ms: u32) {
    sys_delay_ns(ms_to_ns(u64::from(ms)));
}

/// Block for at least `ns` nanoseconds using a single platform sleep.
pub fn delay_ns(ns: u64) {
    sys_delay_ns(ns);
}

/// Block for at least `ns` nanoseconds, landing close to the deadline.
///
/// A single platform sleep overslept by whatever the scheduler felt like;
/// this routine instead walks the wait through phases whose cost per
/// remaining nanosecond shrinks as the deadline approaches:
///
/// 1. Long sleeps sized from a running overshoot estimate, while the
///    deadline is comfortably far away.
/// 2. 1 ms sleeps that try to undershoot, tracking the largest observed
///    sleep so the last iteration stays short of the deadline.
/// 3. 1 ms sleeps accepting overshoot, in case phase 2 undershot by
///    several milliseconds.
/// 4. Zero-length sleeps (yields), cheaper than pause loops on several
///    platforms.
/// 5. A pause-instruction spin for the final stretch.
///
/// Overshoot tracking is local to each phase: observed oversleep is not
/// stationary over long horizons, so a stale estimate is worse than none.
pub fn delay_precise(ns: u64) {
    let mut current = ticks_ns();
    let deadline = current.saturating_add(ns);

    if ns > 2 * SHORT_SLEEP_NS {
        // Phase 1: longish sleeps while a tenth of the total still clears
        // the guard band. Each request is trimmed by the worst overshoot
        // seen so far in this phase, and the target shrinks as the
        // deadline approaches.
        let mut target_sleep = ns / 10;
        let mut max_overshoot = 0u64;
        if target_sleep >= 10 * SHORT_SLEEP_NS {
            let mut request = target_sleep - SHORT_SLEEP_NS;
            while request >= 10 * SHORT_SLEEP_NS
                && current + target_sleep + 10 * SHORT_SLEEP_NS < deadline
            {
                sys_delay_ns(request);
                let now = ticks_ns();
                if now >= deadline {
                    return;
                }
                let overshoot = (now - current).saturating_sub(request);
                if overshoot > max_overshoot {
                    max_overshoot = overshoot;
                }
                if max_overshoot >= target_sleep {
                    max_overshoot = 0;
                }
                current = now;
                if current + target_sleep + 10 * SHORT_SLEEP_NS > deadline {
                    target_sleep = (deadline - current) / 10;
                    while target_sleep > SHORT_SLEEP_NS
                        && current + target_sleep + 10 * SHORT_SLEEP_NS > deadline
                    {
                        target_sleep /= 10;
                    }
                    if target_sleep <= SHORT_SLEEP_NS {
                        break;
                    }
                    if max_overshoot >= target_sleep {
                        max_overshoot = 0;
                    }
                }
                request = target_sleep - max_overshoot;
            }
        }

        // Phase 2: 1 ms sleeps aiming to undershoot. The ceiling carries
        // across iterations; it is the one estimate that must survive the
        // loop so the final sleep cannot blow past the deadline.
        let mut max_sleep = SHORT_SLEEP_NS + max_overshoot.min(SHORT_SLEEP_NS);
        while current + max_sleep < deadline {
            sys_delay_ns(SHORT_SLEEP_NS);
            let now = ticks_ns();
            if now >= deadline {
                return;
            }
            if now - current > max_sleep {
                max_sleep = now - current;
            }
            current = now;
        }

        // Phase 3: phase 2 rarely undershoots by more than its ceiling,
        // but when it does, keep doing real sleeps instead of spinning.
        while current + 2 * SHORT_SLEEP_NS < deadline {
            sys_delay_ns(SHORT_SLEEP_NS);
            current = ticks_ns();
            if current >= deadline {
                return;
            }
        }
    }

    // Phase 4: zero-length sleeps until less than one short sleep remains.
    while current + SHORT_SLEEP_NS < deadline {
        sys_delay_ns(0);
        current = ticks_ns();
    }

    // Phase 5: spin out the remainder.
    while current < deadline {
        cpu_pause();
        current = ticks_ns();
    }
}
