//! Timer records and the identifiers handed out for them.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use monotick_clock::{ms_to_ns, ns_to_ms};

/// Opaque identifier for a live timer.
///
/// Ids are unique, non-zero, and stable for the timer's active life. The
/// raw value 0 is reserved and never refers to a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u32);

impl TimerId {
    /// Rebuild an id from its raw value, e.g. one round-tripped through FFI.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw non-zero value behind this id.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    pub(crate) const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

static NEXT_TIMER_ID: AtomicU32 = AtomicU32::new(1);

/// Allocate a fresh non-zero timer id.
pub(crate) fn next_timer_id() -> TimerId {
    loop {
        let raw = NEXT_TIMER_ID.fetch_add(1, Ordering::Relaxed);
        if raw != 0 {
            return TimerId(raw);
        }
    }
}

/// The user callback, tagged by the unit its intervals are expressed in.
pub(crate) enum TimerCallback {
    Millis(Box<dyn FnMut(TimerId, u32) -> u32 + Send + 'static>),
    Nanos(Box<dyn FnMut(TimerId, u64) -> u64 + Send + 'static>),
}

impl TimerCallback {
    /// Invoke the callback and return the next interval in nanoseconds,
    /// 0 to stop.
    pub(crate) fn fire(&mut self, id: TimerId, interval_ns: u64) -> u64 {
        match self {
            TimerCallback::Millis(callback) => {
                let next_ms = callback(id, ns_to_ms(interval_ns) as u32);
                ms_to_ns(u64::from(next_ms))
            }
            TimerCallback::Nanos(callback) => callback(id, interval_ns),
        }
    }
}

/// State shared between a record and its registry entry.
#[derive(Debug, Default)]
pub(crate) struct TimerShared {
    /// Once set, the worker recycles the record instead of firing it; stays
    /// set until the record is reused.
    pub(crate) canceled: AtomicBool,
}

/// One scheduling unit: a callback, its deadline, and its state.
///
/// Owned by the scheduler after publication; reachable from exactly one of
/// the pending queue, the worker's deadline list, or the freelist.
pub(crate) struct TimerRecord {
    pub(crate) id: TimerId,
    /// `None` only while parked on the freelist; the closure is dropped at
    /// retirement so captured resources are released promptly.
    pub(crate) callback: Option<TimerCallback>,
    pub(crate) interval_ns: u64,
    pub(crate) scheduled_ns: u64,
    pub(crate) shared: Arc<TimerShared>,
}

impl TimerRecord {
    pub(crate) fn empty() -> Self {
        Self {
            id: TimerId(0),
            callback: None,
            interval_ns: 0,
            scheduled_ns: 0,
            shared: Arc::new(TimerShared::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_nonzero() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1_000 {
            let id = next_timer_id();
            assert!(id.is_valid());
            assert!(seen.insert(id));
        }
    }

    #[test]
    fn test_id_raw_round_trip() {
        let id = next_timer_id();
        assert_eq!(TimerId::from_raw(id.raw()), id);
        assert!(!TimerId::from_raw(0).is_valid());
    }

    #[test]
    fn test_millis_callback_converts_units() {
        let mut callback = TimerCallback::Millis(Box::new(|_, interval_ms| {
            assert_eq!(interval_ms, 25);
            40
        }));
        assert_eq!(callback.fire(TimerId::from_raw(1), 25_000_000), 40_000_000);
    }

    #[test]
    fn test_nanos_callback_passes_through() {
        let mut callback = TimerCallback::Nanos(Box::new(|_, interval_ns| interval_ns * 2));
        assert_eq!(callback.fire(TimerId::from_raw(1), 1_500), 3_000);
    }

    #[test]
    fn test_millis_callback_zero_stops() {
        let mut callback = TimerCallback::Millis(Box::new(|_, _| 0));
        assert_eq!(callback.fire(TimerId::from_raw(1), 10_000_000), 0);
    }
}
