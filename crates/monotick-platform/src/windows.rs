//! Windows-specific platform implementation.

use std::cell::RefCell;
use std::time::Duration;

use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::Media::{TIMERR_NOERROR, timeBeginPeriod, timeEndPeriod};
use windows::Win32::System::Performance::{QueryPerformanceCounter, QueryPerformanceFrequency};
use windows::Win32::System::Threading::{
    CreateWaitableTimerW, INFINITE, SetWaitableTimer, Sleep, WaitForSingleObject,
};

pub fn perf_counter() -> u64 {
    let mut value = 0i64;
    // SAFETY: `value` is a valid out-pointer; QPC cannot fail on XP and later.
    unsafe {
        let _ = QueryPerformanceCounter(&mut value);
    }
    value as u64
}

pub fn perf_frequency() -> u64 {
    let mut freq = 0i64;
    // SAFETY: `freq` is a valid out-pointer; the frequency is fixed at boot.
    unsafe {
        let _ = QueryPerformanceFrequency(&mut freq);
    }
    freq as u64
}

/// Owned waitable-timer handle, one per calling thread.
struct WaitableTimer(HANDLE);

impl WaitableTimer {
    fn create() -> Option<Self> {
        // SAFETY: creating an unnamed manual-reset timer has no preconditions.
        unsafe { CreateWaitableTimerW(None, true, None).ok().map(Self) }
    }

    fn sleep(&self, duration: Duration) -> bool {
        let due_time = relative_due_time_100ns(duration);
        // SAFETY: the handle is owned by this struct and stays valid for the
        // duration of both calls.
        unsafe {
            if SetWaitableTimer(self.0, &due_time, 0, None, None, false).is_err() {
                return false;
            }
            WaitForSingleObject(self.0, INFINITE);
        }
        true
    }
}

impl Drop for WaitableTimer {
    fn drop(&mut self) {
        // SAFETY: the handle was returned by CreateWaitableTimerW and is
        // closed exactly once.
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

thread_local! {
    static THREAD_TIMER: RefCell<Option<WaitableTimer>> = const { RefCell::new(None) };
}

pub fn sys_delay_ns(ns: u64) {
    if ns == 0 {
        // SAFETY: Sleep(0) yields the remainder of the time slice.
        unsafe {
            Sleep(0);
        }
        return;
    }

    let duration = Duration::from_nanos(ns);
    let slept = THREAD_TIMER.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_none() {
            *slot = WaitableTimer::create();
        }
        slot.as_ref().is_some_and(|timer| timer.sleep(duration))
    });

    if !slept {
        // No waitable timer available; round up to whole milliseconds.
        let ms = ns.div_ceil(1_000_000).min(u64::from(u32::MAX)) as u32;
        // SAFETY: Sleep has no preconditions.
        unsafe {
            Sleep(ms);
        }
    }
}

/// Convert a duration to a relative due time in 100 ns units for a waitable
/// timer. Negative values mean relative time.
fn relative_due_time_100ns(duration: Duration) -> i64 {
    let ticks_100ns = (duration.as_nanos() / 100).min(i64::MAX as u128) as i64;
    -ticks_100ns.max(1)
}

pub fn request_timer_resolution(period_ms: u32) -> bool {
    if period_ms == 0 {
        return false;
    }
    // SAFETY: timeBeginPeriod has no preconditions; a rejected request is
    // reported through the return value.
    unsafe { timeBeginPeriod(period_ms) == TIMERR_NOERROR }
}

pub fn release_timer_resolution(period_ms: u32) {
    if period_ms == 0 {
        return;
    }
    // SAFETY: paired with a prior successful timeBeginPeriod call.
    unsafe {
        let _ = timeEndPeriod(period_ms);
    }
}
