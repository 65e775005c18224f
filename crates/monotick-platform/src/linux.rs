//! Linux-specific platform implementation.

use libc::{CLOCK_MONOTONIC, EINTR, clock_gettime, clock_nanosleep, sched_yield, timespec};

const NS_PER_SECOND: u64 = 1_000_000_000;

pub fn perf_counter() -> u64 {
    let mut now = timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: `now` is a valid out-pointer and CLOCK_MONOTONIC is always
    // available on Linux.
    unsafe {
        clock_gettime(CLOCK_MONOTONIC, &mut now);
    }
    (now.tv_sec as u64) * NS_PER_SECOND + now.tv_nsec as u64
}

pub fn perf_frequency() -> u64 {
    NS_PER_SECOND
}

pub fn sys_delay_ns(ns: u64) {
    if ns == 0 {
        // SAFETY: no arguments, no preconditions.
        unsafe {
            sched_yield();
        }
        return;
    }

    let mut request = timespec {
        tv_sec: (ns / NS_PER_SECOND) as libc::time_t,
        tv_nsec: (ns % NS_PER_SECOND) as libc::c_long,
    };

    loop {
        let mut remaining = timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        // SAFETY: both timespec pointers are valid for the duration of the
        // call; a relative CLOCK_MONOTONIC sleep has no other preconditions.
        let rc = unsafe { clock_nanosleep(CLOCK_MONOTONIC, 0, &request, &mut remaining) };
        if rc != EINTR {
            break;
        }
        // Interrupted by a signal; resume with whatever is left.
        request = remaining;
    }
}

pub fn request_timer_resolution(_period_ms: u32) -> bool {
    // Linux sleeps are driven by high-resolution timers; there is no
    // process-wide resolution request to make.
    false
}

pub fn release_timer_resolution(_period_ms: u32) {}
