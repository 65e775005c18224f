//! Fallback platform implementation for systems without a native backend.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

const NS_PER_SECOND: u64 = 1_000_000_000;

fn anchor() -> Instant {
    static ANCHOR: OnceLock<Instant> = OnceLock::new();
    *ANCHOR.get_or_init(Instant::now)
}

pub fn perf_counter() -> u64 {
    anchor().elapsed().as_nanos() as u64
}

pub fn perf_frequency() -> u64 {
    NS_PER_SECOND
}

pub fn sys_delay_ns(ns: u64) {
    if ns == 0 {
        std::thread::yield_now();
        return;
    }
    std::thread::sleep(Duration::from_nanos(ns));
}

pub fn request_timer_resolution(_period_ms: u32) -> bool {
    false
}

pub fn release_timer_resolution(_period_ms: u32) {}
