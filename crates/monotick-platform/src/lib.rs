//! Platform timing primitives for monotick.
//!
//! This crate isolates everything the timer service needs from the host
//! platform behind a small free-function interface:
//!
//! - **Performance counter**: [`perf_counter`] / [`perf_frequency`], a
//!   monotonic integer tick source with a fixed frequency in ticks/second
//! - **Best-effort sleep**: [`sys_delay_ns`], blocks for at least the
//!   requested duration and may oversleep; a zero request yields the CPU
//! - **Timer resolution**: [`request_timer_resolution`] /
//!   [`release_timer_resolution`], asks the OS for finer sleep granularity
//!   where that is a meaningful concept
//! - **CPU pause**: [`cpu_pause`], the spin-wait hint instruction
//!
//! One module per platform, selected at compile time. The Linux and Windows
//! backends use native clock and sleep syscalls; everything else falls back
//! to the standard library.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]

#[cfg(target_os = "linux")]
mod linux;

#[cfg(windows)]
mod windows;

#[cfg(not(any(target_os = "linux", windows)))]
mod fallback;

#[cfg(target_os = "linux")]
use linux as imp;

#[cfg(windows)]
use windows as imp;

#[cfg(not(any(target_os = "linux", windows)))]
use fallback as imp;

/// Read the platform performance counter.
///
/// The counter is monotonic and advances at [`perf_frequency`] ticks per
/// second. The absolute value is meaningless; only differences between two
/// readings carry information.
#[inline]
#[must_use]
pub fn perf_counter() -> u64 {
    imp::perf_counter()
}

/// Frequency of the performance counter in ticks per second.
///
/// Constant for the lifetime of the process.
#[inline]
#[must_use]
pub fn perf_frequency() -> u64 {
    imp::perf_frequency()
}

/// Block the calling thread for at least `ns` nanoseconds.
///
/// The platform may oversleep by an arbitrary amount; callers that need
/// precision must compensate. A zero request yields the CPU without a
/// measurable sleep.
#[inline]
pub fn sys_delay_ns(ns: u64) {
    imp::sys_delay_ns(ns);
}

/// Ask the OS to schedule sleeps with `period_ms` millisecond granularity.
///
/// Best effort: returns `false` where the platform has no such concept or
/// the request was rejected. A successful request must later be paired with
/// [`release_timer_resolution`] for the same period.
#[inline]
pub fn request_timer_resolution(period_ms: u32) -> bool {
    imp::request_timer_resolution(period_ms)
}

/// Revoke a previously granted timer resolution request.
#[inline]
pub fn release_timer_resolution(period_ms: u32) {
    imp::release_timer_resolution(period_ms);
}

/// Emit the CPU's spin-wait hint instruction.
#[inline]
pub fn cpu_pause() {
    std::hint::spin_loop();
}
