//! Process-wide timer service for monotick.
//!
//! Many producer threads schedule one-shot or periodic callbacks at
//! nanosecond-resolution deadlines; a single background worker dispatches
//! them in time order. Periodic behavior is driven by the callback's return
//! value (the next interval, 0 to stop), cancellation by
//! [`TimerService::remove`].
//!
//! Two API surfaces:
//!
//! - [`TimerService`], an owned service instance with its own worker
//! - The process-global functions [`init_timers`], [`quit_timers`],
//!   [`add_timer_ms`], [`add_timer_ns`], [`remove_timer`], which manage one
//!   shared instance and initialize it lazily on first use
//!
//! Timekeeping and sleeps re-exported from `monotick-clock`: [`ticks_ns`],
//! [`ticks_ms`], [`delay`], [`delay_ns`], [`delay_precise`].
//!
//! # Example
//!
//! ```no_run
//! use monotick_timers::{add_timer_ms, quit_timers, remove_timer};
//!
//! let id = add_timer_ms(100, |_, interval_ms| {
//!     println!("tick");
//!     interval_ms // keep firing every 100 ms
//! })
//! .expect("start timer service");
//!
//! std::thread::sleep(std::time::Duration::from_secs(1));
//! remove_timer(id).expect("timer is live");
//! quit_timers();
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]

mod config;
mod error;
mod global;
mod service;
mod timer;

pub mod prelude;

pub use config::{TimerServiceConfig, TimerServiceConfigBuilder};
pub use error::{TimerError, TimerResult};
pub use global::{add_timer_ms, add_timer_ns, init_timers, quit_timers, remove_timer};
pub use service::TimerService;
pub use timer::TimerId;

pub use monotick_clock::{delay, delay_ns, delay_precise, ticks_ms, ticks_ns};
