//! Prelude module for common timer service types.

pub use crate::config::{TimerServiceConfig, TimerServiceConfigBuilder};
pub use crate::error::{TimerError, TimerResult};
pub use crate::global::{add_timer_ms, add_timer_ns, init_timers, quit_timers, remove_timer};
pub use crate::service::TimerService;
pub use crate::timer::TimerId;

pub use monotick_clock::{delay, delay_ns, delay_precise, ticks_ms, ticks_ns};
