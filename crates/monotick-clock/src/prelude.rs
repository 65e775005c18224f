//! Prelude module for common clock types.

pub use crate::clock::{TickClock, ticks_ms, ticks_ns};
pub use crate::delay::{delay, delay_ns, delay_precise};
pub use crate::resolution::{HINT_TIMER_RESOLUTION, ResolutionController};
pub use crate::{MS_PER_SECOND, NS_PER_MS, NS_PER_SECOND, ms_to_ns, ns_to_ms};
