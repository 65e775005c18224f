//! Prelude module for common hint registry types.

pub use crate::registry::{HintCallback, HintRegistry, HintWatchId};
pub use crate::{add_hint_callback, get_hint, registry, remove_hint_callback, set_hint};
