//! Process-wide string hint registry for monotick.
//!
//! Hints are named string values that let an application tune runtime
//! behavior without a compile-time dependency on the tuned component.
//! Components subscribe to the hints they care about and react to changes;
//! setters and subscribers never need to know about each other.
//!
//! The registry is deliberately small:
//!
//! - [`HintRegistry::set`] / [`HintRegistry::get`] read and write values
//! - [`HintRegistry::add_callback`] subscribes a watcher; it is invoked once
//!   immediately with the current value, then again on every change
//! - [`HintRegistry::remove_callback`] drops a watcher by its id
//!
//! A process-global instance is available through [`registry`], with
//! [`set_hint`] / [`get_hint`] / [`add_hint_callback`] /
//! [`remove_hint_callback`] as free-function conveniences.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]

mod registry;

pub mod prelude;

pub use registry::{HintCallback, HintRegistry, HintWatchId};

use std::sync::OnceLock;

/// The process-global hint registry.
pub fn registry() -> &'static HintRegistry {
    static REGISTRY: OnceLock<HintRegistry> = OnceLock::new();
    REGISTRY.get_or_init(HintRegistry::new)
}

/// Set a hint in the process-global registry.
///
/// Returns `true` if the stored value changed.
pub fn set_hint(name: &str, value: &str) -> bool {
    registry().set(name, value)
}

/// Read a hint from the process-global registry.
#[must_use]
pub fn get_hint(name: &str) -> Option<String> {
    registry().get(name)
}

/// Subscribe a watcher to a hint in the process-global registry.
pub fn add_hint_callback<F>(name: &str, callback: F) -> HintWatchId
where
    F: Fn(&str, Option<&str>, Option<&str>) + Send + Sync + 'static,
{
    registry().add_callback(name, callback)
}

/// Remove a watcher from the process-global registry.
pub fn remove_hint_callback(name: &str, id: HintWatchId) {
    registry().remove_callback(name, id);
}
