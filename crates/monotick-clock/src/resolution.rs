//! OS timer-resolution requests driven by a hint.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use monotick_hints::{HintWatchId, add_hint_callback, remove_hint_callback};
use monotick_platform::{release_timer_resolution, request_timer_resolution};

/// Requested sleep granularity in milliseconds, as a decimal integer string.
///
/// Unset or empty selects the default of 1 ms. `"0"` (or an unparsable
/// value) disables the request.
pub const HINT_TIMER_RESOLUTION: &str = "TIMER_RESOLUTION";

/// Keeps the OS timer-resolution request in sync with the
/// [`HINT_TIMER_RESOLUTION`] hint.
///
/// On creation the current hint value (default 1 ms) is installed; every
/// hint change revokes the previous request and installs the new one.
/// Dropping the controller revokes the final request and the hint
/// subscription. Platform rejections are tolerated; the request is best
/// effort.
pub struct ResolutionController {
    requested: Arc<Mutex<u32>>,
    watch: HintWatchId,
}

impl ResolutionController {
    /// Install the controller against the process-global hint registry.
    #[must_use]
    pub fn install() -> Self {
        let requested = Arc::new(Mutex::new(0u32));
        let state = Arc::clone(&requested);
        let watch = add_hint_callback(HINT_TIMER_RESOLUTION, move |_, _, value| {
            apply(&state, parse_period(value));
        });
        Self { requested, watch }
    }

    /// The period currently requested from the OS, 0 when none.
    #[must_use]
    pub fn requested_ms(&self) -> u32 {
        *self.requested.lock()
    }
}

impl Drop for ResolutionController {
    fn drop(&mut self) {
        remove_hint_callback(HINT_TIMER_RESOLUTION, self.watch);
        apply(&self.requested, 0);
    }
}

impl std::fmt::Debug for ResolutionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionController")
            .field("requested_ms", &self.requested_ms())
            .finish()
    }
}

fn apply(requested: &Mutex<u32>, period_ms: u32) {
    let mut current = requested.lock();
    if period_ms == *current {
        return;
    }
    if *current != 0 {
        release_timer_resolution(*current);
    }
    *current = period_ms;
    if period_ms != 0 && !request_timer_resolution(period_ms) {
        debug!(period_ms, "timer resolution request not honored");
    }
}

fn parse_period(value: Option<&str>) -> u32 {
    match value {
        None => 1,
        Some(text) => {
            let text = text.trim();
            if text.is_empty() {
                1
            } else {
                text.parse().unwrap_or(0)
            }
        }
    }
}
