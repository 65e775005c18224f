//! The process-global timer service instance.

use parking_lot::Mutex;

use crate::error::{TimerError, TimerResult};
use crate::service::TimerService;
use crate::timer::TimerId;

static SERVICE: Mutex<Option<TimerService>> = Mutex::new(None);

/// Start the process-global timer service if it is not already running.
///
/// Safe to call repeatedly.
///
/// # Errors
///
/// Returns an error if the worker thread cannot be spawned.
pub fn init_timers() -> TimerResult<()> {
    let mut slot = SERVICE.lock();
    if slot.is_none() {
        *slot = Some(TimerService::start()?);
    }
    Ok(())
}

/// Stop the process-global timer service.
///
/// Blocks until the worker has exited; all queued timers are dropped
/// without firing. Safe to call repeatedly, including when the service was
/// never started.
pub fn quit_timers() {
    // Drop the slot lock before joining the worker so producers blocked on
    // the global API fail over to a fresh service instead of deadlocking.
    let service = SERVICE.lock().take();
    if let Some(service) = service {
        service.shutdown();
    }
}

/// Add a timer with a millisecond-unit callback to the global service,
/// starting the service if needed.
///
/// # Errors
///
/// Returns an error if the service had to be started and could not be.
pub fn add_timer_ms<F>(interval_ms: u32, callback: F) -> TimerResult<TimerId>
where
    F: FnMut(TimerId, u32) -> u32 + Send + 'static,
{
    let mut slot = SERVICE.lock();
    if slot.is_none() {
        *slot = Some(TimerService::start()?);
    }
    let service = slot.as_ref().ok_or(TimerError::NotFound)?;
    service.add_ms(interval_ms, callback)
}

/// Add a timer with a nanosecond-unit callback to the global service,
/// starting the service if needed.
///
/// # Errors
///
/// Returns an error if the service had to be started and could not be.
pub fn add_timer_ns<F>(interval_ns: u64, callback: F) -> TimerResult<TimerId>
where
    F: FnMut(TimerId, u64) -> u64 + Send + 'static,
{
    let mut slot = SERVICE.lock();
    if slot.is_none() {
        *slot = Some(TimerService::start()?);
    }
    let service = slot.as_ref().ok_or(TimerError::NotFound)?;
    service.add_ns(interval_ns, callback)
}

/// Cancel a timer in the global service.
///
/// # Errors
///
/// [`TimerError::InvalidParameter`] for the reserved zero id,
/// [`TimerError::NotFound`] if the id is unknown, already canceled, or the
/// service is not running.
pub fn remove_timer(id: TimerId) -> TimerResult<()> {
    if !id.is_valid() {
        return Err(TimerError::InvalidParameter);
    }
    let slot = SERVICE.lock();
    match slot.as_ref() {
        Some(service) => service.remove(id),
        None => Err(TimerError::NotFound),
    }
}
