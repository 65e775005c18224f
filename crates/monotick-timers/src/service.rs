//! The timer service: producer-side registry and the dispatch worker.
//!
//! Any thread may add a timer, but a single worker thread owns the active
//! queue, sorted by deadline. Producers hand records over through a
//! lock-free pending queue and wake the worker through a token channel;
//! cancellation just flips a flag the worker observes before firing.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{Receiver, Sender, bounded};
use crossbeam::queue::SegQueue;
use crossbeam::utils::CachePadded;
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use monotick_clock::{ResolutionController, ms_to_ns, ticks_ns};

use crate::config::TimerServiceConfig;
use crate::error::{TimerError, TimerResult};
use crate::timer::{TimerCallback, TimerId, TimerRecord, TimerShared, next_timer_id};

/// State shared between producers and the dispatch worker.
struct ServiceShared {
    /// Live id lookup, the linearization point of cancellation.
    registry: Mutex<HashMap<u32, Arc<TimerShared>>>,
    /// Records published by producers since the worker's last intake.
    pending: CachePadded<SegQueue<Box<TimerRecord>>>,
    /// Retired records awaiting reuse.
    freelist: CachePadded<SegQueue<Box<TimerRecord>>>,
    /// Cleared to request worker exit.
    active: AtomicBool,
    /// Wake token for the worker; a full channel means a wakeup is already
    /// pending, which is just as good as another token.
    wake_tx: Sender<()>,
    freelist_capacity: usize,
}

/// A process-wide timer dispatch service.
///
/// One background worker fires callbacks in deadline order; any number of
/// threads may add and remove timers concurrently. Dropping the service
/// shuts it down, joining the worker first so no callback outlives it.
///
/// # Example
///
/// ```no_run
/// use monotick_timers::TimerService;
///
/// let service = TimerService::start().expect("spawn worker");
/// let id = service
///     .add_ms(250, |_, interval_ms| interval_ms) // fires every 250 ms
///     .expect("add timer");
/// // ...
/// service.remove(id).expect("timer is live");
/// service.shutdown();
/// ```
pub struct TimerService {
    shared: Arc<ServiceShared>,
    worker: Option<JoinHandle<()>>,
    _resolution: Option<ResolutionController>,
}

impl TimerService {
    /// Start a service with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread cannot be spawned.
    pub fn start() -> TimerResult<Self> {
        Self::with_config(TimerServiceConfig::default())
    }

    /// Start a service with a custom configuration.
    ///
    /// On any failure everything built so far is torn down before the error
    /// is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the worker
    /// thread cannot be spawned.
    pub fn with_config(config: TimerServiceConfig) -> TimerResult<Self> {
        config.validate()?;

        let (wake_tx, wake_rx) = bounded(1);
        let shared = Arc::new(ServiceShared {
            registry: Mutex::new(HashMap::new()),
            pending: CachePadded::new(SegQueue::new()),
            freelist: CachePadded::new(SegQueue::new()),
            active: AtomicBool::new(true),
            wake_tx,
            freelist_capacity: config.freelist_capacity,
        });

        let resolution = config
            .manage_timer_resolution
            .then(ResolutionController::install);

        // Callbacks are user code, so the worker keeps the default
        // (unrestricted) stack size.
        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name(config.worker_thread_name.clone())
            .spawn(move || worker_main(&worker_shared, &wake_rx))
            .map_err(TimerError::WorkerSpawn)?;

        info!(worker = %config.worker_thread_name, "timer service started");
        Ok(Self {
            shared,
            worker: Some(worker),
            _resolution: resolution,
        })
    }

    /// Whether the dispatch worker is still being asked to run.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.active.load(Ordering::Acquire)
    }

    /// Add a timer with a millisecond-unit callback.
    ///
    /// The callback first fires `interval_ms` milliseconds from now and
    /// returns the next interval in milliseconds, 0 to stop.
    ///
    /// # Errors
    ///
    /// Currently infallible in practice; the `Result` mirrors
    /// [`add_ns`](Self::add_ns).
    pub fn add_ms<F>(&self, interval_ms: u32, callback: F) -> TimerResult<TimerId>
    where
        F: FnMut(TimerId, u32) -> u32 + Send + 'static,
    {
        self.submit(
            ms_to_ns(u64::from(interval_ms)),
            TimerCallback::Millis(Box::new(callback)),
        )
    }

    /// Add a timer with a nanosecond-unit callback.
    ///
    /// The callback first fires `interval_ns` nanoseconds from now and
    /// returns the next interval in nanoseconds, 0 to stop.
    ///
    /// # Errors
    ///
    /// Currently infallible in practice; the `Result` form keeps room for
    /// submission limits.
    pub fn add_ns<F>(&self, interval_ns: u64, callback: F) -> TimerResult<TimerId>
    where
        F: FnMut(TimerId, u64) -> u64 + Send + 'static,
    {
        self.submit(interval_ns, TimerCallback::Nanos(Box::new(callback)))
    }

    fn submit(&self, interval_ns: u64, callback: TimerCallback) -> TimerResult<TimerId> {
        let mut record = match self.shared.freelist.pop() {
            Some(record) => record,
            None => Box::new(TimerRecord::empty()),
        };

        // A recycled record may still be registry-visible under its old id;
        // cancel that id first so two ids never alias one record.
        if record.id.is_valid() {
            let _ = self.remove(record.id);
        }
        if let Some(shared) = Arc::get_mut(&mut record.shared) {
            *shared.canceled.get_mut() = false;
        } else {
            record.shared = Arc::new(TimerShared::default());
        }

        record.id = next_timer_id();
        record.callback = Some(callback);
        record.interval_ns = interval_ns;
        record.scheduled_ns = ticks_ns().saturating_add(interval_ns);

        let id = record.id;
        self.shared
            .registry
            .lock()
            .insert(id.raw(), Arc::clone(&record.shared));

        self.shared.pending.push(record);
        let _ = self.shared.wake_tx.try_send(());
        Ok(id)
    }

    /// Cancel a timer.
    ///
    /// On success no further callback invocations happen for `id`; an
    /// invocation already entered runs to completion.
    ///
    /// # Errors
    ///
    /// [`TimerError::InvalidParameter`] for the reserved zero id,
    /// [`TimerError::NotFound`] if the id is unknown or already canceled.
    pub fn remove(&self, id: TimerId) -> TimerResult<()> {
        if !id.is_valid() {
            return Err(TimerError::InvalidParameter);
        }

        let entry = self.shared.registry.lock().remove(&id.raw());
        match entry {
            Some(shared) if !shared.canceled.swap(true, Ordering::AcqRel) => Ok(()),
            _ => Err(TimerError::NotFound),
        }
    }

    /// Shut the service down.
    ///
    /// Blocks until the worker has exited; a callback in flight finishes
    /// first. All records still queued anywhere are dropped without firing.
    pub fn shutdown(mut self) {
        self.shutdown_inner();
    }

    fn shutdown_inner(&mut self) {
        if !self.shared.active.swap(false, Ordering::AcqRel) {
            return;
        }

        let _ = self.shared.wake_tx.try_send(());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("timer worker panicked");
            }
        }

        while self.shared.pending.pop().is_some() {}
        while self.shared.freelist.pop().is_some() {}
        self.shared.registry.lock().clear();
        debug!("timer service stopped");
    }
}

impl Drop for TimerService {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("timer service dropped while running; shutting down");
        }
        self.shutdown_inner();
    }
}

impl std::fmt::Debug for TimerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerService")
            .field("running", &self.is_running())
            .field("live_timers", &self.shared.registry.lock().len())
            .finish()
    }
}

/// Insert into the deadline list, ordered by descending deadline so the
/// soonest timer pops from the tail. A new record goes ahead of records
/// with an equal deadline, which keeps equal deadlines firing in
/// registration order.
fn insert_sorted(timers: &mut Vec<Box<TimerRecord>>, record: Box<TimerRecord>) {
    let at = timers.partition_point(|queued| queued.scheduled_ns > record.scheduled_ns);
    timers.insert(at, record);
}

/// Dispatch worker loop:
///  1. Recycle retired records and take in newly added timers
///  2. Fire everything due this tick, rescheduling periodic timers
///  3. Wait until the next deadline or a new timer arrives
fn worker_main(shared: &ServiceShared, wake_rx: &Receiver<()>) {
    debug!("timer worker started");

    let mut timers: Vec<Box<TimerRecord>> = Vec::new();
    let mut retired: Vec<Box<TimerRecord>> = Vec::new();

    loop {
        for mut record in retired.drain(..) {
            record.callback = None;
            if shared.freelist.len() < shared.freelist_capacity {
                shared.freelist.push(record);
            }
        }
        while let Some(record) = shared.pending.pop() {
            insert_sorted(&mut timers, record);
        }

        // Exit check comes after maintenance so late additions are owned by
        // this thread (and freed with it) rather than stranded in pending.
        if !shared.active.load(Ordering::Acquire) {
            break;
        }

        // Infinite wait unless a future deadline says otherwise.
        let mut delay_ns = u64::MAX;

        let tick = ticks_ns();
        loop {
            let Some(head_deadline) = timers.last().map(|record| record.scheduled_ns) else {
                break;
            };
            if head_deadline > tick {
                delay_ns = head_deadline - tick;
                break;
            }
            let Some(mut record) = timers.pop() else {
                break;
            };

            let next_interval_ns = if record.shared.canceled.load(Ordering::Acquire) {
                0
            } else {
                match record.callback.as_mut() {
                    Some(callback) => callback.fire(record.id, record.interval_ns),
                    None => 0,
                }
            };

            if next_interval_ns > 0 {
                // Reschedule from this tick, not from wall time, so jitter
                // does not accumulate in the deadline.
                record.interval_ns = next_interval_ns;
                record.scheduled_ns = tick.saturating_add(next_interval_ns);
                insert_sorted(&mut timers, record);
            } else {
                record.shared.canceled.store(true, Ordering::Release);
                retired.push(record);
            }
        }

        // Account for time spent firing callbacks.
        let elapsed = ticks_ns().saturating_sub(tick);
        if elapsed >= delay_ns {
            delay_ns = 0;
        } else if delay_ns != u64::MAX {
            delay_ns -= elapsed;
        }

        // Every added timer posts a token, so this may return early and
        // re-run the loop a few extra times; that is fine.
        if delay_ns == u64::MAX {
            let _ = wake_rx.recv();
        } else {
            let _ = wake_rx.recv_timeout(Duration::from_nanos(delay_ns));
        }
    }

    debug!("timer worker stopped");
}
