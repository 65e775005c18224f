//! Tests for the process-global timer API.
//!
//! Everything lives in one test function because the functions under test
//! share one process-wide service; parallel test threads would race its
//! lifecycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc;
use std::time::Duration;

use monotick_timers::{
    TimerError, TimerId, add_timer_ms, add_timer_ns, init_timers, quit_timers, remove_timer,
};

#[test]
fn test_global_lifecycle_and_operations() {
    // Repeated init is a no-op.
    init_timers().expect("start global service");
    init_timers().expect("second init is idempotent");

    // A periodic timer fires and cancels exactly once.
    let (tx, rx) = mpsc::channel();
    let id = add_timer_ms(10, move |_, interval_ms| {
        let _ = tx.send(());
        interval_ms
    })
    .expect("add periodic timer");
    rx.recv_timeout(Duration::from_secs(1)).expect("fires");
    remove_timer(id).expect("first removal succeeds");
    assert!(matches!(remove_timer(id), Err(TimerError::NotFound)));

    // The reserved id is rejected without touching the service.
    assert!(matches!(
        remove_timer(TimerId::from_raw(0)),
        Err(TimerError::InvalidParameter)
    ));

    // Quit is idempotent and drops queued timers silently.
    let fired = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&fired);
    let queued = add_timer_ms(60_000, move |_, interval_ms| {
        counter.fetch_add(1, Ordering::SeqCst);
        interval_ms
    })
    .expect("add long timer");
    quit_timers();
    quit_timers();
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert!(matches!(remove_timer(queued), Err(TimerError::NotFound)));

    // Adding after quit lazily restarts the service.
    let (tx, rx) = mpsc::channel();
    add_timer_ns(1_000_000, move |_, _| {
        let _ = tx.send(());
        0
    })
    .expect("add restarts service");
    rx.recv_timeout(Duration::from_secs(1))
        .expect("fires after restart");

    quit_timers();
}
