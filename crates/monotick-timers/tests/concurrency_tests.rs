//! Concurrent producer tests for the timer service.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use monotick_timers::{TimerId, TimerService};

const PRODUCERS: usize = 8;
const TIMERS_PER_PRODUCER: usize = 1_000;

/// Cheap deterministic per-thread interval source.
fn xorshift(state: &mut u64) -> u64 {
    *state ^= *state << 13;
    *state ^= *state >> 7;
    *state ^= *state << 17;
    *state
}

#[test]
fn test_concurrent_producers_all_fire_once() {
    let service = Arc::new(TimerService::start().expect("spawn timer worker"));
    let fired: Arc<Mutex<Vec<TimerId>>> = Arc::new(Mutex::new(Vec::new()));

    let mut producers = Vec::new();
    let mut created: HashSet<TimerId> = HashSet::new();
    for producer in 0..PRODUCERS {
        let service = Arc::clone(&service);
        let fired = Arc::clone(&fired);
        producers.push(thread::spawn(move || {
            let mut rng = 0x9E37_79B9_7F4A_7C15 ^ (producer as u64 + 1);
            let mut ids = Vec::with_capacity(TIMERS_PER_PRODUCER);
            for _ in 0..TIMERS_PER_PRODUCER {
                let interval_ns = xorshift(&mut rng) % 100_000_000;
                let sink = Arc::clone(&fired);
                let id = service
                    .add_ns(interval_ns, move |id, _| {
                        sink.lock().unwrap().push(id);
                        0
                    })
                    .expect("add timer");
                ids.push(id);
            }
            ids
        }));
    }
    for producer in producers {
        created.extend(producer.join().expect("producer thread"));
    }

    // Every interval is below 100 ms; poll instead of sleeping a fixed
    // amount so a loaded runner gets the slack it needs without slowing
    // the common case.
    let expected = PRODUCERS * TIMERS_PER_PRODUCER;
    let wait_start = std::time::Instant::now();
    while fired.lock().unwrap().len() < expected && wait_start.elapsed() < Duration::from_secs(10) {
        thread::sleep(Duration::from_millis(20));
    }

    let fired = fired.lock().unwrap();
    assert_eq!(created.len(), expected, "ids must be unique");
    assert_eq!(fired.len(), expected, "every timer fires exactly once");

    let fired_set: HashSet<TimerId> = fired.iter().copied().collect();
    assert_eq!(fired_set.len(), fired.len(), "no id fires twice");
    assert_eq!(fired_set, created);
}

#[test]
fn test_concurrent_removals_cancel_exactly_once() {
    let service = Arc::new(TimerService::start().expect("spawn timer worker"));
    let fired = Arc::new(AtomicU32::new(0));

    let mut ids = Vec::new();
    for _ in 0..64 {
        let counter = Arc::clone(&fired);
        let id = service
            .add_ms(3_600_000, move |_, interval_ms| {
                counter.fetch_add(1, Ordering::SeqCst);
                interval_ms
            })
            .expect("add timer");
        ids.push(id);
    }

    // Two threads race to cancel every timer; each id must cancel once.
    let successes = Arc::new(AtomicU32::new(0));
    let mut cancelers = Vec::new();
    for _ in 0..2 {
        let service = Arc::clone(&service);
        let successes = Arc::clone(&successes);
        let ids = ids.clone();
        cancelers.push(thread::spawn(move || {
            for id in ids {
                if service.remove(id).is_ok() {
                    successes.fetch_add(1, Ordering::SeqCst);
                }
            }
        }));
    }
    for canceler in cancelers {
        canceler.join().expect("canceler thread");
    }

    assert_eq!(successes.load(Ordering::SeqCst), 64);
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[test]
fn test_producers_race_with_cancellation() {
    let service = Arc::new(TimerService::start().expect("spawn timer worker"));

    let mut producers = Vec::new();
    for producer in 0..4 {
        let service = Arc::clone(&service);
        producers.push(thread::spawn(move || {
            let mut rng = 0xDEAD_BEEF ^ (producer as u64 + 1);
            for _ in 0..50 {
                let interval_ns = xorshift(&mut rng) % 5_000_000;
                let id = service
                    .add_ns(interval_ns, |_, _| 0)
                    .expect("add timer");
                // Half the time, try to cancel immediately; either outcome
                // (canceled or already fired) is legal.
                if rng & 1 == 0 {
                    let _ = service.remove(id);
                }
            }
        }));
    }
    for producer in producers {
        producer.join().expect("producer thread");
    }

    thread::sleep(Duration::from_millis(100));
}
