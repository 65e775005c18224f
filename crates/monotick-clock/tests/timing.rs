//! Timing behavior tests for the clock crate.

use std::time::Instant;

use monotick_clock::{delay_precise, ns_to_ms, ticks_ms, ticks_ns};

#[test]
fn test_ticks_track_wall_time() {
    let wall_start = Instant::now();
    let tick_start = ticks_ns();

    std::thread::sleep(std::time::Duration::from_millis(50));

    let tick_elapsed = ticks_ns() - tick_start;
    let wall_elapsed = wall_start.elapsed().as_nanos() as u64;

    // Both are monotonic clocks read back to back; they should agree to
    // within a few milliseconds even on a busy runner.
    let difference = tick_elapsed.abs_diff(wall_elapsed);
    assert!(
        difference < 10_000_000,
        "tick clock diverged from wall clock by {difference} ns"
    );
}

#[test]
fn test_ms_reading_matches_ns_reading() {
    // The two reads are not atomic together; keep the tightest pair so a
    // preemption between reads cannot flake the test.
    let mut best = u64::MAX;
    for _ in 0..100 {
        let ms = ticks_ms();
        let derived = ns_to_ms(ticks_ns());
        assert!(derived >= ms);
        best = best.min(derived - ms);
    }
    assert!(best <= 1);
}

#[test]
fn test_precise_delay_accuracy_over_repeats() {
    const REQUEST_NS: u64 = 50_000_000;
    const REPEATS: usize = 200;

    let mut total_overshoot = 0u64;
    let mut max_overshoot = 0u64;
    for _ in 0..REPEATS {
        let start = ticks_ns();
        delay_precise(REQUEST_NS);
        let elapsed = ticks_ns() - start;

        assert!(elapsed >= REQUEST_NS, "undershot: {elapsed} ns");
        let overshoot = elapsed - REQUEST_NS;
        total_overshoot += overshoot;
        max_overshoot = max_overshoot.max(overshoot);
    }

    let mean_overshoot = total_overshoot / REPEATS as u64;
    assert!(
        mean_overshoot < 2_000_000,
        "mean overshoot {mean_overshoot} ns"
    );
    assert!(max_overshoot < 10_000_000, "max overshoot {max_overshoot} ns");
}
