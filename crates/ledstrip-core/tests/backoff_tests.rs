//! Tests for the retry delay calculator.

use ledstrip_core::BackoffCalculator;

#[test]
fn first_delay_is_the_floor() {
    let mut backoff = BackoffCalculator::<100, 30_000>::new();

    assert_eq!(backoff.ms_to_next_try(), 100);
}

#[test]
fn delays_double_until_the_ceiling() {
    let mut backoff = BackoffCalculator::<100, 30_000>::new();

    let mut delays = [0u32; 12];
    for delay in &mut delays {
        *delay = backoff.ms_to_next_try();
    }

    assert_eq!(
        delays,
        [100, 200, 400, 800, 1_600, 3_200, 6_400, 12_800, 25_600, 30_000, 30_000, 30_000]
    );
}

#[test]
fn delays_are_non_decreasing_and_bounded() {
    let mut backoff = BackoffCalculator::<250, 8_000>::new();

    let mut previous = 0;
    for _ in 0..64 {
        let delay = backoff.ms_to_next_try();
        assert!(delay >= previous);
        assert!(delay > 0);
        assert!(delay <= 8_000);
        previous = delay;
    }
}

#[test]
fn reset_restores_the_floor() {
    let mut backoff = BackoffCalculator::<100, 30_000>::new();

    for _ in 0..5 {
        backoff.ms_to_next_try();
    }
    backoff.reset();

    assert_eq!(backoff.ms_to_next_try(), 100);
}

#[test]
fn advancing_is_not_idempotent() {
    let mut backoff = BackoffCalculator::<100, 30_000>::new();

    let first = backoff.ms_to_next_try();
    let second = backoff.ms_to_next_try();

    assert!(second > first);
}

#[test]
fn ceiling_equal_to_floor_pins_the_delay() {
    let mut backoff = BackoffCalculator::<5_000, 5_000>::new();

    assert_eq!(backoff.ms_to_next_try(), 5_000);
    assert_eq!(backoff.ms_to_next_try(), 5_000);
}
