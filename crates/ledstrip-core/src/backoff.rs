//! Bounded exponential retry delays.

/// Retry delay calculator with a compile-time floor and ceiling.
///
/// Each call to [`ms_to_next_try`](Self::ms_to_next_try) returns the delay
/// to wait before the next attempt and doubles the stored delay, clamped to
/// `CEILING_MS`. [`reset`](Self::reset) restores the floor and is called
/// exactly on a successful connectivity event, never on an attempt alone.
///
/// The returned delay is always in `FLOOR_MS..=CEILING_MS` and is
/// non-decreasing between resets.
#[derive(Debug, Clone)]
pub struct BackoffCalculator<const FLOOR_MS: u32, const CEILING_MS: u32> {
    next_ms: u32,
}

impl<const FLOOR_MS: u32, const CEILING_MS: u32> BackoffCalculator<FLOOR_MS, CEILING_MS> {
    const FLOOR_IS_POSITIVE: () = assert!(FLOOR_MS > 0);
    const CEILING_IS_ABOVE_FLOOR: () = assert!(CEILING_MS >= FLOOR_MS);

    pub const fn new() -> Self {
        let () = Self::FLOOR_IS_POSITIVE;
        let () = Self::CEILING_IS_ABOVE_FLOOR;
        Self { next_ms: FLOOR_MS }
    }

    /// Delay in milliseconds to wait before the next attempt.
    ///
    /// Not idempotent: the stored delay doubles on every call until it hits
    /// the ceiling.
    pub fn ms_to_next_try(&mut self) -> u32 {
        let delay = self.next_ms;
        self.next_ms = delay.saturating_mul(2).min(CEILING_MS);
        delay
    }

    /// Restore the floor delay after a successful attempt.
    pub fn reset(&mut self) {
        self.next_ms = FLOOR_MS;
    }
}

impl<const FLOOR_MS: u32, const CEILING_MS: u32> Default
    for BackoffCalculator<FLOOR_MS, CEILING_MS>
{
    fn default() -> Self {
        Self::new()
    }
}
