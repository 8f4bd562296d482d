// crates/pulse-core/src/core/time.rs
// ============================================================================
// Module: Pulse Time Model
// Description: Injectable clock used for fiscal resolution and cache expiry.
// Purpose: Keep "now" a single injected input so tests never sleep.
// Dependencies: time
// ============================================================================

//! ## Overview
//! The engine resolves the current fiscal quarter and cache expiry from a
//! [`Clock`] supplied by the host instead of reading wall-clock time inline.
//! Each summary request resolves "now" exactly once, so a request straddling
//! midnight on a quarter boundary observes one consistent quarter throughout.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Mutex;

use time::OffsetDateTime;

use crate::core::period::Month;
use crate::core::period::YearMonth;

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Time source injected into the cache and aggregator.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> OffsetDateTime;
}

/// Wall-clock backed [`Clock`] used in production.
///
/// # Invariants
/// - Always reports UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Deterministic [`Clock`] for tests; advances only when told to.
///
/// # Invariants
/// - `now` only changes through [`FixedClock::advance`] or [`FixedClock::set`].
#[derive(Debug)]
pub struct FixedClock {
    /// Current instant reported by the clock.
    now: Mutex<OffsetDateTime>,
}

impl FixedClock {
    /// Creates a fixed clock at the given instant.
    #[must_use]
    pub const fn new(now: OffsetDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Advances the clock by a duration.
    pub fn advance(&self, by: std::time::Duration) {
        let mut guard = self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard += by;
    }

    /// Replaces the reported instant.
    pub fn set(&self, now: OffsetDateTime) {
        let mut guard = self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        *self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the calendar month containing an instant.
#[must_use]
pub fn year_month_of(at: OffsetDateTime) -> YearMonth {
    let month = match Month::from_raw(u8::from(at.month())) {
        Some(month) => month,
        // time::Month is always 1..=12.
        None => Month::JANUARY,
    };
    YearMonth::new(at.year(), month)
}

/// Returns an instant as unix epoch milliseconds.
#[must_use]
pub fn unix_millis(at: OffsetDateTime) -> i64 {
    let millis = at.unix_timestamp_nanos() / 1_000_000;
    i64::try_from(millis).unwrap_or(i64::MAX)
}
