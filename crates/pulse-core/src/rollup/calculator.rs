// crates/pulse-core/src/rollup/calculator.rs
// ============================================================================
// Module: Pulse Rollup Calculator
// Description: Pure period aggregation, variance, and signal derivation.
// Purpose: Convert monthly series into period values and health signals.
// Dependencies: crate::core, serde
// ============================================================================

//! ## Overview
//! The calculator is total: every operation returns a value for every input
//! and signals "insufficient data" with `None` or [`SignalStatus::Gray`]
//! instead of failing. Missing months are skipped, not zeroed; a partial
//! period still produces a partial sum, because a Q1 actual computed mid-March
//! is still meaningful. Stock metrics read at period end rather than summing;
//! summing a headcount series double-counts people.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::metric::Direction;
use crate::core::metric::PeriodKind;
use crate::core::period::YearMonth;
use crate::core::series::MonthlySeries;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Attainment percentage at or above which a higher-is-better metric is green.
pub const GREEN_ATTAINMENT_PCT: f64 = 100.0;
/// Attainment percentage at or above which a higher-is-better metric is yellow.
pub const YELLOW_ATTAINMENT_PCT: f64 = 90.0;
/// Overshoot percentage up to which a lower-is-better metric is yellow.
pub const OVERSHOOT_TOLERANCE_PCT: f64 = 10.0;

// ============================================================================
// SECTION: Signal Status
// ============================================================================

/// Health signal derived from an actual, a target, and a direction.
///
/// # Invariants
/// - `Gray` means "no data yet" and is never conflated with `Red`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalStatus {
    /// On or ahead of plan.
    Green,
    /// Slightly behind plan.
    Yellow,
    /// Materially behind plan.
    Red,
    /// Insufficient data to judge.
    Gray,
}

impl SignalStatus {
    /// Returns the stable wire label for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
            Self::Gray => "gray",
        }
    }
}

// ============================================================================
// SECTION: Period Value
// ============================================================================

/// Aggregates a monthly series over the given months per the metric kind.
///
/// Flow metrics sum the months that have data; stock metrics take the last
/// month that has data. Returns `None` only when no covered month has data.
#[must_use]
pub fn period_value(
    series: &MonthlySeries,
    months: &[YearMonth],
    kind: PeriodKind,
) -> Option<f64> {
    match kind {
        PeriodKind::Flow => {
            let mut sum = None;
            for month in months {
                if let Some(value) = series.value_at(*month) {
                    sum = Some(sum.unwrap_or(0.0) + value);
                }
            }
            sum
        }
        PeriodKind::Stock => months
            .iter()
            .rev()
            .find_map(|month| series.value_at(*month)),
    }
}

// ============================================================================
// SECTION: Variance
// ============================================================================

/// Variance between an actual and a plan value.
///
/// # Invariants
/// - `variance_pct` is `None` whenever `plan` is zero or either input is
///   missing; it is never infinite or NaN for finite inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Variance {
    /// `actual - plan`, when both are known.
    pub variance: Option<f64>,
    /// `variance / |plan| * 100`, when defined.
    pub variance_pct: Option<f64>,
}

/// Computes variance and variance percent between actual and plan.
#[must_use]
pub fn variance(actual: Option<f64>, plan: Option<f64>) -> Variance {
    let (Some(actual), Some(plan)) = (actual, plan) else {
        return Variance {
            variance: None,
            variance_pct: None,
        };
    };
    let delta = actual - plan;
    let variance_pct = if plan == 0.0 { None } else { Some(delta / plan.abs() * 100.0) };
    Variance {
        variance: Some(delta),
        variance_pct,
    }
}

// ============================================================================
// SECTION: Signal Derivation
// ============================================================================

/// Derives the health signal for an actual against a target.
///
/// Thresholds are fixed constants, not per-metric configuration, so every
/// rendering of the same numbers reproduces identical coloring.
#[must_use]
pub fn signal_status(
    actual: Option<f64>,
    target: Option<f64>,
    direction: Direction,
) -> SignalStatus {
    let Some(actual) = actual else {
        return SignalStatus::Gray;
    };
    let Some(target) = target else {
        return SignalStatus::Gray;
    };
    match direction {
        Direction::HigherIsBetter => {
            if target == 0.0 {
                return SignalStatus::Gray;
            }
            let attainment_pct = actual / target * 100.0;
            if attainment_pct >= GREEN_ATTAINMENT_PCT {
                SignalStatus::Green
            } else if attainment_pct >= YELLOW_ATTAINMENT_PCT {
                SignalStatus::Yellow
            } else {
                SignalStatus::Red
            }
        }
        Direction::LowerIsBetter => {
            if actual <= target {
                return SignalStatus::Green;
            }
            if target == 0.0 {
                return SignalStatus::Red;
            }
            let overshoot_pct = (actual - target) / target * 100.0;
            if overshoot_pct <= OVERSHOOT_TOLERANCE_PCT {
                SignalStatus::Yellow
            } else {
                SignalStatus::Red
            }
        }
    }
}

/// Progress percentage of an actual against a target, when defined.
///
/// For lower-is-better metrics progress is the inverse ratio so that staying
/// under plan reads as at-or-above 100%.
#[must_use]
pub fn progress_pct(
    actual: Option<f64>,
    target: Option<f64>,
    direction: Direction,
) -> Option<f64> {
    let (Some(actual), Some(target)) = (actual, target) else {
        return None;
    };
    match direction {
        Direction::HigherIsBetter => {
            if target == 0.0 { None } else { Some(actual / target * 100.0) }
        }
        Direction::LowerIsBetter => {
            if actual == 0.0 { None } else { Some(target / actual * 100.0) }
        }
    }
}
