// crates/pulse-core/src/core/series.rs
// ============================================================================
// Module: Pulse Monthly Series
// Description: Monthly target/actual points and sparse monthly series.
// Purpose: Represent plan and actual values with explicit missing months.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Targets and actuals arrive as one row per calendar month per metric. A
//! [`MonthlySeries`] is the sparse month-indexed view the rollup calculator
//! consumes: a missing month means "unknown", never zero. Conflating the two
//! is the classic source of understated flow sums and phantom red signals, so
//! the absence is kept explicit all the way to the calculator.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::metric::Dimension;
use crate::core::metric::MetricKey;
use crate::core::period::YearMonth;

// ============================================================================
// SECTION: Points
// ============================================================================

/// One monthly plan value for a metric.
///
/// # Invariants
/// - At most one point exists per `(month, metric_key, dimension)` tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetPoint {
    /// Calendar month of the point.
    pub month: YearMonth,
    /// Metric the point belongs to.
    pub metric_key: MetricKey,
    /// Optional business-unit dimension.
    #[serde(default)]
    pub dimension: Option<Dimension>,
    /// Planned value for the month.
    pub value: f64,
}

/// One monthly observed value for a metric.
///
/// # Invariants
/// - At most one point exists per `(month, metric_key, dimension)` tuple.
/// - Absence of a point is semantically "unknown", never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActualPoint {
    /// Calendar month of the point.
    pub month: YearMonth,
    /// Metric the point belongs to.
    pub metric_key: MetricKey,
    /// Optional business-unit dimension.
    #[serde(default)]
    pub dimension: Option<Dimension>,
    /// Observed value for the month.
    pub value: f64,
}

// ============================================================================
// SECTION: Monthly Series
// ============================================================================

/// Sparse chronological month-to-value map for a single metric.
///
/// # Invariants
/// - Months absent from the map are unknown, not zero.
/// - Iteration order is chronological.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlySeries {
    /// Known values keyed by calendar month.
    values: BTreeMap<YearMonth, f64>,
}

impl MonthlySeries {
    /// Creates an empty series.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a series from `(month, value)` pairs; later pairs win on conflict.
    #[must_use]
    pub fn from_pairs(pairs: impl IntoIterator<Item = (YearMonth, f64)>) -> Self {
        Self {
            values: pairs.into_iter().collect(),
        }
    }

    /// Builds a series from target points.
    #[must_use]
    pub fn from_target_points(points: &[TargetPoint]) -> Self {
        Self::from_pairs(points.iter().map(|point| (point.month, point.value)))
    }

    /// Builds a series from actual points.
    #[must_use]
    pub fn from_actual_points(points: &[ActualPoint]) -> Self {
        Self::from_pairs(points.iter().map(|point| (point.month, point.value)))
    }

    /// Records a value for a month, replacing any previous value.
    pub fn set(&mut self, month: YearMonth, value: f64) {
        self.values.insert(month, value);
    }

    /// Returns the known value for a month, if any.
    #[must_use]
    pub fn value_at(&self, month: YearMonth) -> Option<f64> {
        self.values.get(&month).copied()
    }

    /// Returns true when the series holds a value for every given month.
    #[must_use]
    pub fn covers_all(&self, months: &[YearMonth]) -> bool {
        months.iter().all(|month| self.values.contains_key(month))
    }

    /// Iterates known `(month, value)` pairs chronologically.
    pub fn iter(&self) -> impl Iterator<Item = (YearMonth, f64)> + '_ {
        self.values.iter().map(|(month, value)| (*month, *value))
    }

    /// Returns the number of known months.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when no month is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
