// crates/pulse-core/src/rollup/targets.rs
// ============================================================================
// Module: Pulse Target Resolution
// Description: Monthly-first target resolution with static fallbacks.
// Purpose: Resolve the plan value a period is judged against.
// Dependencies: crate::core, crate::rollup::calculator
// ============================================================================

//! ## Overview
//! A period's target resolves in strict order: monthly target points rolled
//! up per the metric's period kind when every month of the period is planned,
//! else the key result's static target for that period label, else nothing.
//! No scaling of a fiscal-year target down to a quarter is ever attempted;
//! an absent target yields `None`, never a guessed value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::core::metric::PeriodKind;
use crate::core::period::YearMonth;
use crate::core::plan::PeriodLabel;
use crate::core::series::MonthlySeries;
use crate::rollup::calculator::period_value;

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves the target for a period.
///
/// `months` are the calendar months the period covers; `label` is the static
/// fallback key on the key result, when the period has one (`Q1..Q4`, `FY`).
/// Monthly points only win when they cover the whole period, so a half-planned
/// quarter falls back to the static target instead of comparing a full-period
/// actual against a partial plan.
#[must_use]
pub fn resolve_target(
    kind: PeriodKind,
    target_series: &MonthlySeries,
    months: &[YearMonth],
    static_targets: &BTreeMap<PeriodLabel, f64>,
    label: Option<PeriodLabel>,
) -> Option<f64> {
    if !months.is_empty() && target_series.covers_all(months) {
        return period_value(target_series, months, kind);
    }
    label.and_then(|label| static_targets.get(&label).copied())
}
