// crates/pulse-core/tests/target_resolution_unit.rs
// ============================================================================
// Module: Target Resolution Tests
// Description: Validate monthly-first target resolution with static fallbacks.
// Purpose: Pin the resolution order and the no-scaling rule.
// Dependencies: pulse-core
// ============================================================================

//! Unit tests for target resolution ordering.

use std::collections::BTreeMap;

use pulse_core::Month;
use pulse_core::MonthlySeries;
use pulse_core::PeriodKind;
use pulse_core::PeriodLabel;
use pulse_core::YearMonth;
use pulse_core::resolve_target;

fn ym(year: i32, month: u8) -> Result<YearMonth, Box<dyn std::error::Error>> {
    Ok(YearMonth::new(year, Month::from_raw(month).ok_or("month out of range")?))
}

#[test]
fn full_monthly_coverage_wins_over_static() -> Result<(), Box<dyn std::error::Error>> {
    let months = [ym(2026, 1)?, ym(2026, 2)?, ym(2026, 3)?];
    let series =
        MonthlySeries::from_pairs([(months[0], 100.0), (months[1], 110.0), (months[2], 120.0)]);
    let mut statics = BTreeMap::new();
    statics.insert(PeriodLabel::Q1, 999.0);
    let resolved =
        resolve_target(PeriodKind::Flow, &series, &months, &statics, Some(PeriodLabel::Q1));
    assert_eq!(resolved, Some(330.0));
    Ok(())
}

#[test]
fn partial_monthly_coverage_falls_back_to_static() -> Result<(), Box<dyn std::error::Error>> {
    let months = [ym(2026, 1)?, ym(2026, 2)?, ym(2026, 3)?];
    // February is unplanned, so the monthly points must not be used.
    let series = MonthlySeries::from_pairs([(months[0], 100.0), (months[2], 120.0)]);
    let mut statics = BTreeMap::new();
    statics.insert(PeriodLabel::Q1, 999.0);
    let resolved =
        resolve_target(PeriodKind::Flow, &series, &months, &statics, Some(PeriodLabel::Q1));
    assert_eq!(resolved, Some(999.0));
    Ok(())
}

#[test]
fn stock_targets_resolve_to_period_end() -> Result<(), Box<dyn std::error::Error>> {
    let months = [ym(2026, 1)?, ym(2026, 2)?, ym(2026, 3)?];
    let series =
        MonthlySeries::from_pairs([(months[0], 40.0), (months[1], 41.0), (months[2], 42.0)]);
    let statics = BTreeMap::new();
    let resolved =
        resolve_target(PeriodKind::Stock, &series, &months, &statics, Some(PeriodLabel::Q1));
    assert_eq!(resolved, Some(42.0));
    Ok(())
}

#[test]
fn absent_target_is_none_never_scaled() -> Result<(), Box<dyn std::error::Error>> {
    let months = [ym(2026, 1)?, ym(2026, 2)?, ym(2026, 3)?];
    let series = MonthlySeries::new();
    // An FY static target exists, but the requested label is Q1; no
    // year-to-quarter scaling may be invented.
    let mut statics = BTreeMap::new();
    statics.insert(PeriodLabel::FY, 1200.0);
    let resolved =
        resolve_target(PeriodKind::Flow, &series, &months, &statics, Some(PeriodLabel::Q1));
    assert_eq!(resolved, None);
    Ok(())
}

#[test]
fn no_label_and_no_monthly_points_is_none() -> Result<(), Box<dyn std::error::Error>> {
    let months = [ym(2026, 1)?];
    let mut statics = BTreeMap::new();
    statics.insert(PeriodLabel::Q1, 10.0);
    let resolved = resolve_target(PeriodKind::Flow, &MonthlySeries::new(), &months, &statics, None);
    assert_eq!(resolved, None);
    Ok(())
}

#[test]
fn empty_month_list_skips_monthly_resolution() {
    let mut statics = BTreeMap::new();
    statics.insert(PeriodLabel::FY, 12.0);
    let resolved = resolve_target(
        PeriodKind::Flow,
        &MonthlySeries::new(),
        &[],
        &statics,
        Some(PeriodLabel::FY),
    );
    assert_eq!(resolved, Some(12.0));
}
