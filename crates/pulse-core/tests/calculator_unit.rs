// crates/pulse-core/tests/calculator_unit.rs
// ============================================================================
// Module: Rollup Calculator Tests
// Description: Validate period aggregation, variance, and signal thresholds.
// Purpose: Pin the flow/stock semantics and fixed signal boundaries.
// Dependencies: pulse-core
// ============================================================================

//! Unit tests for the pure rollup calculator.

use pulse_core::Direction;
use pulse_core::Month;
use pulse_core::MonthlySeries;
use pulse_core::PeriodKind;
use pulse_core::SignalStatus;
use pulse_core::YearMonth;
use pulse_core::period_value;
use pulse_core::progress_pct;
use pulse_core::signal_status;
use pulse_core::variance;

fn ym(year: i32, month: u8) -> Result<YearMonth, Box<dyn std::error::Error>> {
    Ok(YearMonth::new(year, Month::from_raw(month).ok_or("month out of range")?))
}

#[test]
fn flow_sum_skips_missing_months() -> Result<(), Box<dyn std::error::Error>> {
    let months = [ym(2026, 1)?, ym(2026, 2)?, ym(2026, 3)?];
    let series = MonthlySeries::from_pairs([(months[0], 100.0), (months[2], 50.0)]);
    let value = period_value(&series, &months, PeriodKind::Flow);
    assert_eq!(value, Some(150.0));
    Ok(())
}

#[test]
fn flow_sum_of_empty_series_is_unknown() -> Result<(), Box<dyn std::error::Error>> {
    let months = [ym(2026, 1)?, ym(2026, 2)?];
    let series = MonthlySeries::new();
    assert_eq!(period_value(&series, &months, PeriodKind::Flow), None);
    Ok(())
}

#[test]
fn stock_takes_latest_present_month() -> Result<(), Box<dyn std::error::Error>> {
    let months = [ym(2026, 1)?, ym(2026, 2)?, ym(2026, 3)?];
    // March is missing; February is the latest known value.
    let series = MonthlySeries::from_pairs([(months[0], 10.0), (months[1], 12.0)]);
    let value = period_value(&series, &months, PeriodKind::Stock);
    assert_eq!(value, Some(12.0));
    Ok(())
}

#[test]
fn stock_never_sums() -> Result<(), Box<dyn std::error::Error>> {
    let months = [ym(2026, 1)?, ym(2026, 2)?, ym(2026, 3)?];
    let series =
        MonthlySeries::from_pairs([(months[0], 40.0), (months[1], 41.0), (months[2], 42.0)]);
    assert_eq!(period_value(&series, &months, PeriodKind::Stock), Some(42.0));
    Ok(())
}

#[test]
fn variance_pct_is_none_when_plan_is_zero() {
    let spread = variance(Some(25.0), Some(0.0));
    assert_eq!(spread.variance, Some(25.0));
    assert_eq!(spread.variance_pct, None);
}

#[test]
fn variance_uses_absolute_plan_for_percent() {
    let spread = variance(Some(-50.0), Some(-100.0));
    assert_eq!(spread.variance, Some(50.0));
    assert_eq!(spread.variance_pct, Some(50.0));
}

#[test]
fn variance_requires_both_inputs() {
    let spread = variance(None, Some(10.0));
    assert_eq!(spread.variance, None);
    assert_eq!(spread.variance_pct, None);
}

#[test]
fn higher_is_better_signal_boundaries() {
    let dir = Direction::HigherIsBetter;
    assert_eq!(signal_status(Some(100.0), Some(100.0), dir), SignalStatus::Green);
    assert_eq!(signal_status(Some(90.0), Some(100.0), dir), SignalStatus::Yellow);
    assert_eq!(signal_status(Some(89.9), Some(100.0), dir), SignalStatus::Red);
    assert_eq!(signal_status(Some(120.0), Some(100.0), dir), SignalStatus::Green);
}

#[test]
fn lower_is_better_signal_boundaries() {
    let dir = Direction::LowerIsBetter;
    assert_eq!(signal_status(Some(2.0), Some(2.0), dir), SignalStatus::Green);
    assert_eq!(signal_status(Some(2.2), Some(2.0), dir), SignalStatus::Yellow);
    assert_eq!(signal_status(Some(2.21), Some(2.0), dir), SignalStatus::Red);
    assert_eq!(signal_status(Some(1.0), Some(2.0), dir), SignalStatus::Green);
}

#[test]
fn lower_is_better_zero_target_overshoot_is_red() {
    let dir = Direction::LowerIsBetter;
    assert_eq!(signal_status(Some(0.0), Some(0.0), dir), SignalStatus::Green);
    assert_eq!(signal_status(Some(0.1), Some(0.0), dir), SignalStatus::Red);
}

#[test]
fn missing_data_is_gray_not_red() {
    let dir = Direction::HigherIsBetter;
    assert_eq!(signal_status(None, Some(100.0), dir), SignalStatus::Gray);
    assert_eq!(signal_status(Some(50.0), None, dir), SignalStatus::Gray);
    assert_eq!(signal_status(None, None, dir), SignalStatus::Gray);
}

#[test]
fn higher_is_better_zero_target_is_gray() {
    assert_eq!(
        signal_status(Some(10.0), Some(0.0), Direction::HigherIsBetter),
        SignalStatus::Gray
    );
}

#[test]
fn progress_inverts_for_lower_is_better() {
    assert_eq!(progress_pct(Some(50.0), Some(100.0), Direction::HigherIsBetter), Some(50.0));
    assert_eq!(progress_pct(Some(1.0), Some(2.0), Direction::LowerIsBetter), Some(200.0));
    assert_eq!(progress_pct(Some(0.0), Some(2.0), Direction::LowerIsBetter), None);
    assert_eq!(progress_pct(Some(5.0), Some(0.0), Direction::HigherIsBetter), None);
}
