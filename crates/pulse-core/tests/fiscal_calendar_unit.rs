// crates/pulse-core/tests/fiscal_calendar_unit.rs
// ============================================================================
// Module: Fiscal Calendar Tests
// Description: Validate period parsing and fiscal-to-calendar expansion.
// Purpose: Pin quarter boundaries for off-January fiscal years.
// Dependencies: pulse-core
// ============================================================================

//! Unit tests for period labels and the fiscal calendar.

use pulse_core::FiscalCalendar;
use pulse_core::Month;
use pulse_core::Period;
use pulse_core::Quarter;
use pulse_core::SummaryPeriod;
use pulse_core::YearMonth;

fn ym(year: i32, month: u8) -> Result<YearMonth, Box<dyn std::error::Error>> {
    Ok(YearMonth::new(year, Month::from_raw(month).ok_or("month out of range")?))
}

#[test]
fn period_labels_parse() -> Result<(), Box<dyn std::error::Error>> {
    assert_eq!(Period::parse("FY")?, Period::FiscalYear);
    assert_eq!(Period::parse("Q3")?, Period::Quarter(Quarter::Q3));
    assert_eq!(Period::parse("M7")?, Period::Month(Month::from_raw(7).ok_or("month")?));
    assert!(Period::parse("Q5").is_err());
    assert!(Period::parse("M13").is_err());
    assert!(Period::parse("H1").is_err());
    Ok(())
}

#[test]
fn summary_period_labels_parse() -> Result<(), Box<dyn std::error::Error>> {
    assert_eq!(SummaryPeriod::parse("YTD")?, SummaryPeriod::YearToDate);
    assert_eq!(SummaryPeriod::parse("Last12m")?, SummaryPeriod::TrailingTwelve);
    assert_eq!(SummaryPeriod::parse("Q2")?, SummaryPeriod::Quarter(Quarter::Q2));
    assert!(SummaryPeriod::parse("M3").is_err());
    Ok(())
}

#[test]
fn january_calendar_quarters_align_with_calendar_year() -> Result<(), Box<dyn std::error::Error>> {
    let calendar = FiscalCalendar::january();
    assert_eq!(calendar.quarter_of(ym(2026, 2)?), (2026, Quarter::Q1));
    assert_eq!(calendar.quarter_of(ym(2026, 12)?), (2026, Quarter::Q4));
    let q1 = calendar.months_in(2026, Period::Quarter(Quarter::Q1));
    assert_eq!(q1, vec![ym(2026, 1)?, ym(2026, 2)?, ym(2026, 3)?]);
    Ok(())
}

#[test]
fn april_start_shifts_quarters_and_year_labels() -> Result<(), Box<dyn std::error::Error>> {
    let calendar = FiscalCalendar::new(Month::from_raw(4).ok_or("month")?);
    // February 2026 belongs to fiscal 2025, fourth quarter.
    assert_eq!(calendar.quarter_of(ym(2026, 2)?), (2025, Quarter::Q4));
    assert_eq!(calendar.quarter_of(ym(2026, 4)?), (2026, Quarter::Q1));
    let q4 = calendar.months_in(2025, Period::Quarter(Quarter::Q4));
    assert_eq!(q4, vec![ym(2026, 1)?, ym(2026, 2)?, ym(2026, 3)?]);
    let fy = calendar.months_in(2025, Period::FiscalYear);
    assert_eq!(fy.first().copied(), Some(ym(2025, 4)?));
    assert_eq!(fy.last().copied(), Some(ym(2026, 3)?));
    assert_eq!(fy.len(), 12);
    Ok(())
}

#[test]
fn ytd_runs_from_fiscal_start_through_today() -> Result<(), Box<dyn std::error::Error>> {
    let calendar = FiscalCalendar::new(Month::from_raw(4).ok_or("month")?);
    let months = calendar.summary_months(SummaryPeriod::YearToDate, ym(2026, 6)?);
    assert_eq!(months, vec![ym(2026, 4)?, ym(2026, 5)?, ym(2026, 6)?]);
    Ok(())
}

#[test]
fn trailing_twelve_ends_at_today() -> Result<(), Box<dyn std::error::Error>> {
    let calendar = FiscalCalendar::january();
    let months = calendar.summary_months(SummaryPeriod::TrailingTwelve, ym(2026, 3)?);
    assert_eq!(months.len(), 12);
    assert_eq!(months.first().copied(), Some(ym(2025, 4)?));
    assert_eq!(months.last().copied(), Some(ym(2026, 3)?));
    Ok(())
}

#[test]
fn year_month_arithmetic_crosses_year_boundaries() -> Result<(), Box<dyn std::error::Error>> {
    assert_eq!(ym(2025, 12)?.next(), ym(2026, 1)?);
    assert_eq!(ym(2026, 1)?.minus_months(1), ym(2025, 12)?);
    assert_eq!(ym(2026, 2)?.minus_months(14), ym(2024, 12)?);
    assert_eq!(ym(2026, 5)?.to_string(), "2026-05");
    Ok(())
}
