// crates/pulse-core/src/core/period.rs
// ============================================================================
// Module: Pulse Periods and Fiscal Calendar
// Description: Month, quarter, and period labels plus fiscal-year resolution.
// Purpose: Provide deterministic period-to-month expansion for rollups.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Rollups aggregate monthly points into larger periods. This module defines
//! the period vocabulary (`M1..M12`, `Q1..Q4`, `FY`, plus the dashboard
//! summary periods `YTD` and `Last12m`) and the [`FiscalCalendar`] that maps
//! a fiscal period onto concrete calendar months. Quarter boundaries honor an
//! explicit fiscal-year start month rather than assuming January, so target
//! fallback resolution stays correct for off-calendar fiscal years.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Parse errors for period and month labels.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PeriodParseError {
    /// Unknown period label.
    #[error("unknown period label: {0}")]
    UnknownLabel(String),
    /// Month value outside 1..=12.
    #[error("month out of range: {0}")]
    MonthOutOfRange(u8),
}

// ============================================================================
// SECTION: Month
// ============================================================================

/// Calendar month number.
///
/// # Invariants
/// - Always within 1..=12; enforced at construction and deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Month(u8);

impl Month {
    /// January.
    pub const JANUARY: Self = Self(1);
    /// December.
    pub const DECEMBER: Self = Self(12);

    /// Creates a month from a 1-based value (returns `None` when out of range).
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        if raw >= 1 && raw <= 12 { Some(Self(raw)) } else { None }
    }

    /// Returns the 1-based month number.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Returns the 0-based month index.
    #[must_use]
    pub const fn index0(self) -> u8 {
        self.0 - 1
    }
}

impl TryFrom<u8> for Month {
    type Error = PeriodParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_raw(value).ok_or(PeriodParseError::MonthOutOfRange(value))
    }
}

impl From<Month> for u8 {
    fn from(value: Month) -> Self {
        value.get()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M{}", self.0)
    }
}

// ============================================================================
// SECTION: Quarter
// ============================================================================

/// Fiscal quarter within a fiscal year.
///
/// # Invariants
/// - Variants map 1:1 to the wire labels `Q1..Q4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Quarter {
    /// First fiscal quarter.
    Q1,
    /// Second fiscal quarter.
    Q2,
    /// Third fiscal quarter.
    Q3,
    /// Fourth fiscal quarter.
    Q4,
}

impl Quarter {
    /// All quarters in fiscal order.
    pub const ALL: [Self; 4] = [Self::Q1, Self::Q2, Self::Q3, Self::Q4];

    /// Creates a quarter from a 1-based index (returns `None` when out of range).
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(Self::Q1),
            2 => Some(Self::Q2),
            3 => Some(Self::Q3),
            4 => Some(Self::Q4),
            _ => None,
        }
    }

    /// Returns the 1-based quarter index.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Q1 => 1,
            Self::Q2 => 2,
            Self::Q3 => 3,
            Self::Q4 => 4,
        }
    }

    /// Returns the stable wire label for the quarter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Q1 => "Q1",
            Self::Q2 => "Q2",
            Self::Q3 => "Q3",
            Self::Q4 => "Q4",
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Period
// ============================================================================

/// Target-resolution period within a fiscal year.
///
/// # Invariants
/// - Labels parse from and render to `M1..M12`, `Q1..Q4`, and `FY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    /// A single fiscal month (1-based offset into the fiscal year).
    Month(Month),
    /// A fiscal quarter.
    Quarter(Quarter),
    /// The full fiscal year.
    FiscalYear,
}

impl Period {
    /// Parses a period label (`M1..M12`, `Q1..Q4`, `FY`).
    ///
    /// # Errors
    ///
    /// Returns [`PeriodParseError::UnknownLabel`] for any other label.
    pub fn parse(label: &str) -> Result<Self, PeriodParseError> {
        if label == "FY" {
            return Ok(Self::FiscalYear);
        }
        if let Some(rest) = label.strip_prefix('Q')
            && let Ok(index) = rest.parse::<u8>()
            && let Some(quarter) = Quarter::from_index(index)
        {
            return Ok(Self::Quarter(quarter));
        }
        if let Some(rest) = label.strip_prefix('M')
            && let Ok(raw) = rest.parse::<u8>()
            && let Some(month) = Month::from_raw(raw)
        {
            return Ok(Self::Month(month));
        }
        Err(PeriodParseError::UnknownLabel(label.to_string()))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Month(month) => month.fmt(f),
            Self::Quarter(quarter) => quarter.fmt(f),
            Self::FiscalYear => f.write_str("FY"),
        }
    }
}

/// Dashboard summary period requested by clients.
///
/// # Invariants
/// - Labels parse from and render to `YTD`, `Q1..Q4`, and `Last12m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryPeriod {
    /// Fiscal year-to-date through the current month.
    YearToDate,
    /// A specific fiscal quarter of the current fiscal year.
    Quarter(Quarter),
    /// Trailing twelve calendar months ending at the current month.
    TrailingTwelve,
}

impl SummaryPeriod {
    /// Parses a summary period label (`YTD`, `Q1..Q4`, `Last12m`).
    ///
    /// # Errors
    ///
    /// Returns [`PeriodParseError::UnknownLabel`] for any other label.
    pub fn parse(label: &str) -> Result<Self, PeriodParseError> {
        match label {
            "YTD" => Ok(Self::YearToDate),
            "Last12m" => Ok(Self::TrailingTwelve),
            other => match Period::parse(other) {
                Ok(Period::Quarter(quarter)) => Ok(Self::Quarter(quarter)),
                _ => Err(PeriodParseError::UnknownLabel(label.to_string())),
            },
        }
    }

    /// Returns the stable wire label for the summary period.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::YearToDate => "YTD",
            Self::Quarter(quarter) => quarter.as_str(),
            Self::TrailingTwelve => "Last12m",
        }
    }
}

impl fmt::Display for SummaryPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Year-Month
// ============================================================================

/// A concrete calendar month in a concrete calendar year.
///
/// # Invariants
/// - Ordering is chronological (year first, then month).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct YearMonth {
    /// Calendar year.
    pub year: i32,
    /// Calendar month.
    pub month: Month,
}

impl YearMonth {
    /// Creates a year-month pair.
    #[must_use]
    pub const fn new(year: i32, month: Month) -> Self {
        Self {
            year,
            month,
        }
    }

    /// Returns the month immediately after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        if self.month.get() == 12 {
            Self {
                year: self.year + 1,
                month: Month::JANUARY,
            }
        } else {
            Self {
                year: self.year,
                month: Month(self.month.get() + 1),
            }
        }
    }

    /// Returns the month `count` calendar months before this one.
    #[must_use]
    pub const fn minus_months(self, count: u16) -> Self {
        let total = (self.year as i64) * 12 + (self.month.index0() as i64) - (count as i64);
        let year = total.div_euclid(12);
        let index0 = total.rem_euclid(12);
        #[allow(
            clippy::cast_possible_truncation,
            reason = "index0 is in 0..12 and year fits i32 for any supported input."
        )]
        Self {
            year: year as i32,
            month: Month(index0 as u8 + 1),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month.get())
    }
}

// ============================================================================
// SECTION: Fiscal Calendar
// ============================================================================

/// Fiscal calendar anchored at an explicit start month.
///
/// # Invariants
/// - Fiscal years are labeled by the calendar year containing their first month.
/// - All period-to-month expansions are pure and deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalCalendar {
    /// Calendar month on which the fiscal year begins.
    pub start_month: Month,
}

impl Default for FiscalCalendar {
    fn default() -> Self {
        Self::january()
    }
}

impl FiscalCalendar {
    /// Creates a calendar with the given fiscal-year start month.
    #[must_use]
    pub const fn new(start_month: Month) -> Self {
        Self {
            start_month,
        }
    }

    /// Creates the default calendar-year-aligned fiscal calendar.
    #[must_use]
    pub const fn january() -> Self {
        Self::new(Month::JANUARY)
    }

    /// Returns the 0-based fiscal offset of a calendar month.
    #[must_use]
    pub const fn fiscal_offset(&self, month: Month) -> u8 {
        (month.index0() + 12 - self.start_month.index0()) % 12
    }

    /// Returns the fiscal year containing a calendar month.
    #[must_use]
    pub const fn fiscal_year_of(&self, at: YearMonth) -> i32 {
        if at.month.get() >= self.start_month.get() { at.year } else { at.year - 1 }
    }

    /// Returns the fiscal year and quarter containing a calendar month.
    #[must_use]
    pub const fn quarter_of(&self, at: YearMonth) -> (i32, Quarter) {
        let offset = self.fiscal_offset(at.month);
        let quarter = match Quarter::from_index(offset / 3 + 1) {
            Some(quarter) => quarter,
            // fiscal_offset is < 12, so the index is always 1..=4.
            None => Quarter::Q4,
        };
        (self.fiscal_year_of(at), quarter)
    }

    /// Returns the calendar month at a 0-based fiscal offset of a fiscal year.
    #[must_use]
    pub const fn month_at(&self, fiscal_year: i32, offset: u8) -> YearMonth {
        let raw = self.start_month.index0() + offset;
        let year = fiscal_year + (raw / 12) as i32;
        let month = match Month::from_raw(raw % 12 + 1) {
            Some(month) => month,
            // raw % 12 + 1 is always 1..=12.
            None => Month::JANUARY,
        };
        YearMonth::new(year, month)
    }

    /// Expands a target-resolution period into its calendar months.
    #[must_use]
    pub fn months_in(&self, fiscal_year: i32, period: Period) -> Vec<YearMonth> {
        match period {
            Period::Month(month) => vec![self.month_at(fiscal_year, month.index0())],
            Period::Quarter(quarter) => {
                let base = (quarter.index() - 1) * 3;
                (base .. base + 3).map(|offset| self.month_at(fiscal_year, offset)).collect()
            }
            Period::FiscalYear => {
                (0 .. 12).map(|offset| self.month_at(fiscal_year, offset)).collect()
            }
        }
    }

    /// Expands a dashboard summary period into its calendar months.
    ///
    /// `today` is the request's single "now"; callers resolve it once per
    /// request so a render never straddles a period boundary mid-flight.
    #[must_use]
    pub fn summary_months(&self, period: SummaryPeriod, today: YearMonth) -> Vec<YearMonth> {
        match period {
            SummaryPeriod::YearToDate => {
                let fiscal_year = self.fiscal_year_of(today);
                (0 ..= self.fiscal_offset(today.month))
                    .map(|offset| self.month_at(fiscal_year, offset))
                    .collect()
            }
            SummaryPeriod::Quarter(quarter) => {
                self.months_in(self.fiscal_year_of(today), Period::Quarter(quarter))
            }
            SummaryPeriod::TrailingTwelve => {
                let mut months = Vec::with_capacity(12);
                let mut cursor = today.minus_months(11);
                for _ in 0 .. 12 {
                    months.push(cursor);
                    cursor = cursor.next();
                }
                months
            }
        }
    }
}
