// crates/pulse-core/src/core/checkin.rs
// ============================================================================
// Module: Pulse Check-in Ledger Model
// Description: Append-only confidence/commentary entries per key result.
// Purpose: Capture human check-ins without mutation or deletion.
// Dependencies: serde, crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! A check-in is a timestamped human statement about a key result for a
//! period: a confidence score in 0..=100 plus optional commentary, blockers,
//! and next actions. The ledger is append-only; corrections are new rows and
//! "current state" is simply the most recent entry per key result.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::plan::KrId;
use crate::interfaces::ValidationError;

// ============================================================================
// SECTION: Period Scope
// ============================================================================

/// Period granularity a check-in refers to.
///
/// # Invariants
/// - Variants are stable wire labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckInPeriodType {
    /// A single month; `period_value` is 1..=12.
    Month,
    /// A fiscal quarter; `period_value` is 1..=4.
    Quarter,
    /// The full year; `period_value` is ignored and normalized to 1.
    Year,
}

impl CheckInPeriodType {
    /// Returns true when `period_value` is valid for this granularity.
    #[must_use]
    pub const fn accepts(self, period_value: u8) -> bool {
        match self {
            Self::Month => period_value >= 1 && period_value <= 12,
            Self::Quarter => period_value >= 1 && period_value <= 4,
            Self::Year => period_value == 1,
        }
    }
}

// ============================================================================
// SECTION: Check-in Rows
// ============================================================================

/// Write payload for a new check-in.
///
/// # Invariants
/// - `confidence` must lie in 0..=100; enforced by [`NewCheckIn::validate`]
///   at the write boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCheckIn {
    /// Key result the check-in refers to.
    pub kr_id: KrId,
    /// Fiscal year the check-in refers to.
    pub year: i32,
    /// Period granularity.
    pub period_type: CheckInPeriodType,
    /// Period value within the granularity.
    pub period_value: u8,
    /// Confidence score in 0..=100.
    pub confidence: u8,
    /// Optional free-form commentary.
    #[serde(default)]
    pub commentary: Option<String>,
    /// Optional blockers note.
    #[serde(default)]
    pub blockers: Option<String>,
    /// Optional next-actions note.
    #[serde(default)]
    pub next_actions: Option<String>,
    /// Author of the check-in.
    pub created_by: String,
}

impl NewCheckIn {
    /// Validates the payload at the write boundary.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] naming the offending field when the
    /// confidence or period value is out of range or a required field is empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.confidence > 100 {
            return Err(ValidationError::new(
                "confidence",
                format!("must be within 0..=100, got {}", self.confidence),
            ));
        }
        if !self.period_type.accepts(self.period_value) {
            return Err(ValidationError::new(
                "period_value",
                format!("out of range for period type: {}", self.period_value),
            ));
        }
        if self.kr_id.as_str().is_empty() {
            return Err(ValidationError::new("kr_id", "must not be empty"));
        }
        if self.created_by.trim().is_empty() {
            return Err(ValidationError::new("created_by", "must not be empty"));
        }
        Ok(())
    }
}

/// A persisted check-in ledger row.
///
/// # Invariants
/// - Rows are never mutated or deleted after append.
/// - `created_at` is unix epoch milliseconds assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    /// Ledger row identifier assigned by the store.
    pub id: i64,
    /// Key result the check-in refers to.
    pub kr_id: KrId,
    /// Fiscal year the check-in refers to.
    pub year: i32,
    /// Period granularity.
    pub period_type: CheckInPeriodType,
    /// Period value within the granularity.
    pub period_value: u8,
    /// Confidence score in 0..=100.
    pub confidence: u8,
    /// Optional free-form commentary.
    pub commentary: Option<String>,
    /// Optional blockers note.
    pub blockers: Option<String>,
    /// Optional next-actions note.
    pub next_actions: Option<String>,
    /// Author of the check-in.
    pub created_by: String,
    /// Append timestamp in unix epoch milliseconds.
    pub created_at: i64,
}
