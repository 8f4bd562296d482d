// crates/pulse-core/src/interfaces/mod.rs
// ============================================================================
// Module: Pulse Interfaces
// Description: Backend-agnostic interfaces for measures, check-ins, and live values.
// Purpose: Define the contract surfaces between the rollup engine and persistence.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the rollup engine reads plan and actual data without
//! embedding backend details. Implementations must treat absent rows as
//! "unknown" (never zero) and keep reads bounded and single-round-trip; the
//! engine performs no retries or cross-request coordination of its own.

// ============================================================================
// SECTION: Imports
// ============================================================================

pub mod memory;

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::core::checkin::CheckIn;
use crate::core::checkin::NewCheckIn;
use crate::core::metric::Dimension;
use crate::core::metric::MetricDefinition;
use crate::core::metric::MetricKey;
use crate::core::period::YearMonth;
use crate::core::plan::KrId;
use crate::core::series::ActualPoint;
use crate::core::series::TargetPoint;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Malformed-input error naming the offending field.
///
/// # Invariants
/// - `field` names the request field a caller must correct.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid {field}: {message}")]
pub struct ValidationError {
    /// Offending request field.
    pub field: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl ValidationError {
    /// Creates a validation error for a named field.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Measure store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Messages avoid embedding raw row payloads.
#[derive(Debug, Error, Clone)]
pub enum StoreError {
    /// Store I/O error.
    #[error("measure store io error: {0}")]
    Io(String),
    /// Database engine error.
    #[error("measure store db error: {0}")]
    Db(String),
    /// Stored data is invalid.
    #[error("measure store invalid data: {0}")]
    Invalid(String),
    /// Stored data fails integrity checks.
    #[error("measure store corruption: {0}")]
    Corrupt(String),
}

/// Metric registry errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, Clone)]
pub enum RegistryError {
    /// Registry I/O error.
    #[error("metric registry io error: {0}")]
    Io(String),
    /// Registry invalid data error.
    #[error("metric registry invalid data: {0}")]
    Invalid(String),
    /// Registration conflict (duplicate metric key).
    #[error("metric registry conflict: {0}")]
    Conflict(String),
}

/// Check-in ledger errors.
///
/// # Invariants
/// - Validation failures and store failures stay distinguishable for HTTP mapping.
#[derive(Debug, Error)]
pub enum CheckInError {
    /// Write payload failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Ledger persistence failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// SECTION: Measure Store
// ============================================================================

/// Inclusive month range for point queries.
///
/// # Invariants
/// - `from <= to`; constructors normalize reversed bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    /// First month of the range.
    pub from: YearMonth,
    /// Last month of the range.
    pub to: YearMonth,
}

impl MonthRange {
    /// Creates a range, swapping reversed bounds.
    #[must_use]
    pub fn new(from: YearMonth, to: YearMonth) -> Self {
        if from <= to {
            Self {
                from,
                to,
            }
        } else {
            Self {
                from: to,
                to: from,
            }
        }
    }

    /// Returns true when the range contains the month.
    #[must_use]
    pub fn contains(&self, month: YearMonth) -> bool {
        self.from <= month && month <= self.to
    }
}

impl fmt::Display for MonthRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.from, self.to)
    }
}

/// Read/write access to monthly target and actual points.
///
/// Target and actual rows are written by ingestion jobs outside this core;
/// the rollup engine treats the store as a pure data source.
pub trait MeasureStore: Send + Sync {
    /// Reads target points for a metric over a month range.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn target_points(
        &self,
        metric_key: &MetricKey,
        dimension: Option<&Dimension>,
        range: MonthRange,
    ) -> Result<Vec<TargetPoint>, StoreError>;

    /// Reads actual points for a metric over a month range.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn actual_points(
        &self,
        metric_key: &MetricKey,
        dimension: Option<&Dimension>,
        range: MonthRange,
    ) -> Result<Vec<ActualPoint>, StoreError>;

    /// Inserts or replaces a monthly target point.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn upsert_target(&self, point: &TargetPoint) -> Result<(), StoreError>;

    /// Inserts or replaces a monthly actual point.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn upsert_actual(&self, point: &ActualPoint) -> Result<(), StoreError>;

    /// Reports store readiness for liveness/readiness probes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store is unavailable.
    fn readiness(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Metric Registry
// ============================================================================

/// Persistent registry of metric definitions.
pub trait MetricRegistry: Send + Sync {
    /// Loads all persisted metric definitions.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when loading fails.
    fn load_definitions(&self) -> Result<Vec<MetricDefinition>, RegistryError>;

    /// Registers a metric definition.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Conflict`] when the key is already registered.
    fn register(&self, definition: &MetricDefinition) -> Result<(), RegistryError>;
}

// ============================================================================
// SECTION: Check-in Store
// ============================================================================

/// Append-only check-in ledger.
pub trait CheckInStore: Send + Sync {
    /// Validates and appends a check-in, returning the persisted row.
    ///
    /// # Errors
    ///
    /// Returns [`CheckInError::Validation`] for out-of-range payloads and
    /// [`CheckInError::Store`] when persistence fails.
    fn append(&self, new: &NewCheckIn) -> Result<CheckIn, CheckInError>;

    /// Returns the most recent check-in per key result for a year.
    ///
    /// Recency is `created_at` descending with ledger row id as tie-breaker.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn latest_per_kr(&self, year: i32) -> Result<BTreeMap<KrId, CheckIn>, StoreError>;

    /// Lists check-ins for one key result, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn for_kr(&self, kr_id: &KrId, year: Option<i32>) -> Result<Vec<CheckIn>, StoreError>;
}

// ============================================================================
// SECTION: Live Values
// ============================================================================

/// Domain-specific source of live metric snapshots (MRR, churn, headcount, …).
///
/// A missing entry for a metric degrades that metric to a gray signal in the
/// dashboard; it never fails the whole request.
pub trait LiveValueSource: Send + Sync {
    /// Returns current live values keyed by metric.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the underlying queries fail.
    fn live_values(
        &self,
        dimension: Option<&Dimension>,
    ) -> Result<BTreeMap<MetricKey, f64>, StoreError>;
}
