// crates/pulse-core/src/core/plan.rs
// ============================================================================
// Module: Pulse Business Plan
// Description: Objectives, key results, and initiatives.
// Purpose: Provide the load-time-validated OKR tree the aggregator renders.
// Dependencies: serde, thiserror, crate::core
// ============================================================================

//! ## Overview
//! The business plan is slow-changing configuration: objectives own an ordered
//! set of key results, each key result references exactly one catalog metric,
//! and initiatives tag objectives and key results for coverage reporting.
//! [`BusinessPlan::validate`] cross-checks every reference against the metric
//! catalog at load time so a mistyped metric key fails the deployment instead
//! of rendering silent `null`s.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::metric::MetricCatalog;
use crate::core::metric::MetricKey;
use crate::core::period::Quarter;

// ============================================================================
// SECTION: Identifiers
// ============================================================================

/// Key result identifier.
///
/// # Invariants
/// - Opaque UTF-8 string; no normalization or validation is applied by this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KrId(String);

impl KrId {
    /// Creates a new key result identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for KrId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for KrId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Objective identifier.
///
/// # Invariants
/// - Opaque UTF-8 string; no normalization or validation is applied by this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectiveId(String);

impl ObjectiveId {
    /// Creates a new objective identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ObjectiveId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Initiative identifier.
///
/// # Invariants
/// - Opaque UTF-8 string; no normalization or validation is applied by this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InitiativeId(String);

impl InitiativeId {
    /// Creates a new initiative identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InitiativeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for InitiativeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Period Labels
// ============================================================================

/// Static target label carried on a key result.
///
/// # Invariants
/// - Labels map 1:1 to the wire forms `Q1..Q4` and `FY`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum PeriodLabel {
    /// First fiscal quarter.
    Q1,
    /// Second fiscal quarter.
    Q2,
    /// Third fiscal quarter.
    Q3,
    /// Fourth fiscal quarter.
    Q4,
    /// Full fiscal year.
    FY,
}

impl PeriodLabel {
    /// Returns the stable wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Q1 => "Q1",
            Self::Q2 => "Q2",
            Self::Q3 => "Q3",
            Self::Q4 => "Q4",
            Self::FY => "FY",
        }
    }
}

impl From<Quarter> for PeriodLabel {
    fn from(quarter: Quarter) -> Self {
        match quarter {
            Quarter::Q1 => Self::Q1,
            Quarter::Q2 => Self::Q2,
            Quarter::Q3 => Self::Q3,
            Quarter::Q4 => Self::Q4,
        }
    }
}

impl fmt::Display for PeriodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Plan Nodes
// ============================================================================

/// A single measurable key result tied to a catalog metric.
///
/// # Invariants
/// - `metric_key` must resolve against the catalog (checked by
///   [`BusinessPlan::validate`]).
/// - `targets` holds static fallback targets used when no monthly target
///   points exist for the requested period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyResult {
    /// Key result identifier, unique across the plan.
    pub id: KrId,
    /// Human-readable title.
    pub title: String,
    /// Referenced catalog metric.
    pub metric_key: MetricKey,
    /// Static fallback targets keyed by period label.
    #[serde(default)]
    pub targets: BTreeMap<PeriodLabel, f64>,
}

/// An objective grouping an ordered set of key results.
///
/// # Invariants
/// - Purely organizational; carries no computed state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    /// Objective identifier, unique across the plan.
    pub id: ObjectiveId,
    /// Human-readable title.
    pub title: String,
    /// Ordered key results owned by the objective.
    #[serde(default)]
    pub key_results: Vec<KeyResult>,
}

/// Delivery status of an initiative.
///
/// # Invariants
/// - Variants are stable wire labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitiativeStatus {
    /// Scoped but not started.
    Planned,
    /// Actively being worked.
    Active,
    /// Delivery blocked.
    Blocked,
    /// Completed.
    Done,
}

/// A project or workstream tagged to an objective and key results.
///
/// # Invariants
/// - Participates in coverage only; never in the numeric rollup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Initiative {
    /// Initiative identifier, unique across the plan.
    pub id: InitiativeId,
    /// Human-readable title.
    pub title: String,
    /// Owning objective.
    pub objective_id: ObjectiveId,
    /// Tagged key results (may be empty).
    #[serde(default)]
    pub kr_ids: Vec<KrId>,
    /// Delivery status.
    pub status: InitiativeStatus,
    /// Accountable owner.
    pub owner: String,
    /// Fiscal quarter the initiative is slotted into.
    pub quarter: Quarter,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Plan validation errors.
///
/// # Invariants
/// - Variants name the offending plan node for actionable configuration fixes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// A key result references a metric key absent from the catalog.
    #[error("key result {kr_id} references unknown metric key {metric_key}")]
    UnknownMetric {
        /// Offending key result.
        kr_id: String,
        /// Unresolved metric key.
        metric_key: String,
    },
    /// Two key results share the same identifier.
    #[error("duplicate key result id: {0}")]
    DuplicateKr(String),
    /// Two objectives share the same identifier.
    #[error("duplicate objective id: {0}")]
    DuplicateObjective(String),
    /// An initiative references an unknown objective.
    #[error("initiative {initiative_id} references unknown objective {objective_id}")]
    UnknownObjective {
        /// Offending initiative.
        initiative_id: String,
        /// Unresolved objective.
        objective_id: String,
    },
    /// An initiative references an unknown key result.
    #[error("initiative {initiative_id} references unknown key result {kr_id}")]
    UnknownKr {
        /// Offending initiative.
        initiative_id: String,
        /// Unresolved key result.
        kr_id: String,
    },
}

// ============================================================================
// SECTION: Business Plan
// ============================================================================

/// The full OKR tree: objectives, their key results, and initiatives.
///
/// # Invariants
/// - After [`BusinessPlan::validate`] succeeds, every metric key resolves
///   against the catalog and all cross-references are sound.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessPlan {
    /// Objectives in display order.
    #[serde(default)]
    pub objectives: Vec<Objective>,
    /// Initiatives tagged to objectives and key results.
    #[serde(default)]
    pub initiatives: Vec<Initiative>,
}

impl BusinessPlan {
    /// Validates identifiers and catalog references.
    ///
    /// # Errors
    ///
    /// Returns the first [`PlanError`] encountered, naming the offending node.
    pub fn validate(&self, catalog: &MetricCatalog) -> Result<(), PlanError> {
        let mut objective_ids = BTreeSet::new();
        let mut kr_ids = BTreeSet::new();
        for objective in &self.objectives {
            if !objective_ids.insert(objective.id.clone()) {
                return Err(PlanError::DuplicateObjective(objective.id.as_str().to_string()));
            }
            for kr in &objective.key_results {
                if !kr_ids.insert(kr.id.clone()) {
                    return Err(PlanError::DuplicateKr(kr.id.as_str().to_string()));
                }
                if !catalog.contains(&kr.metric_key) {
                    return Err(PlanError::UnknownMetric {
                        kr_id: kr.id.as_str().to_string(),
                        metric_key: kr.metric_key.as_str().to_string(),
                    });
                }
            }
        }
        for initiative in &self.initiatives {
            if !objective_ids.contains(&initiative.objective_id) {
                return Err(PlanError::UnknownObjective {
                    initiative_id: initiative.id.as_str().to_string(),
                    objective_id: initiative.objective_id.as_str().to_string(),
                });
            }
            for kr_id in &initiative.kr_ids {
                if !kr_ids.contains(kr_id) {
                    return Err(PlanError::UnknownKr {
                        initiative_id: initiative.id.as_str().to_string(),
                        kr_id: kr_id.as_str().to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Iterates all key results across objectives in display order.
    pub fn key_results(&self) -> impl Iterator<Item = &KeyResult> {
        self.objectives.iter().flat_map(|objective| objective.key_results.iter())
    }

    /// Looks up a key result by identifier.
    #[must_use]
    pub fn find_kr(&self, id: &KrId) -> Option<&KeyResult> {
        self.key_results().find(|kr| &kr.id == id)
    }

    /// Returns initiatives tagged to an objective.
    #[must_use]
    pub fn initiatives_for(&self, objective_id: &ObjectiveId) -> Vec<&Initiative> {
        self.initiatives
            .iter()
            .filter(|initiative| &initiative.objective_id == objective_id)
            .collect()
    }

    /// Fraction of key results covered by at least one active initiative.
    ///
    /// Returns `None` when the plan holds no key results.
    #[must_use]
    pub fn initiative_coverage(&self) -> Option<f64> {
        let total = self.key_results().count();
        if total == 0 {
            return None;
        }
        let covered: BTreeSet<&KrId> = self
            .initiatives
            .iter()
            .filter(|initiative| initiative.status == InitiativeStatus::Active)
            .flat_map(|initiative| initiative.kr_ids.iter())
            .collect();
        let covered_count = self.key_results().filter(|kr| covered.contains(&kr.id)).count();
        #[allow(
            clippy::cast_precision_loss,
            reason = "Plan sizes are far below f64 integer precision."
        )]
        Some(covered_count as f64 / total as f64)
    }
}
