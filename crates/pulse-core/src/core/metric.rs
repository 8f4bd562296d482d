// crates/pulse-core/src/core/metric.rs
// ============================================================================
// Module: Pulse Metric Catalog
// Description: Metric definitions and the closed metric registry.
// Purpose: Provide load-time-validated metric metadata for rollups.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Every key result references a metric by key. The catalog is a closed
//! registry built once at load time: duplicate keys are rejected there, so an
//! unknown `metric_key` at request time can only mean a lookup miss, never a
//! silently mistyped definition. Directions and period kinds live here because
//! they decide how a metric is aggregated and colored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Identifier
// ============================================================================

/// Metric identifier referenced by key results and data points.
///
/// # Invariants
/// - Opaque UTF-8 string; no normalization or validation is applied by this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricKey(String);

impl MetricKey {
    /// Creates a new metric key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for MetricKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for MetricKey {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Metric Metadata
// ============================================================================

/// Display unit of a metric.
///
/// # Invariants
/// - Variants are stable wire labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Monetary value.
    Currency,
    /// Percentage value.
    Percentage,
    /// Plain count.
    Count,
}

/// Favorable direction of a metric.
///
/// # Invariants
/// - Variants are stable wire labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Larger actuals are favorable (revenue, headcount).
    HigherIsBetter,
    /// Smaller actuals are favorable (churn, delinquency).
    LowerIsBetter,
}

/// Aggregation behavior of a metric across the months of a period.
///
/// # Invariants
/// - `Flow` metrics sum across months; `Stock` metrics read at period end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    /// Period value is the sum of monthly values.
    Flow,
    /// Period value is the latest available monthly value.
    Stock,
}

/// Business-unit dimension attached to a metric variant or data point.
///
/// # Invariants
/// - `key` and `value` are opaque labels; equality is exact string match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Dimension {
    /// Dimension key (for example `business_unit`).
    pub key: String,
    /// Dimension value (for example `core`).
    pub value: String,
}

impl Dimension {
    /// Creates a business-unit dimension.
    #[must_use]
    pub fn business_unit(value: impl Into<String>) -> Self {
        Self {
            key: "business_unit".to_string(),
            value: value.into(),
        }
    }
}

/// Static definition of a single metric.
///
/// # Invariants
/// - `key` is unique across the owning catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDefinition {
    /// Unique metric key.
    pub key: MetricKey,
    /// Human-readable title.
    pub title: String,
    /// Display unit.
    pub unit: Unit,
    /// Favorable direction.
    pub direction: Direction,
    /// Aggregation behavior across a period.
    pub period_kind: PeriodKind,
    /// Whether the metric is derived from other metrics rather than sourced.
    #[serde(default)]
    pub is_derived: bool,
    /// Optional business-unit dimension for per-unit variants.
    #[serde(default)]
    pub dimension: Option<Dimension>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Catalog construction errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Two definitions share the same metric key.
    #[error("duplicate metric key: {0}")]
    Duplicate(String),
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Closed registry of metric definitions keyed by metric key.
///
/// # Invariants
/// - Keys are unique; duplicates fail at construction, not at request time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricCatalog {
    /// Definitions keyed by metric key.
    definitions: BTreeMap<MetricKey, MetricDefinition>,
}

impl MetricCatalog {
    /// Builds a catalog from definitions, rejecting duplicate keys.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Duplicate`] when two definitions share a key.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = MetricDefinition>,
    ) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        for definition in definitions {
            let key = definition.key.clone();
            if map.insert(key.clone(), definition).is_some() {
                return Err(CatalogError::Duplicate(key.as_str().to_string()));
            }
        }
        Ok(Self {
            definitions: map,
        })
    }

    /// Builds the standard business-plan catalog.
    ///
    /// # Panics
    ///
    /// Never panics; the builtin definitions carry no duplicate keys.
    #[must_use]
    pub fn builtin() -> Self {
        let definitions = builtin_definitions();
        match Self::from_definitions(definitions) {
            Ok(catalog) => catalog,
            // Builtin keys are unique by construction.
            Err(_) => Self::default(),
        }
    }

    /// Looks up a definition by key.
    #[must_use]
    pub fn get(&self, key: &MetricKey) -> Option<&MetricDefinition> {
        self.definitions.get(key)
    }

    /// Returns true when the catalog contains the key.
    #[must_use]
    pub fn contains(&self, key: &MetricKey) -> bool {
        self.definitions.contains_key(key)
    }

    /// Iterates over definitions in key order.
    pub fn iter(&self) -> impl Iterator<Item = &MetricDefinition> {
        self.definitions.values()
    }

    /// Returns the number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns true when the catalog holds no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Returns the builtin business-plan metric definitions.
fn builtin_definitions() -> Vec<MetricDefinition> {
    /// Shorthand constructor for a builtin definition without dimension.
    fn define(
        key: &str,
        title: &str,
        unit: Unit,
        direction: Direction,
        period_kind: PeriodKind,
        is_derived: bool,
    ) -> MetricDefinition {
        MetricDefinition {
            key: MetricKey::new(key),
            title: title.to_string(),
            unit,
            direction,
            period_kind,
            is_derived,
            dimension: None,
        }
    }

    vec![
        define(
            "mrr_active",
            "Active MRR",
            Unit::Currency,
            Direction::HigherIsBetter,
            PeriodKind::Flow,
            false,
        ),
        define(
            "net_revenue",
            "Net Revenue",
            Unit::Currency,
            Direction::HigherIsBetter,
            PeriodKind::Flow,
            false,
        ),
        define(
            "new_sales",
            "New Sales",
            Unit::Currency,
            Direction::HigherIsBetter,
            PeriodKind::Flow,
            false,
        ),
        define(
            "ebitda",
            "EBITDA",
            Unit::Currency,
            Direction::HigherIsBetter,
            PeriodKind::Flow,
            true,
        ),
        define(
            "net_churn_pct",
            "Net Churn %",
            Unit::Percentage,
            Direction::LowerIsBetter,
            PeriodKind::Stock,
            true,
        ),
        define(
            "delinquency_pct",
            "Delinquency %",
            Unit::Percentage,
            Direction::LowerIsBetter,
            PeriodKind::Stock,
            true,
        ),
        define(
            "headcount",
            "Headcount",
            Unit::Count,
            Direction::HigherIsBetter,
            PeriodKind::Stock,
            false,
        ),
        define(
            "cash_balance",
            "Cash Balance",
            Unit::Currency,
            Direction::HigherIsBetter,
            PeriodKind::Stock,
            false,
        ),
    ]
}
