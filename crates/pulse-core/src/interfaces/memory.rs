// crates/pulse-core/src/interfaces/memory.rs
// ============================================================================
// Module: Pulse In-Memory Stores
// Description: In-memory implementations of the store interfaces.
// Purpose: Provide deterministic fixtures for unit and integration tests.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! In-memory stores back tests and examples without a database. They honor
//! the same semantics as the durable adapters: absent rows are unknown, the
//! check-in ledger is append-only, and timestamps come from the injected
//! clock so ordering assertions never race wall-clock time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use crate::core::checkin::CheckIn;
use crate::core::checkin::NewCheckIn;
use crate::core::metric::Dimension;
use crate::core::metric::MetricDefinition;
use crate::core::metric::MetricKey;
use crate::core::plan::KrId;
use crate::core::series::ActualPoint;
use crate::core::series::TargetPoint;
use crate::core::time::Clock;
use crate::core::time::unix_millis;
use crate::interfaces::CheckInError;
use crate::interfaces::CheckInStore;
use crate::interfaces::LiveValueSource;
use crate::interfaces::MeasureStore;
use crate::interfaces::MetricRegistry;
use crate::interfaces::MonthRange;
use crate::interfaces::RegistryError;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Measure Store
// ============================================================================

/// Mutex-guarded in-memory measure store.
///
/// # Invariants
/// - Upserts replace any point with the same `(month, metric, dimension)` key.
#[derive(Debug, Default, Clone)]
pub struct InMemoryMeasureStore {
    /// Stored target points.
    targets: Arc<Mutex<Vec<TargetPoint>>>,
    /// Stored actual points.
    actuals: Arc<Mutex<Vec<ActualPoint>>>,
}

impl InMemoryMeasureStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Returns true when a stored dimension matches the requested one.
fn dimension_matches(stored: Option<&Dimension>, requested: Option<&Dimension>) -> bool {
    match requested {
        Some(dimension) => stored == Some(dimension),
        None => stored.is_none(),
    }
}

impl MeasureStore for InMemoryMeasureStore {
    fn target_points(
        &self,
        metric_key: &MetricKey,
        dimension: Option<&Dimension>,
        range: MonthRange,
    ) -> Result<Vec<TargetPoint>, StoreError> {
        let guard = self.targets.lock().unwrap_or_else(PoisonError::into_inner);
        let mut points: Vec<TargetPoint> = guard
            .iter()
            .filter(|point| {
                &point.metric_key == metric_key
                    && dimension_matches(point.dimension.as_ref(), dimension)
                    && range.contains(point.month)
            })
            .cloned()
            .collect();
        points.sort_by_key(|point| point.month);
        Ok(points)
    }

    fn actual_points(
        &self,
        metric_key: &MetricKey,
        dimension: Option<&Dimension>,
        range: MonthRange,
    ) -> Result<Vec<ActualPoint>, StoreError> {
        let guard = self.actuals.lock().unwrap_or_else(PoisonError::into_inner);
        let mut points: Vec<ActualPoint> = guard
            .iter()
            .filter(|point| {
                &point.metric_key == metric_key
                    && dimension_matches(point.dimension.as_ref(), dimension)
                    && range.contains(point.month)
            })
            .cloned()
            .collect();
        points.sort_by_key(|point| point.month);
        Ok(points)
    }

    fn upsert_target(&self, point: &TargetPoint) -> Result<(), StoreError> {
        let mut guard = self.targets.lock().unwrap_or_else(PoisonError::into_inner);
        guard.retain(|existing| {
            !(existing.month == point.month
                && existing.metric_key == point.metric_key
                && existing.dimension == point.dimension)
        });
        guard.push(point.clone());
        Ok(())
    }

    fn upsert_actual(&self, point: &ActualPoint) -> Result<(), StoreError> {
        let mut guard = self.actuals.lock().unwrap_or_else(PoisonError::into_inner);
        guard.retain(|existing| {
            !(existing.month == point.month
                && existing.metric_key == point.metric_key
                && existing.dimension == point.dimension)
        });
        guard.push(point.clone());
        Ok(())
    }
}

// ============================================================================
// SECTION: Metric Registry
// ============================================================================

/// Mutex-guarded in-memory metric registry.
///
/// # Invariants
/// - Duplicate registrations conflict, matching the durable adapter.
#[derive(Debug, Default, Clone)]
pub struct InMemoryMetricRegistry {
    /// Registered definitions keyed by metric key.
    definitions: Arc<Mutex<BTreeMap<MetricKey, MetricDefinition>>>,
}

impl InMemoryMetricRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetricRegistry for InMemoryMetricRegistry {
    fn load_definitions(&self) -> Result<Vec<MetricDefinition>, RegistryError> {
        let guard = self.definitions.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.values().cloned().collect())
    }

    fn register(&self, definition: &MetricDefinition) -> Result<(), RegistryError> {
        let mut guard = self.definitions.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.contains_key(&definition.key) {
            return Err(RegistryError::Conflict(definition.key.as_str().to_string()));
        }
        guard.insert(definition.key.clone(), definition.clone());
        Ok(())
    }
}

// ============================================================================
// SECTION: Check-in Ledger
// ============================================================================

/// Mutex-guarded append-only in-memory check-in ledger.
///
/// # Invariants
/// - Rows are appended with monotonically increasing ids and never mutated.
pub struct InMemoryCheckInStore {
    /// Appended ledger rows in insertion order.
    rows: Mutex<Vec<CheckIn>>,
    /// Clock assigning `created_at` timestamps.
    clock: Arc<dyn Clock>,
}

impl InMemoryCheckInStore {
    /// Creates an empty ledger using the given clock.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            clock,
        }
    }
}

impl CheckInStore for InMemoryCheckInStore {
    fn append(&self, new: &NewCheckIn) -> Result<CheckIn, CheckInError> {
        new.validate()?;
        let mut guard = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        let id = i64::try_from(guard.len())
            .map_err(|_| StoreError::Invalid("ledger row count overflow".to_string()))?
            + 1;
        let row = CheckIn {
            id,
            kr_id: new.kr_id.clone(),
            year: new.year,
            period_type: new.period_type,
            period_value: new.period_value,
            confidence: new.confidence,
            commentary: new.commentary.clone(),
            blockers: new.blockers.clone(),
            next_actions: new.next_actions.clone(),
            created_by: new.created_by.clone(),
            created_at: unix_millis(self.clock.now()),
        };
        guard.push(row.clone());
        Ok(row)
    }

    fn latest_per_kr(&self, year: i32) -> Result<BTreeMap<KrId, CheckIn>, StoreError> {
        let guard = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        let mut latest: BTreeMap<KrId, CheckIn> = BTreeMap::new();
        for row in guard.iter().filter(|row| row.year == year) {
            match latest.get(&row.kr_id) {
                Some(existing)
                    if (existing.created_at, existing.id) >= (row.created_at, row.id) => {}
                _ => {
                    latest.insert(row.kr_id.clone(), row.clone());
                }
            }
        }
        Ok(latest)
    }

    fn for_kr(&self, kr_id: &KrId, year: Option<i32>) -> Result<Vec<CheckIn>, StoreError> {
        let guard = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        let mut rows: Vec<CheckIn> = guard
            .iter()
            .filter(|row| &row.kr_id == kr_id && year.is_none_or(|value| row.year == value))
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }
}

// ============================================================================
// SECTION: Live Values
// ============================================================================

/// Static live-value map for tests and fixtures.
///
/// # Invariants
/// - Values are returned as-is regardless of dimension.
#[derive(Debug, Default, Clone)]
pub struct StaticLiveValues {
    /// Live values keyed by metric.
    values: BTreeMap<MetricKey, f64>,
}

impl StaticLiveValues {
    /// Creates a source from `(metric, value)` pairs.
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = (MetricKey, f64)>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }
}

impl LiveValueSource for StaticLiveValues {
    fn live_values(
        &self,
        _dimension: Option<&Dimension>,
    ) -> Result<BTreeMap<MetricKey, f64>, StoreError> {
        Ok(self.values.clone())
    }
}
