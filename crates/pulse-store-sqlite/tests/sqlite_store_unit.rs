// crates/pulse-store-sqlite/tests/sqlite_store_unit.rs
// ============================================================================
// Module: SQLite Store Tests
// Description: Validate durable point storage, registry, and ledger behavior.
// Purpose: Ensure the SQLite adapter honors the core store contracts.
// Dependencies: pulse-store-sqlite, pulse-core, tempfile, time
// ============================================================================

//! Integration tests for the `SQLite` Pulse store.

use std::sync::Arc;
use std::time::Duration;

use pulse_core::ActualPoint;
use pulse_core::CheckInError;
use pulse_core::CheckInPeriodType;
use pulse_core::CheckInStore;
use pulse_core::Dimension;
use pulse_core::FixedClock;
use pulse_core::KrId;
use pulse_core::MeasureStore;
use pulse_core::MetricCatalog;
use pulse_core::MetricKey;
use pulse_core::MetricRegistry;
use pulse_core::Month;
use pulse_core::MonthRange;
use pulse_core::NewCheckIn;
use pulse_core::RegistryError;
use pulse_core::TargetPoint;
use pulse_core::YearMonth;
use pulse_store_sqlite::SqlitePulseStore;
use pulse_store_sqlite::SqliteStoreConfig;
use tempfile::TempDir;
use time::OffsetDateTime;

fn ym(year: i32, month: u8) -> Result<YearMonth, Box<dyn std::error::Error>> {
    Ok(YearMonth::new(year, Month::from_raw(month).ok_or("month out of range")?))
}

fn open_store() -> Result<(TempDir, Arc<FixedClock>, SqlitePulseStore), Box<dyn std::error::Error>>
{
    let dir = TempDir::new()?;
    let clock = Arc::new(FixedClock::new(OffsetDateTime::UNIX_EPOCH));
    let config = SqliteStoreConfig::for_path(dir.path().join("pulse.db"));
    let store = SqlitePulseStore::new(config, clock.clone())?;
    Ok((dir, clock, store))
}

#[test]
fn upsert_and_read_points_in_range() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, _clock, store) = open_store()?;
    let metric = MetricKey::new("mrr_active");
    for (month, value) in [(1u8, 400_000.0), (2, 450_000.0), (4, 500_000.0)] {
        store.upsert_actual(&ActualPoint {
            month: ym(2026, month)?,
            metric_key: metric.clone(),
            dimension: None,
            value,
        })?;
    }
    let range = MonthRange::new(ym(2026, 1)?, ym(2026, 3)?);
    let points = store.actual_points(&metric, None, range)?;
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].month, ym(2026, 1)?);
    assert_eq!(points[1].value, 450_000.0);
    Ok(())
}

#[test]
fn upsert_replaces_same_month_value() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, _clock, store) = open_store()?;
    let metric = MetricKey::new("headcount");
    let point = TargetPoint {
        month: ym(2026, 6)?,
        metric_key: metric.clone(),
        dimension: None,
        value: 40.0,
    };
    store.upsert_target(&point)?;
    store.upsert_target(&TargetPoint {
        value: 42.0,
        ..point
    })?;
    let range = MonthRange::new(ym(2026, 6)?, ym(2026, 6)?);
    let points = store.target_points(&metric, None, range)?;
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].value, 42.0);
    Ok(())
}

#[test]
fn dimensioned_rows_do_not_leak_into_undimensioned_reads()
-> Result<(), Box<dyn std::error::Error>> {
    let (_dir, _clock, store) = open_store()?;
    let metric = MetricKey::new("net_revenue");
    let unit = Dimension::business_unit("core");
    store.upsert_actual(&ActualPoint {
        month: ym(2026, 1)?,
        metric_key: metric.clone(),
        dimension: Some(unit.clone()),
        value: 100.0,
    })?;
    store.upsert_actual(&ActualPoint {
        month: ym(2026, 1)?,
        metric_key: metric.clone(),
        dimension: None,
        value: 250.0,
    })?;
    let range = MonthRange::new(ym(2026, 1)?, ym(2026, 1)?);
    let all = store.actual_points(&metric, None, range)?;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].value, 250.0);
    let scoped = store.actual_points(&metric, Some(&unit), range)?;
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].value, 100.0);
    assert_eq!(scoped[0].dimension.as_ref(), Some(&unit));
    Ok(())
}

#[test]
fn range_queries_cross_year_boundaries() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, _clock, store) = open_store()?;
    let metric = MetricKey::new("cash_balance");
    for (year, month) in [(2025, 11u8), (2025, 12), (2026, 1), (2026, 2)] {
        store.upsert_actual(&ActualPoint {
            month: ym(year, month)?,
            metric_key: metric.clone(),
            dimension: None,
            value: f64::from(month),
        })?;
    }
    let range = MonthRange::new(ym(2025, 12)?, ym(2026, 1)?);
    let points = store.actual_points(&metric, None, range)?;
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].month, ym(2025, 12)?);
    assert_eq!(points[1].month, ym(2026, 1)?);
    Ok(())
}

#[test]
fn registry_round_trips_and_rejects_duplicates() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, _clock, store) = open_store()?;
    let catalog = MetricCatalog::builtin();
    for definition in catalog.iter() {
        store.register(definition)?;
    }
    let loaded = store.load_definitions()?;
    assert_eq!(loaded.len(), catalog.len());
    let first = loaded.first().ok_or("empty registry")?;
    assert!(catalog.contains(&first.key));

    let duplicate = catalog.iter().next().ok_or("empty catalog")?;
    let result = store.register(duplicate);
    assert!(matches!(result, Err(RegistryError::Conflict(_))));
    Ok(())
}

#[test]
fn checkin_ledger_appends_and_reads_back() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, clock, store) = open_store()?;
    let new = NewCheckIn {
        kr_id: KrId::new("kr-mrr"),
        year: 2026,
        period_type: CheckInPeriodType::Quarter,
        period_value: 1,
        confidence: 70,
        commentary: Some("pipeline thin in feb".to_string()),
        blockers: Some("pricing approval".to_string()),
        next_actions: None,
        created_by: "sam".to_string(),
    };
    let first = store.append(&new)?;
    clock.advance(Duration::from_secs(3_600));
    let second = store.append(&NewCheckIn {
        confidence: 80,
        ..new.clone()
    })?;
    assert!(second.id > first.id);
    assert!(second.created_at > first.created_at);

    let latest = store.latest_per_kr(2026)?;
    assert_eq!(latest.get(&KrId::new("kr-mrr")).map(|row| row.confidence), Some(80));

    let rows = store.for_kr(&KrId::new("kr-mrr"), Some(2026))?;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].confidence, 80);
    assert_eq!(rows[1].commentary.as_deref(), Some("pipeline thin in feb"));
    Ok(())
}

#[test]
fn checkin_validation_happens_before_insert() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, _clock, store) = open_store()?;
    let bad = NewCheckIn {
        kr_id: KrId::new("kr-mrr"),
        year: 2026,
        period_type: CheckInPeriodType::Month,
        period_value: 0,
        confidence: 50,
        commentary: None,
        blockers: None,
        next_actions: None,
        created_by: "sam".to_string(),
    };
    let result = store.append(&bad);
    assert!(matches!(result, Err(CheckInError::Validation(_))));
    assert!(store.for_kr(&KrId::new("kr-mrr"), None)?.is_empty());
    Ok(())
}

#[test]
fn store_reopens_against_existing_schema() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let path = dir.path().join("pulse.db");
    let clock = Arc::new(FixedClock::new(OffsetDateTime::UNIX_EPOCH));
    let metric = MetricKey::new("ebitda");
    {
        let store =
            SqlitePulseStore::new(SqliteStoreConfig::for_path(&path), clock.clone())?;
        store.upsert_actual(&ActualPoint {
            month: ym(2026, 3)?,
            metric_key: metric.clone(),
            dimension: None,
            value: 120_000.0,
        })?;
    }
    let store = SqlitePulseStore::new(SqliteStoreConfig::for_path(&path), clock)?;
    let range = MonthRange::new(ym(2026, 1)?, ym(2026, 12)?);
    let points = store.actual_points(&metric, None, range)?;
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].value, 120_000.0);
    Ok(())
}
