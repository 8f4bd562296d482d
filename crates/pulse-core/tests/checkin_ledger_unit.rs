// crates/pulse-core/tests/checkin_ledger_unit.rs
// ============================================================================
// Module: Check-in Ledger Tests
// Description: Validate write validation, ordering, and latest-per-KR reads.
// Purpose: Pin the append-only ledger semantics.
// Dependencies: pulse-core, time
// ============================================================================

//! Unit tests for the check-in ledger.

use std::sync::Arc;
use std::time::Duration;

use pulse_core::CheckInError;
use pulse_core::CheckInPeriodType;
use pulse_core::CheckInStore;
use pulse_core::FixedClock;
use pulse_core::KrId;
use pulse_core::NewCheckIn;
use pulse_core::interfaces::memory::InMemoryCheckInStore;
use time::OffsetDateTime;

fn new_checkin(kr: &str, confidence: u8) -> NewCheckIn {
    NewCheckIn {
        kr_id: KrId::new(kr),
        year: 2026,
        period_type: CheckInPeriodType::Quarter,
        period_value: 1,
        confidence,
        commentary: Some("on track".to_string()),
        blockers: None,
        next_actions: None,
        created_by: "sam".to_string(),
    }
}

fn store() -> (Arc<FixedClock>, InMemoryCheckInStore) {
    let clock = Arc::new(FixedClock::new(OffsetDateTime::UNIX_EPOCH));
    let store = InMemoryCheckInStore::new(clock.clone());
    (clock, store)
}

#[test]
fn confidence_above_100_is_rejected() {
    let (_clock, store) = store();
    let result = store.append(&new_checkin("kr-1", 101));
    assert!(matches!(result, Err(CheckInError::Validation(err)) if err.field == "confidence"));
}

#[test]
fn period_value_is_checked_per_granularity() {
    let (_clock, store) = store();
    let mut bad = new_checkin("kr-1", 80);
    bad.period_type = CheckInPeriodType::Month;
    bad.period_value = 13;
    let result = store.append(&bad);
    assert!(matches!(result, Err(CheckInError::Validation(err)) if err.field == "period_value"));
}

#[test]
fn empty_author_is_rejected() {
    let (_clock, store) = store();
    let mut bad = new_checkin("kr-1", 80);
    bad.created_by = "  ".to_string();
    let result = store.append(&bad);
    assert!(matches!(result, Err(CheckInError::Validation(err)) if err.field == "created_by"));
}

#[test]
fn append_assigns_ids_and_timestamps() -> Result<(), Box<dyn std::error::Error>> {
    let (clock, store) = store();
    let first = store.append(&new_checkin("kr-1", 70))?;
    clock.advance(Duration::from_secs(60));
    let second = store.append(&new_checkin("kr-1", 75))?;
    assert_eq!(first.id, 1);
    assert_eq!(second.id, 2);
    assert!(second.created_at > first.created_at);
    Ok(())
}

#[test]
fn latest_per_kr_takes_newest_with_id_tiebreak() -> Result<(), Box<dyn std::error::Error>> {
    let (clock, store) = store();
    store.append(&new_checkin("kr-1", 60))?;
    clock.advance(Duration::from_secs(10));
    store.append(&new_checkin("kr-2", 90))?;
    // Same timestamp as the next append; the higher row id must win.
    store.append(&new_checkin("kr-1", 65))?;
    store.append(&new_checkin("kr-1", 70))?;
    let latest = store.latest_per_kr(2026)?;
    assert_eq!(latest.len(), 2);
    assert_eq!(latest.get(&KrId::new("kr-1")).map(|row| row.confidence), Some(70));
    assert_eq!(latest.get(&KrId::new("kr-2")).map(|row| row.confidence), Some(90));
    Ok(())
}

#[test]
fn latest_per_kr_filters_by_year() -> Result<(), Box<dyn std::error::Error>> {
    let (_clock, store) = store();
    let mut old = new_checkin("kr-1", 50);
    old.year = 2025;
    store.append(&old)?;
    store.append(&new_checkin("kr-1", 80))?;
    let latest = store.latest_per_kr(2025)?;
    assert_eq!(latest.get(&KrId::new("kr-1")).map(|row| row.confidence), Some(50));
    Ok(())
}

#[test]
fn for_kr_lists_newest_first() -> Result<(), Box<dyn std::error::Error>> {
    let (clock, store) = store();
    store.append(&new_checkin("kr-1", 60))?;
    clock.advance(Duration::from_secs(5));
    store.append(&new_checkin("kr-1", 70))?;
    store.append(&new_checkin("kr-2", 90))?;
    let rows = store.for_kr(&KrId::new("kr-1"), Some(2026))?;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].confidence, 70);
    assert_eq!(rows[1].confidence, 60);
    Ok(())
}
