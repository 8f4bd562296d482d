// crates/pulse-core/tests/plan_validation_unit.rs
// ============================================================================
// Module: Business Plan Tests
// Description: Validate plan cross-checks and initiative coverage.
// Purpose: Ensure bad references fail at load time, not render time.
// Dependencies: pulse-core
// ============================================================================

//! Unit tests for business plan validation and coverage.

use std::collections::BTreeMap;

use pulse_core::BusinessPlan;
use pulse_core::Initiative;
use pulse_core::InitiativeId;
use pulse_core::InitiativeStatus;
use pulse_core::KeyResult;
use pulse_core::KrId;
use pulse_core::MetricCatalog;
use pulse_core::MetricKey;
use pulse_core::Objective;
use pulse_core::ObjectiveId;
use pulse_core::PeriodLabel;
use pulse_core::PlanError;
use pulse_core::Quarter;

fn kr(id: &str, metric: &str) -> KeyResult {
    KeyResult {
        id: KrId::new(id),
        title: id.to_string(),
        metric_key: MetricKey::new(metric),
        targets: BTreeMap::new(),
    }
}

fn objective(id: &str, key_results: Vec<KeyResult>) -> Objective {
    Objective {
        id: ObjectiveId::new(id),
        title: id.to_string(),
        key_results,
    }
}

fn initiative(id: &str, objective: &str, krs: &[&str], status: InitiativeStatus) -> Initiative {
    Initiative {
        id: InitiativeId::new(id),
        title: id.to_string(),
        objective_id: ObjectiveId::new(objective),
        kr_ids: krs.iter().map(|id| KrId::new(*id)).collect(),
        status,
        owner: "ops".to_string(),
        quarter: Quarter::Q1,
    }
}

#[test]
fn valid_plan_passes() {
    let catalog = MetricCatalog::builtin();
    let plan = BusinessPlan {
        objectives: vec![objective("o-growth", vec![kr("kr-mrr", "mrr_active")])],
        initiatives: vec![initiative("i-1", "o-growth", &["kr-mrr"], InitiativeStatus::Active)],
    };
    assert!(plan.validate(&catalog).is_ok());
}

#[test]
fn unknown_metric_key_fails_load() {
    let catalog = MetricCatalog::builtin();
    let plan = BusinessPlan {
        objectives: vec![objective("o-1", vec![kr("kr-x", "mrr_actve")])],
        initiatives: Vec::new(),
    };
    assert_eq!(
        plan.validate(&catalog),
        Err(PlanError::UnknownMetric {
            kr_id: "kr-x".to_string(),
            metric_key: "mrr_actve".to_string(),
        })
    );
}

#[test]
fn duplicate_kr_id_fails_load() {
    let catalog = MetricCatalog::builtin();
    let plan = BusinessPlan {
        objectives: vec![
            objective("o-1", vec![kr("kr-dup", "mrr_active")]),
            objective("o-2", vec![kr("kr-dup", "ebitda")]),
        ],
        initiatives: Vec::new(),
    };
    assert_eq!(plan.validate(&catalog), Err(PlanError::DuplicateKr("kr-dup".to_string())));
}

#[test]
fn initiative_references_are_checked() {
    let catalog = MetricCatalog::builtin();
    let plan = BusinessPlan {
        objectives: vec![objective("o-1", vec![kr("kr-1", "mrr_active")])],
        initiatives: vec![initiative("i-1", "o-missing", &[], InitiativeStatus::Planned)],
    };
    assert_eq!(
        plan.validate(&catalog),
        Err(PlanError::UnknownObjective {
            initiative_id: "i-1".to_string(),
            objective_id: "o-missing".to_string(),
        })
    );

    let plan = BusinessPlan {
        objectives: vec![objective("o-1", vec![kr("kr-1", "mrr_active")])],
        initiatives: vec![initiative("i-1", "o-1", &["kr-missing"], InitiativeStatus::Planned)],
    };
    assert_eq!(
        plan.validate(&catalog),
        Err(PlanError::UnknownKr {
            initiative_id: "i-1".to_string(),
            kr_id: "kr-missing".to_string(),
        })
    );
}

#[test]
fn coverage_counts_only_active_initiatives() {
    let plan = BusinessPlan {
        objectives: vec![objective(
            "o-1",
            vec![kr("kr-1", "mrr_active"), kr("kr-2", "ebitda")],
        )],
        initiatives: vec![
            initiative("i-active", "o-1", &["kr-1"], InitiativeStatus::Active),
            initiative("i-done", "o-1", &["kr-2"], InitiativeStatus::Done),
        ],
    };
    assert_eq!(plan.initiative_coverage(), Some(0.5));
}

#[test]
fn coverage_is_none_for_empty_plan() {
    let plan = BusinessPlan::default();
    assert_eq!(plan.initiative_coverage(), None);
}

#[test]
fn static_targets_round_trip_through_serde() -> Result<(), Box<dyn std::error::Error>> {
    let mut targets = BTreeMap::new();
    targets.insert(PeriodLabel::Q1, 1_340_000.0);
    targets.insert(PeriodLabel::FY, 5_600_000.0);
    let kr = KeyResult {
        id: KrId::new("kr-mrr"),
        title: "Grow active MRR".to_string(),
        metric_key: MetricKey::new("mrr_active"),
        targets,
    };
    let json = serde_json::to_string(&kr)?;
    let back: KeyResult = serde_json::from_str(&json)?;
    assert_eq!(back, kr);
    assert_eq!(back.targets.get(&PeriodLabel::Q1).copied(), Some(1_340_000.0));
    Ok(())
}
