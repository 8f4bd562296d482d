// crates/pulse-core/src/rollup/aggregator.rs
// ============================================================================
// Module: Pulse Dashboard Aggregator
// Description: Assembles the objective/key-result/initiative summary tree.
// Purpose: Orchestrate catalog, targets, actuals, and signals per request.
// Dependencies: crate::core, crate::interfaces, crate::rollup
// ============================================================================

//! ## Overview
//! The aggregator pulls monthly targets and actuals for every key result,
//! merges in live metric snapshots, runs the rollup calculator, and assembles
//! the objectives tree plus highlight cards and chart series. It is
//! best-effort per metric: a failed read or missing live value degrades that
//! key result to a gray signal and the rest of the tree renders normally.
//! The fiscal "now" is resolved exactly once per call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::metric::Dimension;
use crate::core::metric::Direction;
use crate::core::metric::MetricCatalog;
use crate::core::metric::MetricDefinition;
use crate::core::metric::MetricKey;
use crate::core::metric::Unit;
use crate::core::period::FiscalCalendar;
use crate::core::period::Period;
use crate::core::period::Quarter;
use crate::core::period::SummaryPeriod;
use crate::core::period::YearMonth;
use crate::core::plan::BusinessPlan;
use crate::core::plan::Initiative;
use crate::core::plan::InitiativeStatus;
use crate::core::plan::KeyResult;
use crate::core::plan::KrId;
use crate::core::plan::PeriodLabel;
use crate::core::series::MonthlySeries;
use crate::core::time::Clock;
use crate::core::time::unix_millis;
use crate::core::time::year_month_of;
use crate::interfaces::LiveValueSource;
use crate::interfaces::MeasureStore;
use crate::interfaces::MonthRange;
use crate::interfaces::StoreError;
use crate::rollup::calculator::SignalStatus;
use crate::rollup::calculator::period_value;
use crate::rollup::calculator::progress_pct;
use crate::rollup::calculator::signal_status;
use crate::rollup::calculator::variance;
use crate::rollup::targets::resolve_target;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Metric keys rendered as headline cards, in display order.
pub const HIGHLIGHT_KEYS: [&str; 5] =
    ["mrr_active", "net_revenue", "ebitda", "delinquency_pct", "net_churn_pct"];

// ============================================================================
// SECTION: Summary Tree
// ============================================================================

/// Computed figures and signal for a single key result.
///
/// # Invariants
/// - `status` is `gray` exactly when the figures could not be computed;
///   unavailability is a first-class state, never an error path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KrSummary {
    /// Key result identifier.
    pub id: String,
    /// Key result title.
    pub title: String,
    /// Referenced metric key.
    pub metric_key: MetricKey,
    /// Metric display unit.
    pub unit: Unit,
    /// Metric favorable direction.
    pub direction: Direction,
    /// Current period value, when known.
    pub current_value: Option<f64>,
    /// Resolved target, when known.
    pub target: Option<f64>,
    /// Progress against target, percent.
    pub progress_pct: Option<f64>,
    /// Absolute variance against target.
    pub variance: Option<f64>,
    /// Variance against target, percent.
    pub variance_pct: Option<f64>,
    /// Derived health signal.
    pub status: SignalStatus,
}

/// Initiative rendered under its objective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiativeSummary {
    /// Initiative identifier.
    pub id: String,
    /// Initiative title.
    pub title: String,
    /// Tagged key result identifiers.
    pub kr_ids: Vec<String>,
    /// Delivery status label.
    pub status: String,
    /// Accountable owner.
    pub owner: String,
    /// Slotted fiscal quarter label.
    pub quarter: String,
}

/// Objective with its computed key results and initiatives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveSummary {
    /// Objective identifier.
    pub id: String,
    /// Objective title.
    pub title: String,
    /// Key results in display order.
    pub key_results: Vec<KrSummary>,
    /// Initiatives tagged to the objective.
    pub initiatives: Vec<InitiativeSummary>,
}

/// Headline card for a curated metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightCard {
    /// Metric key.
    pub metric_key: MetricKey,
    /// Metric title.
    pub title: String,
    /// Metric display unit.
    pub unit: Unit,
    /// Current period value, when known.
    pub current_value: Option<f64>,
    /// Resolved target, when known.
    pub target: Option<f64>,
    /// Progress against target, percent.
    pub progress_pct: Option<f64>,
    /// Derived health signal.
    pub status: SignalStatus,
}

/// One month of a charting series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Calendar month.
    pub month: YearMonth,
    /// Observed value, when known.
    pub actual: Option<f64>,
    /// Planned value, when known.
    pub target: Option<f64>,
}

/// Response metadata attached to the summary tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryMeta {
    /// Whether the response was served from the cache.
    pub cache_hit: bool,
    /// Fiscal year resolved for the request.
    pub fiscal_year: i32,
    /// Fiscal quarter resolved for the request.
    pub fiscal_quarter: Quarter,
    /// Assembly timestamp in unix epoch milliseconds.
    pub generated_at: i64,
}

/// The assembled dashboard payload; the unit cached by the response cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryTree {
    /// Requested summary period label.
    pub period: String,
    /// Requested business unit label (`all` when unfiltered).
    pub business_unit: String,
    /// Objectives with computed key results.
    pub objectives: Vec<ObjectiveSummary>,
    /// Headline cards for curated metrics.
    pub highlights: Vec<HighlightCard>,
    /// Monthly chart series per metric key.
    pub series: BTreeMap<MetricKey, Vec<SeriesPoint>>,
    /// Fraction of key results covered by an active initiative.
    pub initiative_coverage: Option<f64>,
    /// Response metadata.
    pub meta: SummaryMeta,
}

// ============================================================================
// SECTION: Quarter Summary
// ============================================================================

/// Actual/plan figures for one metric in one period column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodFigures {
    /// Period label (`Q1..Q4`, `FY`).
    pub period: String,
    /// Aggregated actual, when known.
    pub actual: Option<f64>,
    /// Resolved plan, when known.
    pub plan: Option<f64>,
    /// Variance against plan, percent.
    pub variance_pct: Option<f64>,
    /// Derived health signal.
    pub status: SignalStatus,
}

/// Quarter-by-quarter figures for one key result metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricQuarterRow {
    /// Key result identifier.
    pub kr_id: String,
    /// Metric key.
    pub metric_key: MetricKey,
    /// Metric title.
    pub title: String,
    /// Metric display unit.
    pub unit: Unit,
    /// Figures for Q1..Q4 followed by the full fiscal year.
    pub periods: Vec<PeriodFigures>,
}

/// Aggregated actual/plan per quarter for one fiscal year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterSummary {
    /// Fiscal year.
    pub year: i32,
    /// Per-metric rows in plan order.
    pub rows: Vec<MetricQuarterRow>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors for raw series reads.
///
/// # Invariants
/// - Unknown-metric lookups stay distinguishable from store failures for
///   HTTP status mapping.
#[derive(Debug, Error)]
pub enum SeriesError {
    /// The metric key is not registered in the catalog.
    #[error("unknown metric key: {0}")]
    UnknownMetric(String),
    /// The underlying store read failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// SECTION: Aggregator
// ============================================================================

/// Orchestrates catalog, stores, and calculator into dashboard payloads.
///
/// # Invariants
/// - Stateless between requests; all shared state lives behind the injected
///   stores.
/// - The fiscal quarter is resolved once per call, never per metric.
pub struct DashboardAggregator {
    /// Metric catalog validated at load time.
    catalog: Arc<MetricCatalog>,
    /// Business plan validated at load time.
    plan: Arc<BusinessPlan>,
    /// Fiscal calendar configuration.
    calendar: FiscalCalendar,
    /// Monthly target/actual store.
    measures: Arc<dyn MeasureStore>,
    /// Optional live metric snapshot source.
    live_values: Option<Arc<dyn LiveValueSource>>,
    /// Injected time source.
    clock: Arc<dyn Clock>,
}

impl DashboardAggregator {
    /// Creates an aggregator over the given collaborators.
    #[must_use]
    pub fn new(
        catalog: Arc<MetricCatalog>,
        plan: Arc<BusinessPlan>,
        calendar: FiscalCalendar,
        measures: Arc<dyn MeasureStore>,
        live_values: Option<Arc<dyn LiveValueSource>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalog,
            plan,
            calendar,
            measures,
            live_values,
            clock,
        }
    }

    /// Assembles the dashboard summary tree for a period and business unit.
    ///
    /// Best-effort per metric: individual read failures degrade the affected
    /// key result to a gray signal instead of failing the request.
    #[must_use]
    pub fn summary(
        &self,
        period: SummaryPeriod,
        business_unit: Option<&Dimension>,
    ) -> SummaryTree {
        let now = self.clock.now();
        let today = year_month_of(now);
        let (fiscal_year, fiscal_quarter) = self.calendar.quarter_of(today);
        let months = self.calendar.summary_months(period, today);
        let label = static_label_for(period);
        let live = self.fetch_live_values(business_unit);

        let mut objectives = Vec::with_capacity(self.plan.objectives.len());
        for objective in &self.plan.objectives {
            let key_results = objective
                .key_results
                .iter()
                .map(|kr| self.compute_kr(kr, &months, label, business_unit, &live))
                .collect();
            let initiatives = self
                .plan
                .initiatives_for(&objective.id)
                .into_iter()
                .map(initiative_summary)
                .collect();
            objectives.push(ObjectiveSummary {
                id: objective.id.as_str().to_string(),
                title: objective.title.clone(),
                key_results,
                initiatives,
            });
        }

        let mut series: BTreeMap<MetricKey, Vec<SeriesPoint>> = BTreeMap::new();
        let mut seen: BTreeSet<MetricKey> = BTreeSet::new();
        for kr in self.plan.key_results() {
            if seen.insert(kr.metric_key.clone()) {
                let points = self.chart_series(&kr.metric_key, &months, business_unit);
                series.insert(kr.metric_key.clone(), points);
            }
        }

        let highlights = self.highlights(&months, label, business_unit, &live);

        SummaryTree {
            period: period.as_str().to_string(),
            business_unit: business_unit
                .map_or_else(|| "all".to_string(), |dimension| dimension.value.clone()),
            objectives,
            highlights,
            series,
            initiative_coverage: self.plan.initiative_coverage(),
            meta: SummaryMeta {
                cache_hit: false,
                fiscal_year,
                fiscal_quarter,
                generated_at: unix_millis(now),
            },
        }
    }

    /// Aggregated actual/plan per quarter (plus full year) for a fiscal year.
    #[must_use]
    pub fn quarter_summary(&self, fiscal_year: i32) -> QuarterSummary {
        let mut rows = Vec::new();
        for kr in self.plan.key_results() {
            let Some(definition) = self.catalog.get(&kr.metric_key) else {
                continue;
            };
            let mut periods = Vec::with_capacity(5);
            for quarter in Quarter::ALL {
                let months = self.calendar.months_in(fiscal_year, Period::Quarter(quarter));
                periods.push(self.period_figures(
                    definition,
                    kr,
                    &months,
                    Some(PeriodLabel::from(quarter)),
                    None,
                    quarter.as_str(),
                ));
            }
            let fy_months = self.calendar.months_in(fiscal_year, Period::FiscalYear);
            periods.push(self.period_figures(
                definition,
                kr,
                &fy_months,
                Some(PeriodLabel::FY),
                None,
                "FY",
            ));
            rows.push(MetricQuarterRow {
                kr_id: kr.id.as_str().to_string(),
                metric_key: kr.metric_key.clone(),
                title: definition.title.clone(),
                unit: definition.unit,
                periods,
            });
        }
        QuarterSummary {
            year: fiscal_year,
            rows,
        }
    }

    /// Raw monthly actual/target series for one metric over a month range.
    ///
    /// # Errors
    ///
    /// Returns [`SeriesError::UnknownMetric`] for keys absent from the catalog
    /// and [`SeriesError::Store`] when the underlying reads fail.
    pub fn metric_series(
        &self,
        metric_key: &MetricKey,
        range: MonthRange,
        business_unit: Option<&Dimension>,
    ) -> Result<Vec<SeriesPoint>, SeriesError> {
        let Some(definition) = self.catalog.get(metric_key) else {
            return Err(SeriesError::UnknownMetric(metric_key.as_str().to_string()));
        };
        let dimension = read_dimension(definition, business_unit);
        let actuals = MonthlySeries::from_actual_points(&self.measures.actual_points(
            metric_key,
            dimension,
            range,
        )?);
        let targets = MonthlySeries::from_target_points(&self.measures.target_points(
            metric_key,
            dimension,
            range,
        )?);
        let mut points = Vec::new();
        let mut cursor = range.from;
        while cursor <= range.to {
            points.push(SeriesPoint {
                month: cursor,
                actual: actuals.value_at(cursor),
                target: targets.value_at(cursor),
            });
            cursor = cursor.next();
        }
        Ok(points)
    }

    /// Fetches live values, degrading to an empty map on source failure.
    fn fetch_live_values(
        &self,
        business_unit: Option<&Dimension>,
    ) -> BTreeMap<MetricKey, f64> {
        self.live_values
            .as_ref()
            .and_then(|source| source.live_values(business_unit).ok())
            .unwrap_or_default()
    }

    /// Computes the summary row for one key result.
    fn compute_kr(
        &self,
        kr: &KeyResult,
        months: &[YearMonth],
        label: Option<PeriodLabel>,
        business_unit: Option<&Dimension>,
        live: &BTreeMap<MetricKey, f64>,
    ) -> KrSummary {
        let Some(definition) = self.catalog.get(&kr.metric_key) else {
            // Unknown keys are rejected at plan load; still render gray
            // rather than panic if a stale plan slips through.
            return KrSummary {
                id: kr.id.as_str().to_string(),
                title: kr.title.clone(),
                metric_key: kr.metric_key.clone(),
                unit: Unit::Count,
                direction: Direction::HigherIsBetter,
                current_value: None,
                target: None,
                progress_pct: None,
                variance: None,
                variance_pct: None,
                status: SignalStatus::Gray,
            };
        };
        let figures = self.period_figures(definition, kr, months, label, business_unit, "");
        let current_value = live.get(&kr.metric_key).copied().or(figures.actual);
        let target = figures.plan;
        let spread = variance(current_value, target);
        KrSummary {
            id: kr.id.as_str().to_string(),
            title: kr.title.clone(),
            metric_key: kr.metric_key.clone(),
            unit: definition.unit,
            direction: definition.direction,
            current_value,
            target,
            progress_pct: progress_pct(current_value, target, definition.direction),
            variance: spread.variance,
            variance_pct: spread.variance_pct,
            status: signal_status(current_value, target, definition.direction),
        }
    }

    /// Computes actual/plan figures for one metric over explicit months.
    fn period_figures(
        &self,
        definition: &MetricDefinition,
        kr: &KeyResult,
        months: &[YearMonth],
        label: Option<PeriodLabel>,
        business_unit: Option<&Dimension>,
        period_label: &str,
    ) -> PeriodFigures {
        let Some(range) = months_range(months) else {
            return PeriodFigures {
                period: period_label.to_string(),
                actual: None,
                plan: None,
                variance_pct: None,
                status: SignalStatus::Gray,
            };
        };
        let dimension = read_dimension(definition, business_unit);
        let actual_series = self
            .measures
            .actual_points(&kr.metric_key, dimension, range)
            .map(|points| MonthlySeries::from_actual_points(&points))
            .unwrap_or_default();
        let target_series = self
            .measures
            .target_points(&kr.metric_key, dimension, range)
            .map(|points| MonthlySeries::from_target_points(&points))
            .unwrap_or_default();
        let actual = period_value(&actual_series, months, definition.period_kind);
        let plan =
            resolve_target(definition.period_kind, &target_series, months, &kr.targets, label);
        let spread = variance(actual, plan);
        PeriodFigures {
            period: period_label.to_string(),
            actual,
            plan,
            variance_pct: spread.variance_pct,
            status: signal_status(actual, plan, definition.direction),
        }
    }

    /// Computes headline cards for the curated highlight metrics.
    fn highlights(
        &self,
        months: &[YearMonth],
        label: Option<PeriodLabel>,
        business_unit: Option<&Dimension>,
        live: &BTreeMap<MetricKey, f64>,
    ) -> Vec<HighlightCard> {
        let mut cards = Vec::new();
        for key in HIGHLIGHT_KEYS {
            let metric_key = MetricKey::new(key);
            let Some(definition) = self.catalog.get(&metric_key) else {
                continue;
            };
            let kr = self
                .plan
                .key_results()
                .find(|kr| kr.metric_key == metric_key);
            let figures = kr.map_or_else(
                || self.metric_only_figures(definition, months, business_unit),
                |kr| self.period_figures(definition, kr, months, label, business_unit, ""),
            );
            let current_value = live.get(&metric_key).copied().or(figures.actual);
            cards.push(HighlightCard {
                metric_key: metric_key.clone(),
                title: definition.title.clone(),
                unit: definition.unit,
                current_value,
                target: figures.plan,
                progress_pct: progress_pct(current_value, figures.plan, definition.direction),
                status: signal_status(current_value, figures.plan, definition.direction),
            });
        }
        cards
    }

    /// Computes figures for a highlight metric with no plan key result.
    ///
    /// Such a metric has no static fallback targets, so only monthly target
    /// points can produce a plan value.
    fn metric_only_figures(
        &self,
        definition: &MetricDefinition,
        months: &[YearMonth],
        business_unit: Option<&Dimension>,
    ) -> PeriodFigures {
        let placeholder = KeyResult {
            id: KrId::new(definition.key.as_str()),
            title: definition.title.clone(),
            metric_key: definition.key.clone(),
            targets: BTreeMap::new(),
        };
        self.period_figures(definition, &placeholder, months, None, business_unit, "")
    }

    /// Reads the chart series for a metric, degrading to empty on failure.
    fn chart_series(
        &self,
        metric_key: &MetricKey,
        months: &[YearMonth],
        business_unit: Option<&Dimension>,
    ) -> Vec<SeriesPoint> {
        let Some(range) = months_range(months) else {
            return Vec::new();
        };
        self.metric_series(metric_key, range, business_unit)
            .unwrap_or_default()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the dimension used for store reads.
///
/// A requested business unit wins; otherwise the metric's own declared
/// dimension applies.
fn read_dimension<'a>(
    definition: &'a MetricDefinition,
    business_unit: Option<&'a Dimension>,
) -> Option<&'a Dimension> {
    business_unit.or(definition.dimension.as_ref())
}

/// Returns the inclusive range spanned by an ordered month list.
fn months_range(months: &[YearMonth]) -> Option<MonthRange> {
    let first = months.first()?;
    let last = months.last()?;
    Some(MonthRange::new(*first, *last))
}

/// Returns the static fallback label for a summary period, when one exists.
const fn static_label_for(period: SummaryPeriod) -> Option<PeriodLabel> {
    match period {
        SummaryPeriod::Quarter(quarter) => Some(match quarter {
            Quarter::Q1 => PeriodLabel::Q1,
            Quarter::Q2 => PeriodLabel::Q2,
            Quarter::Q3 => PeriodLabel::Q3,
            Quarter::Q4 => PeriodLabel::Q4,
        }),
        SummaryPeriod::YearToDate => Some(PeriodLabel::FY),
        SummaryPeriod::TrailingTwelve => None,
    }
}

/// Renders an initiative for the summary payload.
fn initiative_summary(initiative: &Initiative) -> InitiativeSummary {
    InitiativeSummary {
        id: initiative.id.as_str().to_string(),
        title: initiative.title.clone(),
        kr_ids: initiative
            .kr_ids
            .iter()
            .map(|id| id.as_str().to_string())
            .collect(),
        status: match initiative.status {
            InitiativeStatus::Planned => "planned".to_string(),
            InitiativeStatus::Active => "active".to_string(),
            InitiativeStatus::Blocked => "blocked".to_string(),
            InitiativeStatus::Done => "done".to_string(),
        },
        owner: initiative.owner.clone(),
        quarter: initiative.quarter.as_str().to_string(),
    }
}
