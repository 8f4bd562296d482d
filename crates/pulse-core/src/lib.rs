// crates/pulse-core/src/lib.rs
// ============================================================================
// Module: Pulse Core Library
// Description: Target-tracking and rollup engine for the Pulse dashboard.
// Purpose: Provide the domain model, rollup calculator, and store interfaces.
// Dependencies: serde, thiserror, time
// ============================================================================

//! ## Overview
//! Pulse Core turns monthly targets and actuals into an
//! objective/key-result/initiative summary tree with health signals.
//! Invariants:
//! - Missing months are "unknown", never zero; flow metrics sum present
//!   months and stock metrics read the latest present month.
//! - Signal thresholds are fixed constants so identical numbers always
//!   produce identical colors.
//! - Target resolution is monthly-first with static fallbacks and never
//!   scales a fiscal-year target down to a shorter period.
//! - All persistence sits behind the [`interfaces`] traits; this crate
//!   performs no I/O of its own.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod cache;
pub mod core;
pub mod interfaces;
pub mod rollup;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::cache::DEFAULT_TTL;
pub use crate::cache::InMemoryResponseCache;
pub use crate::cache::KeyPattern;
pub use crate::cache::ResponseCache;
pub use crate::core::checkin::CheckIn;
pub use crate::core::checkin::CheckInPeriodType;
pub use crate::core::checkin::NewCheckIn;
pub use crate::core::metric::CatalogError;
pub use crate::core::metric::Dimension;
pub use crate::core::metric::Direction;
pub use crate::core::metric::MetricCatalog;
pub use crate::core::metric::MetricDefinition;
pub use crate::core::metric::MetricKey;
pub use crate::core::metric::PeriodKind;
pub use crate::core::metric::Unit;
pub use crate::core::period::FiscalCalendar;
pub use crate::core::period::Month;
pub use crate::core::period::Period;
pub use crate::core::period::PeriodParseError;
pub use crate::core::period::Quarter;
pub use crate::core::period::SummaryPeriod;
pub use crate::core::period::YearMonth;
pub use crate::core::plan::BusinessPlan;
pub use crate::core::plan::Initiative;
pub use crate::core::plan::InitiativeId;
pub use crate::core::plan::InitiativeStatus;
pub use crate::core::plan::KeyResult;
pub use crate::core::plan::KrId;
pub use crate::core::plan::Objective;
pub use crate::core::plan::ObjectiveId;
pub use crate::core::plan::PeriodLabel;
pub use crate::core::plan::PlanError;
pub use crate::core::series::ActualPoint;
pub use crate::core::series::MonthlySeries;
pub use crate::core::series::TargetPoint;
pub use crate::core::time::Clock;
pub use crate::core::time::FixedClock;
pub use crate::core::time::SystemClock;
pub use crate::interfaces::CheckInError;
pub use crate::interfaces::CheckInStore;
pub use crate::interfaces::LiveValueSource;
pub use crate::interfaces::MeasureStore;
pub use crate::interfaces::MetricRegistry;
pub use crate::interfaces::MonthRange;
pub use crate::interfaces::RegistryError;
pub use crate::interfaces::StoreError;
pub use crate::interfaces::ValidationError;
pub use crate::interfaces::memory::InMemoryCheckInStore;
pub use crate::interfaces::memory::InMemoryMeasureStore;
pub use crate::interfaces::memory::InMemoryMetricRegistry;
pub use crate::interfaces::memory::StaticLiveValues;
pub use crate::rollup::aggregator::DashboardAggregator;
pub use crate::rollup::aggregator::HighlightCard;
pub use crate::rollup::aggregator::KrSummary;
pub use crate::rollup::aggregator::ObjectiveSummary;
pub use crate::rollup::aggregator::QuarterSummary;
pub use crate::rollup::aggregator::SeriesError;
pub use crate::rollup::aggregator::SeriesPoint;
pub use crate::rollup::aggregator::SummaryMeta;
pub use crate::rollup::aggregator::SummaryTree;
pub use crate::rollup::calculator::SignalStatus;
pub use crate::rollup::calculator::Variance;
pub use crate::rollup::calculator::period_value;
pub use crate::rollup::calculator::progress_pct;
pub use crate::rollup::calculator::signal_status;
pub use crate::rollup::calculator::variance;
pub use crate::rollup::targets::resolve_target;
