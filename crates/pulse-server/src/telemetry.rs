// crates/pulse-server/src/telemetry.rs
// ============================================================================
// Module: Server Telemetry
// Description: Observability hooks for dashboard request handling.
// Purpose: Provide metric events and latency buckets without hard deps.
// Dependencies: none
// ============================================================================

//! ## Overview
//! This module exposes a thin metrics interface for dashboard request
//! counters and latency histograms. It is intentionally dependency-light so
//! deployments can plug in Prometheus or OpenTelemetry without redesign.
//! Labels carry no request payloads; metric values never include business
//! figures.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default latency buckets in milliseconds for request histograms.
pub const API_LATENCY_BUCKETS_MS: &[u64] =
    &[1, 2, 5, 10, 25, 50, 100, 250, 500, 1_000, 2_500, 5_000];

// ============================================================================
// SECTION: Metric Labels
// ============================================================================

/// Dashboard endpoint classification.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ApiRoute {
    /// GET /okr/summary.
    Summary,
    /// GET /okr/quarter-summary.
    QuarterSummary,
    /// GET /okr/krs.
    KrList,
    /// GET /okr/targets.
    TargetList,
    /// GET /okr/metric-series.
    MetricSeries,
    /// GET /okr/kr-checkins/{kr_id}.
    CheckInList,
    /// POST /okr/kr-checkins.
    CheckInCreate,
    /// POST /okr/cache/invalidate.
    CacheInvalidate,
}

impl ApiRoute {
    /// Returns a stable label for the route.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Summary => "okr/summary",
            Self::QuarterSummary => "okr/quarter-summary",
            Self::KrList => "okr/krs",
            Self::TargetList => "okr/targets",
            Self::MetricSeries => "okr/metric-series",
            Self::CheckInList => "okr/kr-checkins/list",
            Self::CheckInCreate => "okr/kr-checkins/create",
            Self::CacheInvalidate => "okr/cache/invalidate",
        }
    }
}

/// Request outcome classification.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ApiOutcome {
    /// Successful request.
    Ok,
    /// Failed request.
    Error,
}

impl ApiOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }
}

/// Dashboard request metric event payload.
///
/// # Invariants
/// - `cache_hit` is `None` for routes without a response cache.
#[derive(Debug, Clone)]
pub struct ApiMetricEvent {
    /// Endpoint classification.
    pub route: ApiRoute,
    /// Request outcome.
    pub outcome: ApiOutcome,
    /// Whether the response was served from cache, when applicable.
    pub cache_hit: Option<bool>,
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Metrics sink for dashboard requests and latencies.
pub trait DashboardMetrics: Send + Sync {
    /// Records a request counter event.
    fn record_request(&self, event: ApiMetricEvent);
    /// Records a latency observation for the request.
    fn record_latency(&self, event: ApiMetricEvent, latency: Duration);
}

/// No-op metrics sink.
///
/// # Invariants
/// - Metrics are intentionally discarded.
pub struct NoopMetrics;

impl DashboardMetrics for NoopMetrics {
    fn record_request(&self, _event: ApiMetricEvent) {}

    fn record_latency(&self, _event: ApiMetricEvent, _latency: Duration) {}
}
