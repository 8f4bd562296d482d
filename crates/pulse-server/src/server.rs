// crates/pulse-server/src/server.rs
// ============================================================================
// Module: Dashboard HTTP Server
// Description: Axum surface for rollup reads, check-in writes, and cache ops.
// Purpose: Expose the Pulse dashboard over HTTP with a TTL response cache.
// Dependencies: pulse-core, pulse-config, pulse-store-sqlite, axum, tokio
// ============================================================================

//! ## Overview
//! The HTTP server wires the dashboard aggregator, the response cache, and
//! the check-in ledger behind a small JSON API. Read endpoints are cached by
//! period and business unit; writes go straight to the store. Inputs are
//! untrusted and validated at the boundary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::routing::get;
use axum::routing::post;
use pulse_config::PulseConfig;
use pulse_core::BusinessPlan;
use pulse_core::CheckIn;
use pulse_core::CheckInStore;
use pulse_core::Clock;
use pulse_core::DashboardAggregator;
use pulse_core::Dimension;
use pulse_core::Direction;
use pulse_core::FiscalCalendar;
use pulse_core::InMemoryResponseCache;
use pulse_core::KeyPattern;
use pulse_core::KrId;
use pulse_core::MeasureStore;
use pulse_core::MetricCatalog;
use pulse_core::MetricKey;
use pulse_core::MetricRegistry;
use pulse_core::Month;
use pulse_core::MonthRange;
use pulse_core::NewCheckIn;
use pulse_core::Period;
use pulse_core::PeriodKind;
use pulse_core::PeriodLabel;
use pulse_core::QuarterSummary;
use pulse_core::RegistryError;
use pulse_core::ResponseCache;
use pulse_core::SeriesPoint;
use pulse_core::SummaryPeriod;
use pulse_core::SummaryTree;
use pulse_core::SystemClock;
use pulse_core::TargetPoint;
use pulse_core::Unit;
use pulse_core::YearMonth;
use pulse_core::core::time::year_month_of;
use pulse_store_sqlite::SqlitePulseStore;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ApiError;
use crate::telemetry::ApiMetricEvent;
use crate::telemetry::ApiOutcome;
use crate::telemetry::ApiRoute;
use crate::telemetry::DashboardMetrics;
use crate::telemetry::NoopMetrics;

// ============================================================================
// SECTION: Server
// ============================================================================

/// Pulse dashboard server instance.
pub struct PulseServer {
    /// Validated configuration.
    config: PulseConfig,
    /// Shared handler state.
    state: Arc<AppState>,
}

impl PulseServer {
    /// Builds a server from configuration, opening the store and seeding the
    /// metric registry with any catalog definitions not yet registered.
    ///
    /// # Errors
    ///
    /// Returns [`PulseServerError`] when validation or store setup fails.
    pub fn from_config(config: PulseConfig) -> Result<Self, PulseServerError> {
        config.validate().map_err(|err| PulseServerError::Config(err.to_string()))?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let catalog =
            Arc::new(config.catalog().map_err(|err| PulseServerError::Config(err.to_string()))?);
        let calendar = config
            .fiscal_calendar()
            .map_err(|err| PulseServerError::Config(err.to_string()))?;
        let store = Arc::new(
            SqlitePulseStore::new(config.store.clone(), Arc::clone(&clock))
                .map_err(|err| PulseServerError::Init(err.to_string()))?,
        );
        seed_registry(store.as_ref(), &catalog)
            .map_err(|err| PulseServerError::Init(err.to_string()))?;

        let measures: Arc<dyn MeasureStore> = store.clone();
        let checkins: Arc<dyn CheckInStore> = store.clone();
        let cache: Arc<dyn ResponseCache> = Arc::new(InMemoryResponseCache::with_ttl(
            Arc::clone(&clock),
            Duration::from_secs(config.cache.ttl_secs),
        ));
        let plan = Arc::new(config.plan.clone());
        let aggregator = DashboardAggregator::new(
            Arc::clone(&catalog),
            Arc::clone(&plan),
            calendar,
            Arc::clone(&measures),
            None,
            Arc::clone(&clock),
        );
        let state = Arc::new(AppState {
            aggregator,
            catalog,
            plan,
            cache,
            checkins,
            measures,
            calendar,
            clock,
            admin_token: config.server.admin_token.clone(),
            metrics: Arc::new(NoopMetrics),
        });
        Ok(Self {
            config,
            state,
        })
    }

    /// Returns the shared handler state.
    #[must_use]
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Serves the dashboard API until the listener fails.
    ///
    /// # Errors
    ///
    /// Returns [`PulseServerError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), PulseServerError> {
        let addr: SocketAddr = self
            .config
            .server
            .bind_addr
            .parse()
            .map_err(|_| PulseServerError::Config("invalid bind address".to_string()))?;
        let app = router(self.state);
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|_| PulseServerError::Transport("http bind failed".to_string()))?;
        axum::serve(listener, app)
            .await
            .map_err(|_| PulseServerError::Transport("http server failed".to_string()))
    }
}

/// Registers catalog definitions absent from the durable registry.
fn seed_registry(store: &SqlitePulseStore, catalog: &MetricCatalog) -> Result<(), RegistryError> {
    let registered: Vec<MetricKey> =
        store.load_definitions()?.into_iter().map(|definition| definition.key).collect();
    for definition in catalog.iter() {
        if !registered.contains(&definition.key) {
            store.register(definition)?;
        }
    }
    Ok(())
}

/// Shared state behind every handler.
pub struct AppState {
    /// Rollup aggregator over the configured plan and store.
    pub aggregator: DashboardAggregator,
    /// Effective metric catalog (builtin plus configured extensions).
    pub catalog: Arc<MetricCatalog>,
    /// The business plan served by the dashboard.
    pub plan: Arc<BusinessPlan>,
    /// TTL response cache for summary payloads.
    pub cache: Arc<dyn ResponseCache>,
    /// Append-only check-in ledger.
    pub checkins: Arc<dyn CheckInStore>,
    /// Measure store, used for readiness probes.
    pub measures: Arc<dyn MeasureStore>,
    /// Fiscal calendar for default-period resolution.
    pub calendar: FiscalCalendar,
    /// Injected time source.
    pub clock: Arc<dyn Clock>,
    /// Bearer token required by admin endpoints; `None` disables them.
    pub admin_token: Option<String>,
    /// Metrics sink for request telemetry.
    pub metrics: Arc<dyn DashboardMetrics>,
}

/// Builds the dashboard router over shared state.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/okr/summary", get(handle_summary))
        .route("/okr/quarter-summary", get(handle_quarter_summary))
        .route("/okr/krs", get(handle_kr_list))
        .route("/okr/targets", get(handle_target_list))
        .route("/okr/metric-series", get(handle_metric_series))
        .route("/okr/kr-checkins/{kr_id}", get(handle_checkin_list))
        .route("/okr/kr-checkins", post(handle_checkin_create))
        .route("/okr/cache/invalidate", post(handle_cache_invalidate))
        .route("/healthz", get(handle_health))
        .route("/readyz", get(handle_ready))
        .with_state(state)
}

// ============================================================================
// SECTION: Read Handlers
// ============================================================================

/// Query parameters for the summary endpoint.
#[derive(Debug, Deserialize)]
struct SummaryQuery {
    /// Summary period label; defaults to `YTD`.
    period: Option<String>,
    /// Business-unit selector; `all` or absent selects the unfiltered view.
    bu: Option<String>,
}

/// Serves the dashboard summary tree, cached by period and business unit.
async fn handle_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<SummaryTree>, ApiError> {
    let period = query
        .period
        .as_deref()
        .map(SummaryPeriod::parse)
        .transpose()
        .map_err(|err| ApiError::BadRequest(err.to_string()))?
        .unwrap_or(SummaryPeriod::YearToDate);
    let unit = query.bu.as_deref().filter(|unit| *unit != "all");
    let dimension = unit.map(Dimension::business_unit);
    let key = format!("okr:summary:{}:{}", period.as_str(), unit.unwrap_or("all"));
    if let Some(payload) = state.cache.get(&key) {
        let mut tree: SummaryTree =
            serde_json::from_str(&payload).map_err(|_| ApiError::Serialization)?;
        tree.meta.cache_hit = true;
        observe(&state, ApiRoute::Summary, ApiOutcome::Ok, Some(true));
        return Ok(Json(tree));
    }
    let tree = state.aggregator.summary(period, dimension.as_ref());
    let payload = serde_json::to_string(&tree).map_err(|_| ApiError::Serialization)?;
    state.cache.put(&key, payload);
    observe(&state, ApiRoute::Summary, ApiOutcome::Ok, Some(false));
    Ok(Json(tree))
}

/// Query parameters for the quarter-summary endpoint.
#[derive(Debug, Deserialize)]
struct QuarterSummaryQuery {
    /// Fiscal year; defaults to the current fiscal year.
    year: Option<i32>,
}

/// Serves the per-quarter rollup table for a fiscal year.
async fn handle_quarter_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QuarterSummaryQuery>,
) -> Result<Json<QuarterSummary>, ApiError> {
    let fiscal_year = query.year.unwrap_or_else(|| {
        let today = year_month_of(state.clock.now());
        state.calendar.quarter_of(today).0
    });
    let summary = state.aggregator.quarter_summary(fiscal_year);
    observe(&state, ApiRoute::QuarterSummary, ApiOutcome::Ok, None);
    Ok(Json(summary))
}

/// One key result joined with its catalog definition.
#[derive(Debug, Serialize)]
struct KrCatalogRow {
    /// Key result identifier.
    id: KrId,
    /// Key result title.
    title: String,
    /// Referenced catalog metric.
    metric_key: MetricKey,
    /// Metric display unit.
    unit: Unit,
    /// Favorable direction.
    direction: Direction,
    /// Flow or stock aggregation.
    period_kind: PeriodKind,
    /// Static fallback targets keyed by period label.
    targets: BTreeMap<PeriodLabel, f64>,
}

/// Lists plan key results joined with their catalog definitions.
async fn handle_kr_list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<KrCatalogRow>>, ApiError> {
    let mut rows = Vec::new();
    for kr in state.plan.key_results() {
        let definition = state
            .catalog
            .get(&kr.metric_key)
            .ok_or_else(|| ApiError::NotFound(format!("unknown metric: {}", kr.metric_key)))?;
        rows.push(KrCatalogRow {
            id: kr.id.clone(),
            title: kr.title.clone(),
            metric_key: kr.metric_key.clone(),
            unit: definition.unit,
            direction: definition.direction,
            period_kind: definition.period_kind,
            targets: kr.targets.clone(),
        });
    }
    observe(&state, ApiRoute::KrList, ApiOutcome::Ok, None);
    Ok(Json(rows))
}

/// Query parameters for the targets endpoint.
#[derive(Debug, Deserialize)]
struct TargetListQuery {
    /// Fiscal year; defaults to the current fiscal year.
    year: Option<i32>,
}

/// Serves the raw target points for every catalog metric across a fiscal year.
async fn handle_target_list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TargetListQuery>,
) -> Result<Json<Vec<TargetPoint>>, ApiError> {
    let fiscal_year = query.year.unwrap_or_else(|| {
        let today = year_month_of(state.clock.now());
        state.calendar.quarter_of(today).0
    });
    let months = state.calendar.months_in(fiscal_year, Period::FiscalYear);
    let range = match (months.first(), months.last()) {
        (Some(first), Some(last)) => MonthRange::new(*first, *last),
        _ => return Ok(Json(Vec::new())),
    };
    let mut points = Vec::new();
    for definition in state.catalog.iter() {
        points.extend(state.measures.target_points(&definition.key, None, range)?);
    }
    observe(&state, ApiRoute::TargetList, ApiOutcome::Ok, None);
    Ok(Json(points))
}

/// Query parameters for the metric-series endpoint.
#[derive(Debug, Deserialize)]
struct MetricSeriesQuery {
    /// Catalog metric key.
    metric_key: String,
    /// Inclusive range start, `YYYY-MM`.
    start: String,
    /// Inclusive range end, `YYYY-MM`.
    end: String,
    /// Optional business-unit filter.
    business_unit: Option<String>,
}

/// Serves the raw monthly actual/target series for one metric.
async fn handle_metric_series(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MetricSeriesQuery>,
) -> Result<Json<Vec<SeriesPoint>>, ApiError> {
    let start = parse_year_month(&query.start)?;
    let end = parse_year_month(&query.end)?;
    let dimension = query.business_unit.as_deref().map(Dimension::business_unit);
    let points = state.aggregator.metric_series(
        &MetricKey::new(query.metric_key),
        MonthRange::new(start, end),
        dimension.as_ref(),
    )?;
    observe(&state, ApiRoute::MetricSeries, ApiOutcome::Ok, None);
    Ok(Json(points))
}

// ============================================================================
// SECTION: Check-in Handlers
// ============================================================================

/// Query parameters for the check-in list endpoint.
#[derive(Debug, Deserialize)]
struct CheckInListQuery {
    /// Optional plan-year filter.
    year: Option<i32>,
}

/// Lists check-ins for one key result, newest first.
async fn handle_checkin_list(
    State(state): State<Arc<AppState>>,
    Path(kr_id): Path<String>,
    Query(query): Query<CheckInListQuery>,
) -> Result<Json<Vec<CheckIn>>, ApiError> {
    let rows = state.checkins.for_kr(&KrId::new(kr_id), query.year)?;
    observe(&state, ApiRoute::CheckInList, ApiOutcome::Ok, None);
    Ok(Json(rows))
}

/// Appends a check-in to the ledger.
async fn handle_checkin_create(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewCheckIn>,
) -> Result<(StatusCode, Json<CheckIn>), ApiError> {
    let row = state.checkins.append(&new)?;
    observe(&state, ApiRoute::CheckInCreate, ApiOutcome::Ok, None);
    Ok((StatusCode::CREATED, Json(row)))
}

// ============================================================================
// SECTION: Admin Handlers
// ============================================================================

/// Request body for cache invalidation.
#[derive(Debug, Deserialize)]
struct InvalidateRequest {
    /// Exact key or prefix pattern ending in `*`; absent flushes everything.
    #[serde(default)]
    pattern: Option<String>,
}

/// Response body for cache invalidation.
#[derive(Debug, Serialize)]
struct InvalidateResponse {
    /// Number of entries removed.
    removed: usize,
}

/// Drops cached responses matching a pattern; requires the admin token.
async fn handle_cache_invalidate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>, ApiError> {
    require_admin(&state, &headers)?;
    let pattern = KeyPattern::parse(request.pattern.as_deref().unwrap_or("*"));
    let removed = state.cache.invalidate(&pattern);
    observe(&state, ApiRoute::CacheInvalidate, ApiOutcome::Ok, None);
    Ok(Json(InvalidateResponse {
        removed,
    }))
}

/// Rejects requests lacking the configured admin bearer token.
fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = state.admin_token.as_deref() else {
        return Err(ApiError::Unauthorized);
    };
    let presented = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    if presented == Some(expected) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}

// ============================================================================
// SECTION: Probe Handlers
// ============================================================================

/// Probe response body.
#[derive(Debug, Serialize)]
struct ProbeResponse {
    /// Stable probe status label.
    status: &'static str,
}

/// Liveness probe; always succeeds while the process serves requests.
async fn handle_health() -> Json<ProbeResponse> {
    Json(ProbeResponse {
        status: "ok",
    })
}

/// Readiness probe; fails with 503 until the store answers.
async fn handle_ready(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ProbeResponse>, StatusCode> {
    state.measures.readiness().map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;
    Ok(Json(ProbeResponse {
        status: "ready",
    }))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses a `YYYY-MM` month label.
fn parse_year_month(label: &str) -> Result<YearMonth, ApiError> {
    let invalid = || ApiError::BadRequest(format!("invalid month label: {label}"));
    let (year, month) = label.split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let raw: u8 = month.parse().map_err(|_| invalid())?;
    let month = Month::from_raw(raw).ok_or_else(invalid)?;
    Ok(YearMonth::new(year, month))
}

/// Records a request counter event.
fn observe(state: &AppState, route: ApiRoute, outcome: ApiOutcome, cache_hit: Option<bool>) {
    state.metrics.record_request(ApiMetricEvent {
        route,
        outcome,
        cache_hit,
    });
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Server lifecycle errors.
#[derive(Debug, thiserror::Error)]
pub enum PulseServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================
