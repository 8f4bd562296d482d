// crates/pulse-server/src/lib.rs
// ============================================================================
// Module: Pulse Server Library
// Description: HTTP surface for the Pulse dashboard backend.
// Purpose: Expose rollup reads, check-in writes, and cache administration.
// Dependencies: pulse-core, pulse-config, pulse-store-sqlite, axum, tokio
// ============================================================================

//! ## Overview
//! The Pulse server serves the OKR dashboard over JSON: period rollups,
//! quarter tables, raw metric series, and the check-in ledger. Summary
//! responses are cached with a TTL keyed by period and business unit.
//! Invariants:
//! - Each request resolves "now" once; every figure in one response is
//!   consistent with a single clock reading.
//! - Admin endpoints are disabled unless a token is configured.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod error;
pub mod server;
pub mod telemetry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::ApiError;
pub use server::AppState;
pub use server::PulseServer;
pub use server::PulseServerError;
pub use server::router;
pub use telemetry::ApiMetricEvent;
pub use telemetry::ApiOutcome;
pub use telemetry::ApiRoute;
pub use telemetry::DashboardMetrics;
pub use telemetry::NoopMetrics;
