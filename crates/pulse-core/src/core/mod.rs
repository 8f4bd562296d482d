// crates/pulse-core/src/core/mod.rs
// ============================================================================
// Module: Pulse Core Domain
// Description: Domain vocabulary for the rollup engine.
// Purpose: Group periods, metrics, series, plan, check-ins, and time.
// Dependencies: serde, thiserror, time
// ============================================================================

//! ## Overview
//! Pure domain types shared by every other layer. Nothing in here performs
//! I/O; persistence and transport live behind the interfaces module.

pub mod checkin;
pub mod metric;
pub mod period;
pub mod plan;
pub mod series;
pub mod time;
