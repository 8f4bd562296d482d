// crates/pulse-core/src/rollup/mod.rs
// ============================================================================
// Module: Pulse Rollup
// Description: Period aggregation, target resolution, and tree assembly.
// Purpose: Group the pure calculator and the orchestrating aggregator.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The calculator and target resolver are pure functions over monthly series;
//! the aggregator layers store access and plan traversal on top of them to
//! produce the dashboard payloads.

pub mod aggregator;
pub mod calculator;
pub mod targets;
