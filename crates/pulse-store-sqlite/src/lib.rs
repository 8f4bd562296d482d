// crates/pulse-store-sqlite/src/lib.rs
// ============================================================================
// Module: Pulse SQLite Store Library
// Description: SQLite-backed persistence for measures, metrics, and check-ins.
// Purpose: Provide the durable store adapters behind the core interfaces.
// Dependencies: pulse-core, rusqlite
// ============================================================================

//! ## Overview
//! `SQLite`-backed implementations of the Pulse store interfaces. One store
//! owns the database file and implements measure reads/writes, the metric
//! registry, and the append-only check-in ledger over a single schema.
//! Invariants:
//! - Writes are serialized through one connection; reads rotate over a
//!   read-only pool.
//! - Absent rows stay absent; the store never materializes zeros.
//! - Check-in rows are insert-only; no update or delete statement exists.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SCHEMA_VERSION;
pub use store::SqlitePulseStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
