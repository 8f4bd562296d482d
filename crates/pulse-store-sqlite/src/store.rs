// crates/pulse-store-sqlite/src/store.rs
// ============================================================================
// Module: Pulse SQLite Store
// Description: SQLite persistence for monthly points, metrics, and check-ins.
// Purpose: Durable adapter behind the MeasureStore/MetricRegistry/CheckInStore traits.
// Dependencies: pulse-core, rusqlite, serde, serde_json
// ============================================================================

//! ## Overview
//! All Pulse tables live in one database file. Monthly target and actual
//! points are keyed by `(year, month, metric_key, dimension)`; the dimension
//! columns store empty strings for undimensioned rows so the primary key
//! stays total. Metric definitions are stored as JSON payloads keyed by
//! metric key. The check-in ledger is insert-only with an autoincrement row
//! id so recency ties on `created_at` break deterministically.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

use pulse_core::ActualPoint;
use pulse_core::CheckIn;
use pulse_core::CheckInError;
use pulse_core::CheckInPeriodType;
use pulse_core::CheckInStore;
use pulse_core::Clock;
use pulse_core::Dimension;
use pulse_core::KrId;
use pulse_core::MeasureStore;
use pulse_core::MetricDefinition;
use pulse_core::MetricKey;
use pulse_core::MetricRegistry;
use pulse_core::Month;
use pulse_core::MonthRange;
use pulse_core::NewCheckIn;
use pulse_core::RegistryError;
use pulse_core::StoreError;
use pulse_core::TargetPoint;
use pulse_core::YearMonth;
use pulse_core::core::time::unix_millis;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Current schema version persisted in `store_meta`.
pub const SCHEMA_VERSION: i64 = 1;

/// Default busy timeout for `SQLite` connections in milliseconds.
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Default read connection pool size.
const DEFAULT_READ_POOL_SIZE: usize = 4;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` Pulse store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
/// - `read_pool_size` must be greater than zero.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Number of read-only connections used for read path isolation.
    #[serde(default = "default_read_pool_size")]
    pub read_pool_size: usize,
}

impl SqliteStoreConfig {
    /// Creates a config with defaults for the given database path.
    #[must_use]
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
            read_pool_size: DEFAULT_READ_POOL_SIZE,
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default read connection pool size.
const fn default_read_pool_size() -> usize {
    DEFAULT_READ_POOL_SIZE
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages avoid embedding raw row payloads.
#[derive(Debug, Error, Clone)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Db(message),
            SqliteStoreError::VersionMismatch(message) => Self::Corrupt(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
        }
    }
}

impl From<SqliteStoreError> for RegistryError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message)
            | SqliteStoreError::VersionMismatch(message)
            | SqliteStoreError::Invalid(message) => Self::Invalid(message),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed Pulse store with WAL support.
///
/// # Invariants
/// - Writes are serialized through the write connection mutex.
/// - Reads rotate over the read pool round-robin.
/// - Check-in timestamps come from the injected clock, never `SQLite`.
pub struct SqlitePulseStore {
    /// Serialized write connection.
    write_connection: Mutex<Connection>,
    /// Read-only connection pool.
    read_connections: Vec<Mutex<Connection>>,
    /// Round-robin cursor over the read pool.
    read_cursor: AtomicUsize,
    /// Clock assigning check-in `created_at` timestamps.
    clock: Arc<dyn Clock>,
}

impl SqlitePulseStore {
    /// Opens an `SQLite`-backed Pulse store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// its schema cannot be initialized.
    pub fn new(config: SqliteStoreConfig, clock: Arc<dyn Clock>) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        if config.read_pool_size == 0 {
            return Err(SqliteStoreError::Invalid(
                "read_pool_size must be greater than zero".to_string(),
            ));
        }
        let mut write_connection = open_connection(&config)?;
        initialize_schema(&mut write_connection)?;
        let mut read_connections = Vec::with_capacity(config.read_pool_size);
        for _ in 0 .. config.read_pool_size {
            read_connections.push(Mutex::new(open_connection(&config)?));
        }
        Ok(Self {
            write_connection: Mutex::new(write_connection),
            read_connections,
            read_cursor: AtomicUsize::new(0),
            clock,
        })
    }

    /// Returns the next read connection in round-robin order.
    fn read_connection(&self) -> &Mutex<Connection> {
        let index = self.read_cursor.fetch_add(1, Ordering::Relaxed) % self.read_connections.len();
        &self.read_connections[index]
    }

    /// Reads monthly points from one table over a month range.
    fn points(
        &self,
        table: &str,
        metric_key: &MetricKey,
        dimension: Option<&Dimension>,
        range: MonthRange,
    ) -> Result<Vec<(YearMonth, Option<Dimension>, f64)>, SqliteStoreError> {
        let connection = self.read_connection();
        let guard = connection.lock().unwrap_or_else(PoisonError::into_inner);
        let sql = format!(
            "SELECT year, month, dimension_key, dimension_value, value FROM {table}
             WHERE metric_key = ?1
               AND dimension_key = ?2 AND dimension_value = ?3
               AND (year * 100 + month) BETWEEN ?4 AND ?5
             ORDER BY year, month"
        );
        let mut statement =
            guard.prepare(&sql).map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let (dim_key, dim_value) = dimension_columns(dimension);
        let rows = statement
            .query_map(
                params![
                    metric_key.as_str(),
                    dim_key,
                    dim_value,
                    month_ordinal(range.from),
                    month_ordinal(range.to)
                ],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, f64>(4)?,
                    ))
                },
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let mut points = Vec::new();
        for row in rows {
            let (year, month, dim_key, dim_value, value) =
                row.map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            points.push((
                decode_year_month(year, month)?,
                decode_dimension(&dim_key, &dim_value),
                value,
            ));
        }
        Ok(points)
    }

    /// Inserts or replaces one monthly point row.
    fn upsert_point(
        &self,
        table: &str,
        month: YearMonth,
        metric_key: &MetricKey,
        dimension: Option<&Dimension>,
        value: f64,
    ) -> Result<(), SqliteStoreError> {
        let guard = self.write_connection.lock().unwrap_or_else(PoisonError::into_inner);
        let sql = format!(
            "INSERT INTO {table} (year, month, metric_key, dimension_key, dimension_value, value)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (year, month, metric_key, dimension_key, dimension_value)
             DO UPDATE SET value = excluded.value"
        );
        let (dim_key, dim_value) = dimension_columns(dimension);
        guard
            .execute(
                &sql,
                params![
                    i64::from(month.year),
                    i64::from(month.month.get()),
                    metric_key.as_str(),
                    dim_key,
                    dim_value,
                    value
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }
}

impl MeasureStore for SqlitePulseStore {
    fn target_points(
        &self,
        metric_key: &MetricKey,
        dimension: Option<&Dimension>,
        range: MonthRange,
    ) -> Result<Vec<TargetPoint>, StoreError> {
        let rows = self.points("monthly_targets", metric_key, dimension, range)?;
        Ok(rows
            .into_iter()
            .map(|(month, dimension, value)| TargetPoint {
                month,
                metric_key: metric_key.clone(),
                dimension,
                value,
            })
            .collect())
    }

    fn actual_points(
        &self,
        metric_key: &MetricKey,
        dimension: Option<&Dimension>,
        range: MonthRange,
    ) -> Result<Vec<ActualPoint>, StoreError> {
        let rows = self.points("monthly_actuals", metric_key, dimension, range)?;
        Ok(rows
            .into_iter()
            .map(|(month, dimension, value)| ActualPoint {
                month,
                metric_key: metric_key.clone(),
                dimension,
                value,
            })
            .collect())
    }

    fn upsert_target(&self, point: &TargetPoint) -> Result<(), StoreError> {
        self.upsert_point(
            "monthly_targets",
            point.month,
            &point.metric_key,
            point.dimension.as_ref(),
            point.value,
        )?;
        Ok(())
    }

    fn upsert_actual(&self, point: &ActualPoint) -> Result<(), StoreError> {
        self.upsert_point(
            "monthly_actuals",
            point.month,
            &point.metric_key,
            point.dimension.as_ref(),
            point.value,
        )?;
        Ok(())
    }

    fn readiness(&self) -> Result<(), StoreError> {
        let connection = self.read_connection();
        let guard = connection.lock().unwrap_or_else(PoisonError::into_inner);
        guard
            .execute("SELECT 1", [])
            .map_err(|err| StoreError::Db(err.to_string()))?;
        Ok(())
    }
}

impl MetricRegistry for SqlitePulseStore {
    fn load_definitions(&self) -> Result<Vec<MetricDefinition>, RegistryError> {
        let connection = self.read_connection();
        let guard = connection.lock().unwrap_or_else(PoisonError::into_inner);
        let mut statement = guard
            .prepare("SELECT definition_json FROM metric_registry ORDER BY metric_key")
            .map_err(|err| RegistryError::Invalid(err.to_string()))?;
        let rows = statement
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|err| RegistryError::Invalid(err.to_string()))?;
        let mut definitions = Vec::new();
        for row in rows {
            let payload = row.map_err(|err| RegistryError::Invalid(err.to_string()))?;
            let definition: MetricDefinition = serde_json::from_str(&payload)
                .map_err(|err| RegistryError::Invalid(err.to_string()))?;
            definitions.push(definition);
        }
        Ok(definitions)
    }

    fn register(&self, definition: &MetricDefinition) -> Result<(), RegistryError> {
        let payload = serde_json::to_string(definition)
            .map_err(|err| RegistryError::Invalid(err.to_string()))?;
        let guard = self.write_connection.lock().unwrap_or_else(PoisonError::into_inner);
        let inserted = guard
            .execute(
                "INSERT OR IGNORE INTO metric_registry (metric_key, definition_json)
                 VALUES (?1, ?2)",
                params![definition.key.as_str(), payload],
            )
            .map_err(|err| RegistryError::Invalid(err.to_string()))?;
        if inserted == 0 {
            return Err(RegistryError::Conflict(definition.key.as_str().to_string()));
        }
        Ok(())
    }
}

impl CheckInStore for SqlitePulseStore {
    fn append(&self, new: &NewCheckIn) -> Result<CheckIn, CheckInError> {
        new.validate()?;
        let created_at = unix_millis(self.clock.now());
        let guard = self.write_connection.lock().unwrap_or_else(PoisonError::into_inner);
        guard
            .execute(
                "INSERT INTO kr_checkins
                 (kr_id, year, period_type, period_value, confidence,
                  commentary, blockers, next_actions, created_by, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    new.kr_id.as_str(),
                    i64::from(new.year),
                    period_type_label(new.period_type),
                    i64::from(new.period_value),
                    i64::from(new.confidence),
                    new.commentary,
                    new.blockers,
                    new.next_actions,
                    new.created_by,
                    created_at
                ],
            )
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let id = guard.last_insert_rowid();
        Ok(CheckIn {
            id,
            kr_id: new.kr_id.clone(),
            year: new.year,
            period_type: new.period_type,
            period_value: new.period_value,
            confidence: new.confidence,
            commentary: new.commentary.clone(),
            blockers: new.blockers.clone(),
            next_actions: new.next_actions.clone(),
            created_by: new.created_by.clone(),
            created_at,
        })
    }

    fn latest_per_kr(&self, year: i32) -> Result<BTreeMap<KrId, CheckIn>, StoreError> {
        let connection = self.read_connection();
        let guard = connection.lock().unwrap_or_else(PoisonError::into_inner);
        let mut statement = guard
            .prepare(
                "SELECT id, kr_id, year, period_type, period_value, confidence,
                        commentary, blockers, next_actions, created_by, created_at
                 FROM kr_checkins WHERE year = ?1
                 ORDER BY created_at, id",
            )
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map(params![i64::from(year)], decode_checkin_row)
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let mut latest = BTreeMap::new();
        for row in rows {
            let row = row.map_err(|err| StoreError::Db(err.to_string()))?;
            let checkin = decode_checkin(row)?;
            // Ascending order means the last row seen per KR is the newest.
            latest.insert(checkin.kr_id.clone(), checkin);
        }
        Ok(latest)
    }

    fn for_kr(&self, kr_id: &KrId, year: Option<i32>) -> Result<Vec<CheckIn>, StoreError> {
        let connection = self.read_connection();
        let guard = connection.lock().unwrap_or_else(PoisonError::into_inner);
        let mut statement = guard
            .prepare(
                "SELECT id, kr_id, year, period_type, period_value, confidence,
                        commentary, blockers, next_actions, created_by, created_at
                 FROM kr_checkins
                 WHERE kr_id = ?1 AND (?2 IS NULL OR year = ?2)
                 ORDER BY created_at DESC, id DESC",
            )
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map(params![kr_id.as_str(), year.map(i64::from)], decode_checkin_row)
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let mut checkins = Vec::new();
        for row in rows {
            let row = row.map_err(|err| StoreError::Db(err.to_string()))?;
            checkins.push(decode_checkin(row)?);
        }
        Ok(checkins)
    }
}

// ============================================================================
// SECTION: Row Decoding
// ============================================================================

/// Raw check-in row as read from `SQLite`.
type RawCheckInRow = (
    i64,
    String,
    i64,
    String,
    i64,
    i64,
    Option<String>,
    Option<String>,
    Option<String>,
    String,
    i64,
);

/// Maps a `kr_checkins` row into its raw tuple form.
fn decode_checkin_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawCheckInRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
        row.get(10)?,
    ))
}

/// Converts a raw row into a domain check-in, validating ranges.
fn decode_checkin(row: RawCheckInRow) -> Result<CheckIn, StoreError> {
    let (
        id,
        kr_id,
        year,
        period_type,
        period_value,
        confidence,
        commentary,
        blockers,
        next_actions,
        created_by,
        created_at,
    ) = row;
    Ok(CheckIn {
        id,
        kr_id: KrId::new(kr_id),
        year: i32::try_from(year)
            .map_err(|_| StoreError::Corrupt(format!("check-in year out of range: {year}")))?,
        period_type: parse_period_type(&period_type)?,
        period_value: u8::try_from(period_value).map_err(|_| {
            StoreError::Corrupt(format!("check-in period_value out of range: {period_value}"))
        })?,
        confidence: u8::try_from(confidence).map_err(|_| {
            StoreError::Corrupt(format!("check-in confidence out of range: {confidence}"))
        })?,
        commentary,
        blockers,
        next_actions,
        created_by,
        created_at,
    })
}

/// Returns the stored label for a check-in period type.
const fn period_type_label(period_type: CheckInPeriodType) -> &'static str {
    match period_type {
        CheckInPeriodType::Month => "month",
        CheckInPeriodType::Quarter => "quarter",
        CheckInPeriodType::Year => "year",
    }
}

/// Parses a stored check-in period type label.
fn parse_period_type(label: &str) -> Result<CheckInPeriodType, StoreError> {
    match label {
        "month" => Ok(CheckInPeriodType::Month),
        "quarter" => Ok(CheckInPeriodType::Quarter),
        "year" => Ok(CheckInPeriodType::Year),
        other => Err(StoreError::Corrupt(format!("unknown check-in period type: {other}"))),
    }
}

/// Returns the dimension columns stored for an optional dimension.
fn dimension_columns(dimension: Option<&Dimension>) -> (&str, &str) {
    dimension.map_or(("", ""), |dimension| (dimension.key.as_str(), dimension.value.as_str()))
}

/// Decodes stored dimension columns, mapping empty strings to `None`.
fn decode_dimension(key: &str, value: &str) -> Option<Dimension> {
    if key.is_empty() {
        return None;
    }
    Some(Dimension {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Returns a sortable `year * 100 + month` ordinal for range queries.
fn month_ordinal(month: YearMonth) -> i64 {
    i64::from(month.year) * 100 + i64::from(month.month.get())
}

/// Decodes stored year/month columns into a [`YearMonth`].
fn decode_year_month(year: i64, month: i64) -> Result<YearMonth, SqliteStoreError> {
    let year = i32::try_from(year)
        .map_err(|_| SqliteStoreError::Invalid(format!("stored year out of range: {year}")))?;
    let month = u8::try_from(month)
        .ok()
        .and_then(Month::from_raw)
        .ok_or_else(|| SqliteStoreError::Invalid(format!("stored month out of range: {month}")))?;
    Ok(YearMonth::new(year, month))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates the store path shape before opening.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with durability pragmas applied.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(connection)
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS monthly_targets (
                    year INTEGER NOT NULL,
                    month INTEGER NOT NULL,
                    metric_key TEXT NOT NULL,
                    dimension_key TEXT NOT NULL DEFAULT '',
                    dimension_value TEXT NOT NULL DEFAULT '',
                    value REAL NOT NULL,
                    PRIMARY KEY (year, month, metric_key, dimension_key, dimension_value)
                );
                CREATE TABLE IF NOT EXISTS monthly_actuals (
                    year INTEGER NOT NULL,
                    month INTEGER NOT NULL,
                    metric_key TEXT NOT NULL,
                    dimension_key TEXT NOT NULL DEFAULT '',
                    dimension_value TEXT NOT NULL DEFAULT '',
                    value REAL NOT NULL,
                    PRIMARY KEY (year, month, metric_key, dimension_key, dimension_value)
                );
                CREATE INDEX IF NOT EXISTS idx_monthly_targets_metric
                    ON monthly_targets (metric_key, year, month);
                CREATE INDEX IF NOT EXISTS idx_monthly_actuals_metric
                    ON monthly_actuals (metric_key, year, month);
                CREATE TABLE IF NOT EXISTS metric_registry (
                    metric_key TEXT NOT NULL PRIMARY KEY,
                    definition_json TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS kr_checkins (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    kr_id TEXT NOT NULL,
                    year INTEGER NOT NULL,
                    period_type TEXT NOT NULL,
                    period_value INTEGER NOT NULL,
                    confidence INTEGER NOT NULL,
                    commentary TEXT,
                    blockers TEXT,
                    next_actions TEXT,
                    created_by TEXT NOT NULL,
                    created_at INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_kr_checkins_kr
                    ON kr_checkins (kr_id, year, created_at);",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(SCHEMA_VERSION) => {}
        Some(other) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "expected schema version {SCHEMA_VERSION}, found {other}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))
}
