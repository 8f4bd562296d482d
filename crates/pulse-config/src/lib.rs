// crates/pulse-config/src/lib.rs
// ============================================================================
// Module: Pulse Config Library
// Description: Canonical configuration model, loading guards, and validation.
// Purpose: Give every Pulse binary one strict, fail-closed config surface.
// Dependencies: pulse-core, pulse-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration for the Pulse services. One TOML file declares the server
//! surface, the store location, the cache policy, the fiscal calendar, the
//! business plan, and any metric definitions beyond the builtin catalog.
//! Invariants:
//! - Loading is fail-closed: oversized files, non-UTF-8 bytes, and unknown
//!   keys are rejected before any value is used.
//! - A loaded config is validated as a whole; the plan must reference only
//!   metrics present in the effective catalog.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use pulse_core::BusinessPlan;
use pulse_core::FiscalCalendar;
use pulse_core::MetricCatalog;
use pulse_core::MetricDefinition;
use pulse_core::Month;
use pulse_store_sqlite::SqliteStoreConfig;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted length of a config path, in bytes.
pub const MAX_CONFIG_PATH_LEN: usize = 4_096;

/// Maximum accepted length of a single path component, in bytes.
pub const MAX_PATH_COMPONENT_LEN: usize = 255;

/// Maximum accepted config file size, in bytes.
pub const MAX_CONFIG_BYTES: u64 = 1_048_576;

/// Default bind address for the HTTP server.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Default response cache time-to-live, in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Filesystem failure while reading the config file.
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    /// The file was not valid TOML for the config model.
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// The config parsed but violates a semantic rule.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Config Model
// ============================================================================

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address the server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Bearer token required by admin endpoints; absent disables them.
    #[serde(default)]
    pub admin_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            admin_token: None,
        }
    }
}

/// Response cache settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Seconds a cached response stays fresh.
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

/// Fiscal calendar settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalendarConfig {
    /// Calendar month (1..=12) on which the fiscal year begins.
    #[serde(default = "default_fiscal_start_month")]
    pub fiscal_year_start_month: u8,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            fiscal_year_start_month: default_fiscal_start_month(),
        }
    }
}

/// Root configuration for the Pulse services.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PulseConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Durable store settings.
    pub store: SqliteStoreConfig,
    /// Response cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Fiscal calendar settings.
    #[serde(default)]
    pub calendar: CalendarConfig,
    /// The business plan served by the dashboard.
    pub plan: BusinessPlan,
    /// Metric definitions added on top of the builtin catalog.
    #[serde(default)]
    pub metrics: Vec<MetricDefinition>,
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl PulseConfig {
    /// Loads and validates configuration from `path`.
    ///
    /// When `path` is `None` the default `pulse.toml` in the working
    /// directory is used.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the path fails the input guards, the
    /// file cannot be read or parsed, or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map_or_else(|| PathBuf::from("pulse.toml"), Path::to_path_buf);
        validate_config_path(&path)?;
        let metadata = fs::metadata(&path)?;
        if metadata.len() > MAX_CONFIG_BYTES {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let bytes = fs::read(&path)?;
        let text = String::from_utf8(bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(&text)
    }

    /// Parses and validates configuration from a TOML string.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration as a whole.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for semantic violations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server
            .bind_addr
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::Invalid("server bind_addr must be a socket address".to_string()))?;
        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::Invalid("cache ttl_secs must be positive".to_string()));
        }
        self.fiscal_calendar()?;
        let catalog = self.catalog()?;
        self.plan
            .validate(&catalog)
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        Ok(())
    }

    /// Builds the effective metric catalog: builtin definitions plus the
    /// configured extensions.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] when an extension duplicates a key.
    pub fn catalog(&self) -> Result<MetricCatalog, ConfigError> {
        let builtin = MetricCatalog::builtin();
        let definitions = builtin.iter().cloned().chain(self.metrics.iter().cloned());
        MetricCatalog::from_definitions(definitions)
            .map_err(|err| ConfigError::Invalid(err.to_string()))
    }

    /// Builds the fiscal calendar from the configured start month.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] when the start month is out of range.
    pub fn fiscal_calendar(&self) -> Result<FiscalCalendar, ConfigError> {
        let month = Month::from_raw(self.calendar.fiscal_year_start_month).ok_or_else(|| {
            ConfigError::Invalid("calendar fiscal_year_start_month must be 1..=12".to_string())
        })?;
        Ok(FiscalCalendar::new(month))
    }
}

// ============================================================================
// SECTION: Path Guards
// ============================================================================

/// Rejects config paths that exceed length limits.
fn validate_config_path(path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().len() > MAX_CONFIG_PATH_LEN {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LEN {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default server bind address.
fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

/// Default cache time-to-live in seconds.
const fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

/// Default fiscal-year start month (January).
const fn default_fiscal_start_month() -> u8 {
    1
}
