// crates/pulse-core/src/cache.rs
// ============================================================================
// Module: Pulse Response Cache
// Description: TTL response cache with pattern invalidation.
// Purpose: Serve repeated dashboard renders without recomputation.
// Dependencies: crate::core::time, thiserror
// ============================================================================

//! ## Overview
//! Dashboard payloads are expensive to assemble and cheap to reuse for a few
//! minutes. The cache stores serialized responses under structured string
//! keys (`okr:summary:{period}:{business_unit}`) with a fixed TTL, and
//! supports explicit invalidation by exact key or trailing-`*` prefix pattern
//! so an ingestion job can drop every summary variant in one call. Expired
//! entries are purged lazily on read; time comes from the injected clock so
//! expiry is testable without sleeping.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::Duration;

use time::OffsetDateTime;

use crate::core::time::Clock;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

// ============================================================================
// SECTION: Key Patterns
// ============================================================================

/// Invalidation pattern over cache keys.
///
/// # Invariants
/// - A trailing `*` is the only wildcard form; it matches any key with the
///   preceding prefix. Every other pattern matches exactly one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPattern {
    /// Matches one key verbatim.
    Exact(String),
    /// Matches every key starting with the prefix.
    Prefix(String),
}

impl KeyPattern {
    /// Parses a pattern string, treating a trailing `*` as a prefix wildcard.
    #[must_use]
    pub fn parse(pattern: &str) -> Self {
        pattern.strip_suffix('*').map_or_else(
            || Self::Exact(pattern.to_string()),
            |prefix| Self::Prefix(prefix.to_string()),
        )
    }

    /// Returns true when the pattern matches a key.
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        match self {
            Self::Exact(exact) => key == exact,
            Self::Prefix(prefix) => key.starts_with(prefix.as_str()),
        }
    }
}

// ============================================================================
// SECTION: Cache Interface
// ============================================================================

/// TTL cache of serialized response payloads.
///
/// Implementations must be safe to share across request handlers.
pub trait ResponseCache: Send + Sync {
    /// Returns the cached payload for a key, if present and unexpired.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores a payload under a key with the cache's TTL.
    fn put(&self, key: &str, payload: String);

    /// Removes entries matching the pattern, returning how many were dropped.
    fn invalidate(&self, pattern: &KeyPattern) -> usize;

    /// Removes every entry, returning how many were dropped.
    fn clear(&self) -> usize;
}

// ============================================================================
// SECTION: In-Memory Cache
// ============================================================================

/// One cached payload with its expiry instant.
#[derive(Debug, Clone)]
struct CacheEntry {
    /// Serialized response payload.
    payload: String,
    /// Instant past which the entry is stale.
    expires_at: OffsetDateTime,
}

/// Mutex-guarded in-memory TTL cache.
///
/// # Invariants
/// - A `get` never returns a payload past its expiry; stale entries are
///   removed on the read that observes them.
pub struct InMemoryResponseCache {
    /// Live entries keyed by cache key.
    entries: Mutex<HashMap<String, CacheEntry>>,
    /// Entry lifetime applied on `put`.
    ttl: Duration,
    /// Injected time source.
    clock: Arc<dyn Clock>,
}

impl InMemoryResponseCache {
    /// Creates a cache with the default TTL.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(clock, DEFAULT_TTL)
    }

    /// Creates a cache with an explicit TTL.
    #[must_use]
    pub fn with_ttl(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Returns the number of live and stale entries currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true when no entry is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResponseCache for InMemoryResponseCache {
    fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        let mut guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(entry) = guard.get(key) else {
            return None;
        };
        if entry.expires_at <= now {
            guard.remove(key);
            return None;
        }
        Some(entry.payload.clone())
    }

    fn put(&self, key: &str, payload: String) {
        let expires_at = self.clock.now() + self.ttl;
        let mut guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        guard.insert(
            key.to_string(),
            CacheEntry {
                payload,
                expires_at,
            },
        );
    }

    fn invalidate(&self, pattern: &KeyPattern) -> usize {
        let mut guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = guard.len();
        guard.retain(|key, _| !pattern.matches(key));
        before - guard.len()
    }

    fn clear(&self) -> usize {
        let mut guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let dropped = guard.len();
        guard.clear();
        dropped
    }
}
