//! Content-addressed, TTL-based artifact cache.
//!
//! [`CacheStore`] sits in front of a [`KeyValueStore`] backend. Values are
//! wrapped in a [`CacheEntry`] recording creation time and TTL; expiry is
//! checked lazily on read, so no background sweeper is needed and any dumb
//! string store can act as a backend.
//!
//! Two TTL classes exist:
//!
//! - [`TtlClass::Project`]: short-lived (hours), for facts scoped to one
//!   project fingerprint.
//! - [`TtlClass::Generated`]: long-lived (days), for generated artifacts.
//!
//! Cache failures never fail a generation: read errors degrade to a miss and
//! write errors are logged and counted.

mod key;
mod store;

pub use key::CacheKey;
pub use store::{FileStore, KeyValueStore, MemoryStore};

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::MimirError;
use crate::telemetry;
use crate::types::ProjectFacts;

/// Lifetime class of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TtlClass {
    /// Facts tied to one project state.
    Project,
    /// Generated artifact content.
    Generated,
}

impl TtlClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            TtlClass::Project => "project",
            TtlClass::Generated => "generated",
        }
    }
}

/// Configuration for the artifact cache.
///
/// ```rust
/// # use mimir::cache::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .project_ttl(Duration::from_secs(3600))
///     .generated_ttl(Duration::from_secs(86_400));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for [`TtlClass::Project`] entries. Default: 12 hours.
    pub project_ttl: Duration,
    /// TTL for [`TtlClass::Generated`] entries. Default: 7 days.
    pub generated_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            project_ttl: Duration::from_secs(12 * 3600),
            generated_ttl: Duration::from_secs(7 * 24 * 3600),
        }
    }
}

impl CacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project_ttl(mut self, ttl: Duration) -> Self {
        self.project_ttl = ttl;
        self
    }

    pub fn generated_ttl(mut self, ttl: Duration) -> Self {
        self.generated_ttl = ttl;
        self
    }

    /// TTL applied to entries of `class`.
    pub fn ttl_for(&self, class: TtlClass) -> Duration {
        match class {
            TtlClass::Project => self.project_ttl,
            TtlClass::Generated => self.generated_ttl,
        }
    }
}

/// Stored representation of one cached value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub ttl_secs: u64,
}

impl CacheEntry {
    pub fn new(content: impl Into<String>, ttl: Duration) -> Self {
        Self {
            content: content.into(),
            created_at: Utc::now(),
            ttl_secs: ttl.as_secs(),
        }
    }

    /// Whether the entry has outlived its TTL at `now`.
    ///
    /// An entry dated in the future (clock skew) is treated as fresh.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.created_at).num_seconds();
        age >= 0 && age as u64 >= self.ttl_secs
    }
}

/// TTL-aware cache over a string backend.
///
/// Cloning is cheap; clones share the backend.
#[derive(Clone)]
pub struct CacheStore {
    backend: Arc<dyn KeyValueStore>,
    config: CacheConfig,
}

impl CacheStore {
    pub fn new(backend: Arc<dyn KeyValueStore>, config: CacheConfig) -> Self {
        Self { backend, config }
    }

    /// In-process cache with default TTLs.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), CacheConfig::default())
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Look up live content for `key`.
    ///
    /// Returns `None` on a miss, on an expired entry, and on any backend or
    /// decode failure.
    pub async fn get(&self, key: &CacheKey) -> Option<String> {
        let class = key.class().as_str();
        let entry = match self.backend.get(key.as_str()).await {
            Ok(Some(raw)) => match serde_json::from_str::<CacheEntry>(&raw) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(key = key.as_str(), error = %e, "discarding undecodable cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(key = key.as_str(), error = %e, "cache read failed, treating as miss");
                None
            }
        };

        match entry {
            Some(entry) if !entry.is_expired(Utc::now()) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL, "class" => class).increment(1);
                Some(entry.content)
            }
            Some(_) => {
                debug!(key = key.as_str(), "cache entry expired");
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "class" => class).increment(1);
                None
            }
            None => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "class" => class).increment(1);
                None
            }
        }
    }

    /// Store `content` under `key` with the TTL of the key's class.
    ///
    /// Failures are logged and counted, never returned.
    pub async fn set(&self, key: &CacheKey, content: impl Into<String>) {
        let entry = CacheEntry::new(content, self.config.ttl_for(key.class()));
        let result = match serde_json::to_string(&entry) {
            Ok(raw) => self.backend.set(key.as_str(), raw).await,
            Err(e) => Err(MimirError::CacheWrite(e.to_string())),
        };
        if let Err(e) = result {
            warn!(key = key.as_str(), error = %e, "cache write failed");
            metrics::counter!(telemetry::CACHE_WRITE_FAILURES_TOTAL,
                "class" => key.class().as_str(),
            )
            .increment(1);
        }
    }

    /// Cached facts snapshot for a project state.
    pub async fn get_facts(&self, fingerprint: &str) -> Option<ProjectFacts> {
        let raw = self.get(&CacheKey::for_facts(fingerprint)).await?;
        match serde_json::from_str(&raw) {
            Ok(facts) => Some(facts),
            Err(e) => {
                warn!(fingerprint, error = %e, "discarding undecodable facts snapshot");
                None
            }
        }
    }

    /// Cache the facts snapshot for a project state.
    pub async fn set_facts(&self, fingerprint: &str, facts: &ProjectFacts) {
        match serde_json::to_string(facts) {
            Ok(raw) => self.set(&CacheKey::for_facts(fingerprint), raw).await,
            Err(e) => warn!(fingerprint, error = %e, "failed to encode facts snapshot"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn cache_config_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl_for(TtlClass::Project), Duration::from_secs(43_200));
        assert_eq!(config.ttl_for(TtlClass::Generated), Duration::from_secs(604_800));
    }

    #[test]
    fn entry_expires_at_ttl() {
        let entry = CacheEntry::new("x", Duration::from_secs(60));
        assert!(!entry.is_expired(entry.created_at));
        assert!(!entry.is_expired(entry.created_at + TimeDelta::seconds(59)));
        assert!(entry.is_expired(entry.created_at + TimeDelta::seconds(60)));
    }

    #[test]
    fn future_dated_entry_is_fresh() {
        let entry = CacheEntry::new("x", Duration::from_secs(60));
        assert!(!entry.is_expired(entry.created_at - TimeDelta::seconds(3600)));
    }
}
