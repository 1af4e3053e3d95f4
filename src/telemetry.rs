//! Telemetry metric name constants.
//!
//! Centralised metric names for mimir operations. Consumers install their
//! own `metrics` recorder (e.g. prometheus, statsd); without a recorder
//! installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `mimir_`. Counters end in `_total`.
//!
//! # Common labels
//!
//! - `class`: cache TTL class: "project" or "generated"
//! - `category`: artifact category: "agent", "skill", "summary"
//! - `service`: generation service name (e.g. "anthropic")
//! - `source`: how an artifact was produced: "cache", "override",
//!   "builtin", "live", "fallback"

/// Total cache hits.
///
/// Labels: `class`.
pub const CACHE_HITS_TOTAL: &str = "mimir_cache_hits_total";

/// Total cache misses, including expired and undecodable entries.
///
/// Labels: `class`.
pub const CACHE_MISSES_TOTAL: &str = "mimir_cache_misses_total";

/// Total failed cache writes. Failed writes never fail a generation.
///
/// Labels: `class`.
pub const CACHE_WRITE_FAILURES_TOTAL: &str = "mimir_cache_write_failures_total";

/// Total retry attempts (not counting the initial call).
///
/// Labels: `service`.
pub const RETRIES_TOTAL: &str = "mimir_retries_total";

/// Total artifacts resolved.
///
/// Labels: `category`, `source`.
pub const ARTIFACTS_TOTAL: &str = "mimir_artifacts_total";

/// Total batches aborted by the failure threshold.
///
/// Labels: `category`.
pub const BATCH_ABORTS_TOTAL: &str = "mimir_batch_aborts_total";
