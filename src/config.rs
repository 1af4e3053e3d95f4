//! Configuration loading.
//!
//! Configuration is loaded from TOML with the following resolution order:
//! 1. Explicit path (e.g. `--config <path>`)
//! 2. `~/.mimir/config.toml` (user)
//! 3. Built-in defaults
//!
//! The Anthropic API key is never read from the config file; it comes from
//! the `ANTHROPIC_API_KEY` environment variable.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::providers::{RetryConfig, TierModels};
use crate::types::ModelTier;
use crate::{MimirError, Result};

/// Environment variable holding the Anthropic API key.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub retry: RetrySection,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub templates: TemplatesConfig,
}

/// Batch execution settings.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Maximum tasks in flight per category (default: 4).
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Fraction of failed items that aborts a category (default: 0.5).
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: f64,
    /// Per-call timeout for the generation service in seconds (default: 60).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Output token budget per live generation (default: 4096).
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: usize,
    /// Default tier ceiling for requests built by the CLI (default: balanced).
    #[serde(default)]
    pub ceiling: ModelTier,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            failure_threshold: default_failure_threshold(),
            request_timeout_secs: default_request_timeout(),
            max_output_tokens: default_max_output_tokens(),
            ceiling: ModelTier::default(),
        }
    }
}

fn default_concurrency() -> usize {
    crate::orchestrator::DEFAULT_CONCURRENCY
}

fn default_failure_threshold() -> f64 {
    crate::engine::DEFAULT_FAILURE_THRESHOLD
}

fn default_request_timeout() -> u64 {
    crate::providers::DEFAULT_TIMEOUT.as_secs()
}

fn default_max_output_tokens() -> usize {
    crate::resolver::DEFAULT_MAX_OUTPUT_TOKENS
}

/// Retry settings for the generation service.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySection {
    /// Total attempts including the first (default: 3).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Backoff before the first retry in milliseconds (default: 500).
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Backoff cap in milliseconds (default: 30000).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "default_jitter")]
    pub jitter: bool,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            jitter: default_jitter(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_jitter() -> bool {
    true
}

impl RetrySection {
    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig::new()
            .max_attempts(self.max_attempts)
            .initial_delay(Duration::from_millis(self.initial_delay_ms))
            .max_delay(Duration::from_millis(self.max_delay_ms))
            .jitter(self.jitter)
    }
}

/// Artifact cache settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    /// Cache directory (default: `~/.cache/mimir/artifacts`).
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Use an in-process cache only; nothing persists across runs.
    #[serde(default)]
    pub memory_only: bool,
    /// TTL for project-scoped entries in hours (default: 12).
    #[serde(default = "default_project_ttl_hours")]
    pub project_ttl_hours: u64,
    /// TTL for generated artifacts in days (default: 7).
    #[serde(default = "default_generated_ttl_days")]
    pub generated_ttl_days: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            dir: None,
            memory_only: false,
            project_ttl_hours: default_project_ttl_hours(),
            generated_ttl_days: default_generated_ttl_days(),
        }
    }
}

impl CacheSection {
    pub fn to_cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .project_ttl(Duration::from_secs(self.project_ttl_hours.saturating_mul(3600)))
            .generated_ttl(Duration::from_secs(
                self.generated_ttl_days.saturating_mul(24 * 3600),
            ))
    }
}

fn default_project_ttl_hours() -> u64 {
    12
}

fn default_generated_ttl_days() -> u64 {
    7
}

/// Generation service settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderConfig {
    /// Anthropic API base URL (default: https://api.anthropic.com).
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub models: TierModels,
}

/// Template settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplatesConfig {
    /// Directory of user override templates.
    #[serde(default)]
    pub override_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided; must exist)
    /// 2. `~/.mimir/config.toml`
    /// 3. Defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            MimirError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            MimirError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(MimirError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        Ok(dirs::home_dir()
            .map(|home| home.join(".mimir").join("config.toml"))
            .filter(|path| path.exists()))
    }

    /// API key from the environment, if set and non-empty.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.engine.request_timeout_secs)
    }
}
