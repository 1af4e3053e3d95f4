//! Builder for configuring coordinator instances

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::coordinator::{DEFAULT_FAILURE_THRESHOLD, GenerationCoordinator};
use crate::cache::{CacheConfig, CacheStore, FileStore, MemoryStore};
use crate::config::Config;
use crate::orchestrator::{BatchOrchestrator, DEFAULT_CONCURRENCY};
use crate::providers::{
    AnthropicService, DEFAULT_TIMEOUT, GenerationService, RetryConfig, RetryingService,
    TierModels, TimeoutService,
};
use crate::resolver::{DEFAULT_MAX_OUTPUT_TOKENS, TemplateResolver, TemplateSet};
use crate::selector::ModelSelector;
use crate::{MimirError, Result};

/// Main entry point for creating coordinator instances.
pub struct Mimir;

impl Mimir {
    /// Create a new builder for configuring the coordinator.
    pub fn builder() -> MimirBuilder {
        MimirBuilder::new()
    }
}

/// Where the artifact cache lives.
enum CacheChoice {
    Store(CacheStore),
    Dir(PathBuf),
    Memory,
}

/// Builder for configuring coordinator instances.
pub struct MimirBuilder {
    anthropic_key: Option<String>,
    anthropic_base_url: Option<String>,
    models: TierModels,
    service: Option<Arc<dyn GenerationService>>,
    cache: CacheChoice,
    cache_config: CacheConfig,
    overrides: Option<TemplateSet>,
    override_dir: Option<PathBuf>,
    selector: ModelSelector,
    concurrency: usize,
    failure_threshold: f64,
    retry: RetryConfig,
    timeout: Duration,
    max_output_tokens: usize,
}

impl Default for MimirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MimirBuilder {
    pub fn new() -> Self {
        Self {
            anthropic_key: None,
            anthropic_base_url: None,
            models: TierModels::default(),
            service: None,
            cache: CacheChoice::Memory,
            cache_config: CacheConfig::default(),
            overrides: None,
            override_dir: None,
            selector: ModelSelector::default(),
            concurrency: DEFAULT_CONCURRENCY,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            retry: RetryConfig::default(),
            timeout: DEFAULT_TIMEOUT,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }

    /// Apply every setting from a loaded [`Config`].
    ///
    /// Picks up the API key from the environment when present. Settings made
    /// on the builder afterwards take precedence.
    pub fn config(mut self, config: &Config) -> Self {
        if let Some(key) = config.api_key() {
            self.anthropic_key = Some(key);
        }
        self.anthropic_base_url = config.provider.base_url.clone();
        self.models = config.provider.models.clone();
        self.cache = if config.cache.memory_only {
            CacheChoice::Memory
        } else {
            CacheChoice::Dir(config.cache.dir.clone().unwrap_or_else(FileStore::default_dir))
        };
        self.cache_config = config.cache.to_cache_config();
        self.override_dir = config.templates.override_dir.clone();
        self.concurrency = config.engine.concurrency;
        self.failure_threshold = config.engine.failure_threshold;
        self.retry = config.retry.to_retry_config();
        self.timeout = config.request_timeout();
        self.max_output_tokens = config.engine.max_output_tokens;
        self
    }

    /// Generate live content through the Anthropic API.
    pub fn anthropic(mut self, api_key: impl Into<String>) -> Self {
        self.anthropic_key = Some(api_key.into());
        self
    }

    /// Point the Anthropic client at a different base URL.
    pub fn anthropic_base_url(mut self, url: impl Into<String>) -> Self {
        self.anthropic_base_url = Some(url.into());
        self
    }

    /// Set the model id used for each tier.
    pub fn models(mut self, models: TierModels) -> Self {
        self.models = models;
        self
    }

    /// Use a custom generation service instead of the Anthropic client.
    ///
    /// The service is still wrapped with the configured timeout and retry.
    pub fn service(mut self, service: Arc<dyn GenerationService>) -> Self {
        self.service = Some(service);
        self
    }

    /// Disable live generation, even if a service or API key was set.
    pub fn offline(mut self) -> Self {
        self.service = None;
        self.anthropic_key = None;
        self
    }

    /// Use an existing cache (shared with the caller).
    pub fn cache(mut self, cache: CacheStore) -> Self {
        self.cache = CacheChoice::Store(cache);
        self
    }

    /// Persist the cache as files under `dir`.
    pub fn file_cache(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache = CacheChoice::Dir(dir.into());
        self
    }

    /// Keep the cache in memory only (default).
    pub fn memory_cache(mut self) -> Self {
        self.cache = CacheChoice::Memory;
        self
    }

    /// Set TTLs for caches created by this builder.
    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Use these override templates.
    pub fn overrides(mut self, templates: TemplateSet) -> Self {
        self.overrides = Some(templates);
        self
    }

    /// Load override templates from `dir` at build time.
    pub fn override_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.override_dir = Some(dir.into());
        self
    }

    pub fn selector(mut self, selector: ModelSelector) -> Self {
        self.selector = selector;
        self
    }

    /// Maximum tasks in flight per category (default: 4).
    pub fn concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit;
        self
    }

    /// Fraction of failed items, between 0.0 and 1.0, that aborts a
    /// category (default: 0.5).
    pub fn failure_threshold(mut self, fraction: f64) -> Self {
        self.failure_threshold = fraction;
        self
    }

    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Per-call timeout for the generation service (default: 60s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_output_tokens(mut self, n: usize) -> Self {
        self.max_output_tokens = n;
        self
    }

    /// Build the coordinator.
    ///
    /// Without a service or API key the coordinator still works from the
    /// cache and templates; items needing live generation get fallback
    /// content.
    pub fn build(self) -> Result<GenerationCoordinator> {
        if !(0.0..=1.0).contains(&self.failure_threshold) {
            return Err(MimirError::Configuration(format!(
                "failure threshold must be between 0.0 and 1.0, got {}",
                self.failure_threshold
            )));
        }

        let cache = match self.cache {
            CacheChoice::Store(cache) => cache,
            CacheChoice::Dir(dir) => {
                debug!(dir = %dir.display(), "using file cache");
                CacheStore::new(Arc::new(FileStore::new(dir)), self.cache_config)
            }
            CacheChoice::Memory => CacheStore::new(Arc::new(MemoryStore::new()), self.cache_config),
        };

        let overrides = match (self.overrides, self.override_dir) {
            (Some(templates), _) => templates,
            (None, Some(dir)) => TemplateSet::load_dir(&dir)?,
            (None, None) => TemplateSet::new(),
        };

        let inner: Option<Arc<dyn GenerationService>> = match (self.service, self.anthropic_key) {
            (Some(service), _) => Some(service),
            (None, Some(key)) => {
                let client = match self.anthropic_base_url {
                    Some(url) => AnthropicService::with_base_url(key, url),
                    None => AnthropicService::new(key),
                };
                Some(Arc::new(client.models(self.models)))
            }
            (None, None) => {
                debug!("no generation service configured, live generation disabled");
                None
            }
        };

        let mut resolver = TemplateResolver::builder(cache)
            .selector(self.selector)
            .overrides(overrides)
            .max_output_tokens(self.max_output_tokens);
        if let Some(inner) = inner {
            let timed: Arc<dyn GenerationService> =
                Arc::new(TimeoutService::new(inner, self.timeout));
            resolver = resolver.service(Arc::new(RetryingService::new(timed, self.retry)));
        }

        Ok(GenerationCoordinator::new(resolver.build())
            .orchestrator(BatchOrchestrator::new(self.concurrency))
            .failure_threshold(self.failure_threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_without_service() {
        let coordinator = Mimir::builder().build().unwrap();
        assert_eq!(coordinator.concurrency(), DEFAULT_CONCURRENCY);
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let err = Mimir::builder().failure_threshold(1.5).build().err().unwrap();
        assert!(matches!(err, MimirError::Configuration(_)));
        assert!(Mimir::builder().failure_threshold(f64::NAN).build().is_err());
    }

    #[test]
    fn config_threshold_is_range_checked() {
        let mut config = Config::default();
        config.cache.memory_only = true;
        config.engine.failure_threshold = -0.25;
        let result = Mimir::builder().config(&config).build();
        assert!(matches!(result, Err(MimirError::Configuration(_))));

        config.engine.failure_threshold = 1.0;
        assert!(Mimir::builder().config(&config).build().is_ok());
    }

    #[test]
    fn missing_override_dir_is_error() {
        let result = Mimir::builder()
            .override_dir("/nonexistent/mimir-templates")
            .build();
        assert!(matches!(result, Err(MimirError::Configuration(_))));
    }

    #[test]
    fn config_sets_concurrency() {
        let mut config = Config::default();
        config.engine.concurrency = 9;
        config.cache.memory_only = true;
        let coordinator = Mimir::builder().config(&config).build().unwrap();
        assert_eq!(coordinator.concurrency(), 9);
    }
}
