//! Per-item content resolution.
//!
//! [`TemplateResolver`] evaluates an ordered chain of [`ResolveStrategy`]s
//! until one produces content:
//!
//! ```text
//!   cache hit ──► user override ──► built-in template ──► live generation
//! ```
//!
//! The model tier is selected first because it is part of the cache key.
//! Every strategy after the cache writes its result through to the cache
//! before returning, so a repeated call with identical inputs is a pure
//! cache hit.

pub mod prompt;
pub mod render;
pub mod strategy;
pub mod templates;

pub use render::{RenderContext, render};
pub use strategy::{
    CachedStrategy, ItemContext, LiveStrategy, ResolutionSource, ResolveStrategy,
    TemplateStrategy,
};
pub use templates::{TemplateSet, fallback_template};

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::cache::{CacheKey, CacheStore};
use crate::providers::GenerationService;
use crate::selector::ModelSelector;
use crate::telemetry;
use crate::types::{Category, GenerationRequest, ModelTier};
use crate::{MimirError, Result};

/// Default output budget for one live generation.
pub const DEFAULT_MAX_OUTPUT_TOKENS: usize = 4096;

/// Content for one item plus how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub content: String,
    pub source: ResolutionSource,
    pub tier: ModelTier,
}

/// Resolves items through the cache → override → built-in → live chain.
pub struct TemplateResolver {
    cache: CacheStore,
    selector: ModelSelector,
    strategies: Vec<Box<dyn ResolveStrategy>>,
}

impl TemplateResolver {
    /// Start building a resolver backed by `cache`.
    pub fn builder(cache: CacheStore) -> TemplateResolverBuilder {
        TemplateResolverBuilder::new(cache)
    }

    pub fn selector(&self) -> &ModelSelector {
        &self.selector
    }

    /// Tier and cache key for an item.
    pub fn plan(
        &self,
        category: Category,
        name: &str,
        request: &GenerationRequest,
    ) -> (ModelTier, CacheKey) {
        let tier = self
            .selector
            .select(category.into(), request.complexity(name), request.ceiling());
        let key = CacheKey::for_artifact(
            request.goal(),
            request.fingerprint(),
            category,
            name,
            tier,
        );
        (tier, key)
    }

    /// Resolve one item.
    #[instrument(skip(self, request))]
    pub async fn resolve(
        &self,
        category: Category,
        name: &str,
        request: &GenerationRequest,
    ) -> Result<Resolution> {
        let (tier, key) = self.plan(category, name, request);
        let render_ctx = RenderContext::new(category, name, request);
        let item = ItemContext {
            category,
            name,
            tier,
            key: &key,
            render: &render_ctx,
        };

        for strategy in &self.strategies {
            let Some(content) = strategy.attempt(&item).await? else {
                continue;
            };
            let source = strategy.source();
            if source != ResolutionSource::Cache {
                self.cache.set(&key, content.as_str()).await;
            }
            debug!(%source, %tier, "resolved");
            metrics::counter!(telemetry::ARTIFACTS_TOTAL,
                "category" => category.as_str(),
                "source" => source.as_str(),
            )
            .increment(1);
            return Ok(Resolution {
                content,
                source,
                tier,
            });
        }

        Err(MimirError::Unresolved {
            category,
            name: name.to_string(),
        })
    }

    /// Deterministic template-only content for an item.
    ///
    /// Makes no external call and touches no cache.
    pub fn fallback(
        &self,
        category: Category,
        name: &str,
        request: &GenerationRequest,
    ) -> String {
        render(
            fallback_template(category),
            &RenderContext::new(category, name, request),
        )
    }
}

/// Builder for [`TemplateResolver`].
///
/// Strategies are always assembled in the fixed chain order regardless of
/// the order builder methods are called in.
pub struct TemplateResolverBuilder {
    cache: CacheStore,
    selector: ModelSelector,
    overrides: TemplateSet,
    builtins: TemplateSet,
    service: Option<Arc<dyn GenerationService>>,
    max_output_tokens: usize,
}

impl TemplateResolverBuilder {
    fn new(cache: CacheStore) -> Self {
        Self {
            cache,
            selector: ModelSelector::default(),
            overrides: TemplateSet::new(),
            builtins: TemplateSet::builtin(),
            service: None,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }

    pub fn selector(mut self, selector: ModelSelector) -> Self {
        self.selector = selector;
        self
    }

    /// User-supplied templates, consulted before built-ins.
    pub fn overrides(mut self, templates: TemplateSet) -> Self {
        self.overrides = templates;
        self
    }

    /// Replace the built-in template set.
    pub fn builtins(mut self, templates: TemplateSet) -> Self {
        self.builtins = templates;
        self
    }

    /// Enable live generation through `service`.
    pub fn service(mut self, service: Arc<dyn GenerationService>) -> Self {
        self.service = Some(service);
        self
    }

    pub fn max_output_tokens(mut self, n: usize) -> Self {
        self.max_output_tokens = n;
        self
    }

    pub fn build(self) -> TemplateResolver {
        let mut strategies: Vec<Box<dyn ResolveStrategy>> = vec![
            Box::new(CachedStrategy::new(self.cache.clone())),
            Box::new(TemplateStrategy::overrides(self.overrides)),
            Box::new(TemplateStrategy::builtin(self.builtins)),
        ];
        if let Some(service) = self.service {
            strategies.push(Box::new(LiveStrategy::new(service, self.max_output_tokens)));
        }
        TemplateResolver {
            cache: self.cache,
            selector: self.selector,
            strategies,
        }
    }
}
