//! Content strategies tried in order by the resolver.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::prompt::{compose_prompt, strip_wrapping};
use super::render::{RenderContext, render};
use super::templates::TemplateSet;
use crate::cache::{CacheKey, CacheStore};
use crate::providers::GenerationService;
use crate::types::{Category, ModelTier};
use crate::{MimirError, Result};

/// Where a resolved artifact's content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionSource {
    Cache,
    Override,
    Builtin,
    Live,
}

impl ResolutionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionSource::Cache => "cache",
            ResolutionSource::Override => "override",
            ResolutionSource::Builtin => "builtin",
            ResolutionSource::Live => "live",
        }
    }
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a strategy may need about the item being resolved.
pub struct ItemContext<'a> {
    pub category: Category,
    pub name: &'a str,
    pub tier: ModelTier,
    pub key: &'a CacheKey,
    pub render: &'a RenderContext,
}

/// One way of producing content for an item.
///
/// `Ok(None)` means "not applicable, try the next strategy"; an error ends
/// resolution for the item.
#[async_trait]
pub trait ResolveStrategy: Send + Sync {
    fn source(&self) -> ResolutionSource;

    async fn attempt(&self, item: &ItemContext<'_>) -> Result<Option<String>>;
}

/// Returns cached content for the item's key.
pub struct CachedStrategy {
    cache: CacheStore,
}

impl CachedStrategy {
    pub fn new(cache: CacheStore) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl ResolveStrategy for CachedStrategy {
    fn source(&self) -> ResolutionSource {
        ResolutionSource::Cache
    }

    async fn attempt(&self, item: &ItemContext<'_>) -> Result<Option<String>> {
        Ok(self.cache.get(item.key).await)
    }
}

/// Renders a template from a [`TemplateSet`].
///
/// Used for both user overrides and built-ins; only the reported source
/// differs.
pub struct TemplateStrategy {
    templates: TemplateSet,
    source: ResolutionSource,
}

impl TemplateStrategy {
    /// Strategy over user-supplied override templates.
    pub fn overrides(templates: TemplateSet) -> Self {
        Self {
            templates,
            source: ResolutionSource::Override,
        }
    }

    /// Strategy over built-in templates.
    pub fn builtin(templates: TemplateSet) -> Self {
        Self {
            templates,
            source: ResolutionSource::Builtin,
        }
    }
}

#[async_trait]
impl ResolveStrategy for TemplateStrategy {
    fn source(&self) -> ResolutionSource {
        self.source
    }

    async fn attempt(&self, item: &ItemContext<'_>) -> Result<Option<String>> {
        Ok(self
            .templates
            .get(item.category, item.name)
            .map(|template| render(template, item.render)))
    }
}

/// Generates content through the external service.
///
/// The service is expected to arrive already wrapped in timeout and retry
/// decorators.
pub struct LiveStrategy {
    service: Arc<dyn GenerationService>,
    max_output_tokens: usize,
}

impl LiveStrategy {
    pub fn new(service: Arc<dyn GenerationService>, max_output_tokens: usize) -> Self {
        Self {
            service,
            max_output_tokens,
        }
    }
}

#[async_trait]
impl ResolveStrategy for LiveStrategy {
    fn source(&self) -> ResolutionSource {
        ResolutionSource::Live
    }

    async fn attempt(&self, item: &ItemContext<'_>) -> Result<Option<String>> {
        let prompt = compose_prompt(item.category, item.render);
        let response = self
            .service
            .complete(&prompt, item.tier, self.max_output_tokens)
            .await?;
        let content = strip_wrapping(&response);
        if content.is_empty() {
            return Err(MimirError::EmptyResponse);
        }
        Ok(Some(content))
    }
}
