//! Per-call timeout decorator.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::traits::GenerationService;
use crate::types::ModelTier;
use crate::{MimirError, Result};

/// Default timeout for one generation call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Decorator that bounds every call to the inner service.
///
/// An elapsed call becomes [`MimirError::Timeout`], which is transient, so
/// when this sits inside a [`RetryingService`](super::RetryingService) each
/// attempt gets its own budget. The timed-out future is dropped; whether the
/// remote request is actually abandoned is up to the inner service.
pub struct TimeoutService {
    inner: Arc<dyn GenerationService>,
    timeout: Duration,
}

impl TimeoutService {
    pub fn new(inner: Arc<dyn GenerationService>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl GenerationService for TimeoutService {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(
        &self,
        prompt: &str,
        tier: ModelTier,
        max_output_tokens: usize,
    ) -> Result<String> {
        tokio::time::timeout(
            self.timeout,
            self.inner.complete(prompt, tier, max_output_tokens),
        )
        .await
        .map_err(|_| MimirError::Timeout(self.timeout))?
    }
}
