//! Generation service trait.
//!
//! The engine talks to text-generation backends through one narrow trait so
//! that decorators ([`RetryingService`](super::RetryingService),
//! [`TimeoutService`](super::TimeoutService)) and test doubles compose freely.
//!
//! # Error contract
//!
//! Implementations classify failures through [`MimirError`](crate::MimirError)
//! variants: timeouts, rate limits, and server faults are transient and will
//! be retried; authentication and malformed-request errors are fatal.

use async_trait::async_trait;

use crate::Result;
use crate::types::ModelTier;

/// External text-generation backend.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Service name for logging/metrics.
    fn name(&self) -> &str;

    /// Complete `prompt` with a model of the given tier, producing at most
    /// `max_output_tokens` tokens.
    async fn complete(
        &self,
        prompt: &str,
        tier: ModelTier,
        max_output_tokens: usize,
    ) -> Result<String>;
}
