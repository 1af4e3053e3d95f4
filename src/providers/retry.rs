//! Bounded retries for transient generation failures.
//!
//! [`with_retry`] drives any fallible async operation; [`RetryingService`]
//! applies it to every call of a wrapped [`GenerationService`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::{debug, warn};

use super::traits::GenerationService;
use crate::telemetry;
use crate::types::ModelTier;
use crate::{MimirError, Result};

/// How often and how patiently a transient failure is retried.
///
/// ```rust
/// # use mimir::RetryConfig;
/// # use std::time::Duration;
/// let config = RetryConfig::new()
///     .max_attempts(5)
///     .initial_delay(Duration::from_millis(200))
///     .jitter(true);
/// assert!(config.is_enabled());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, the first call included. 1 disables retries.
    pub max_attempts: u32,
    /// Backoff before the first retry; doubles per retry.
    pub initial_delay: Duration,
    /// Ceiling on any single backoff.
    pub max_delay: Duration,
    /// Scale each backoff by a random factor in `[0.5, 1.0]`.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single attempt, never retried.
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn jitter(mut self, enabled: bool) -> Self {
        self.jitter = enabled;
        self
    }

    /// Whether more than one attempt is allowed.
    pub fn is_enabled(&self) -> bool {
        self.max_attempts > 1
    }

    /// Un-jittered backoff before retry number `retry + 1`:
    /// `initial_delay * 2^retry`, capped at `max_delay`.
    pub fn backoff(&self, retry: u32) -> Duration {
        self.initial_delay
            .saturating_mul(2u32.saturating_pow(retry))
            .min(self.max_delay)
    }

    /// The delay actually slept before retry number `retry + 1`.
    ///
    /// A provider `retry_after` hint replaces the backoff. It is a floor:
    /// with jitter the wait lands in `[hint, 1.5 * hint]`. Every delay,
    /// hinted or not, is capped at `max_delay`; a hint at or above the cap
    /// is jittered like a backoff of `max_delay`.
    pub fn delay(&self, retry: u32, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(hint) if hint < self.max_delay => {
                let wait = if self.jitter {
                    hint.mul_f64(rand::rng().random_range(1.0..=1.5))
                } else {
                    hint
                };
                wait.min(self.max_delay)
            }
            Some(_) => self.jittered(self.max_delay),
            None => self.jittered(self.backoff(retry)),
        }
    }

    /// Scale `delay` into `[0.5, 1.0] * delay` when jitter is on.
    fn jittered(&self, delay: Duration) -> Duration {
        if self.jitter {
            delay.mul_f64(rand::rng().random_range(0.5..=1.0))
        } else {
            delay
        }
    }
}

/// Attempt bookkeeping for one retried operation.
struct Attempts<'a> {
    config: &'a RetryConfig,
    made: u32,
}

impl<'a> Attempts<'a> {
    fn new(config: &'a RetryConfig) -> Self {
        Self { config, made: 0 }
    }

    /// Record a failed attempt; returns the delay before the next one, or
    /// `None` when `error` is final.
    fn after_failure(&mut self, error: &MimirError) -> Option<Duration> {
        self.made += 1;
        if !error.is_transient() || self.made >= self.config.max_attempts.max(1) {
            return None;
        }
        Some(self.config.delay(self.made - 1, error.retry_after()))
    }
}

/// Run `op` until it succeeds, fails fatally, or runs out of attempts.
///
/// Only errors classified transient by
/// [`MimirError::is_transient`] are retried. The last error is returned
/// unchanged.
pub async fn with_retry<F, Fut, T>(config: &RetryConfig, service: &str, op: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempts = Attempts::new(config);
    loop {
        let error = match op().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };
        let Some(delay) = attempts.after_failure(&error) else {
            if attempts.made > 1 {
                debug!(service, attempts = attempts.made, error = %error, "giving up");
            }
            return Err(error);
        };

        warn!(
            service,
            attempt = attempts.made,
            max_attempts = config.max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "transient failure, retrying"
        );
        metrics::counter!(telemetry::RETRIES_TOTAL, "service" => service.to_owned()).increment(1);
        tokio::time::sleep(delay).await;
    }
}

/// A [`GenerationService`] whose calls go through [`with_retry`].
pub struct RetryingService {
    inner: Arc<dyn GenerationService>,
    config: RetryConfig,
}

impl RetryingService {
    pub fn new(inner: Arc<dyn GenerationService>, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl GenerationService for RetryingService {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(
        &self,
        prompt: &str,
        tier: ModelTier,
        max_output_tokens: usize,
    ) -> Result<String> {
        let inner = &self.inner;
        with_retry(&self.config, inner.name(), || {
            inner.complete(prompt, tier, max_output_tokens)
        })
        .await
    }
}
