//! Generation service implementations and decorators.
//!
//! - [`traits::GenerationService`]: the one operation the engine needs.
//! - [`AnthropicService`]: HTTP client for the Anthropic Messages API.
//! - [`TimeoutService`]: bounds each call; elapsed calls are transient.
//! - [`RetryingService`]: bounded, classified retries with backoff.
//!
//! The builder stacks them as `Retrying(Timeout(inner))` so that every
//! attempt carries its own timeout.

pub mod anthropic;
pub mod retry;
pub mod timeout;
pub mod traits;

pub use anthropic::{AnthropicService, TierModels};
pub use retry::{RetryConfig, RetryingService, with_retry};
pub use timeout::{DEFAULT_TIMEOUT, TimeoutService};
pub use traits::GenerationService;
