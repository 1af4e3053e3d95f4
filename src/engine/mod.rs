//! Generation coordination.
//!
//! - [`GenerationCoordinator`]: the state machine that turns a request into
//!   an [`OutputBundle`](crate::types::OutputBundle).
//! - [`GenerationProgress`]: per-invocation counters and state history.
//! - [`Mimir`] / [`MimirBuilder`]: assembles a coordinator from settings or
//!   a loaded [`Config`](crate::config::Config).

mod builder;
mod coordinator;
mod progress;
mod settings;

pub use builder::{Mimir, MimirBuilder};
pub use coordinator::{DEFAULT_FAILURE_THRESHOLD, GenerationCoordinator, exceeds_threshold};
pub use progress::{CoordinatorState, GenerationProgress};
pub use settings::derive_settings;
