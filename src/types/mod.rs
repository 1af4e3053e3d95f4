//! Public types for the Mimir API.

mod bundle;
mod category;
mod facts;
mod request;
mod tier;

pub use bundle::{Artifact, GenerationCounts, OutputBundle, Permissions, Settings};
pub use category::Category;
pub use facts::ProjectFacts;
pub use request::{GenerationRequest, GenerationRequestBuilder, SUMMARY_ITEM};
pub use tier::{Complexity, ModelTier};
