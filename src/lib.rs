//! Mimir - Generation orchestration engine for coding-assistant artifacts
//!
//! Mimir produces a batch of small text artifacts (agent definitions, skill
//! definitions, and a project summary) for an AI coding assistant. For each
//! artifact it reuses a cached result, renders a static template, or calls
//! an external generation service, running items concurrently and
//! tolerating partial failure. Identical inputs produce identical output.
//!
//! # Example
//!
//! ```rust,no_run
//! use mimir::{GenerationRequest, Mimir, ModelTier, ProjectFacts};
//!
//! #[tokio::main]
//! async fn main() -> mimir::Result<()> {
//!     let coordinator = Mimir::builder()
//!         .anthropic("sk-ant-your-key")
//!         .file_cache("/tmp/mimir-cache")
//!         .build()?;
//!
//!     let request = GenerationRequest::builder("Add OAuth login", "3f9c2a")
//!         .agents(["code-reviewer", "security-auditor"])
//!         .skill("database-migrations")
//!         .ceiling(ModelTier::Balanced)
//!         .facts(ProjectFacts::new().language("rust").framework("axum"))
//!         .build();
//!
//!     let bundle = coordinator.run(&request).await?;
//!     for artifact in &bundle.artifacts {
//!         println!("{} {}: {} bytes", artifact.category, artifact.name, artifact.content.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod providers;
pub mod resolver;
pub mod selector;
pub mod telemetry;
pub mod types;
pub mod version;

// Re-export main types at crate root
pub use cache::{CacheConfig, CacheStore, KeyValueStore};
pub use config::Config;
pub use engine::{
    CoordinatorState, GenerationCoordinator, GenerationProgress, Mimir, MimirBuilder,
};
pub use error::{ErrorKind, MimirError, Result};
pub use orchestrator::{BatchObserver, BatchOrchestrator, BatchResult};
pub use providers::{GenerationService, RetryConfig};
pub use resolver::{Resolution, ResolutionSource, TemplateResolver, TemplateSet};
pub use selector::{ModelSelector, TaskType};
pub use version::{BuildInfo, PKG_VERSION, version_string};

// Re-export all types
pub use types::{
    Artifact, Category, Complexity, GenerationCounts, GenerationRequest, GenerationRequestBuilder,
    ModelTier, OutputBundle, Permissions, ProjectFacts, Settings,
};
