//! Output bundle handed to the artifact writer.

use serde::{Deserialize, Serialize};

use super::{Category, ModelTier};

/// One named generated content unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub category: Category,
    pub name: String,
    pub content: String,
}

/// Assistant settings derived from the request and project facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Tier ceiling the artifacts were generated under.
    pub model: ModelTier,
    pub agents: Vec<String>,
    pub skills: Vec<String>,
    pub permissions: Permissions,
}

/// Tool permission patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub allow: Vec<String>,
}

/// How each artifact was produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationCounts {
    pub cache_hits: usize,
    /// Override and built-in template renders.
    pub template_hits: usize,
    pub live_generations: usize,
    pub fallbacks: usize,
}

impl GenerationCounts {
    /// Total artifacts accounted for.
    pub fn total(&self) -> usize {
        self.cache_hits + self.template_hits + self.live_generations + self.fallbacks
    }
}

/// Everything one invocation produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputBundle {
    /// Artifacts grouped by category in processing order, request order within.
    pub artifacts: Vec<Artifact>,
    pub settings: Settings,
    pub counts: GenerationCounts,
}

impl OutputBundle {
    /// Artifacts of one category.
    pub fn artifacts_for(&self, category: Category) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter().filter(move |a| a.category == category)
    }

    /// Look up one artifact's content.
    pub fn content(&self, category: Category, name: &str) -> Option<&str> {
        self.artifacts
            .iter()
            .find(|a| a.category == category && a.name == name)
            .map(|a| a.content.as_str())
    }
}
