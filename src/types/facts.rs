//! Structural facts about the target project.

use serde::{Deserialize, Serialize};

/// Read-only summary produced by the codebase scanner.
///
/// Mimir never derives or mutates these; they are rendered into templates and
/// prompts as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFacts {
    /// Primary language (e.g. "rust", "typescript").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Detected framework (e.g. "axum", "next.js").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Recognised code patterns (e.g. "repository pattern", "async handlers").
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl ProjectFacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn framework(mut self, framework: impl Into<String>) -> Self {
        self.framework = Some(framework.into());
        self
    }

    pub fn dependency(mut self, dependency: impl Into<String>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }
}
