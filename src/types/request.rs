//! Generation requests.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Category, Complexity, ModelTier, ProjectFacts};

/// Item name of the single summary artifact.
pub const SUMMARY_ITEM: &str = "project";

/// One invocation's worth of work: what to generate and for which project.
///
/// Built once through [`GenerationRequest::builder`] and immutable afterwards.
/// Validation happens in the coordinator, not here, so that an invalid request
/// is rejected before any dispatch with a proper error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    goal: String,
    fingerprint: String,
    agents: Vec<String>,
    skills: Vec<String>,
    include_summary: bool,
    ceiling: ModelTier,
    complexity: HashMap<String, Complexity>,
    facts: ProjectFacts,
}

impl GenerationRequest {
    /// Start building a request for `goal` against the project identified by
    /// `fingerprint`.
    pub fn builder(
        goal: impl Into<String>,
        fingerprint: impl Into<String>,
    ) -> GenerationRequestBuilder {
        GenerationRequestBuilder::new(goal, fingerprint)
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Highest tier the caller authorised.
    pub fn ceiling(&self) -> ModelTier {
        self.ceiling
    }

    pub fn facts(&self) -> &ProjectFacts {
        &self.facts
    }

    pub fn include_summary(&self) -> bool {
        self.include_summary
    }

    /// Item names requested for `category`, in request order.
    pub fn items(&self, category: Category) -> Vec<String> {
        match category {
            Category::Agent => self.agents.clone(),
            Category::Skill => self.skills.clone(),
            Category::Summary if self.include_summary => vec![SUMMARY_ITEM.to_string()],
            Category::Summary => Vec::new(),
        }
    }

    /// Total number of items across all categories.
    pub fn item_count(&self) -> usize {
        Category::ALL.iter().map(|c| self.items(*c).len()).sum()
    }

    /// Complexity hint for an item, defaulting to [`Complexity::Normal`].
    pub fn complexity(&self, name: &str) -> Complexity {
        self.complexity.get(name).copied().unwrap_or_default()
    }
}

/// Builder for [`GenerationRequest`].
pub struct GenerationRequestBuilder {
    request: GenerationRequest,
}

impl GenerationRequestBuilder {
    fn new(goal: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        Self {
            request: GenerationRequest {
                goal: goal.into(),
                fingerprint: fingerprint.into(),
                agents: Vec::new(),
                skills: Vec::new(),
                include_summary: true,
                ceiling: ModelTier::default(),
                complexity: HashMap::new(),
                facts: ProjectFacts::default(),
            },
        }
    }

    /// Append an agent to generate.
    pub fn agent(mut self, name: impl Into<String>) -> Self {
        self.request.agents.push(name.into());
        self
    }

    pub fn agents<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request.agents.extend(names.into_iter().map(Into::into));
        self
    }

    /// Append a skill to generate.
    pub fn skill(mut self, name: impl Into<String>) -> Self {
        self.request.skills.push(name.into());
        self
    }

    pub fn skills<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request.skills.extend(names.into_iter().map(Into::into));
        self
    }

    /// Whether to generate the project summary (default: true).
    pub fn summary(mut self, enabled: bool) -> Self {
        self.request.include_summary = enabled;
        self
    }

    /// Set the highest tier the engine may select.
    pub fn ceiling(mut self, tier: ModelTier) -> Self {
        self.request.ceiling = tier;
        self
    }

    /// Attach a complexity hint to an item.
    pub fn complexity(mut self, name: impl Into<String>, hint: Complexity) -> Self {
        self.request.complexity.insert(name.into(), hint);
        self
    }

    pub fn facts(mut self, facts: ProjectFacts) -> Self {
        self.request.facts = facts;
        self
    }

    pub fn build(self) -> GenerationRequest {
        self.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_is_included_by_default() {
        let request = GenerationRequest::builder("goal", "fp").agent("a").build();
        assert_eq!(request.items(Category::Summary), vec![SUMMARY_ITEM]);
        assert_eq!(request.item_count(), 2);
    }

    #[test]
    fn summary_can_be_disabled() {
        let request = GenerationRequest::builder("goal", "fp")
            .skill("s")
            .summary(false)
            .build();
        assert!(request.items(Category::Summary).is_empty());
        assert_eq!(request.item_count(), 1);
    }

    #[test]
    fn complexity_defaults_to_normal() {
        let request = GenerationRequest::builder("goal", "fp")
            .agent("a")
            .complexity("a", Complexity::High)
            .build();
        assert_eq!(request.complexity("a"), Complexity::High);
        assert_eq!(request.complexity("b"), Complexity::Normal);
    }
}
