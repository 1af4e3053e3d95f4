//! Deterministic model tier selection.
//!
//! A policy table maps each task type to a baseline tier. A
//! [`Complexity::High`] hint raises the baseline one step for task types that
//! opt in. The result is always clamped to the caller's ceiling.
//!
//! Selection involves no randomness: the tier is part of the cache key, so
//! identical inputs must select identical tiers.

use std::collections::HashMap;

use crate::types::{Category, Complexity, ModelTier};

/// Kind of generation work being tiered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskType {
    AgentDefinition,
    SkillDefinition,
    ProjectSummary,
}

impl From<Category> for TaskType {
    fn from(category: Category) -> Self {
        match category {
            Category::Agent => TaskType::AgentDefinition,
            Category::Skill => TaskType::SkillDefinition,
            Category::Summary => TaskType::ProjectSummary,
        }
    }
}

/// Selection policy for one task type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierPolicy {
    pub baseline: ModelTier,
    /// Whether a high complexity hint may raise the baseline.
    pub complexity_eligible: bool,
}

impl TierPolicy {
    pub const fn new(baseline: ModelTier, complexity_eligible: bool) -> Self {
        Self {
            baseline,
            complexity_eligible,
        }
    }
}

/// Picks a tier per task, never above the caller's ceiling.
#[derive(Debug, Clone)]
pub struct ModelSelector {
    policies: HashMap<TaskType, TierPolicy>,
}

impl Default for ModelSelector {
    fn default() -> Self {
        Self {
            policies: HashMap::from([
                (
                    TaskType::AgentDefinition,
                    TierPolicy::new(ModelTier::Balanced, true),
                ),
                (
                    TaskType::SkillDefinition,
                    TierPolicy::new(ModelTier::Fast, true),
                ),
                (
                    TaskType::ProjectSummary,
                    TierPolicy::new(ModelTier::Fast, false),
                ),
            ]),
        }
    }
}

impl ModelSelector {
    /// Selector with the default policy table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the policy for one task type.
    pub fn with_policy(mut self, task: TaskType, policy: TierPolicy) -> Self {
        self.policies.insert(task, policy);
        self
    }

    /// Policy in effect for `task`.
    pub fn policy(&self, task: TaskType) -> TierPolicy {
        self.policies
            .get(&task)
            .copied()
            .unwrap_or(TierPolicy::new(ModelTier::Fast, false))
    }

    /// Select a tier for `task`, clamped to `ceiling`.
    pub fn select(&self, task: TaskType, complexity: Complexity, ceiling: ModelTier) -> ModelTier {
        let policy = self.policy(task);
        let computed = if policy.complexity_eligible && complexity == Complexity::High {
            policy.baseline.step_up()
        } else {
            policy.baseline
        };
        computed.min(ceiling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TASKS: [TaskType; 3] = [
        TaskType::AgentDefinition,
        TaskType::SkillDefinition,
        TaskType::ProjectSummary,
    ];
    const HINTS: [Complexity; 3] = [Complexity::Low, Complexity::Normal, Complexity::High];

    #[test]
    fn never_exceeds_ceiling() {
        let selector = ModelSelector::new();
        for task in TASKS {
            for hint in HINTS {
                for ceiling in ModelTier::ALL {
                    let tier = selector.select(task, hint, ceiling);
                    assert!(tier <= ceiling, "{task:?}/{hint:?}/{ceiling:?} -> {tier:?}");
                }
            }
        }
    }

    #[test]
    fn never_exceeds_ceiling_with_custom_policy() {
        let selector = ModelSelector::new().with_policy(
            TaskType::ProjectSummary,
            TierPolicy::new(ModelTier::Capable, true),
        );
        for hint in HINTS {
            for ceiling in ModelTier::ALL {
                assert!(selector.select(TaskType::ProjectSummary, hint, ceiling) <= ceiling);
            }
        }
    }

    #[test]
    fn high_complexity_raises_eligible_tasks() {
        let selector = ModelSelector::new();
        assert_eq!(
            selector.select(TaskType::AgentDefinition, Complexity::Normal, ModelTier::Capable),
            ModelTier::Balanced
        );
        assert_eq!(
            selector.select(TaskType::AgentDefinition, Complexity::High, ModelTier::Capable),
            ModelTier::Capable
        );
        assert_eq!(
            selector.select(TaskType::SkillDefinition, Complexity::High, ModelTier::Capable),
            ModelTier::Balanced
        );
    }

    #[test]
    fn ineligible_tasks_ignore_complexity() {
        let selector = ModelSelector::new();
        assert_eq!(
            selector.select(TaskType::ProjectSummary, Complexity::High, ModelTier::Capable),
            ModelTier::Fast
        );
    }

    #[test]
    fn low_ceiling_clamps() {
        let selector = ModelSelector::new();
        assert_eq!(
            selector.select(TaskType::AgentDefinition, Complexity::High, ModelTier::Fast),
            ModelTier::Fast
        );
    }

    #[test]
    fn selection_is_deterministic() {
        let selector = ModelSelector::new();
        let pick = || {
            selector.select(TaskType::AgentDefinition, Complexity::High, ModelTier::Balanced)
        };
        let first = pick();
        for _ in 0..10 {
            assert_eq!(pick(), first);
        }
    }
}
