//! Static template sets: user overrides, built-ins, and fallbacks.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::types::Category;
use crate::{MimirError, Result};

/// Templates keyed by `(category, item name)`.
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    templates: HashMap<(Category, String), String>,
}

impl TemplateSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Templates shipped with mimir.
    pub fn builtin() -> Self {
        let mut set = Self::new();
        for (category, name, template) in BUILTIN {
            set.insert(*category, *name, *template);
        }
        set
    }

    /// Load override templates from `dir`.
    ///
    /// Layout: `<dir>/agents/<name>.md`, `<dir>/skills/<name>.md`,
    /// `<dir>/summary/<name>.md`. Missing category directories are skipped;
    /// a missing `dir` is a configuration error.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(MimirError::Configuration(format!(
                "template directory not found: {dir:?}"
            )));
        }

        let mut set = Self::new();
        for category in Category::ALL {
            let category_dir = dir.join(category.dir_name());
            if !category_dir.is_dir() {
                continue;
            }
            let entries = fs::read_dir(&category_dir).map_err(|e| {
                MimirError::Configuration(format!("failed to read {category_dir:?}: {e}"))
            })?;
            for entry in entries {
                let path = entry
                    .map_err(|e| {
                        MimirError::Configuration(format!("failed to read {category_dir:?}: {e}"))
                    })?
                    .path();
                if path.extension().and_then(|e| e.to_str()) != Some("md") {
                    continue;
                }
                let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                let template = fs::read_to_string(&path).map_err(|e| {
                    MimirError::Configuration(format!("failed to read template {path:?}: {e}"))
                })?;
                debug!(%category, name, "loaded override template");
                set.insert(category, name, template);
            }
        }
        Ok(set)
    }

    /// Add or replace a template.
    pub fn insert(
        &mut self,
        category: Category,
        name: impl Into<String>,
        template: impl Into<String>,
    ) {
        self.templates
            .insert((category, name.into()), template.into());
    }

    pub fn get(&self, category: Category, name: &str) -> Option<&str> {
        self.templates
            .get(&(category, name.to_string()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Template-only content used when an item cannot be resolved otherwise.
///
/// Only context fields are rendered into it, so the output is a pure
/// function of the request.
pub fn fallback_template(category: Category) -> &'static str {
    match category {
        Category::Agent => AGENT_FALLBACK,
        Category::Skill => SKILL_FALLBACK,
        Category::Summary => SUMMARY_FALLBACK,
    }
}

const AGENT_FALLBACK: &str = "\
---
name: {{name}}
description: {{title}} agent for this project
---

# {{title}}

You are the {{title}} agent for this project.

## Goal

{{goal}}

{{#language}}## Stack

- Language: {{language}}{{/language}}
{{#framework}}- Framework: {{framework}}{{/framework}}

{{#patterns}}## Conventions

{{patterns}}{{/patterns}}
";

const SKILL_FALLBACK: &str = "\
---
name: {{name}}
description: {{title}} skill
---

# {{title}}

Apply this skill when working towards: {{goal}}

{{#dependencies}}## Relevant dependencies

{{dependencies}}{{/dependencies}}
";

const SUMMARY_FALLBACK: &str = "\
# Project Overview

{{goal}}

{{#language}}## Stack

- Language: {{language}}{{/language}}
{{#framework}}- Framework: {{framework}}{{/framework}}

{{#dependencies}}## Dependencies

{{dependencies}}{{/dependencies}}

{{#patterns}}## Patterns

{{patterns}}{{/patterns}}
";

const BUILTIN: &[(Category, &str, &str)] = &[
    (
        Category::Agent,
        "code-reviewer",
        "\
---
name: code-reviewer
description: Reviews changes for correctness, clarity and test coverage
---

# Code Reviewer

Review every change against the project goal: {{goal}}

{{#language}}Hold the code to idiomatic {{language}} standards.{{/language}}
{{#patterns}}Check that changes follow the established patterns:

{{patterns}}{{/patterns}}
",
    ),
    (
        Category::Agent,
        "test-writer",
        "\
---
name: test-writer
description: Writes focused tests for new and changed behaviour
---

# Test Writer

Write tests that pin down behaviour relevant to: {{goal}}

{{#framework}}Use the testing conventions of {{framework}}.{{/framework}}
",
    ),
    (
        Category::Skill,
        "commit-messages",
        "\
---
name: commit-messages
description: Writes concise, imperative commit messages
---

# Commit Messages

Summarise the change in one imperative line under 72 characters, then
explain what changed and why in the body.
",
    ),
];
