//! Assistant settings derivation.

use crate::types::{Category, GenerationRequest, Permissions, Settings};

/// Tool permissions granted per detected language or framework.
///
/// Keys are matched case-insensitively against `ProjectFacts::language` and
/// `ProjectFacts::framework`.
const PERMISSION_TABLE: &[(&str, &[&str])] = &[
    (
        "rust",
        &[
            "Bash(cargo build:*)",
            "Bash(cargo test:*)",
            "Bash(cargo clippy:*)",
            "Bash(cargo fmt:*)",
        ],
    ),
    ("typescript", &["Bash(npm run:*)", "Bash(npm test:*)", "Bash(npx tsc:*)"]),
    ("javascript", &["Bash(npm run:*)", "Bash(npm test:*)"]),
    ("python", &["Bash(python -m pytest:*)", "Bash(pip install:*)"]),
    ("go", &["Bash(go build:*)", "Bash(go test:*)", "Bash(go vet:*)"]),
    ("java", &["Bash(mvn:*)", "Bash(gradle:*)"]),
    ("ruby", &["Bash(bundle exec:*)"]),
    ("next.js", &["Bash(npx next:*)"]),
    ("django", &["Bash(python manage.py:*)"]),
    ("rails", &["Bash(bin/rails:*)"]),
];

/// Always granted.
const BASE_PERMISSIONS: &[&str] = &["Bash(git status:*)", "Bash(git diff:*)", "Bash(git log:*)"];

/// Derive settings from the request and its facts.
///
/// Pure and deterministic: identical requests yield identical settings.
pub fn derive_settings(request: &GenerationRequest) -> Settings {
    let facts = request.facts();
    let mut allow: Vec<String> = BASE_PERMISSIONS.iter().map(|p| p.to_string()).collect();

    for detected in [facts.language.as_deref(), facts.framework.as_deref()]
        .into_iter()
        .flatten()
    {
        let detected = detected.trim().to_lowercase();
        let Some((_, patterns)) = PERMISSION_TABLE.iter().find(|(key, _)| *key == detected) else {
            continue;
        };
        for pattern in *patterns {
            if !allow.iter().any(|p| p == pattern) {
                allow.push(pattern.to_string());
            }
        }
    }

    Settings {
        model: request.ceiling(),
        agents: request.items(Category::Agent),
        skills: request.items(Category::Skill),
        permissions: Permissions { allow },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ModelTier, ProjectFacts};

    #[test]
    fn rust_project_gets_cargo_permissions() {
        let request = GenerationRequest::builder("goal", "fp")
            .agent("reviewer")
            .skill("testing")
            .ceiling(ModelTier::Capable)
            .facts(ProjectFacts::new().language("Rust"))
            .build();
        let settings = derive_settings(&request);

        assert_eq!(settings.model, ModelTier::Capable);
        assert_eq!(settings.agents, vec!["reviewer"]);
        assert_eq!(settings.skills, vec!["testing"]);
        assert!(settings.permissions.allow.contains(&"Bash(cargo build:*)".to_string()));
        assert!(settings.permissions.allow.contains(&"Bash(cargo test:*)".to_string()));
    }

    #[test]
    fn unknown_language_gets_base_permissions_only() {
        let request = GenerationRequest::builder("goal", "fp")
            .agent("a")
            .facts(ProjectFacts::new().language("cobol"))
            .build();
        assert_eq!(derive_settings(&request).permissions.allow.len(), BASE_PERMISSIONS.len());
    }

    #[test]
    fn shared_patterns_are_not_duplicated() {
        let request = GenerationRequest::builder("goal", "fp")
            .agent("a")
            .facts(ProjectFacts::new().language("typescript").framework("javascript"))
            .build();
        let allow = derive_settings(&request).permissions.allow;
        let npm_run = allow.iter().filter(|p| *p == "Bash(npm run:*)").count();
        assert_eq!(npm_run, 1);
    }
}
