//! Tests for the per-item resolution chain.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mimir::cache::{CacheConfig, CacheStore, MemoryStore};
use mimir::providers::GenerationService;
use mimir::resolver::{ResolutionSource, TemplateResolver, TemplateSet};
use mimir::{
    Category, Complexity, GenerationRequest, MimirError, ModelTier, ProjectFacts, Result,
};

/// Records every call and answers with a fenced document.
#[derive(Default)]
struct RecordingService {
    calls: Mutex<Vec<(String, ModelTier)>>,
    reply: Option<String>,
}

impl RecordingService {
    fn replying(reply: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            reply: Some(reply.to_string()),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn tiers(&self) -> Vec<ModelTier> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }
}

#[async_trait]
impl GenerationService for RecordingService {
    fn name(&self) -> &str {
        "recording"
    }

    async fn complete(&self, prompt: &str, tier: ModelTier, _max: usize) -> Result<String> {
        self.calls.lock().unwrap().push((prompt.to_string(), tier));
        let first_line = prompt.lines().next().unwrap_or_default();
        Ok(match &self.reply {
            Some(reply) => reply.clone(),
            None => format!("```markdown\n# Generated\n\n{first_line}\n```\n"),
        })
    }
}

fn request() -> GenerationRequest {
    GenerationRequest::builder("Add OAuth login", "fp-1")
        .agents(["security-auditor", "code-reviewer"])
        .skill("db-migrations")
        .ceiling(ModelTier::Capable)
        .facts(ProjectFacts::new().language("rust").framework("axum"))
        .build()
}

fn memory_cache() -> (Arc<MemoryStore>, CacheStore) {
    let store = Arc::new(MemoryStore::new());
    let cache = CacheStore::new(store.clone(), CacheConfig::default());
    (store, cache)
}

#[tokio::test]
async fn live_result_is_cleaned_and_written_through() {
    let (store, cache) = memory_cache();
    let service = Arc::new(RecordingService::default());
    let resolver = TemplateResolver::builder(cache).service(service.clone()).build();
    let request = request();

    let first = resolver
        .resolve(Category::Agent, "security-auditor", &request)
        .await
        .unwrap();
    assert_eq!(first.source, ResolutionSource::Live);
    assert!(first.content.starts_with("# Generated"));
    assert!(!first.content.contains("```"));
    assert_eq!(store.len().await, 1);

    let second = resolver
        .resolve(Category::Agent, "security-auditor", &request)
        .await
        .unwrap();
    assert_eq!(second.source, ResolutionSource::Cache);
    assert_eq!(second.content, first.content);
    assert_eq!(service.call_count(), 1);
}

#[tokio::test]
async fn builtin_template_needs_no_service() {
    let (store, cache) = memory_cache();
    let resolver = TemplateResolver::builder(cache).build();
    let request = request();

    let resolution = resolver
        .resolve(Category::Agent, "code-reviewer", &request)
        .await
        .unwrap();
    assert_eq!(resolution.source, ResolutionSource::Builtin);
    assert!(resolution.content.contains("Add OAuth login"));
    assert!(resolution.content.contains("idiomatic rust"));
    assert!(!resolution.content.contains("{{"));
    assert_eq!(store.len().await, 1, "template renders are written through too");

    let again = resolver
        .resolve(Category::Agent, "code-reviewer", &request)
        .await
        .unwrap();
    assert_eq!(again.source, ResolutionSource::Cache);
    assert_eq!(again.content, resolution.content);
}

#[tokio::test]
async fn override_takes_precedence_over_builtin() {
    let (_, cache) = memory_cache();
    let mut overrides = TemplateSet::new();
    overrides.insert(
        Category::Agent,
        "code-reviewer",
        "# Our reviewer\n\n{{#framework}}Knows {{framework}}.{{/framework}}",
    );
    let service = Arc::new(RecordingService::default());
    let resolver = TemplateResolver::builder(cache)
        .overrides(overrides)
        .service(service.clone())
        .build();

    let resolution = resolver
        .resolve(Category::Agent, "code-reviewer", &request())
        .await
        .unwrap();
    assert_eq!(resolution.source, ResolutionSource::Override);
    assert_eq!(resolution.content, "# Our reviewer\n\nKnows axum.\n");
    assert_eq!(service.call_count(), 0);
}

#[tokio::test]
async fn unresolvable_item_without_service_is_error() {
    let (store, cache) = memory_cache();
    let resolver = TemplateResolver::builder(cache).build();

    let err = resolver
        .resolve(Category::Skill, "db-migrations", &request())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MimirError::Unresolved { category: Category::Skill, ref name } if name == "db-migrations"
    ));
    assert_eq!(store.len().await, 0);
}

#[tokio::test]
async fn blank_generation_is_empty_response() {
    let (store, cache) = memory_cache();
    let service = Arc::new(RecordingService::replying("```markdown\n   \n```"));
    let resolver = TemplateResolver::builder(cache).service(service).build();

    let err = resolver
        .resolve(Category::Skill, "db-migrations", &request())
        .await
        .unwrap_err();
    assert!(matches!(err, MimirError::EmptyResponse));
    assert_eq!(store.len().await, 0, "failures are not cached");
}

#[tokio::test]
async fn selected_tier_reaches_the_service() {
    let (_, cache) = memory_cache();
    let service = Arc::new(RecordingService::default());
    let resolver = TemplateResolver::builder(cache).service(service.clone()).build();

    let request = GenerationRequest::builder("goal", "fp")
        .agents(["plain", "hard"])
        .skill("tricky")
        .complexity("hard", Complexity::High)
        .complexity("tricky", Complexity::High)
        .ceiling(ModelTier::Capable)
        .build();

    resolver.resolve(Category::Agent, "plain", &request).await.unwrap();
    resolver.resolve(Category::Agent, "hard", &request).await.unwrap();
    resolver.resolve(Category::Skill, "tricky", &request).await.unwrap();
    resolver.resolve(Category::Summary, "project", &request).await.unwrap();

    assert_eq!(
        service.tiers(),
        vec![
            ModelTier::Balanced,
            ModelTier::Capable,
            ModelTier::Balanced,
            ModelTier::Fast
        ]
    );
}

#[tokio::test]
async fn tier_is_part_of_the_cache_key() {
    let (store, cache) = memory_cache();
    let service = Arc::new(RecordingService::default());
    let resolver = TemplateResolver::builder(cache).service(service.clone()).build();

    let base = |ceiling| {
        GenerationRequest::builder("goal", "fp")
            .agent("security-auditor")
            .ceiling(ceiling)
            .build()
    };
    resolver
        .resolve(Category::Agent, "security-auditor", &base(ModelTier::Fast))
        .await
        .unwrap();
    resolver
        .resolve(Category::Agent, "security-auditor", &base(ModelTier::Balanced))
        .await
        .unwrap();

    assert_eq!(service.call_count(), 2);
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn fallback_is_deterministic_and_uncached() {
    let (store, cache) = memory_cache();
    let resolver = TemplateResolver::builder(cache).build();
    let request = request();

    let a = resolver.fallback(Category::Agent, "security-auditor", &request);
    let b = resolver.fallback(Category::Agent, "security-auditor", &request);
    assert_eq!(a, b);
    assert!(a.contains("# Security Auditor"));
    assert!(a.contains("Add OAuth login"));
    assert!(a.contains("- Framework: axum"));
    assert!(!a.contains("{{"));
    assert_eq!(store.len().await, 0);
}

#[tokio::test]
async fn fallback_omits_sections_without_facts() {
    let (_, cache) = memory_cache();
    let resolver = TemplateResolver::builder(cache).build();
    let request = GenerationRequest::builder("Ship it", "fp").skill("deploy").build();

    let content = resolver.fallback(Category::Skill, "deploy", &request);
    assert!(!content.contains("Relevant dependencies"));
    assert!(content.contains("Apply this skill when working towards: Ship it"));
}
