//! Top-level generation state machine.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, instrument, warn};

use super::progress::{CoordinatorState, GenerationProgress};
use super::settings::derive_settings;
use crate::error::ErrorKind;
use crate::orchestrator::{BatchOrchestrator, BatchResult};
use crate::resolver::{Resolution, TemplateResolver};
use crate::telemetry;
use crate::types::{Artifact, Category, GenerationRequest, OutputBundle, SUMMARY_ITEM};
use crate::{MimirError, Result};

/// Default fraction of failed items at which a category aborts.
pub const DEFAULT_FAILURE_THRESHOLD: f64 = 0.5;

/// Failures quoted in an aggregate error.
const SUMMARY_LIMIT: usize = 3;

/// Drives a [`GenerationRequest`] through validation, per-category batches,
/// the summary, and assembly of the [`OutputBundle`].
///
/// Categories run one after another; items within a category run
/// concurrently under the orchestrator's bound.
pub struct GenerationCoordinator {
    resolver: TemplateResolver,
    orchestrator: BatchOrchestrator,
    failure_threshold: f64,
}

impl GenerationCoordinator {
    pub fn new(resolver: TemplateResolver) -> Self {
        Self {
            resolver,
            orchestrator: BatchOrchestrator::default(),
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
        }
    }

    pub fn orchestrator(mut self, orchestrator: BatchOrchestrator) -> Self {
        self.orchestrator = orchestrator;
        self
    }

    /// Fraction of failed items (0.0 to 1.0) at which a category aborts.
    /// Range-checked by [`MimirBuilder::build`](crate::MimirBuilder::build).
    pub(crate) fn failure_threshold(mut self, fraction: f64) -> Self {
        self.failure_threshold = fraction;
        self
    }

    pub fn resolver(&self) -> &TemplateResolver {
        &self.resolver
    }

    pub fn concurrency(&self) -> usize {
        self.orchestrator.concurrency()
    }

    /// Run `request` with a fresh progress tracker.
    pub async fn run(&self, request: &GenerationRequest) -> Result<OutputBundle> {
        self.generate(request, &GenerationProgress::new()).await
    }

    /// Run `request`, reporting into `progress`.
    ///
    /// On error `progress` ends in [`CoordinatorState::Failed`]; cache entries
    /// written by items that finished before the failure are kept.
    #[instrument(skip_all, fields(fingerprint = request.fingerprint()))]
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        progress: &GenerationProgress,
    ) -> Result<OutputBundle> {
        match self.drive(request, progress).await {
            Ok(bundle) => {
                progress.transition(CoordinatorState::Done);
                Ok(bundle)
            }
            Err(e) => {
                warn!(error = %e, "generation failed");
                progress.transition(CoordinatorState::Failed);
                Err(e)
            }
        }
    }

    async fn drive(
        &self,
        request: &GenerationRequest,
        progress: &GenerationProgress,
    ) -> Result<OutputBundle> {
        progress.transition(CoordinatorState::ValidatingInput);
        validate(request)?;

        let mut artifacts = Vec::with_capacity(request.item_count());
        for category in [Category::Agent, Category::Skill] {
            progress.transition(CoordinatorState::GeneratingCategory(category));
            let items = request.items(category);
            if items.is_empty() {
                continue;
            }
            let batch = self.resolve_batch(category, &items, request, progress).await;
            self.check_threshold(category, &items, &batch)?;
            artifacts.extend(self.assemble_category(category, &items, batch, request, progress));
        }

        if request.include_summary() {
            progress.transition(CoordinatorState::GeneratingSummary);
            let items = vec![SUMMARY_ITEM.to_string()];
            let batch = self
                .resolve_batch(Category::Summary, &items, request, progress)
                .await;
            artifacts.extend(self.assemble_category(
                Category::Summary,
                &items,
                batch,
                request,
                progress,
            ));
        }

        progress.transition(CoordinatorState::Assembling);
        let counts = progress.counts();
        if counts.fallbacks > 0 {
            warn!(
                fallbacks = counts.fallbacks,
                total = artifacts.len(),
                "some artifacts use fallback content"
            );
        }
        info!(
            artifacts = artifacts.len(),
            cache_hits = counts.cache_hits,
            template_hits = counts.template_hits,
            live_generations = counts.live_generations,
            fallbacks = counts.fallbacks,
            "generation complete"
        );

        Ok(OutputBundle {
            artifacts,
            settings: derive_settings(request),
            counts,
        })
    }

    async fn resolve_batch(
        &self,
        category: Category,
        items: &[String],
        request: &GenerationRequest,
        progress: &GenerationProgress,
    ) -> BatchResult<Resolution> {
        let resolver = &self.resolver;
        self.orchestrator
            .run(
                items.to_vec(),
                move |name| async move { resolver.resolve(category, &name, request).await },
                progress,
            )
            .await
    }

    /// Abort the category when too many of its items failed.
    fn check_threshold(
        &self,
        category: Category,
        items: &[String],
        batch: &BatchResult<Resolution>,
    ) -> Result<()> {
        let failed = batch.errors.len();
        let total = batch.total();
        if !exceeds_threshold(failed, total, self.failure_threshold) {
            return Ok(());
        }

        metrics::counter!(telemetry::BATCH_ABORTS_TOTAL, "category" => category.as_str())
            .increment(1);

        // Quote failures in request order so the message is reproducible.
        let position: HashMap<&str, usize> = items
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();
        let mut errors: Vec<&(String, MimirError)> = batch.errors.iter().collect();
        errors.sort_by_key(|(name, _)| position.get(name.as_str()).copied());

        let summary = errors
            .iter()
            .take(SUMMARY_LIMIT)
            .map(|(name, e)| format!("{name}: {e}"))
            .collect::<Vec<_>>()
            .join("; ");

        Err(MimirError::AggregateBatch {
            category,
            failed,
            total,
            dominant_kind: dominant_kind(batch.errors.iter().map(|(_, e)| e)),
            summary,
        })
    }

    /// Turn a tolerated batch into artifacts in request order, substituting
    /// fallback content for failed items.
    fn assemble_category(
        &self,
        category: Category,
        items: &[String],
        batch: BatchResult<Resolution>,
        request: &GenerationRequest,
        progress: &GenerationProgress,
    ) -> Vec<Artifact> {
        let mut content: HashMap<String, String> = batch
            .results
            .into_iter()
            .map(|(name, resolution)| (name, resolution.content))
            .collect();

        for (name, e) in batch.errors {
            warn!(%category, item = name.as_str(), error = %e, "using fallback content");
            let fallback = self.resolver.fallback(category, &name, request);
            progress.record_fallback();
            metrics::counter!(telemetry::ARTIFACTS_TOTAL,
                "category" => category.as_str(),
                "source" => "fallback",
            )
            .increment(1);
            content.insert(name, fallback);
        }

        items
            .iter()
            .filter_map(|name| {
                let Some(content) = content.remove(name) else {
                    debug!(%category, item = name.as_str(), "no outcome for item");
                    return None;
                };
                Some(Artifact {
                    category,
                    name: name.clone(),
                    content,
                })
            })
            .collect()
    }
}

/// Reject malformed requests before anything is dispatched.
fn validate(request: &GenerationRequest) -> Result<()> {
    if request.goal().trim().is_empty() {
        return Err(MimirError::Validation("goal must not be empty".to_string()));
    }
    if request.fingerprint().trim().is_empty() {
        return Err(MimirError::Validation(
            "project fingerprint must not be empty".to_string(),
        ));
    }
    if request.item_count() == 0 {
        return Err(MimirError::Validation(
            "request must name at least one agent, skill, or the summary".to_string(),
        ));
    }

    for category in [Category::Agent, Category::Skill] {
        let mut seen = HashSet::new();
        for name in request.items(category) {
            if name.trim().is_empty() {
                return Err(MimirError::Validation(format!(
                    "{category} names must not be blank"
                )));
            }
            if !seen.insert(name.clone()) {
                return Err(MimirError::Validation(format!(
                    "duplicate {category} '{name}'"
                )));
            }
        }
    }
    Ok(())
}

/// Whether `failed` of `total` items reaches the abort fraction.
///
/// A batch with no failures never aborts, whatever the fraction.
pub fn exceeds_threshold(failed: usize, total: usize, fraction: f64) -> bool {
    failed > 0 && failed as f64 >= fraction * total as f64
}

/// The shared kind when every error has the same one.
fn dominant_kind<'a>(mut errors: impl Iterator<Item = &'a MimirError>) -> Option<ErrorKind> {
    let first = errors.next()?.kind();
    errors.all(|e| e.kind() == first).then_some(first)
}
