//! Per-invocation progress tracking.

use std::fmt;
use std::sync::{Mutex, MutexGuard};

use crate::MimirError;
use crate::orchestrator::BatchObserver;
use crate::resolver::{Resolution, ResolutionSource};
use crate::types::{Category, GenerationCounts};

/// Coordinator lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    ValidatingInput,
    GeneratingCategory(Category),
    GeneratingSummary,
    Assembling,
    Done,
    Failed,
}

impl CoordinatorState {
    /// Whether no further transitions follow.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CoordinatorState::Done | CoordinatorState::Failed)
    }
}

impl fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinatorState::Idle => f.write_str("idle"),
            CoordinatorState::ValidatingInput => f.write_str("validating input"),
            CoordinatorState::GeneratingCategory(c) => write!(f, "generating {}", c.dir_name()),
            CoordinatorState::GeneratingSummary => f.write_str("generating summary"),
            CoordinatorState::Assembling => f.write_str("assembling"),
            CoordinatorState::Done => f.write_str("done"),
            CoordinatorState::Failed => f.write_str("failed"),
        }
    }
}

#[derive(Debug)]
struct Inner {
    counts: GenerationCounts,
    history: Vec<CoordinatorState>,
    completed: usize,
    failed: usize,
}

/// Counters and state history for one generation run.
///
/// Passed explicitly to [`GenerationCoordinator::generate`](super::GenerationCoordinator::generate)
/// so a caller can poll it from another task while the run is in flight.
/// Counts are only updated from orchestrator completion callbacks and the
/// coordinator's own fallback step, never from inside a task.
#[derive(Debug)]
pub struct GenerationProgress {
    inner: Mutex<Inner>,
}

impl Default for GenerationProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationProgress {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                counts: GenerationCounts::default(),
                history: vec![CoordinatorState::Idle],
                completed: 0,
                failed: 0,
            }),
        }
    }

    // A panicking observer elsewhere must not wedge progress reporting.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current state.
    pub fn state(&self) -> CoordinatorState {
        self.lock()
            .history
            .last()
            .copied()
            .unwrap_or(CoordinatorState::Idle)
    }

    /// Every state entered so far, oldest first.
    pub fn history(&self) -> Vec<CoordinatorState> {
        self.lock().history.clone()
    }

    /// Snapshot of the source counters.
    pub fn counts(&self) -> GenerationCounts {
        self.lock().counts
    }

    /// Items finished successfully by the orchestrator so far.
    pub fn completed(&self) -> usize {
        self.lock().completed
    }

    /// Items that failed in the orchestrator so far (before fallback).
    pub fn failed(&self) -> usize {
        self.lock().failed
    }

    pub(crate) fn transition(&self, state: CoordinatorState) {
        self.lock().history.push(state);
    }

    pub(crate) fn record_fallback(&self) {
        self.lock().counts.fallbacks += 1;
    }

    fn record_resolution(&self, source: ResolutionSource) {
        let mut inner = self.lock();
        inner.completed += 1;
        match source {
            ResolutionSource::Cache => inner.counts.cache_hits += 1,
            ResolutionSource::Override | ResolutionSource::Builtin => {
                inner.counts.template_hits += 1
            }
            ResolutionSource::Live => inner.counts.live_generations += 1,
        }
    }
}

impl BatchObserver<Resolution> for GenerationProgress {
    fn on_success(&self, _item: &str, output: &Resolution) {
        self.record_resolution(output.source);
    }

    fn on_error(&self, _item: &str, _error: &MimirError) {
        self.lock().failed += 1;
    }
}
