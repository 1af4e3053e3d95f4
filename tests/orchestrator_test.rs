//! Tests for bounded-concurrency batch execution.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use mimir::orchestrator::{BatchObserver, BatchOrchestrator, NoopObserver};
use mimir::MimirError;

fn items(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("item-{i}")).collect()
}

/// Records callback order.
#[derive(Default)]
struct Recorder {
    started: Mutex<Vec<String>>,
    succeeded: Mutex<Vec<String>>,
    failed: Mutex<Vec<String>>,
}

impl BatchObserver<String> for Recorder {
    fn on_start(&self, item: &str) {
        self.started.lock().unwrap().push(item.to_string());
    }

    fn on_success(&self, item: &str, _output: &String) {
        self.succeeded.lock().unwrap().push(item.to_string());
    }

    fn on_error(&self, item: &str, _error: &MimirError) {
        self.failed.lock().unwrap().push(item.to_string());
    }
}

/// Panics on every callback.
struct PanickingObserver;

impl BatchObserver<String> for PanickingObserver {
    fn on_start(&self, _item: &str) {
        panic!("observer start");
    }

    fn on_success(&self, _item: &str, _output: &String) {
        panic!("observer success");
    }

    fn on_error(&self, _item: &str, _error: &MimirError) {
        panic!("observer error");
    }
}

#[tokio::test(start_paused = true)]
async fn in_flight_tasks_never_exceed_limit() {
    for limit in [1, 3, 8] {
        let in_flight = &AtomicUsize::new(0);
        let peak = &AtomicUsize::new(0);
        let orchestrator = BatchOrchestrator::new(limit);

        let batch = orchestrator
            .run(
                items(20),
                |item| {
                    // Counted from task construction, so lazy creation is covered too.
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    async move {
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                        Ok::<_, MimirError>(item)
                    }
                },
                &NoopObserver,
            )
            .await;

        assert_eq!(batch.results.len(), 20);
        assert_eq!(peak.load(Ordering::SeqCst), limit, "limit {limit}");
    }
}

#[tokio::test]
async fn zero_limit_is_clamped_to_one() {
    let orchestrator = BatchOrchestrator::new(0);
    assert_eq!(orchestrator.concurrency(), 1);

    let batch = orchestrator
        .run(items(3), |item| async move { Ok(item) }, &NoopObserver)
        .await;
    assert_eq!(batch.results.len(), 3);
}

#[tokio::test]
async fn partition_is_exhaustive_and_disjoint() {
    let input = items(10);
    let batch = BatchOrchestrator::new(4)
        .run(
            input.clone(),
            |item| async move {
                let n: usize = item.trim_start_matches("item-").parse().unwrap();
                if n % 3 == 0 {
                    Err(MimirError::EmptyResponse)
                } else {
                    Ok(n)
                }
            },
            &NoopObserver,
        )
        .await;

    let ok: HashSet<&str> = batch.results.iter().map(|(i, _)| i.as_str()).collect();
    let failed: HashSet<&str> = batch.errors.iter().map(|(i, _)| i.as_str()).collect();
    let all: HashSet<&str> = input.iter().map(String::as_str).collect();

    assert!(ok.is_disjoint(&failed));
    assert_eq!(ok.union(&failed).copied().collect::<HashSet<_>>(), all);
    assert_eq!(batch.total(), 10);
    assert_eq!(failed.len(), 4);
    assert!(!batch.is_complete_success());
}

#[tokio::test]
async fn failure_does_not_cancel_siblings() {
    let completed = &AtomicUsize::new(0);
    let batch = BatchOrchestrator::new(2)
        .run(
            items(6),
            |item| async move {
                if item == "item-0" {
                    return Err(MimirError::AuthenticationFailed);
                }
                tokio::task::yield_now().await;
                completed.fetch_add(1, Ordering::SeqCst);
                Ok(item)
            },
            &NoopObserver,
        )
        .await;

    assert_eq!(batch.errors.len(), 1);
    assert_eq!(completed.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn panicking_task_only_fails_its_item() {
    let batch: mimir::BatchResult<String> = BatchOrchestrator::new(3)
        .run(
            items(5),
            |item| async move {
                if item == "item-2" {
                    panic!("boom");
                }
                Ok(item)
            },
            &NoopObserver,
        )
        .await;

    assert_eq!(batch.results.len(), 4);
    assert_eq!(batch.errors.len(), 1);
    let (item, err) = &batch.errors[0];
    assert_eq!(item, "item-2");
    assert!(matches!(err, MimirError::TaskPanicked(name) if name == "item-2"));
}

#[tokio::test]
async fn panicking_observer_does_not_affect_results() {
    let batch = BatchOrchestrator::new(2)
        .run(
            items(4),
            |item| async move {
                if item == "item-3" {
                    Err(MimirError::EmptyResponse)
                } else {
                    Ok(item)
                }
            },
            &PanickingObserver,
        )
        .await;

    assert_eq!(batch.results.len(), 3);
    assert_eq!(batch.errors.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn callbacks_fire_in_completion_order() {
    let delays = [("slow", 30), ("mid", 20), ("fast", 10)];
    let recorder = Recorder::default();

    let batch = BatchOrchestrator::new(3)
        .run(
            delays.iter().map(|(name, _)| name.to_string()).collect(),
            |item| async move {
                let (_, ms) = delays.iter().find(|(n, _)| *n == item).unwrap();
                let ms = *ms;
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok(item)
            },
            &recorder,
        )
        .await;

    assert_eq!(*recorder.started.lock().unwrap(), vec!["slow", "mid", "fast"]);
    assert_eq!(*recorder.succeeded.lock().unwrap(), vec!["fast", "mid", "slow"]);
    let order: Vec<&str> = batch.results.iter().map(|(i, _)| i.as_str()).collect();
    assert_eq!(order, vec!["fast", "mid", "slow"]);
}

#[tokio::test]
async fn error_callbacks_fire_once_per_failure() {
    let recorder = Recorder::default();
    let batch = BatchOrchestrator::new(4)
        .run(
            items(6),
            |item| async move {
                if item.ends_with('1') || item.ends_with('4') {
                    Err(MimirError::Http("reset".into()))
                } else {
                    Ok::<String, MimirError>(item)
                }
            },
            &recorder,
        )
        .await;

    let mut failed = recorder.failed.lock().unwrap().clone();
    failed.sort();
    assert_eq!(failed, vec!["item-1", "item-4"]);
    assert_eq!(recorder.succeeded.lock().unwrap().len(), batch.results.len());
    assert_eq!(recorder.started.lock().unwrap().len(), 6);
}

#[tokio::test]
async fn empty_batch_is_empty_success() {
    let batch = BatchOrchestrator::default()
        .run(Vec::new(), |item| async move { Ok::<_, MimirError>(item) }, &NoopObserver)
        .await;
    assert_eq!(batch.total(), 0);
    assert!(batch.is_complete_success());
}
