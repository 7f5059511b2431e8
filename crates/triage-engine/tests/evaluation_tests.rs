//! Integration tests for triage-engine
//!
//! End-to-end evaluation scenarios, partial-failure isolation, and batch
//! evaluation with cancellation.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use triage_domain::signal::SECONDS_PER_DAY;
use triage_domain::{
    Component, ConfidenceTier, CriticalityTier, Environment, SignalSet, SlaStatus, TextSimilarity,
};
use triage_engine::{
    BatchEvaluator, BatchOutcome, BatchRequest, EngineError, EvaluationRequest, TriageEngine,
};

const NOW: i64 = 1_726_000_000;

const CATALOG: &str = r#"
[[areas]]
name = "debugger"
keywords = ["debugger", "breakpoint"]
owners = ["alice", "bob"]

[[areas]]
name = "editor"
keywords = ["completion", "caret"]
owners = ["carol"]
"#;

fn env() -> Environment {
    Environment::new(Some("Ubuntu 24.04"), Some("JBR 21"), Some("2024.2"))
}

fn request(target: SignalSet, pool: Vec<SignalSet>) -> EvaluationRequest {
    EvaluationRequest::new(target, NOW)
        .with_pool(pool)
        .with_catalog_source(CATALOG)
}

#[test]
fn test_scenario_waiting_label() {
    let engine = TriageEngine::new();
    let target = SignalSet::new(10, "Debugger crash", "", NOW - 40 * SECONDS_PER_DAY)
        .with_labels(["need more info", "needs-triage"]);

    let verdict = engine.evaluate(&request(target, vec![])).unwrap();
    assert_eq!(verdict.sla_status, Some(SlaStatus::Waiting));
    assert!(verdict.is_complete());
}

#[test]
fn test_scenario_violation_after_ten_days() {
    let engine = TriageEngine::new();
    let target = SignalSet::new(10, "Caret jumps", "", NOW - 10 * SECONDS_PER_DAY);

    let verdict = engine.evaluate(&request(target, vec![])).unwrap();
    assert_eq!(verdict.sla_status, Some(SlaStatus::Violation));
    assert_eq!(verdict.sla_days_open, Some(10));
    assert!(verdict.sla_rationale.starts_with("Missing parent link"));
}

#[test]
fn test_scenario_medium_duplicate() {
    let engine = TriageEngine::new();
    let target = SignalSet::new(200, "Debugger hangs", "", NOW)
        .with_error_signature("NullPointerException at X.Y()")
        .with_environment(env());
    let candidate = SignalSet::new(150, "Breakpoint window empty", "", NOW - SECONDS_PER_DAY)
        .with_error_signature("NullPointerException at X.Y()")
        .with_environment(env());

    let verdict = engine.evaluate(&request(target, vec![candidate])).unwrap();
    assert_eq!(verdict.duplicate_matches.len(), 1);
    assert_eq!(verdict.duplicate_matches[0].confidence_tier, ConfidenceTier::Medium);
    assert!((70..=89).contains(&verdict.duplicate_matches[0].confidence_score));
    assert!(verdict.recommended_labels.contains(&"duplicate".to_string()));
}

#[test]
fn test_scenario_high_duplicate() {
    let engine = TriageEngine::new();
    let target = SignalSet::new(200, "Debugger hangs", "Looks like #150", NOW)
        .with_error_signature("NullPointerException at X.Y()")
        .with_environment(env())
        .with_trigger("after resume")
        .with_cross_reference(150);
    let candidate = SignalSet::new(150, "Breakpoint window empty", "", NOW - SECONDS_PER_DAY)
        .with_error_signature("NullPointerException at X.Y()")
        .with_environment(env())
        .with_trigger("after resume");

    let verdict = engine.evaluate(&request(target, vec![candidate])).unwrap();
    assert_eq!(verdict.duplicate_matches[0].confidence_tier, ConfidenceTier::High);
    assert_eq!(verdict.duplicate_matches[0].candidate_id.value(), 150);
}

#[test]
fn test_partial_failure_on_bad_timestamp() {
    let engine = TriageEngine::new();
    let target = SignalSet::new(200, "Debugger crash", "", NOW + 5 * SECONDS_PER_DAY)
        .with_error_signature("NullPointerException at X.Y()")
        .with_environment(env());
    let candidate = SignalSet::new(150, "Breakpoint window empty", "", NOW)
        .with_error_signature("NullPointerException at X.Y()")
        .with_environment(env());

    let verdict = engine.evaluate(&request(target, vec![candidate])).unwrap();
    assert_eq!(verdict.sla_status, None);
    assert_eq!(verdict.sla_days_open, None);
    assert_eq!(verdict.unevaluated_components, vec![Component::Sla]);
    assert!(verdict.sla_rationale.starts_with("Unevaluated"));
    assert_eq!(verdict.criticality_tier, Some(CriticalityTier::Blocking));
    assert_eq!(verdict.duplicate_matches.len(), 1);

    let json = serde_json::to_value(&verdict).unwrap();
    assert!(json["slaStatus"].is_null());
    assert_eq!(json["unevaluatedComponents"], serde_json::json!(["sla"]));
}

#[test]
fn test_invalid_target_fails_whole_call() {
    let engine = TriageEngine::new();
    let result = engine.evaluate(&request(SignalSet::new(0, "t", "", 0), vec![]));
    assert!(matches!(result, Err(EngineError::InvalidSignalSet(_))));
}

#[test]
fn test_malformed_catalog_surfaces_warning() {
    let engine = TriageEngine::new();
    let request = EvaluationRequest::new(SignalSet::new(3, "Slow typing", "", NOW), NOW)
        .with_catalog_source("[[areas]\nbroken");
    let verdict = engine.evaluate(&request).unwrap();
    assert_eq!(verdict.catalog_warnings.len(), 1);
    assert_eq!(verdict.area_match.unwrap().name, "performance");
}

struct PanickingSimilarity;

impl TextSimilarity for PanickingSimilarity {
    fn similarity(&self, _a: &str, _b: &str) -> f64 {
        panic!("similarity backend unavailable")
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}

#[test]
fn test_classifier_panic_is_isolated() {
    let engine = TriageEngine::new().with_similarity(Arc::new(PanickingSimilarity));
    let target = SignalSet::new(200, "Debugger hangs", "", NOW - SECONDS_PER_DAY)
        .with_error_signature("NPE at A.b()");
    let candidate =
        SignalSet::new(150, "Breakpoint window empty", "", NOW).with_error_signature("NPE at A.b()");

    let verdict = engine.evaluate(&request(target, vec![candidate])).unwrap();
    assert_eq!(
        verdict.unevaluated_components,
        vec![Component::Criticality, Component::Duplicates]
    );
    assert!(verdict.duplicates_rationale.contains("similarity backend unavailable"));
    assert_eq!(verdict.sla_status, Some(SlaStatus::Warning));
    assert_eq!(verdict.area_match.unwrap().name, "debugger");
}

fn batch(targets: Vec<SignalSet>) -> BatchRequest {
    BatchRequest {
        targets,
        candidate_pool: Vec::new(),
        rule_catalog_source: Some(CATALOG.to_string()),
        evaluation_timestamp: NOW,
    }
}

#[tokio::test]
async fn test_batch_keeps_input_order() {
    let evaluator = BatchEvaluator::new(Arc::new(TriageEngine::new())).with_concurrency(2);
    let targets = vec![
        SignalSet::new(5, "Breakpoint ignored", "", NOW),
        SignalSet::new(0, "Invalid", "", NOW),
        SignalSet::new(3, "Completion slow", "", NOW - 9 * SECONDS_PER_DAY),
        SignalSet::new(8, "Caret lost", "", NOW).with_labels(["need more info"]),
    ];

    let report = evaluator.run(batch(targets), CancellationToken::new()).await;
    let ids: Vec<u64> = report.outcomes.iter().map(|o| o.issue_id().value()).collect();
    assert_eq!(ids, vec![5, 0, 3, 8]);
    assert!(matches!(report.outcomes[1], BatchOutcome::Failed { .. }));
    assert_eq!(report.metrics.completed, 3);
    assert_eq!(report.metrics.failed, 1);
    assert_eq!(report.metrics.sla.get("violation"), Some(&1));
    assert_eq!(report.metrics.sla.get("waiting"), Some(&1));
    assert!(report.metrics.summary().contains("3 completed"));
}

#[tokio::test]
async fn test_batch_cancelled_before_start() {
    let evaluator = BatchEvaluator::new(Arc::new(TriageEngine::new()));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let targets = (1..=5).map(|id| SignalSet::new(id, "Breakpoint", "", NOW)).collect();
    let report = evaluator.run(batch(targets), cancel).await;
    assert_eq!(report.metrics.cancelled, 5);
    assert!(report.outcomes.iter().all(|o| o.verdict().is_none()));
}

struct SlowSimilarity;

impl TextSimilarity for SlowSimilarity {
    fn similarity(&self, _a: &str, _b: &str) -> f64 {
        std::thread::sleep(Duration::from_millis(200));
        1.0
    }

    fn name(&self) -> &'static str {
        "slow"
    }
}

#[tokio::test]
async fn test_batch_cancelled_mid_run_reports_no_partial_verdicts() {
    let engine = TriageEngine::new().with_similarity(Arc::new(SlowSimilarity));
    let evaluator = BatchEvaluator::new(Arc::new(engine)).with_concurrency(1);

    let targets: Vec<SignalSet> = (10..13)
        .map(|id| SignalSet::new(id, "Debugger hangs", "", NOW).with_error_signature("NPE at A.b()"))
        .collect();
    let mut request = batch(targets);
    request.candidate_pool =
        vec![SignalSet::new(1, "Debugger hangs", "", NOW).with_error_signature("NPE at A.b()")];

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let report = evaluator.run(request, cancel).await;
    assert_eq!(report.outcomes.len(), 3);
    assert!(report.metrics.cancelled >= 1);
    assert!(report
        .outcomes
        .iter()
        .filter_map(|o| o.verdict())
        .all(|v| v.is_complete()));
}

/// Records which targets ("alpha", "beta") reached the similarity backend
#[derive(Default)]
struct RecordingSimilarity {
    seen: Mutex<HashSet<&'static str>>,
}

impl TextSimilarity for RecordingSimilarity {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        for marker in ["alpha", "beta"] {
            if a.contains(marker) || b.contains(marker) {
                self.seen.lock().unwrap().insert(marker);
            }
        }
        std::thread::sleep(Duration::from_millis(100));
        1.0
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

#[test]
fn test_batch_cancel_skips_queued_blocking_jobs() {
    // One blocking thread: the second target's job waits in the queue
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .max_blocking_threads(1)
        .enable_all()
        .build()
        .unwrap();

    let similarity = Arc::new(RecordingSimilarity::default());
    let engine = TriageEngine::new().with_similarity(similarity.clone());
    let evaluator = BatchEvaluator::new(Arc::new(engine)).with_concurrency(2);

    let targets = ["alpha", "beta"]
        .iter()
        .zip(10..)
        .map(|(marker, id)| {
            SignalSet::new(id, format!("Debugger hangs {}", marker), "", NOW)
                .with_error_signature("NPE at A.b()")
        })
        .collect();
    let mut request = batch(targets);
    request.candidate_pool =
        vec![SignalSet::new(1, "Debugger hangs", "", NOW).with_error_signature("NPE at A.b()")];

    let report = runtime.block_on(async {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            trigger.cancel();
        });
        let report = evaluator.run(request, cancel).await;
        // Let the running job finish and the queued one get its turn
        tokio::time::sleep(Duration::from_millis(1500)).await;
        report
    });

    assert_eq!(report.metrics.cancelled, 2);
    assert_eq!(similarity.seen.lock().unwrap().len(), 1);
}

#[test]
fn test_batch_report_serializes_status_tags() {
    let outcome = BatchOutcome::Cancelled {
        issue_id: triage_domain::IssueId::new(4),
    };
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["status"], "cancelled");
    assert_eq!(json["issueId"], 4);
}
