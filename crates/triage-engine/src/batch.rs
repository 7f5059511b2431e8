//! Bounded parallel evaluation of many targets

use crate::{BatchMetrics, BatchRequest, TriageEngine};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use triage_domain::{IssueId, Verdict};
use uuid::Uuid;

/// Default number of targets evaluated at once
pub const DEFAULT_CONCURRENCY: usize = 4;

/// What happened to one target of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BatchOutcome {
    /// Evaluated; the Verdict may still mark components unevaluated
    Completed(Box<Verdict>),

    /// The evaluation call failed
    #[serde(rename_all = "camelCase")]
    Failed {
        /// Target issue
        issue_id: IssueId,
        /// Why it failed
        reason: String,
    },

    /// Cancelled before a Verdict was produced
    #[serde(rename_all = "camelCase")]
    Cancelled {
        /// Target issue
        issue_id: IssueId,
    },
}

impl BatchOutcome {
    /// The target issue
    pub fn issue_id(&self) -> IssueId {
        match self {
            BatchOutcome::Completed(verdict) => verdict.issue_id,
            BatchOutcome::Failed { issue_id, .. } | BatchOutcome::Cancelled { issue_id } => *issue_id,
        }
    }

    /// The Verdict, if completed
    pub fn verdict(&self) -> Option<&Verdict> {
        match self {
            BatchOutcome::Completed(verdict) => Some(verdict.as_ref()),
            _ => None,
        }
    }
}

/// Result of one batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    /// Run identifier (UUIDv7, time-ordered)
    pub run_id: Uuid,

    /// One outcome per target, in input order
    pub outcomes: Vec<BatchOutcome>,

    /// Run counters
    pub metrics: BatchMetrics,
}

/// Evaluates many targets against one shared pool and catalog
///
/// Targets run on tokio's blocking pool, at most `concurrency` at a time.
/// Cancelling the token stops the batch: every target without a Verdict at
/// that point is reported as cancelled. Queued targets are never evaluated;
/// an evaluation already running cannot be interrupted, so it finishes on
/// its blocking thread and its Verdict is discarded.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use triage_engine::{BatchEvaluator, BatchRequest, TriageEngine};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let request = BatchRequest::from_json(&std::fs::read_to_string("batch.json")?)?;
///     let evaluator = BatchEvaluator::new(Arc::new(TriageEngine::new())).with_concurrency(8);
///
///     // Runs until done or Ctrl+C
///     let report = evaluator.run_until_ctrl_c(request).await;
///     println!("{}", report.metrics.summary());
///     Ok(())
/// }
/// ```
pub struct BatchEvaluator {
    engine: Arc<TriageEngine>,
    concurrency: usize,
}

impl BatchEvaluator {
    /// Create an evaluator with the default concurrency
    pub fn new(engine: Arc<TriageEngine>) -> Self {
        Self {
            engine,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Set how many targets are evaluated at once (at least 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Configured concurrency
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Evaluate every target until done or cancelled
    pub async fn run(&self, request: BatchRequest, cancel: CancellationToken) -> BatchReport {
        let run_id = Uuid::now_v7();
        let started = Instant::now();
        let catalog = self.engine.catalog(request.rule_catalog_source.as_deref());
        let pool = Arc::new(request.candidate_pool);
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let evaluation_time = request.evaluation_timestamp;

        tracing::info!(
            "Batch {} started: {} target(s), {} candidate(s), concurrency {}",
            run_id,
            request.targets.len(),
            pool.len(),
            self.concurrency
        );

        let mut handles = Vec::with_capacity(request.targets.len());
        for target in request.targets {
            let issue_id = target.id;
            let engine = Arc::clone(&self.engine);
            let catalog = Arc::clone(&catalog);
            let pool = Arc::clone(&pool);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();

            let handle = tokio::spawn(async move {
                let permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return BatchOutcome::Cancelled { issue_id },
                    permit = semaphore.acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(e) => {
                            return BatchOutcome::Failed { issue_id, reason: e.to_string() };
                        }
                    },
                };

                // The job may wait in the blocking pool's queue; it skips the
                // evaluation if the batch was cancelled meanwhile.
                let job_cancel = cancel.clone();
                let job = tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    if job_cancel.is_cancelled() {
                        return None;
                    }
                    Some(engine.evaluate_with_catalog(&catalog, &target, &pool, evaluation_time))
                });

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => BatchOutcome::Cancelled { issue_id },
                    joined = job => match joined {
                        Ok(None) => BatchOutcome::Cancelled { issue_id },
                        Ok(Some(Ok(verdict))) => BatchOutcome::Completed(Box::new(verdict)),
                        Ok(Some(Err(e))) => BatchOutcome::Failed { issue_id, reason: e.to_string() },
                        Err(e) => BatchOutcome::Failed {
                            issue_id,
                            reason: format!("Task join error: {}", e),
                        },
                    },
                }
            });
            handles.push((issue_id, handle));
        }

        let mut metrics = BatchMetrics::new();
        let mut outcomes = Vec::with_capacity(handles.len());
        for (issue_id, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => BatchOutcome::Failed {
                    issue_id,
                    reason: format!("Task join error: {}", e),
                },
            };
            if let BatchOutcome::Failed { reason, .. } = &outcome {
                tracing::warn!("Issue {} failed: {}", issue_id, reason);
            }
            metrics.record(&outcome);
            outcomes.push(outcome);
        }
        metrics.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        tracing::info!(
            "Batch {} finished: {} completed, {} failed, {} cancelled",
            run_id,
            metrics.completed,
            metrics.failed,
            metrics.cancelled
        );

        BatchReport {
            run_id,
            outcomes,
            metrics,
        }
    }

    /// Run the batch, cancelling it on Ctrl+C
    pub async fn run_until_ctrl_c(&self, request: BatchRequest) -> BatchReport {
        let cancel = CancellationToken::new();
        let watcher = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("Shutdown signal received, cancelling batch");
                    cancel.cancel();
                }
            })
        };

        let report = self.run(request, cancel).await;
        watcher.abort();
        report
    }
}
