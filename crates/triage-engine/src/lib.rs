//! Triage Engine
//!
//! Turns Signal Sets into Verdicts.
//!
//! # Overview
//!
//! The engine is responsible for:
//! - **Evaluation**: running the area, criticality, duplicate and SLA
//!   classifiers against one target issue
//! - **Isolation**: a failing or panicking classifier leaves only its own
//!   component unevaluated
//! - **Batches**: bounded parallel evaluation of many targets with
//!   cancellation
//! - **Metrics**: per-batch counters with a text summary
//!
//! # Usage
//!
//! ## Single evaluation
//!
//! ```
//! use triage_domain::{CriticalityTier, SignalSet};
//! use triage_engine::{EvaluationRequest, TriageEngine};
//!
//! let engine = TriageEngine::new();
//! let target = SignalSet::new(12, "Editor crash on paste", "Cannot open any file", 0);
//! let verdict = engine.evaluate(&EvaluationRequest::new(target, 3 * 86_400)).unwrap();
//!
//! assert_eq!(verdict.criticality_tier, Some(CriticalityTier::Blocking));
//! assert_eq!(verdict.sla_days_open, Some(3));
//! ```
//!
//! ## Batch
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use triage_engine::{BatchEvaluator, BatchRequest, TriageEngine};
//!
//! # async fn run(request: BatchRequest) {
//! let evaluator = BatchEvaluator::new(Arc::new(TriageEngine::new()));
//! let report = evaluator.run(request, CancellationToken::new()).await;
//! println!("{}", report.metrics.summary());
//! # }
//! ```

#![warn(missing_docs)]

pub mod aggregator;
mod batch;
mod engine;
mod error;
mod metrics;
mod request;

pub use aggregator::ComponentOutcome;
pub use batch::{BatchEvaluator, BatchOutcome, BatchReport, DEFAULT_CONCURRENCY};
pub use engine::{SharedSimilarity, TriageEngine};
pub use error::EngineError;
pub use metrics::BatchMetrics;
pub use request::{BatchRequest, EvaluationRequest};
