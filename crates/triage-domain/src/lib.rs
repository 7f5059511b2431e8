//! Triage Domain Layer
//!
//! Value types shared by every component of the triage engine. This crate
//! performs no I/O and holds no state; it defines what flows between the
//! classifiers and out of the engine.
//!
//! ## Key Concepts
//!
//! - **Signal Set**: the normalized, structured extraction of one issue
//! - **Criticality Tier**: None, Hot, Regression or Blocking, with an explicit
//!   precedence order
//! - **Confidence Tier**: Low, Medium or High duplicate confidence
//! - **SLA Status**: Good, Warning, Violation or Waiting
//! - **Verdict**: the aggregated, serializable output record
//!
//! ## Ingestion
//!
//! Normalization (label folding, line-number stripping, stack truncation)
//! happens when a Signal Set is deserialized or built, so every classifier
//! sees the same canonical form.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod issue;
pub mod normalize;
pub mod signal;
pub mod tier;
pub mod traits;
pub mod verdict;

// Re-exports for convenience
pub use error::SignalError;
pub use issue::IssueId;
pub use signal::{Comment, Environment, ParentLink, SignalSet, StackFrame};
pub use tier::{ConfidenceTier, CriticalityTier, SlaStatus};
pub use traits::TextSimilarity;
pub use verdict::{AreaMatch, Component, DuplicateMatch, Verdict};
