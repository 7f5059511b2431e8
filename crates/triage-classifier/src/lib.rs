//! Triage Classifiers
//!
//! The four independent, stateless classifiers behind a Verdict:
//!
//! - [`AreaMatcher`]: keyword and path-glob scoring against catalog areas
//! - [`CriticalityClassifier`]: Hot / Blocking / Regression predicates
//! - [`DuplicateScorer`]: Primary and Supporting evidence, confidence bands
//! - [`SlaEvaluator`]: Waiting / Good / Warning / Violation
//!
//! Each borrows the [`triage_catalog::RuleCatalog`] it was built from and is
//! a pure function of its inputs.
//!
//! # Examples
//!
//! ```
//! use triage_catalog::RuleCatalog;
//! use triage_classifier::SlaEvaluator;
//! use triage_domain::{SignalSet, SlaStatus};
//!
//! let catalog = RuleCatalog::built_in();
//! let issue = SignalSet::new(7, "Crash on save", "", 0).with_labels(["need more info"]);
//!
//! let outcome = SlaEvaluator::new(&catalog).evaluate(&issue, 86_400).unwrap();
//! assert_eq!(outcome.status, SlaStatus::Waiting);
//! ```

#![warn(missing_docs)]

pub mod area;
pub mod criticality;
pub mod duplicates;
mod error;
pub mod similarity;
pub mod sla;

pub use area::AreaMatcher;
pub use criticality::{CriticalityClassifier, CriticalityOutcome};
pub use duplicates::{DuplicateOutcome, DuplicateScorer, PrimaryMatch, SupportingMatch};
pub use error::ClassifierError;
pub use similarity::TokenOverlap;
pub use sla::{SlaCriterion, SlaEvaluator, SlaOutcome};
