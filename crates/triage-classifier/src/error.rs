//! Classifier error types

use thiserror::Error;
use triage_domain::{Component, SignalError};

/// Errors raised by a single classifier
///
/// The engine isolates these per component: one classifier failing never
/// prevents the others from reporting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifierError {
    /// The Signal Set cannot be evaluated by this classifier
    #[error(transparent)]
    InvalidSignalSet(#[from] SignalError),

    /// Unexpected failure inside a classifier
    #[error("{component} classifier failed: {reason}")]
    ClassifierFailure {
        /// Component that failed
        component: Component,
        /// Failure description
        reason: String,
    },
}

impl ClassifierError {
    /// Build a `ClassifierFailure` for a component
    pub fn failure(component: Component, reason: impl Into<String>) -> Self {
        ClassifierError::ClassifierFailure {
            component,
            reason: reason.into(),
        }
    }
}
