//! Signal Set validation errors

use thiserror::Error;

/// Errors raised when a Signal Set cannot be evaluated
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    /// A required field is missing or malformed
    #[error("Invalid signal set {issue}: {reason}")]
    InvalidSignalSet {
        /// Issue the signal set describes
        issue: String,
        /// What is wrong with it
        reason: String,
    },
}

impl SignalError {
    /// Build an `InvalidSignalSet` error for the given issue
    pub fn invalid(issue: impl ToString, reason: impl Into<String>) -> Self {
        SignalError::InvalidSignalSet {
            issue: issue.to_string(),
            reason: reason.into(),
        }
    }
}
