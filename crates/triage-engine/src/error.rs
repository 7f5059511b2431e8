//! Engine error types

use thiserror::Error;
use triage_domain::SignalError;

/// Errors that fail a whole evaluation call
///
/// Classifier failures are not here: they are isolated per component and
/// reported in the Verdict's `unevaluatedComponents`.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The request cannot be evaluated at all
    #[error(transparent)]
    InvalidSignalSet(#[from] SignalError),

    /// Request or Verdict JSON could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
