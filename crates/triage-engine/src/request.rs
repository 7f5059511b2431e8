//! Evaluation request contracts

use crate::EngineError;
use serde::{Deserialize, Serialize};
use triage_domain::SignalSet;

/// Input for one evaluation call
///
/// ```json
/// { "targetSignalSet": {...}, "candidatePool": [...],
///   "ruleCatalogSource": "...", "evaluationTimestamp": 1726000000 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    /// Issue to classify
    pub target_signal_set: SignalSet,

    /// Other issues to compare against
    #[serde(default)]
    pub candidate_pool: Vec<SignalSet>,

    /// Rule Catalog TOML; `None` selects the built-in default
    #[serde(default)]
    pub rule_catalog_source: Option<String>,

    /// Evaluation time (Unix seconds, UTC)
    pub evaluation_timestamp: i64,
}

impl EvaluationRequest {
    /// Create a request with an empty pool and the default catalog
    pub fn new(target: SignalSet, evaluation_timestamp: i64) -> Self {
        Self {
            target_signal_set: target,
            candidate_pool: Vec::new(),
            rule_catalog_source: None,
            evaluation_timestamp,
        }
    }

    /// Set the candidate pool
    pub fn with_pool(mut self, pool: Vec<SignalSet>) -> Self {
        self.candidate_pool = pool;
        self
    }

    /// Set the Rule Catalog source text
    pub fn with_catalog_source(mut self, source: impl Into<String>) -> Self {
        self.rule_catalog_source = Some(source.into());
        self
    }

    /// Parse a request from JSON
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Input for a batch of evaluations sharing one pool and catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    /// Issues to classify, in reporting order
    pub targets: Vec<SignalSet>,

    /// Shared candidate pool
    #[serde(default)]
    pub candidate_pool: Vec<SignalSet>,

    /// Rule Catalog TOML; `None` selects the built-in default
    #[serde(default)]
    pub rule_catalog_source: Option<String>,

    /// Evaluation time (Unix seconds, UTC)
    pub evaluation_timestamp: i64,
}

impl BatchRequest {
    /// Parse a batch request from JSON
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_json() {
        let request = EvaluationRequest::from_json(
            r#"{
                "targetSignalSet": {"id": 7, "title": "Crash", "createdAt": 100},
                "evaluationTimestamp": 200
            }"#,
        )
        .unwrap();
        assert_eq!(request.target_signal_set.id.value(), 7);
        assert!(request.candidate_pool.is_empty());
        assert!(request.rule_catalog_source.is_none());
    }

    #[test]
    fn test_missing_timestamp_is_an_error() {
        let result = EvaluationRequest::from_json(r#"{"targetSignalSet": {"id": 7}}"#);
        assert!(matches!(result, Err(EngineError::Json(_))));
    }
}
