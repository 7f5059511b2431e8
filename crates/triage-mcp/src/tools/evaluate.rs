//! Evaluate tool - Produce a Verdict for one issue

use crate::error::McpError;
use serde_json::Value;
use triage_domain::Verdict;
use triage_engine::{EvaluationRequest, TriageEngine};

/// Handle triage_evaluate tool invocation
///
/// The arguments are an `EvaluationRequest`. When the request carries no
/// catalog source, `default_catalog` is used instead.
pub fn handle_evaluate(
    engine: &TriageEngine,
    default_catalog: Option<&str>,
    arguments: Value,
) -> Result<Verdict, McpError> {
    let mut request: EvaluationRequest =
        serde_json::from_value(arguments).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    if request.rule_catalog_source.is_none() {
        request.rule_catalog_source = default_catalog.map(str::to_string);
    }

    Ok(engine.evaluate(&request)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_target_is_invalid_params() {
        let engine = TriageEngine::new();
        let err = handle_evaluate(&engine, None, json!({"evaluationTimestamp": 0})).unwrap_err();
        assert_eq!(err.error_code(), -32602);
    }

    #[test]
    fn test_default_catalog_applies() {
        let engine = TriageEngine::new();
        let catalog = "[[areas]]\nname = \"vcs\"\nkeywords = [\"git\"]\nowners = [\"dana\"]\n";
        let verdict = handle_evaluate(
            &engine,
            Some(catalog),
            json!({
                "targetSignalSet": {"id": 3, "title": "git push hangs", "createdAt": 0},
                "evaluationTimestamp": 60
            }),
        )
        .unwrap();
        assert_eq!(verdict.recommended_assignees, vec!["dana".to_string()]);
    }
}
