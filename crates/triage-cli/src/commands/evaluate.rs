//! Evaluate command implementation.

use super::{read_catalog, read_input};
use crate::cli::EvaluateArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use triage_engine::{EvaluationRequest, TriageEngine};

/// Execute the evaluate command.
pub fn execute_evaluate(args: EvaluateArgs, engine: &TriageEngine, formatter: &Formatter) -> Result<()> {
    let request = load_request(&args)?;
    let verdict = engine.evaluate(&request)?;

    println!("{}", formatter.format_verdict(&verdict)?);

    Ok(())
}

/// Build the request, applying command-line overrides
pub fn load_request(args: &EvaluateArgs) -> Result<EvaluationRequest> {
    let json_data = read_input(&args.input)?;
    if json_data.trim().is_empty() {
        return Err(CliError::InvalidInput("Evaluation request is empty".to_string()));
    }

    let mut request = EvaluationRequest::from_json(&json_data)?;

    if let Some(source) = read_catalog(args.catalog.as_deref())? {
        request = request.with_catalog_source(source);
    }
    if let Some(at) = args.at {
        request.evaluation_timestamp = at;
    }

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_overrides_applied() {
        let request = write_temp(
            r#"{"targetSignalSet": {"id": 9, "title": "Slow", "createdAt": 0}, "evaluationTimestamp": 10, "ruleCatalogSource": "ignored"}"#,
        );
        let catalog = write_temp("[sla]\ntolerance_days = 3\n");
        let args = EvaluateArgs {
            input: request.path().display().to_string(),
            catalog: Some(catalog.path().to_path_buf()),
            at: Some(500),
        };

        let loaded = load_request(&args).unwrap();
        assert_eq!(loaded.evaluation_timestamp, 500);
        assert_eq!(loaded.rule_catalog_source.as_deref(), Some("[sla]\ntolerance_days = 3\n"));
    }

    #[test]
    fn test_empty_request_rejected() {
        let request = write_temp("  \n");
        let args = EvaluateArgs {
            input: request.path().display().to_string(),
            catalog: None,
            at: None,
        };
        assert!(matches!(load_request(&args), Err(CliError::InvalidInput(_))));
    }
}
