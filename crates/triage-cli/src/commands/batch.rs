//! Batch command implementation.

use super::{read_catalog, read_input};
use crate::cli::BatchArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::sync::Arc;
use triage_engine::{BatchEvaluator, BatchRequest, TriageEngine};

/// Execute the batch command.
pub async fn execute_batch(args: BatchArgs, engine: Arc<TriageEngine>, formatter: &Formatter) -> Result<()> {
    let request = load_batch(&args)?;

    let evaluator = BatchEvaluator::new(engine).with_concurrency(args.concurrency);
    let report = evaluator.run_until_ctrl_c(request).await;

    println!("{}", formatter.format_batch(&report)?);

    if report.metrics.cancelled > 0 {
        eprintln!(
            "{}",
            formatter.warning(&format!("{} target(s) cancelled", report.metrics.cancelled))
        );
    }

    Ok(())
}

/// Build the batch request, applying command-line overrides
pub fn load_batch(args: &BatchArgs) -> Result<BatchRequest> {
    let json_data = read_input(&args.input)?;
    let mut request = BatchRequest::from_json(&json_data)?;

    if request.targets.is_empty() {
        return Err(CliError::InvalidInput("No targets provided".to_string()));
    }
    if let Some(source) = read_catalog(args.catalog.as_deref())? {
        request.rule_catalog_source = Some(source);
    }

    Ok(request)
}
