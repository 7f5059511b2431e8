//! Metrics collection for batch evaluation

use crate::BatchOutcome;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counters collected over one batch run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchMetrics {
    /// Targets with a Verdict
    pub completed: usize,

    /// Targets whose call failed
    pub failed: usize,

    /// Targets cut off by cancellation
    pub cancelled: usize,

    /// Reported criticality tiers
    pub criticality: BTreeMap<String, usize>,

    /// Reported SLA statuses
    pub sla: BTreeMap<String, usize>,

    /// Components left unevaluated
    pub unevaluated: BTreeMap<String, usize>,

    /// High and Medium matches across all Verdicts
    pub duplicate_matches: usize,

    /// Wall-clock time of the run in milliseconds
    pub elapsed_ms: u64,
}

impl BatchMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one target's outcome
    pub fn record(&mut self, outcome: &BatchOutcome) {
        match outcome {
            BatchOutcome::Completed(verdict) => {
                self.completed += 1;
                if let Some(tier) = verdict.criticality_tier {
                    *self.criticality.entry(tier.as_str().to_string()).or_insert(0) += 1;
                }
                if let Some(status) = verdict.sla_status {
                    *self.sla.entry(status.as_str().to_string()).or_insert(0) += 1;
                }
                for component in &verdict.unevaluated_components {
                    *self.unevaluated.entry(component.as_str().to_string()).or_insert(0) += 1;
                }
                self.duplicate_matches += verdict.duplicate_matches.len();
            }
            BatchOutcome::Failed { .. } => self.failed += 1,
            BatchOutcome::Cancelled { .. } => self.cancelled += 1,
        }
    }

    /// Total targets accounted for
    pub fn total(&self) -> usize {
        self.completed + self.failed + self.cancelled
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Batch Metrics Summary".to_string(),
            "=====================".to_string(),
            format!(
                "Targets: {} ({} completed, {} failed, {} cancelled)",
                self.total(),
                self.completed,
                self.failed,
                self.cancelled
            ),
            format!("Duplicate matches: {}", self.duplicate_matches),
            format!("Elapsed: {}ms", self.elapsed_ms),
        ];

        for (title, counts) in [
            ("Criticality", &self.criticality),
            ("SLA status", &self.sla),
            ("Unevaluated components", &self.unevaluated),
        ] {
            if !counts.is_empty() {
                lines.push(String::new());
                lines.push(format!("{}:", title));
                for (name, count) in counts {
                    lines.push(format!("  {}: {}", name, count));
                }
            }
        }

        lines.join("\n")
    }
}
