//! Verdict Aggregator
//!
//! Runs each classifier in isolation and assembles their results into one
//! Verdict. The aggregator never re-decides anything a classifier reported;
//! it only merges, explains, and derives recommendations.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use triage_catalog::RuleCatalog;
use triage_classifier::{ClassifierError, CriticalityOutcome, DuplicateOutcome, SlaOutcome};
use triage_domain::normalize::normalize_label;
use triage_domain::{AreaMatch, Component, CriticalityTier, SignalSet, Verdict};

/// Result of one classifier, or why it has none
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentOutcome<T> {
    /// The classifier produced a result
    Evaluated(T),

    /// The classifier failed; the rest of the Verdict is unaffected
    Unevaluated {
        /// Failure description
        reason: String,
    },
}

impl<T> ComponentOutcome<T> {
    /// The result, if evaluated
    pub fn as_evaluated(&self) -> Option<&T> {
        match self {
            ComponentOutcome::Evaluated(value) => Some(value),
            ComponentOutcome::Unevaluated { .. } => None,
        }
    }

    /// Whether the classifier failed
    pub fn is_unevaluated(&self) -> bool {
        matches!(self, ComponentOutcome::Unevaluated { .. })
    }
}

/// Run one classifier, turning errors and panics into `Unevaluated`
pub fn isolate<T, F>(component: Component, run: F) -> ComponentOutcome<T>
where
    F: FnOnce() -> Result<T, ClassifierError>,
{
    match panic::catch_unwind(AssertUnwindSafe(run)) {
        Ok(Ok(value)) => ComponentOutcome::Evaluated(value),
        Ok(Err(e)) => {
            tracing::warn!("{} classifier unevaluated: {}", component, e);
            ComponentOutcome::Unevaluated { reason: e.to_string() }
        }
        Err(payload) => {
            let failure = ClassifierError::failure(component, panic_message(payload.as_ref()));
            tracing::warn!("{}", failure);
            ComponentOutcome::Unevaluated {
                reason: failure.to_string(),
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panicked".to_string()
    }
}

/// Outputs of the four classifiers for one issue
#[derive(Debug, Clone)]
pub struct ClassifierOutputs {
    /// Area Matcher
    pub area: ComponentOutcome<Option<AreaMatch>>,
    /// Criticality Classifier
    pub criticality: ComponentOutcome<CriticalityOutcome>,
    /// Duplicate Scorer
    pub duplicates: ComponentOutcome<DuplicateOutcome>,
    /// SLA Evaluator
    pub sla: ComponentOutcome<SlaOutcome>,
}

/// Assemble a Verdict from classifier outputs
pub fn assemble(
    target: &SignalSet,
    evaluation_time: i64,
    catalog: &RuleCatalog,
    outputs: ClassifierOutputs,
) -> Verdict {
    let mut unevaluated = Vec::new();

    let area_match = match outputs.area {
        ComponentOutcome::Evaluated(area) => area,
        ComponentOutcome::Unevaluated { .. } => {
            unevaluated.push(Component::Area);
            None
        }
    };

    let (criticality_tier, matched_tiers, criticality_rationale) = match outputs.criticality {
        ComponentOutcome::Evaluated(c) => (Some(c.tier), c.matched, c.rationale),
        ComponentOutcome::Unevaluated { reason } => {
            unevaluated.push(Component::Criticality);
            (None, Vec::new(), format!("Unevaluated: {}", reason))
        }
    };

    let (duplicate_matches, possibly_related, duplicates_rationale) = match outputs.duplicates {
        ComponentOutcome::Evaluated(d) => (d.duplicates, d.possibly_related, d.rationale),
        ComponentOutcome::Unevaluated { reason } => {
            unevaluated.push(Component::Duplicates);
            (Vec::new(), Vec::new(), format!("Unevaluated: {}", reason))
        }
    };

    let (sla_status, sla_days_open, sla_rationale) = match outputs.sla {
        ComponentOutcome::Evaluated(s) => (Some(s.status), Some(s.days_open), s.rationale),
        ComponentOutcome::Unevaluated { reason } => {
            unevaluated.push(Component::Sla);
            (None, None, format!("Unevaluated: {}", reason))
        }
    };

    let recommended_labels = recommend_labels(
        target,
        area_match.as_ref(),
        criticality_tier,
        !duplicate_matches.is_empty(),
    );
    let recommended_assignees = area_match
        .as_ref()
        .map(|a| a.owners.clone())
        .unwrap_or_default();

    Verdict {
        issue_id: target.id,
        evaluated_at: evaluation_time,
        criticality_tier,
        matched_tiers,
        criticality_rationale,
        duplicate_matches,
        possibly_related,
        duplicates_rationale,
        sla_status,
        sla_days_open,
        sla_rationale,
        area_match,
        recommended_labels,
        recommended_assignees,
        catalog_warnings: catalog.warnings.clone(),
        unevaluated_components: unevaluated,
    }
}

/// Labels worth adding: area, reported tier, `duplicate`; never ones present
fn recommend_labels(
    target: &SignalSet,
    area: Option<&AreaMatch>,
    tier: Option<CriticalityTier>,
    has_duplicates: bool,
) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    let mut push = |label: String| {
        if !label.is_empty() && !target.has_label(&label) && !labels.contains(&label) {
            labels.push(label);
        }
    };

    if let Some(area) = area {
        push(normalize_label(&area.name));
    }
    if let Some(tier) = tier.filter(|t| *t != CriticalityTier::None) {
        push(tier.as_str().to_string());
    }
    if has_duplicates {
        push("duplicate".to_string());
    }
    labels
}
