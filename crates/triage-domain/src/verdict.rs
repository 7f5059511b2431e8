//! Verdict module - the aggregated output record
//!
//! Field names serialize in camelCase and are part of the engine's stable
//! output contract.

use crate::{ConfidenceTier, CriticalityTier, IssueId, SlaStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A classifier whose output feeds the Verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    /// Criticality Classifier
    Criticality,
    /// Duplicate Scorer
    Duplicates,
    /// SLA Evaluator
    Sla,
    /// Area Matcher
    Area,
}

impl Component {
    /// Get the component name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Criticality => "criticality",
            Component::Duplicates => "duplicates",
            Component::Sla => "sla",
            Component::Area => "area",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One candidate the Duplicate Scorer kept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateMatch {
    /// Candidate issue
    pub candidate_id: IssueId,

    /// Confidence band
    pub confidence_tier: ConfidenceTier,

    /// Numeric score within the band
    pub confidence_score: u8,

    /// The Primary predicate that admitted the candidate
    pub primary_match_reason: String,

    /// Supporting predicates that held
    pub supporting_reasons: Vec<String>,
}

/// The catalog area an issue belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaMatch {
    /// Area name
    pub name: String,

    /// Area owners in catalog order
    pub owners: Vec<String>,

    /// Keyword plus path-glob hits
    pub score: usize,
}

/// The reportable triage record for one issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    /// Issue the verdict is about
    pub issue_id: IssueId,

    /// Evaluation timestamp (Unix seconds, UTC)
    pub evaluated_at: i64,

    /// Reported criticality tier (`None` when unevaluated)
    pub criticality_tier: Option<CriticalityTier>,

    /// Every tier whose predicate held, highest precedence first
    pub matched_tiers: Vec<CriticalityTier>,

    /// Why the criticality tier was chosen
    pub criticality_rationale: String,

    /// High and Medium matches, best first
    pub duplicate_matches: Vec<DuplicateMatch>,

    /// Low matches, best first
    pub possibly_related: Vec<DuplicateMatch>,

    /// Summary of duplicate scoring
    pub duplicates_rationale: String,

    /// SLA status (`None` when unevaluated)
    pub sla_status: Option<SlaStatus>,

    /// Whole days since creation
    pub sla_days_open: Option<i64>,

    /// Which SLA criteria failed and how much time remains
    pub sla_rationale: String,

    /// Matched catalog area
    pub area_match: Option<AreaMatch>,

    /// Labels worth applying, never ones already present
    pub recommended_labels: Vec<String>,

    /// Owners of the matched area
    pub recommended_assignees: Vec<String>,

    /// Degraded or fallback paths taken while loading the rule catalog
    pub catalog_warnings: Vec<String>,

    /// Components that failed and were left out
    pub unevaluated_components: Vec<Component>,
}

impl Verdict {
    /// Whether every component was evaluated
    pub fn is_complete(&self) -> bool {
        self.unevaluated_components.is_empty()
    }

    /// Whether a component was left out
    pub fn is_unevaluated(&self, component: Component) -> bool {
        self.unevaluated_components.contains(&component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Verdict {
        Verdict {
            issue_id: IssueId::new(5),
            evaluated_at: 1_700_000_000,
            criticality_tier: Some(CriticalityTier::Hot),
            matched_tiers: vec![CriticalityTier::Hot],
            criticality_rationale: "hot".to_string(),
            duplicate_matches: vec![],
            possibly_related: vec![],
            duplicates_rationale: String::new(),
            sla_status: None,
            sla_days_open: None,
            sla_rationale: "unevaluated".to_string(),
            area_match: None,
            recommended_labels: vec![],
            recommended_assignees: vec![],
            catalog_warnings: vec![],
            unevaluated_components: vec![Component::Sla],
        }
    }

    #[test]
    fn test_stable_field_names() {
        let value = serde_json::to_value(sample()).unwrap();
        for field in [
            "criticalityTier",
            "criticalityRationale",
            "duplicateMatches",
            "possiblyRelated",
            "slaStatus",
            "slaDaysOpen",
            "slaRationale",
            "areaMatch",
            "unevaluatedComponents",
        ] {
            assert!(value.get(field).is_some(), "missing field {}", field);
        }
        assert_eq!(value["unevaluatedComponents"][0], "sla");
        assert!(value["slaStatus"].is_null());
    }

    #[test]
    fn test_completeness() {
        let verdict = sample();
        assert!(!verdict.is_complete());
        assert!(verdict.is_unevaluated(Component::Sla));
        assert!(!verdict.is_unevaluated(Component::Area));
    }
}
