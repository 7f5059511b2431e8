//! SLA Evaluator
//!
//! A stateless state machine over labels, parent-link presence and elapsed
//! time. Nothing is persisted: the status is recomputed on every call.

use crate::ClassifierError;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use triage_catalog::{RuleCatalog, SlaRules};
use triage_domain::{SignalSet, SlaStatus};

/// `https://github.com/<owner>/<repo>/issues/<n>`
static ISSUE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)https?://(?:www\.)?github\.com/([\w.-]+)/([\w.-]+)/issues/(\d+)").unwrap()
});

/// An SLA criterion the issue does not meet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlaCriterion {
    /// No parent issue linked
    MissingParentLink,
    /// The forbidden label is still applied
    ForbiddenLabel(String),
}

impl fmt::Display for SlaCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlaCriterion::MissingParentLink => f.write_str("missing parent link"),
            SlaCriterion::ForbiddenLabel(label) => write!(f, "forbidden label '{}' present", label),
        }
    }
}

/// SLA decision for one issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlaOutcome {
    /// Status
    pub status: SlaStatus,

    /// Whole days since creation
    pub days_open: i64,

    /// Unmet criteria (empty for Good and Waiting)
    pub failed: Vec<SlaCriterion>,

    /// Human-readable explanation
    pub rationale: String,
}

/// Per-issue SLA evaluator
#[derive(Debug, Clone, Copy)]
pub struct SlaEvaluator<'a> {
    rules: &'a SlaRules,
}

impl<'a> SlaEvaluator<'a> {
    /// Create an evaluator from the catalog's SLA rules
    pub fn new(catalog: &'a RuleCatalog) -> Self {
        Self::with_rules(&catalog.sla)
    }

    /// Create an evaluator from explicit rules
    pub fn with_rules(rules: &'a SlaRules) -> Self {
        Self { rules }
    }

    /// Evaluate an issue at `evaluation_time` (Unix seconds, UTC)
    ///
    /// # Errors
    ///
    /// Returns `InvalidSignalSet` when the creation timestamp is negative, or
    /// when it is later than the evaluation time on an issue that is not
    /// waiting on its reporter.
    pub fn evaluate(
        &self,
        signals: &SignalSet,
        evaluation_time: i64,
    ) -> Result<SlaOutcome, ClassifierError> {
        signals.validate_created_at_sign()?;

        // Waiting is terminal: no clock checks follow it
        if let Some(label) = self.rules.waiting_labels.iter().find(|l| signals.has_label(l)) {
            let days_open = signals.days_open(evaluation_time);
            return Ok(SlaOutcome {
                status: SlaStatus::Waiting,
                days_open,
                failed: Vec::new(),
                rationale: format!(
                    "Waiting on reporter (label '{}'); SLA clock paused at {} day(s) open",
                    label, days_open
                ),
            });
        }

        signals.validate_created_at(evaluation_time)?;
        let days_open = signals.days_open(evaluation_time);

        let mut failed = Vec::new();
        if self.rules.required_parent_link && !self.has_parent(signals) {
            failed.push(SlaCriterion::MissingParentLink);
        }
        if let Some(forbidden) = self.rules.forbidden() {
            if signals.has_label(forbidden) {
                failed.push(SlaCriterion::ForbiddenLabel(forbidden.to_lowercase()));
            }
        }

        let tolerance = i64::from(self.rules.tolerance_days);
        let (status, rationale) = if failed.is_empty() {
            (
                SlaStatus::Good,
                format!("All SLA criteria met; {} day(s) open", days_open),
            )
        } else {
            let criteria = failed.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(" and ");
            if days_open <= tolerance {
                (
                    SlaStatus::Warning,
                    format!(
                        "{}; {} day(s) open, {} day(s) left of {}-day tolerance",
                        capitalize(&criteria),
                        days_open,
                        tolerance - days_open,
                        tolerance
                    ),
                )
            } else {
                (
                    SlaStatus::Violation,
                    format!(
                        "{}; {} day(s) open, {} day(s) past {}-day tolerance",
                        capitalize(&criteria),
                        days_open,
                        days_open - tolerance,
                        tolerance
                    ),
                )
            }
        };

        tracing::debug!("Issue {} SLA {}: {}", signals.id, status.as_str(), rationale);
        Ok(SlaOutcome {
            status,
            days_open,
            failed,
            rationale,
        })
    }

    /// Whether the issue has a parent, directly or via a body URL
    pub fn has_parent(&self, signals: &SignalSet) -> bool {
        signals.parent_link.is_some() || self.parent_url(signals).is_some()
    }

    /// First body URL pointing at an issue in a parent repository
    pub fn parent_url(&self, signals: &SignalSet) -> Option<String> {
        ISSUE_URL.captures_iter(&signals.body).find_map(|caps| {
            let repository = format!("{}/{}", &caps[1], &caps[2]);
            let own = signals
                .repository
                .as_deref()
                .is_some_and(|r| r.eq_ignore_ascii_case(&repository));
            let allowed = self.rules.parent_repositories.is_empty()
                || self
                    .rules
                    .parent_repositories
                    .iter()
                    .any(|r| r.trim().eq_ignore_ascii_case(&repository));
            (!own && allowed).then(|| caps[0].to_string())
        })
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_domain::signal::SECONDS_PER_DAY;

    const NOW: i64 = 1_700_000_000;

    fn days_ago(days: i64) -> i64 {
        NOW - days * SECONDS_PER_DAY
    }

    fn evaluate(signals: &SignalSet) -> SlaOutcome {
        let rules = SlaRules::default();
        SlaEvaluator::with_rules(&rules).evaluate(signals, NOW).unwrap()
    }

    #[test]
    fn test_waiting_label_stops_evaluation() {
        let signals = SignalSet::new(1, "t", "", days_ago(30)).with_labels(["Need More Info", "needs-triage"]);
        let outcome = evaluate(&signals);
        assert_eq!(outcome.status, SlaStatus::Waiting);
        assert!(outcome.failed.is_empty());
        assert_eq!(outcome.days_open, 30);
    }

    #[test]
    fn test_good_with_parent_link() {
        let signals = SignalSet::new(1, "t", "", days_ago(30)).with_parent_link("acme/platform", 12);
        assert_eq!(evaluate(&signals).status, SlaStatus::Good);
    }

    #[test]
    fn test_good_with_parent_url() {
        let signals = SignalSet::new(1, "t", "Tracked in https://github.com/acme/platform/issues/88", days_ago(1))
            .with_repository("acme/plugin");
        assert_eq!(evaluate(&signals).status, SlaStatus::Good);
    }

    #[test]
    fn test_same_repository_url_is_not_a_parent() {
        let signals = SignalSet::new(1, "t", "See https://github.com/acme/plugin/issues/3", days_ago(1))
            .with_repository("Acme/Plugin");
        let outcome = evaluate(&signals);
        assert_eq!(outcome.status, SlaStatus::Warning);
        assert_eq!(outcome.failed, vec![SlaCriterion::MissingParentLink]);
    }

    #[test]
    fn test_parent_repository_allow_list() {
        let rules = SlaRules {
            parent_repositories: vec!["acme/platform".to_string()],
            ..SlaRules::default()
        };
        let evaluator = SlaEvaluator::with_rules(&rules);
        let listed = SignalSet::new(1, "t", "https://github.com/ACME/platform/issues/1", 0);
        let unlisted = SignalSet::new(1, "t", "https://github.com/other/repo/issues/1", 0);
        assert!(evaluator.has_parent(&listed));
        assert!(!evaluator.has_parent(&unlisted));
    }

    #[test]
    fn test_forbidden_label_blocks_good() {
        let signals = SignalSet::new(1, "t", "", days_ago(2))
            .with_parent_link("acme/platform", 12)
            .with_labels(["needs-triage"]);
        let outcome = evaluate(&signals);
        assert_eq!(outcome.status, SlaStatus::Warning);
        assert!(outcome.rationale.starts_with("Forbidden label 'needs-triage' present"));
        assert!(outcome.rationale.contains("5 day(s) left"));
    }

    #[test]
    fn test_both_criteria_named() {
        let signals = SignalSet::new(1, "t", "", days_ago(9)).with_labels(["needs-triage"]);
        let outcome = evaluate(&signals);
        assert_eq!(outcome.status, SlaStatus::Violation);
        assert_eq!(outcome.failed.len(), 2);
        assert!(outcome.rationale.starts_with("Missing parent link and forbidden label"));
        assert!(outcome.rationale.contains("2 day(s) past"));
    }

    #[test]
    fn test_tolerance_boundary() {
        let signals = SignalSet::new(1, "t", "", days_ago(7));
        assert_eq!(evaluate(&signals).status, SlaStatus::Warning);
        let signals = SignalSet::new(1, "t", "", days_ago(8));
        assert_eq!(evaluate(&signals).status, SlaStatus::Violation);
    }

    #[test]
    fn test_parent_not_required() {
        let rules = SlaRules {
            required_parent_link: false,
            ..SlaRules::default()
        };
        let signals = SignalSet::new(1, "t", "", days_ago(40));
        let outcome = SlaEvaluator::with_rules(&rules).evaluate(&signals, NOW).unwrap();
        assert_eq!(outcome.status, SlaStatus::Good);
        assert_eq!(outcome.days_open, 40);
    }

    #[test]
    fn test_waiting_label_wins_over_future_timestamp() {
        let rules = SlaRules::default();
        let evaluator = SlaEvaluator::with_rules(&rules);
        let future = SignalSet::new(1, "t", "", NOW + 10).with_labels(["need more info"]);
        let outcome = evaluator.evaluate(&future, NOW).unwrap();
        assert_eq!(outcome.status, SlaStatus::Waiting);
        assert_eq!(outcome.days_open, 0);
    }

    #[test]
    fn test_invalid_timestamps() {
        let rules = SlaRules::default();
        let evaluator = SlaEvaluator::with_rules(&rules);
        let future = SignalSet::new(1, "t", "", NOW + 10);
        assert!(matches!(
            evaluator.evaluate(&future, NOW),
            Err(ClassifierError::InvalidSignalSet(_))
        ));
        let negative = SignalSet::new(1, "t", "", -1).with_labels(["need more info"]);
        assert!(matches!(
            evaluator.evaluate(&negative, NOW),
            Err(ClassifierError::InvalidSignalSet(_))
        ));
    }
}
