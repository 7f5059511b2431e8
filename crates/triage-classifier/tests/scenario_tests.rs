//! Scenario tests for the classifiers
//!
//! Each test builds realistic Signal Sets against a team catalog and checks
//! one classifier decision end to end.

use triage_catalog::RuleCatalog;
use triage_classifier::{AreaMatcher, CriticalityClassifier, DuplicateScorer, SlaEvaluator};
use triage_domain::signal::SECONDS_PER_DAY;
use triage_domain::{ConfidenceTier, CriticalityTier, Environment, SignalSet, SlaStatus};

const NOW: i64 = 1_726_000_000;

const TEAM_CATALOG: &str = r#"
[[areas]]
name = "debugger"
keywords = ["debugger", "breakpoint", "debug session"]
path_globs = ["**/debugger/**"]
owners = ["alice", "bob"]

[[areas]]
name = "editor"
keywords = ["completion", "highlighting", "caret"]
owners = ["carol"]
"#;

fn catalog() -> RuleCatalog {
    let catalog = RuleCatalog::load(Some(TEAM_CATALOG));
    assert!(catalog.warnings.is_empty());
    catalog
}

fn env() -> Environment {
    Environment::new(Some("Windows 11"), Some("JBR 21"), Some("2024.2.1"))
}

#[test]
fn test_sla_violation_after_ten_days() {
    let catalog = catalog();
    let issue = SignalSet::new(31, "Breakpoint skipped", "", NOW - 10 * SECONDS_PER_DAY);
    let outcome = SlaEvaluator::new(&catalog).evaluate(&issue, NOW).unwrap();
    assert_eq!(outcome.status, SlaStatus::Violation);
    assert_eq!(outcome.days_open, 10);
    assert!(outcome.rationale.contains("3 day(s) past 7-day tolerance"));
}

#[test]
fn test_sla_boundary_day_seven_to_eight() {
    let catalog = catalog();
    let evaluator = SlaEvaluator::new(&catalog);
    let issue = SignalSet::new(31, "Breakpoint skipped", "", NOW);

    let day7 = evaluator.evaluate(&issue, NOW + 7 * SECONDS_PER_DAY).unwrap();
    let day8 = evaluator.evaluate(&issue, NOW + 8 * SECONDS_PER_DAY).unwrap();
    assert_eq!(day7.status, SlaStatus::Warning);
    assert_eq!(day8.status, SlaStatus::Violation);
}

#[test]
fn test_duplicate_medium_signature_area_environment() {
    let catalog = catalog();
    let target = SignalSet::new(120, "Debugger stops responding", "", NOW)
        .with_error_signature("NullPointerException at X.Y()")
        .with_environment(env());
    let candidate = SignalSet::new(87, "Breakpoint dialog freezes", "", NOW)
        .with_error_signature("NullPointerException at X.Y()")
        .with_environment(env());

    let outcome = DuplicateScorer::new(&catalog).score(&target, &[candidate]);
    assert_eq!(outcome.duplicates.len(), 1);
    let m = &outcome.duplicates[0];
    assert_eq!(m.confidence_tier, ConfidenceTier::Medium);
    assert!((70..=89).contains(&m.confidence_score));
    assert_eq!(m.primary_match_reason, "identical error signature 'nullpointerexception at x.y()'");
}

#[test]
fn test_duplicate_high_with_cross_reference() {
    let catalog = catalog();
    let target = SignalSet::new(120, "Debugger stops responding", "Probably the same as #87", NOW)
        .with_error_signature("NullPointerException at X.Y()")
        .with_environment(env())
        .with_trigger("after resume from sleep")
        .with_cross_reference(87);
    let candidate = SignalSet::new(87, "Breakpoint dialog freezes", "", NOW)
        .with_error_signature("NullPointerException at X.Y()")
        .with_environment(env())
        .with_trigger("after resume from sleep");

    let outcome = DuplicateScorer::new(&catalog).score(&target, &[candidate]);
    let m = &outcome.duplicates[0];
    assert_eq!(m.confidence_tier, ConfidenceTier::High);
    assert!((90..=100).contains(&m.confidence_score));
    assert_eq!(
        m.supporting_reasons,
        vec!["same area", "same environment", "same trigger condition", "explicit cross-reference"]
    );
}

#[test]
fn test_connection_refused_with_two_supporting_is_low() {
    let catalog = catalog();
    let target = SignalSet::new(120, "Debugger cannot attach", "", NOW)
        .with_error_signature("java.net.ConnectException: Connection refused")
        .with_environment(env());
    let candidate = SignalSet::new(87, "Remote debug session fails", "", NOW)
        .with_error_signature("java.net.ConnectException: Connection refused")
        .with_environment(env());

    let outcome = DuplicateScorer::new(&catalog).score(&target, &[candidate]);
    assert!(outcome.duplicates.is_empty());
    assert_eq!(outcome.possibly_related.len(), 1);
    assert_eq!(outcome.possibly_related[0].confidence_tier, ConfidenceTier::Low);
    assert!((50..=69).contains(&outcome.possibly_related[0].confidence_score));
}

#[test]
fn test_area_tie_goes_to_first_area() {
    let catalog = catalog();
    let issue = SignalSet::new(5, "Breakpoint marker hides completion popup", "", NOW);
    let area = AreaMatcher::new(&catalog).best(&issue).unwrap();
    assert_eq!(area.name, "debugger");
    assert_eq!(area.owners, vec!["alice", "bob"]);
}

#[test]
fn test_blocking_reported_over_regression() {
    let catalog = catalog();
    let issue = SignalSet::new(5, "Debugger crash when stepping", "Worked in 2024.1", NOW)
        .with_environment(env());
    let outcome = CriticalityClassifier::new(&catalog).classify(&issue, &[]);
    assert_eq!(outcome.tier, CriticalityTier::Blocking);
    assert!(outcome.matched.contains(&CriticalityTier::Regression));
}
