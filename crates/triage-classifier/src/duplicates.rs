//! Duplicate Scorer
//!
//! Compares a target issue against each candidate in the pool. A candidate
//! is considered only when a Primary predicate holds (same error signature,
//! same stack signature, or aligned reproduction steps); Supporting
//! predicates then place it in a confidence band.
//!
//! | Evidence                                   | Band   |
//! |--------------------------------------------|--------|
//! | Primary and (3+ Supporting or cross-ref)   | High   |
//! | Primary and exactly 2 Supporting           | Medium |
//! | Primary and exactly 1 Supporting           | Low    |
//! | Primary only                               | none   |
//!
//! A match resting only on generic error messages drops one band unless it
//! has at least 3 Supporting hits.

use crate::area::AreaMatcher;
use crate::similarity::TokenOverlap;
use std::collections::BTreeSet;
use std::fmt;
use triage_catalog::{DuplicateThresholds, RuleCatalog};
use triage_domain::normalize::action_keyword;
use triage_domain::{ConfidenceTier, DuplicateMatch, IssueId, SignalSet, TextSimilarity};

static DEFAULT_SIMILARITY: TokenOverlap = TokenOverlap;

/// Supporting hits that lift a generic-error match out of the downgrade
const GENERIC_MIN_SUPPORTING: usize = 3;

/// Strong duplicate-indicating evidence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryMatch {
    /// An identical normalized error signature
    ErrorSignature(String),

    /// The same leading stack frames
    StackSignature,

    /// Reproduction steps align in count and action keywords
    ReproSteps,
}

impl fmt::Display for PrimaryMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimaryMatch::ErrorSignature(sig) => write!(f, "identical error signature '{}'", sig),
            PrimaryMatch::StackSignature => f.write_str("matching stack signature"),
            PrimaryMatch::ReproSteps => f.write_str("matching reproduction steps"),
        }
    }
}

/// Corroborating evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SupportingMatch {
    /// Both issues map to the same catalog area
    SameArea,
    /// Equal, non-empty environment tuples
    SameEnvironment,
    /// Symptom texts are similar enough
    SameSymptom,
    /// Trigger conditions are similar enough
    SameTrigger,
    /// One issue references the other
    CrossReference,
}

impl SupportingMatch {
    /// Short description for rationale text
    pub fn as_str(&self) -> &'static str {
        match self {
            SupportingMatch::SameArea => "same area",
            SupportingMatch::SameEnvironment => "same environment",
            SupportingMatch::SameSymptom => "same symptom",
            SupportingMatch::SameTrigger => "same trigger condition",
            SupportingMatch::CrossReference => "explicit cross-reference",
        }
    }
}

/// Every Primary predicate that holds between two issues
///
/// Each predicate is commutative, so `primary_matches(a, b)` and
/// `primary_matches(b, a)` hold the same predicates.
pub fn primary_matches(a: &SignalSet, b: &SignalSet) -> Vec<PrimaryMatch> {
    let mut matches: Vec<PrimaryMatch> = a
        .error_signatures
        .iter()
        .filter(|sig| b.error_signatures.contains(sig))
        .map(|sig| PrimaryMatch::ErrorSignature(sig.clone()))
        .collect();

    if same_stack(a, b) {
        matches.push(PrimaryMatch::StackSignature);
    }
    if same_steps(a, b) {
        matches.push(PrimaryMatch::ReproSteps);
    }
    matches
}

fn same_stack(a: &SignalSet, b: &SignalSet) -> bool {
    !a.stack_frames.is_empty()
        && a.stack_frames.len() == b.stack_frames.len()
        && a.stack_frames.iter().zip(&b.stack_frames).all(|(x, y)| x.same_as(y))
}

fn same_steps(a: &SignalSet, b: &SignalSet) -> bool {
    !a.repro_steps.is_empty()
        && a.repro_steps.len() == b.repro_steps.len()
        && a.repro_steps
            .iter()
            .zip(&b.repro_steps)
            .all(|(x, y)| action_keyword(x) == action_keyword(y))
}

/// Why a candidate did not make either output list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discarded {
    /// No Primary predicate held
    NoPrimary,
    /// A Primary predicate held but nothing supported it
    NoSupporting,
    /// A Low match on generic errors only, downgraded out of the bands
    GenericDowngrade,
}

/// Duplicate scoring result for one target
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateOutcome {
    /// High and Medium matches, best first
    pub duplicates: Vec<DuplicateMatch>,

    /// Low matches, best first
    pub possibly_related: Vec<DuplicateMatch>,

    /// Candidates dropped after comparison
    pub discarded: Vec<(IssueId, Discarded)>,

    /// Candidates not compared (invalid id, the target itself, repeats)
    pub skipped: usize,

    /// Human-readable summary
    pub rationale: String,
}

/// Primary/Supporting evidence scorer
pub struct DuplicateScorer<'a> {
    thresholds: &'a DuplicateThresholds,
    areas: AreaMatcher<'a>,
    similarity: &'a dyn TextSimilarity,
}

impl<'a> DuplicateScorer<'a> {
    /// Create a scorer using the catalog's thresholds and areas
    pub fn new(catalog: &'a RuleCatalog) -> Self {
        Self {
            thresholds: &catalog.duplicates,
            areas: AreaMatcher::new(catalog),
            similarity: &DEFAULT_SIMILARITY,
        }
    }

    /// Use a different symptom/trigger similarity measure
    pub fn with_similarity(mut self, similarity: &'a dyn TextSimilarity) -> Self {
        self.similarity = similarity;
        self
    }

    /// Score every candidate in the pool against the target
    pub fn score(&self, target: &SignalSet, pool: &[SignalSet]) -> DuplicateOutcome {
        let target_area = self.areas.best(target).map(|a| a.name);
        let mut seen: BTreeSet<IssueId> = BTreeSet::new();
        let mut skipped = 0;
        let mut kept = Vec::new();
        let mut discarded = Vec::new();

        for candidate in pool {
            if !candidate.id.is_valid() || candidate.id == target.id || !seen.insert(candidate.id) {
                skipped += 1;
                continue;
            }
            match self.compare(target, target_area.as_deref(), candidate) {
                Ok(m) => kept.push(m),
                Err(reason) => discarded.push((candidate.id, reason)),
            }
        }

        kept.sort_by(|a, b| {
            b.confidence_score
                .cmp(&a.confidence_score)
                .then_with(|| a.candidate_id.cmp(&b.candidate_id))
        });
        let (duplicates, possibly_related): (Vec<_>, Vec<_>) =
            kept.into_iter().partition(|m| m.confidence_tier.is_duplicate());

        tracing::debug!(
            "Issue {}: {} duplicate(s), {} possibly related, {} discarded, {} skipped",
            target.id,
            duplicates.len(),
            possibly_related.len(),
            discarded.len(),
            skipped
        );

        let rationale = render_rationale(
            pool.len(),
            &duplicates,
            &possibly_related,
            &discarded,
            skipped,
        );
        DuplicateOutcome {
            duplicates,
            possibly_related,
            discarded,
            skipped,
            rationale,
        }
    }

    /// Supporting predicates that hold between target and candidate
    pub fn supporting_matches(
        &self,
        target: &SignalSet,
        target_area: Option<&str>,
        candidate: &SignalSet,
    ) -> Vec<SupportingMatch> {
        let mut hits = Vec::new();

        if let Some(area) = target_area {
            if self.areas.best(candidate).is_some_and(|a| a.name == area) {
                hits.push(SupportingMatch::SameArea);
            }
        }

        if !target.environment.is_empty()
            && target.environment.tuple() == candidate.environment.tuple()
        {
            hits.push(SupportingMatch::SameEnvironment);
        }

        let symptom = self
            .similarity
            .similarity(target.symptom_text(), candidate.symptom_text());
        if symptom >= self.thresholds.symptom_similarity && symptom > 0.0 {
            hits.push(SupportingMatch::SameSymptom);
        }

        if let (Some(a), Some(b)) = (target.trigger.as_deref(), candidate.trigger.as_deref()) {
            let trigger = self.similarity.similarity(a, b);
            if trigger >= self.thresholds.trigger_similarity && trigger > 0.0 {
                hits.push(SupportingMatch::SameTrigger);
            }
        }

        if target.references(candidate.id) || candidate.references(target.id) {
            hits.push(SupportingMatch::CrossReference);
        }

        hits
    }

    fn compare(
        &self,
        target: &SignalSet,
        target_area: Option<&str>,
        candidate: &SignalSet,
    ) -> Result<DuplicateMatch, Discarded> {
        let primary = primary_matches(target, candidate);
        let Some(first) = primary.first() else {
            return Err(Discarded::NoPrimary);
        };

        let supporting = self.supporting_matches(target, target_area, candidate);
        let cross_reference = supporting.contains(&SupportingMatch::CrossReference);

        let band = if cross_reference || supporting.len() >= 3 {
            ConfidenceTier::High
        } else if supporting.len() == 2 {
            ConfidenceTier::Medium
        } else if supporting.len() == 1 {
            ConfidenceTier::Low
        } else {
            return Err(Discarded::NoSupporting);
        };

        let band = if self.generic_only(&primary) && supporting.len() < GENERIC_MIN_SUPPORTING {
            tracing::debug!(
                "Candidate {} downgraded from {}: generic error only",
                candidate.id,
                band.as_str()
            );
            band.downgrade().ok_or(Discarded::GenericDowngrade)?
        } else {
            band
        };

        let (floor, ceiling) = self.thresholds.band(band);
        let span = usize::from(ceiling.saturating_sub(floor));
        let evidence = 5 * (primary.len() - 1) + 3 * supporting.len() + if cross_reference { 4 } else { 0 };
        // span fits in u8, so the narrowed bonus does too
        let bonus = u8::try_from(evidence.min(span)).unwrap_or(u8::MAX);

        Ok(DuplicateMatch {
            candidate_id: candidate.id,
            confidence_tier: band,
            confidence_score: floor.saturating_add(bonus),
            primary_match_reason: first.to_string(),
            supporting_reasons: supporting.iter().map(|s| s.as_str().to_string()).collect(),
        })
    }

    fn generic_only(&self, primary: &[PrimaryMatch]) -> bool {
        primary.iter().all(|p| match p {
            PrimaryMatch::ErrorSignature(sig) => self.thresholds.is_generic(sig),
            _ => false,
        })
    }
}

fn render_rationale(
    compared: usize,
    duplicates: &[DuplicateMatch],
    possibly_related: &[DuplicateMatch],
    discarded: &[(IssueId, Discarded)],
    skipped: usize,
) -> String {
    let mut text = format!(
        "Compared {} candidate(s): {} duplicate(s), {} possibly related",
        compared,
        duplicates.len(),
        possibly_related.len()
    );

    let no_primary = discarded.iter().filter(|(_, d)| *d == Discarded::NoPrimary).count();
    if no_primary > 0 {
        text.push_str(&format!("; {} without a primary match", no_primary));
    }
    for (id, reason) in discarded {
        match reason {
            Discarded::NoSupporting => {
                text.push_str(&format!("; {} discarded: primary match without supporting evidence", id))
            }
            Discarded::GenericDowngrade => {
                text.push_str(&format!("; {} discarded: generic error with too little support", id))
            }
            Discarded::NoPrimary => {}
        }
    }
    if skipped > 0 {
        text.push_str(&format!("; {} skipped (invalid id, the issue itself, or repeated)", skipped));
    }
    text
}
