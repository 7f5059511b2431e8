//! Criticality Classifier
//!
//! Applies the Hot, Blocking and Regression predicates to a target issue
//! and reports the highest-precedence tier that holds. Every predicate is
//! evaluated, so the rationale can list all matched tiers.

use crate::similarity::TokenOverlap;
use regex::Regex;
use std::sync::LazyLock;
use triage_catalog::{CriticalityRules, RuleCatalog};
use triage_domain::normalize::{normalize_label, normalize_version};
use triage_domain::{CriticalityTier, SignalSet, TextSimilarity};

static DEFAULT_SIMILARITY: TokenOverlap = TokenOverlap;

/// "Previously worked" phrases, each followed by a `RELEASE` unless it names none
static VERSION_PHRASES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bwork(?:ed|ing)\s+(?:fine\s+|correctly\s+)?(?:in|on|with)\s+",
        r"(?i)\bbroke(?:n)?\s+in\s+",
        r"(?i)\bsince\s+",
        r"(?i)\bafter\s+(?:upgrading|updating)\s+from\s+",
        r"(?i)\bregression\s+from\s+",
    ]
    .iter()
    .map(|lead| Regex::new(&format!("{}{}", lead, RELEASE)).unwrap())
    .chain(std::iter::once(Regex::new(r"(?i)\bused\s+to\s+work").unwrap()))
    .collect()
});

/// A release: `version N`/`vN` (group 1) or a bare dotted number (group 2).
/// A bare integer ("since 2 days") is not a release.
const RELEASE: &str = r"(?:(?:version\s+v?|v)(\d[\w.\-]*\w|\d)|(\d+\.\d(?:[\w.\-]*\w)?))";

/// Negation just before a phrase ("no workaround", "without a workaround")
static NEGATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:no|not|without|never)(?:\s+(?:a|an|any|known|real|good))*\s*$").unwrap()
});

/// Outcome of one predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateResult {
    /// Tier the predicate grants
    pub tier: CriticalityTier,

    /// Whether the predicate holds
    pub held: bool,

    /// What satisfied it, or the first condition that failed
    pub detail: String,
}

impl PredicateResult {
    fn held(tier: CriticalityTier, detail: String) -> Self {
        Self {
            tier,
            held: true,
            detail,
        }
    }

    fn failed(tier: CriticalityTier, detail: String) -> Self {
        Self {
            tier,
            held: false,
            detail,
        }
    }
}

/// Criticality decision for one issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriticalityOutcome {
    /// Reported tier
    pub tier: CriticalityTier,

    /// Tiers whose predicate held, highest precedence first
    pub matched: Vec<CriticalityTier>,

    /// Per-predicate results in precedence order
    pub predicates: Vec<PredicateResult>,

    /// Human-readable explanation
    pub rationale: String,
}

/// Hot / Blocking / Regression classifier
pub struct CriticalityClassifier<'a> {
    rules: &'a CriticalityRules,
    symptom_threshold: f64,
    similarity: &'a dyn TextSimilarity,
}

impl<'a> CriticalityClassifier<'a> {
    /// Create a classifier using the catalog's rules and token-overlap similarity
    pub fn new(catalog: &'a RuleCatalog) -> Self {
        Self {
            rules: &catalog.criticality,
            symptom_threshold: catalog.duplicates.symptom_similarity,
            similarity: &DEFAULT_SIMILARITY,
        }
    }

    /// Use a different symptom similarity measure
    pub fn with_similarity(mut self, similarity: &'a dyn TextSimilarity) -> Self {
        self.similarity = similarity;
        self
    }

    /// Classify a target issue against a candidate pool
    pub fn classify(&self, target: &SignalSet, pool: &[SignalSet]) -> CriticalityOutcome {
        let mut predicates = vec![
            self.blocking(target),
            self.regression(target),
            self.hot(target, pool),
        ];
        predicates.sort_by(|a, b| b.tier.compare_precedence(&a.tier));

        let matched: Vec<CriticalityTier> =
            predicates.iter().filter(|p| p.held).map(|p| p.tier).collect();
        let tier = CriticalityTier::highest(matched.iter().copied());

        for p in &predicates {
            tracing::debug!(
                "Issue {} {}: {} ({})",
                target.id,
                p.tier.as_str(),
                if p.held { "held" } else { "not held" },
                p.detail
            );
        }

        let rationale = render_rationale(tier, &matched, &predicates);
        CriticalityOutcome {
            tier,
            matched,
            predicates,
            rationale,
        }
    }

    /// Candidates sharing an error signature or reproduction key with the target
    pub fn similar_issues<'p>(&self, target: &SignalSet, pool: &'p [SignalSet]) -> Vec<&'p SignalSet> {
        let target_key = target.repro_key();
        pool.iter()
            .filter(|c| c.id != target.id)
            .filter(|c| {
                let shares_signature = c
                    .error_signatures
                    .iter()
                    .any(|s| target.error_signatures.contains(s));
                let shares_steps = target_key.is_some() && c.repro_key() == target_key;
                shares_signature || shares_steps
            })
            .collect()
    }

    fn hot(&self, target: &SignalSet, pool: &[SignalSet]) -> PredicateResult {
        let tier = CriticalityTier::Hot;
        let similar = self.similar_issues(target, pool);
        let matching_symptom = similar
            .iter()
            .filter(|c| {
                self.similarity.similarity(target.symptom_text(), c.symptom_text())
                    >= self.symptom_threshold
            })
            .count();

        if matching_symptom < self.rules.hot_min_similar {
            return PredicateResult::failed(
                tier,
                format!(
                    "{} similar issue(s) with matching symptom, needs {}",
                    matching_symptom, self.rules.hot_min_similar
                ),
            );
        }

        // With the default thresholds the comment floor below implies this
        // one; a catalog may raise it above `hot_min_human_comments + 1`.
        let human_comments = target.human_comment_count();
        let engagement = target
            .thumbs_up()
            .saturating_add(u32::try_from(human_comments).unwrap_or(u32::MAX));
        if engagement < self.rules.hot_min_engagement {
            return PredicateResult::failed(
                tier,
                format!(
                    "engagement {} (thumbs-up + comments), needs {}",
                    engagement, self.rules.hot_min_engagement
                ),
            );
        }

        if human_comments <= self.rules.hot_min_human_comments {
            return PredicateResult::failed(
                tier,
                format!(
                    "{} non-bot comment(s), needs more than {}",
                    human_comments, self.rules.hot_min_human_comments
                ),
            );
        }

        PredicateResult::held(
            tier,
            format!(
                "{} similar issues with matching symptom, engagement {}, {} non-bot comments",
                matching_symptom, engagement, human_comments
            ),
        )
    }

    fn blocking(&self, target: &SignalSet) -> PredicateResult {
        let tier = CriticalityTier::Blocking;
        let text = target.searchable_text();

        let core = self
            .rules
            .core_labels
            .iter()
            .find(|l| target.has_label(l))
            .map(|l| format!("label '{}'", normalize_label(l)))
            .or_else(|| {
                self.rules
                    .core_keywords
                    .iter()
                    .map(|k| normalize_label(k))
                    .find(|k| !k.is_empty() && text.contains(k.as_str()))
                    .map(|k| format!("keyword '{}'", k))
            });

        let Some(core) = core else {
            return PredicateResult::failed(tier, "no core-function label or keyword".to_string());
        };

        let workaround = self
            .rules
            .workaround_labels
            .iter()
            .find(|l| target.has_label(l))
            .map(|l| format!("label '{}'", normalize_label(l)))
            .or_else(|| {
                self.rules
                    .workaround_keywords
                    .iter()
                    .map(|k| normalize_label(k))
                    .find(|k| mentions_affirmatively(&text, k))
                    .map(|k| format!("keyword '{}'", k))
            });

        match workaround {
            Some(w) => PredicateResult::failed(tier, format!("{} present but workaround {} found", core, w)),
            None => PredicateResult::held(tier, format!("core function {} with no workaround", core)),
        }
    }

    fn regression(&self, target: &SignalSet) -> PredicateResult {
        let tier = CriticalityTier::Regression;

        let labelled = self.rules.regression_labels.iter().find(|l| target.has_label(l));
        let (phrase, captured) = find_version_phrase(&target.body);

        let marker = match (labelled, phrase) {
            (Some(l), _) => format!("label '{}'", normalize_label(l)),
            (None, Some(p)) => format!("phrase '{}'", p),
            (None, None) => {
                return PredicateResult::failed(tier, "no previously-worked marker".to_string());
            }
        };

        let prior = target
            .last_working_version
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .map(str::to_string)
            .or(captured);
        let Some(prior) = prior else {
            return PredicateResult::failed(tier, format!("{} but no prior release identified", marker));
        };

        let Some(current) = target.environment.version.as_deref().filter(|v| !v.trim().is_empty())
        else {
            return PredicateResult::failed(tier, format!("{} but current release unknown", marker));
        };

        if normalize_version(&prior) == normalize_version(current) {
            return PredicateResult::failed(
                tier,
                format!("{} but prior release {} equals current", marker, prior.trim()),
            );
        }

        PredicateResult::held(
            tier,
            format!("{}: worked in {}, failing in {}", marker, prior.trim(), current.trim()),
        )
    }
}

/// First "previously worked" phrase in a body and the release it names
pub fn find_version_phrase(body: &str) -> (Option<String>, Option<String>) {
    for regex in VERSION_PHRASES.iter() {
        if let Some(caps) = regex.captures(body) {
            let phrase = caps.get(0).map(|m| m.as_str().to_lowercase());
            let version = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str().to_string());
            return (phrase, version);
        }
    }
    (None, None)
}

/// Whether `phrase` occurs in `text` at least once without a preceding negation
fn mentions_affirmatively(text: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    text.match_indices(phrase).any(|(start, _)| {
        let window_start = text[..start]
            .char_indices()
            .rev()
            .nth(24)
            .map(|(i, _)| i)
            .unwrap_or(0);
        !NEGATION.is_match(&text[window_start..start])
    })
}

fn render_rationale(
    tier: CriticalityTier,
    matched: &[CriticalityTier],
    predicates: &[PredicateResult],
) -> String {
    let mut parts = Vec::with_capacity(predicates.len() + 1);
    if matched.is_empty() {
        parts.push("No criticality predicate held".to_string());
    } else {
        let names: Vec<&str> = matched.iter().map(|t| t.as_str()).collect();
        parts.push(format!("Reported {} (matched: {})", tier.as_str(), names.join(", ")));
    }
    for p in predicates {
        parts.push(format!("{}: {}", p.tier.as_str(), p.detail));
    }
    parts.join("; ")
}
