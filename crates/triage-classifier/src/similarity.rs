//! Free-text similarity measures

use std::collections::BTreeSet;
use triage_domain::normalize::tokens;
use triage_domain::TextSimilarity;

/// Token-overlap (Jaccard) similarity
///
/// `|A ∩ B| / |A ∪ B|` over the lower-cased word tokens of each text. Two
/// texts without any tokens have similarity 0: absence of text is not
/// evidence that two symptoms agree.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenOverlap;

impl TextSimilarity for TokenOverlap {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        let a: BTreeSet<String> = tokens(a).into_iter().collect();
        let b: BTreeSet<String> = tokens(b).into_iter().collect();
        let union = a.union(&b).count();
        if union == 0 {
            return 0.0;
        }
        a.intersection(&b).count() as f64 / union as f64
    }

    fn name(&self) -> &'static str {
        "token overlap"
    }
}
