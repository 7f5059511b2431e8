//! Trait definitions for pluggable collaborators
//!
//! The engine fixes the decision rules but leaves free-text comparison open;
//! implementations live in the classifier crate.

/// Similarity measure over free-text signals (symptom, trigger condition)
///
/// Implementations must be symmetric and return a value in `[0.0, 1.0]`.
pub trait TextSimilarity {
    /// Similarity of `a` and `b`
    fn similarity(&self, a: &str, b: &str) -> f64;

    /// Short name used in rationale text
    fn name(&self) -> &'static str;
}
