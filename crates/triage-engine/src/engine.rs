//! Single-call evaluation entry point

use crate::aggregator::{self, ClassifierOutputs};
use crate::{EngineError, EvaluationRequest};
use std::sync::Arc;
use triage_catalog::{CatalogCache, RuleCatalog};
use triage_classifier::{
    AreaMatcher, CriticalityClassifier, DuplicateScorer, SlaEvaluator, TokenOverlap,
};
use triage_domain::{Component, SignalError, SignalSet, TextSimilarity, Verdict};

/// Shared similarity measure handed to the classifiers
pub type SharedSimilarity = Arc<dyn TextSimilarity + Send + Sync>;

/// The triage decision engine
///
/// Holds no per-issue state; the only thing kept between calls is the
/// cached Rule Catalog.
///
/// # Examples
///
/// ```
/// use triage_domain::{SignalSet, SlaStatus};
/// use triage_engine::{EvaluationRequest, TriageEngine};
///
/// let engine = TriageEngine::new();
/// let issue = SignalSet::new(42, "Crash on save", "", 0).with_labels(["need more info"]);
/// let verdict = engine.evaluate(&EvaluationRequest::new(issue, 86_400)).unwrap();
///
/// assert_eq!(verdict.sla_status, Some(SlaStatus::Waiting));
/// assert!(verdict.is_complete());
/// ```
pub struct TriageEngine {
    cache: CatalogCache,
    similarity: SharedSimilarity,
}

impl Default for TriageEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TriageEngine {
    /// Create an engine with token-overlap similarity
    pub fn new() -> Self {
        Self {
            cache: CatalogCache::new(),
            similarity: Arc::new(TokenOverlap),
        }
    }

    /// Use a different symptom/trigger similarity measure
    pub fn with_similarity(mut self, similarity: SharedSimilarity) -> Self {
        self.similarity = similarity;
        self
    }

    /// The catalog for a source text, loaded through the cache
    pub fn catalog(&self, source: Option<&str>) -> Arc<RuleCatalog> {
        self.cache.get_or_load(source)
    }

    /// Catalog cache statistics and control
    pub fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    /// Evaluate one request
    ///
    /// # Errors
    ///
    /// Returns `InvalidSignalSet` when the target id is 0 or the evaluation
    /// timestamp is negative. Classifier failures never fail the call.
    pub fn evaluate(&self, request: &EvaluationRequest) -> Result<Verdict, EngineError> {
        let catalog = self.catalog(request.rule_catalog_source.as_deref());
        self.evaluate_with_catalog(
            &catalog,
            &request.target_signal_set,
            &request.candidate_pool,
            request.evaluation_timestamp,
        )
    }

    /// Evaluate one target against an already-loaded catalog
    pub fn evaluate_with_catalog(
        &self,
        catalog: &RuleCatalog,
        target: &SignalSet,
        pool: &[SignalSet],
        evaluation_time: i64,
    ) -> Result<Verdict, EngineError> {
        target.validate_identity()?;
        if evaluation_time < 0 {
            return Err(SignalError::invalid(
                target.id,
                format!("evaluation timestamp {} is negative", evaluation_time),
            )
            .into());
        }

        tracing::debug!(
            "Evaluating issue {} against {} candidate(s)",
            target.id,
            pool.len()
        );

        let similarity: &dyn TextSimilarity = self.similarity.as_ref();
        let outputs = ClassifierOutputs {
            area: aggregator::isolate(Component::Area, || {
                Ok(AreaMatcher::new(catalog).best(target))
            }),
            criticality: aggregator::isolate(Component::Criticality, || {
                Ok(CriticalityClassifier::new(catalog)
                    .with_similarity(similarity)
                    .classify(target, pool))
            }),
            duplicates: aggregator::isolate(Component::Duplicates, || {
                Ok(DuplicateScorer::new(catalog)
                    .with_similarity(similarity)
                    .score(target, pool))
            }),
            sla: aggregator::isolate(Component::Sla, || {
                SlaEvaluator::new(catalog).evaluate(target, evaluation_time)
            }),
        };

        let verdict = aggregator::assemble(target, evaluation_time, catalog, outputs);
        if !verdict.is_complete() {
            tracing::warn!(
                "Issue {} verdict is partial: {:?} unevaluated",
                target.id,
                verdict.unevaluated_components
            );
        }
        Ok(verdict)
    }

    /// Evaluate a JSON request and return the Verdict as JSON
    pub fn evaluate_json(&self, request: &str) -> Result<String, EngineError> {
        let request = EvaluationRequest::from_json(request)?;
        let verdict = self.evaluate(&request)?;
        Ok(serde_json::to_string(&verdict)?)
    }
}
