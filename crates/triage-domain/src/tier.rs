//! Tier module - the classification scales a Verdict reports on

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Criticality of an issue
///
/// An issue may satisfy several criticality predicates at once; only the
/// highest-precedence one is reported. Precedence is an explicit total order
/// (Blocking > Regression > Hot > None) exposed through
/// [`CriticalityTier::compare_precedence`], not the declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriticalityTier {
    /// No criticality predicate holds
    None,

    /// Widely reported and actively discussed
    Hot,

    /// Blocks a core function with no workaround
    Blocking,

    /// Worked in a prior release
    Regression,
}

impl CriticalityTier {
    /// Every tier, highest precedence first
    pub const BY_PRECEDENCE: [CriticalityTier; 4] = [
        CriticalityTier::Blocking,
        CriticalityTier::Regression,
        CriticalityTier::Hot,
        CriticalityTier::None,
    ];

    /// Numeric precedence rank (higher wins)
    pub fn precedence(&self) -> u8 {
        match self {
            CriticalityTier::Blocking => 3,
            CriticalityTier::Regression => 2,
            CriticalityTier::Hot => 1,
            CriticalityTier::None => 0,
        }
    }

    /// Compare two tiers by reporting precedence
    pub fn compare_precedence(&self, other: &CriticalityTier) -> Ordering {
        self.precedence().cmp(&other.precedence())
    }

    /// The tier to report among a set of matched tiers
    pub fn highest<I>(tiers: I) -> CriticalityTier
    where
        I: IntoIterator<Item = CriticalityTier>,
    {
        tiers
            .into_iter()
            .max_by(|a, b| a.compare_precedence(b))
            .unwrap_or(CriticalityTier::None)
    }

    /// Get the tier name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            CriticalityTier::None => "none",
            CriticalityTier::Hot => "hot",
            CriticalityTier::Blocking => "blocking",
            CriticalityTier::Regression => "regression",
        }
    }
}

/// Confidence that a candidate is a duplicate of the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    /// Possibly related; never recommended as a duplicate
    Low,

    /// Probable duplicate
    Medium,

    /// Near-certain duplicate
    High,
}

impl ConfidenceTier {
    /// The next band down, `None` below Low
    pub fn downgrade(&self) -> Option<ConfidenceTier> {
        match self {
            ConfidenceTier::High => Some(ConfidenceTier::Medium),
            ConfidenceTier::Medium => Some(ConfidenceTier::Low),
            ConfidenceTier::Low => None,
        }
    }

    /// Whether matches in this band go on the duplicate recommendation list
    pub fn is_duplicate(&self) -> bool {
        matches!(self, ConfidenceTier::High | ConfidenceTier::Medium)
    }

    /// Get the tier name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::Low => "low",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::High => "high",
        }
    }
}

/// SLA compliance of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlaStatus {
    /// Waiting on the reporter; the clock is not checked
    Waiting,

    /// All SLA criteria are met
    Good,

    /// A criterion is unmet but still within the tolerance period
    Warning,

    /// A criterion is unmet past the tolerance period
    Violation,
}

impl SlaStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            SlaStatus::Waiting => "waiting",
            SlaStatus::Good => "good",
            SlaStatus::Warning => "warning",
            SlaStatus::Violation => "violation",
        }
    }
}
