//! Declarative rule configuration
//!
//! The TOML shape of a Rule Catalog. Every section and field is optional;
//! anything omitted takes the built-in default.

use serde::{Deserialize, Serialize};
use triage_domain::ConfidenceTier;

/// Highest numeric duplicate score
pub const MAX_SCORE: u8 = 100;

/// Error messages too common to identify a duplicate on their own
pub const DEFAULT_GENERIC_ERRORS: [&str; 7] = [
    "connection refused",
    "timeout",
    "permission denied",
    "out of memory",
    "file not found",
    "invalid argument",
    "unexpected token",
];

/// Complete catalog configuration as written in TOML
///
/// # Examples
///
/// ```
/// use triage_catalog::CatalogConfig;
///
/// let config = CatalogConfig::from_toml("[sla]\ntolerance_days = 3\n").unwrap();
/// assert_eq!(config.sla.tolerance_days, 3);
/// assert!(!config.areas.is_empty()); // omitted sections keep their defaults
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Areas in priority order (first listed wins ties)
    pub areas: Vec<AreaRule>,

    /// SLA rules
    pub sla: SlaRules,

    /// Duplicate-detection thresholds
    pub duplicates: DuplicateThresholds,

    /// Criticality predicate inputs
    pub criticality: CriticalityRules,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            areas: default_areas(),
            sla: SlaRules::default(),
            duplicates: DuplicateThresholds::default(),
            criticality: CriticalityRules::default(),
        }
    }
}

impl CatalogConfig {
    /// Parse configuration from TOML text
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Serialize configuration to TOML text
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// One area entry: a named technical category mapped to owners
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaRule {
    /// Area name (unique, case-insensitive)
    pub name: String,

    /// Keywords matched as case-insensitive substrings
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Globs matched against file paths mentioned in the issue body
    #[serde(default)]
    pub path_globs: Vec<String>,

    /// Owners in assignment order
    #[serde(default)]
    pub owners: Vec<String>,
}

impl AreaRule {
    /// Create an area rule with keywords only
    pub fn new<I, S>(name: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
            path_globs: Vec::new(),
            owners: Vec::new(),
        }
    }

    /// Add path globs
    pub fn with_globs<I, S>(mut self, globs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path_globs.extend(globs.into_iter().map(Into::into));
        self
    }

    /// Add owners
    pub fn with_owners<I, S>(mut self, owners: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.owners.extend(owners.into_iter().map(Into::into));
        self
    }
}

// Keywords match as substrings, so each must be long enough not to occur
// inside unrelated words.
fn default_areas() -> Vec<AreaRule> {
    vec![
        AreaRule::new(
            "performance",
            [
                "slow",
                "performance",
                "freeze",
                "unresponsive",
                "not responding",
                "high cpu",
                "memory usage",
                "laggy",
            ],
        ),
        AreaRule::new(
            "installation",
            ["install", "setup", "update failed", "upgrade", "activation"],
        )
        .with_globs(["**/install/**", "**/setup/**"]),
        AreaRule::new(
            "ui",
            [
                "user interface",
                "toolbar",
                "button",
                "dialog",
                "layout",
                "theme",
                "rendering",
                "font",
            ],
        )
        .with_globs(["**/ui/**", "**/*.css"]),
        AreaRule::new("documentation", ["docs", "documentation", "readme", "typo"])
            .with_globs(["**/*.md", "docs/**"]),
    ]
}

/// SLA rules
///
/// An issue meets the SLA when it links a parent issue and does not carry
/// the forbidden label. Unmet criteria are tolerated for `tolerance_days`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlaRules {
    /// Grace window in whole days (default: 7)
    pub tolerance_days: u32,

    /// Labels that pause the SLA clock
    pub waiting_labels: Vec<String>,

    /// Whether a parent link is required
    pub required_parent_link: bool,

    /// Label that must be absent; empty disables the check
    pub forbidden_label: String,

    /// Repositories a body URL may point to as a parent; empty means any
    /// repository other than the issue's own
    pub parent_repositories: Vec<String>,
}

impl Default for SlaRules {
    fn default() -> Self {
        Self {
            tolerance_days: 7,
            waiting_labels: vec![
                "need more info".to_string(),
                "waiting for response".to_string(),
            ],
            required_parent_link: true,
            forbidden_label: "needs-triage".to_string(),
            parent_repositories: Vec::new(),
        }
    }
}

impl SlaRules {
    /// Strict preset: three-day tolerance
    pub fn strict() -> Self {
        Self {
            tolerance_days: 3,
            ..Self::default()
        }
    }

    /// Lenient preset: two-week tolerance
    pub fn lenient() -> Self {
        Self {
            tolerance_days: 14,
            ..Self::default()
        }
    }

    /// The forbidden label, if the check is enabled
    pub fn forbidden(&self) -> Option<&str> {
        let label = self.forbidden_label.trim();
        if label.is_empty() {
            None
        } else {
            Some(label)
        }
    }
}

/// Duplicate-detection thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicateThresholds {
    /// Lowest High-band score
    pub high_min: u8,

    /// Lowest Medium-band score
    pub medium_min: u8,

    /// Lowest Low-band score
    pub low_min: u8,

    /// Error messages that need extra supporting evidence
    pub generic_errors: Vec<String>,

    /// Token-overlap threshold for "same symptom"
    pub symptom_similarity: f64,

    /// Token-overlap threshold for "same trigger condition"
    pub trigger_similarity: f64,
}

impl Default for DuplicateThresholds {
    fn default() -> Self {
        Self {
            high_min: 90,
            medium_min: 70,
            low_min: 50,
            generic_errors: DEFAULT_GENERIC_ERRORS.iter().map(|s| s.to_string()).collect(),
            symptom_similarity: 0.5,
            trigger_similarity: 0.5,
        }
    }
}

impl DuplicateThresholds {
    /// Check band ordering and threshold ranges
    pub fn validate(&self) -> Result<(), String> {
        if !(self.low_min < self.medium_min && self.medium_min < self.high_min) {
            return Err(format!(
                "band cut-points must increase: low_min {} < medium_min {} < high_min {}",
                self.low_min, self.medium_min, self.high_min
            ));
        }
        if self.high_min > MAX_SCORE {
            return Err(format!("high_min {} exceeds {}", self.high_min, MAX_SCORE));
        }
        for (name, value) in [
            ("symptom_similarity", self.symptom_similarity),
            ("trigger_similarity", self.trigger_similarity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} {} is outside [0.0, 1.0]", name, value));
            }
        }
        Ok(())
    }

    /// Inclusive score range of a band
    pub fn band(&self, tier: ConfidenceTier) -> (u8, u8) {
        match tier {
            ConfidenceTier::High => (self.high_min, MAX_SCORE),
            ConfidenceTier::Medium => (self.medium_min, self.high_min.saturating_sub(1)),
            ConfidenceTier::Low => (self.low_min, self.medium_min.saturating_sub(1)),
        }
    }

    /// Whether a normalized error signature contains a denylisted phrase
    pub fn is_generic(&self, signature: &str) -> bool {
        let signature = signature.to_lowercase();
        self.generic_errors
            .iter()
            .map(|phrase| phrase.trim().to_lowercase())
            .any(|phrase| !phrase.is_empty() && signature.contains(&phrase))
    }
}

/// Inputs to the Hot, Blocking and Regression predicates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriticalityRules {
    /// Labels marking a core function
    pub core_labels: Vec<String>,

    /// Phrases marking a core function
    pub core_keywords: Vec<String>,

    /// Labels stating a workaround exists
    pub workaround_labels: Vec<String>,

    /// Phrases stating a workaround exists
    pub workaround_keywords: Vec<String>,

    /// Labels marking an explicit regression
    pub regression_labels: Vec<String>,

    /// Minimum similar issues for Hot
    pub hot_min_similar: usize,

    /// Minimum thumbs-up plus human comments for Hot. Only binds when set
    /// above `hot_min_human_comments + 1`.
    pub hot_min_engagement: u32,

    /// Human comment count Hot must exceed
    pub hot_min_human_comments: usize,
}

impl Default for CriticalityRules {
    fn default() -> Self {
        Self {
            core_labels: vec![
                "crash".to_string(),
                "data-loss".to_string(),
                "blocker".to_string(),
            ],
            core_keywords: vec![
                "crash".to_string(),
                "data loss".to_string(),
                "cannot start".to_string(),
                "can't start".to_string(),
                "fails to start".to_string(),
                "cannot open".to_string(),
                "unusable".to_string(),
            ],
            workaround_labels: vec!["has-workaround".to_string()],
            workaround_keywords: vec!["workaround".to_string(), "work around".to_string()],
            regression_labels: vec!["regression".to_string()],
            hot_min_similar: 2,
            hot_min_engagement: 2,
            hot_min_human_comments: 3,
        }
    }
}
