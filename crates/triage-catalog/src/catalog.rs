//! Validated Rule Catalog and its loader

use crate::config::{CatalogConfig, CriticalityRules, DuplicateThresholds, SlaRules};
use crate::CatalogError;
use glob::Pattern;
use triage_domain::normalize::normalize_label;

/// Where a loaded catalog came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOrigin {
    /// No configuration was supplied
    BuiltIn,
    /// Parsed from the supplied configuration
    Configured,
    /// The supplied configuration was unusable; built-in default in effect
    Fallback,
}

/// A validated area
#[derive(Debug, Clone)]
pub struct Area {
    /// Area name as written in the catalog
    pub name: String,

    /// Lower-cased, deduplicated keywords
    pub keywords: Vec<String>,

    /// Compiled path globs
    pub path_globs: Vec<Pattern>,

    /// Owners in catalog order
    pub owners: Vec<String>,
}

/// Immutable rule set for one evaluation batch
///
/// A catalog is built once, then passed by reference to every classifier.
/// Problems found while building it never abort an evaluation; they are
/// recorded in [`RuleCatalog::warnings`] so they can surface in each Verdict.
///
/// # Examples
///
/// ```
/// use triage_catalog::{CatalogOrigin, RuleCatalog};
///
/// let catalog = RuleCatalog::load(Some("not = [valid"));
/// assert_eq!(catalog.origin, CatalogOrigin::Fallback);
/// assert_eq!(catalog.warnings.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    /// Areas in declared order
    pub areas: Vec<Area>,

    /// SLA rules
    pub sla: SlaRules,

    /// Duplicate-detection thresholds
    pub duplicates: DuplicateThresholds,

    /// Criticality predicate inputs
    pub criticality: CriticalityRules,

    /// Warnings raised while loading
    pub warnings: Vec<String>,

    /// Where the rules came from
    pub origin: CatalogOrigin,
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self::built_in()
    }
}

impl RuleCatalog {
    /// The built-in default catalog
    pub fn built_in() -> Self {
        let mut catalog = match Self::from_config(CatalogConfig::default()) {
            Ok(catalog) => catalog,
            Err(e) => Self::empty_with_warning(e.to_string()),
        };
        catalog.origin = CatalogOrigin::BuiltIn;
        catalog
    }

    fn empty_with_warning(warning: String) -> Self {
        Self {
            areas: Vec::new(),
            sla: SlaRules::default(),
            duplicates: DuplicateThresholds::default(),
            criticality: CriticalityRules::default(),
            warnings: vec![warning],
            origin: CatalogOrigin::Fallback,
        }
    }

    /// Load a catalog from optional TOML text; never fails
    ///
    /// - Absent or blank text yields the built-in default.
    /// - Unparseable text or inconsistent thresholds yield the built-in
    ///   default plus a warning.
    /// - Rejected areas and globs are dropped with a warning each.
    pub fn load(source: Option<&str>) -> Self {
        let Some(text) = source.filter(|s| !s.trim().is_empty()) else {
            return Self::built_in();
        };

        match Self::from_toml(text) {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::warn!("Rule catalog rejected, using built-in default: {}", e);
                let mut catalog = Self::built_in();
                catalog.origin = CatalogOrigin::Fallback;
                catalog
                    .warnings
                    .push(format!("{}; using built-in default catalog", e));
                catalog
            }
        }
    }

    /// Parse and validate TOML text
    ///
    /// Errors only for problems that make the whole catalog unusable
    /// (`ConfigParse`, `InvalidThresholds`).
    pub fn from_toml(text: &str) -> Result<Self, CatalogError> {
        let config = CatalogConfig::from_toml(text)?;
        Self::from_config(config)
    }

    /// Validate a parsed configuration
    pub fn from_config(config: CatalogConfig) -> Result<Self, CatalogError> {
        config
            .duplicates
            .validate()
            .map_err(CatalogError::InvalidThresholds)?;

        let mut warnings = Vec::new();
        let mut areas: Vec<Area> = Vec::with_capacity(config.areas.len());

        for (index, rule) in config.areas.into_iter().enumerate() {
            let name = rule.name.trim().to_string();
            if name.is_empty() {
                warnings.push(CatalogError::EmptyAreaName(index).to_string());
                continue;
            }
            if areas.iter().any(|a| a.name.eq_ignore_ascii_case(&name)) {
                warnings.push(CatalogError::DuplicateArea(name).to_string());
                continue;
            }

            let mut keywords: Vec<String> = Vec::with_capacity(rule.keywords.len());
            for keyword in rule.keywords.iter().map(|k| normalize_label(k)) {
                if !keyword.is_empty() && !keywords.contains(&keyword) {
                    keywords.push(keyword);
                }
            }
            if keywords.is_empty() {
                warnings.push(CatalogError::EmptyKeywords(name).to_string());
                continue;
            }

            let mut path_globs = Vec::with_capacity(rule.path_globs.len());
            for glob in rule.path_globs.iter().map(|g| g.trim()).filter(|g| !g.is_empty()) {
                match Pattern::new(glob) {
                    Ok(pattern) => path_globs.push(pattern),
                    Err(e) => warnings.push(
                        CatalogError::InvalidGlob {
                            area: name.clone(),
                            glob: glob.to_string(),
                            reason: e.to_string(),
                        }
                        .to_string(),
                    ),
                }
            }

            areas.push(Area {
                name,
                keywords,
                path_globs,
                owners: rule.owners,
            });
        }

        for warning in &warnings {
            tracing::warn!("Rule catalog: {}", warning);
        }

        let mut sla = config.sla;
        sla.waiting_labels = sla
            .waiting_labels
            .iter()
            .map(|l| normalize_label(l))
            .filter(|l| !l.is_empty())
            .collect();

        Ok(Self {
            areas,
            sla,
            duplicates: config.duplicates,
            criticality: config.criticality,
            warnings,
            origin: CatalogOrigin::Configured,
        })
    }

    /// Render the catalog back to its configuration form
    pub fn to_config(&self) -> CatalogConfig {
        CatalogConfig {
            areas: self
                .areas
                .iter()
                .map(|a| crate::AreaRule {
                    name: a.name.clone(),
                    keywords: a.keywords.clone(),
                    path_globs: a.path_globs.iter().map(|p| p.as_str().to_string()).collect(),
                    owners: a.owners.clone(),
                })
                .collect(),
            sla: self.sla.clone(),
            duplicates: self.duplicates.clone(),
            criticality: self.criticality.clone(),
        }
    }

    /// Render the catalog as TOML
    pub fn to_toml(&self) -> Result<String, CatalogError> {
        Ok(self.to_config().to_toml()?)
    }

    /// Look up an area by name (case-insensitive)
    pub fn area(&self, name: &str) -> Option<&Area> {
        self.areas.iter().find(|a| a.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_source_is_built_in() {
        let catalog = RuleCatalog::load(None);
        assert_eq!(catalog.origin, CatalogOrigin::BuiltIn);
        assert!(catalog.warnings.is_empty());
        assert!(!catalog.areas.is_empty());

        let blank = RuleCatalog::load(Some("   \n"));
        assert_eq!(blank.origin, CatalogOrigin::BuiltIn);
    }

    #[test]
    fn test_malformed_source_falls_back() {
        let catalog = RuleCatalog::load(Some("[[areas]\nname = "));
        assert_eq!(catalog.origin, CatalogOrigin::Fallback);
        assert_eq!(catalog.warnings.len(), 1);
        assert!(catalog.warnings[0].contains("Config parse error"));
        assert_eq!(catalog.sla, SlaRules::default());
    }

    #[test]
    fn test_wrong_type_falls_back() {
        let catalog = RuleCatalog::load(Some("[sla]\ntolerance_days = \"seven\"\n"));
        assert_eq!(catalog.origin, CatalogOrigin::Fallback);
    }

    #[test]
    fn test_invalid_thresholds_fall_back() {
        let catalog = RuleCatalog::load(Some("[duplicates]\nhigh_min = 60\nmedium_min = 70\n"));
        assert_eq!(catalog.origin, CatalogOrigin::Fallback);
        assert!(catalog.warnings[0].contains("Invalid thresholds"));
        assert_eq!(catalog.duplicates.high_min, 90);
    }

    #[test]
    fn test_empty_keywords_rejected() {
        let catalog = RuleCatalog::load(Some(
            r#"
            [[areas]]
            name = "debugger"
            keywords = []

            [[areas]]
            name = "editor"
            keywords = ["completion"]
            "#,
        ));
        assert_eq!(catalog.origin, CatalogOrigin::Configured);
        assert_eq!(catalog.areas.len(), 1);
        assert_eq!(catalog.areas[0].name, "editor");
        assert!(catalog.warnings[0].contains("debugger"));
    }

    #[test]
    fn test_duplicate_area_keeps_first() {
        let catalog = RuleCatalog::load(Some(
            r#"
            [[areas]]
            name = "Debugger"
            keywords = ["breakpoint"]
            owners = ["alice"]

            [[areas]]
            name = "debugger"
            keywords = ["watch"]
            owners = ["bob"]
            "#,
        ));
        assert_eq!(catalog.areas.len(), 1);
        assert_eq!(catalog.areas[0].owners, vec!["alice"]);
        assert!(catalog.warnings[0].contains("Duplicate area"));
    }

    #[test]
    fn test_invalid_glob_dropped() {
        let catalog = RuleCatalog::load(Some(
            r#"
            [[areas]]
            name = "build"
            keywords = ["gradle"]
            path_globs = ["**/*.gradle", "[unclosed"]
            "#,
        ));
        let area = catalog.area("BUILD").unwrap();
        assert_eq!(area.path_globs.len(), 1);
        assert_eq!(catalog.warnings.len(), 1);
        assert!(catalog.warnings[0].contains("[unclosed"));
    }

    #[test]
    fn test_keywords_and_waiting_labels_folded() {
        let catalog = RuleCatalog::load(Some(
            r#"
            [[areas]]
            name = "debugger"
            keywords = ["Breakpoint", "breakpoint ", "Debug  Session"]

            [sla]
            waiting_labels = ["Need More Info"]
            "#,
        ));
        assert_eq!(catalog.areas[0].keywords, vec!["breakpoint", "debug session"]);
        assert_eq!(catalog.sla.waiting_labels, vec!["need more info"]);
    }

    #[test]
    fn test_toml_round_trip() {
        let catalog = RuleCatalog::built_in();
        let text = catalog.to_toml().unwrap();
        let reloaded = RuleCatalog::load(Some(&text));
        assert_eq!(reloaded.origin, CatalogOrigin::Configured);
        assert!(reloaded.warnings.is_empty());
        assert_eq!(reloaded.areas.len(), catalog.areas.len());
    }
}
