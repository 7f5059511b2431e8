//! Catalog tool - Load a rule catalog and report what it contains

use crate::error::McpError;
use serde::{Deserialize, Serialize};
use triage_catalog::{CatalogOrigin, RuleCatalog};
use triage_engine::TriageEngine;

/// Parameters for checking a catalog
#[derive(Debug, Deserialize)]
pub struct CheckCatalogParams {
    /// Catalog TOML text (server default when absent)
    #[serde(default)]
    pub source: Option<String>,
}

/// Result of checking a catalog
#[derive(Debug, Serialize)]
pub struct CheckCatalogResult {
    /// built-in, configured or fallback
    pub origin: String,
    /// Areas in declared order
    pub areas: Vec<AreaInfo>,
    /// SLA tolerance in days
    #[serde(rename = "slaToleranceDays")]
    pub sla_tolerance_days: u32,
    /// Load warnings
    pub warnings: Vec<String>,
}

/// Area summary
#[derive(Debug, Serialize)]
pub struct AreaInfo {
    /// Area name
    pub name: String,
    /// Owners in catalog order
    pub owners: Vec<String>,
}

/// Handle triage_check_catalog tool invocation
pub fn handle_check_catalog(
    engine: &TriageEngine,
    default_catalog: Option<&str>,
    params: CheckCatalogParams,
) -> Result<CheckCatalogResult, McpError> {
    let source = params.source.as_deref().or(default_catalog);
    let catalog = engine.catalog(source);
    Ok(summarize(&catalog))
}

fn summarize(catalog: &RuleCatalog) -> CheckCatalogResult {
    let origin = match catalog.origin {
        CatalogOrigin::BuiltIn => "built-in",
        CatalogOrigin::Configured => "configured",
        CatalogOrigin::Fallback => "fallback",
    };
    CheckCatalogResult {
        origin: origin.to_string(),
        areas: catalog
            .areas
            .iter()
            .map(|a| AreaInfo {
                name: a.name.clone(),
                owners: a.owners.clone(),
            })
            .collect(),
        sla_tolerance_days: catalog.sla.tolerance_days,
        warnings: catalog.warnings.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_catalog_params_deserialize_empty() {
        let params: CheckCatalogParams = serde_json::from_str("{}").unwrap();
        assert!(params.source.is_none());
    }

    #[test]
    fn test_built_in_catalog_summary() {
        let engine = TriageEngine::new();
        let result = handle_check_catalog(&engine, None, CheckCatalogParams { source: None }).unwrap();
        assert_eq!(result.origin, "built-in");
        assert_eq!(result.sla_tolerance_days, 7);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_malformed_catalog_reports_fallback() {
        let engine = TriageEngine::new();
        let params = CheckCatalogParams {
            source: Some("[sla\n".to_string()),
        };
        let result = handle_check_catalog(&engine, None, params).unwrap();
        assert_eq!(result.origin, "fallback");
        assert_eq!(result.warnings.len(), 1);
    }
}
