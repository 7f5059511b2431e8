//! Triage Rule Catalog
//!
//! Declarative, per-evaluation configuration for the triage classifiers.
//!
//! The catalog provides:
//! - Area definitions (keywords, path globs, owners)
//! - SLA rules (tolerance, waiting labels, parent-link and label criteria)
//! - Duplicate-detection thresholds and the generic-error denylist
//! - Criticality predicate inputs
//!
//! Loading never fails. Malformed text falls back to the built-in default
//! and every problem is kept as a warning for the Verdict.
//!
//! # Examples
//!
//! ```
//! use triage_catalog::RuleCatalog;
//!
//! let catalog = RuleCatalog::load(Some(r#"
//! [[areas]]
//! name = "debugger"
//! keywords = ["breakpoint", "debug session"]
//! owners = ["alice"]
//! "#));
//!
//! assert_eq!(catalog.areas.len(), 1);
//! assert!(catalog.warnings.is_empty());
//! ```

#![warn(missing_docs)]

mod cache;
mod catalog;
mod config;
mod error;

pub use cache::CatalogCache;
pub use catalog::{Area, CatalogOrigin, RuleCatalog};
pub use config::{
    AreaRule, CatalogConfig, CriticalityRules, DuplicateThresholds, SlaRules,
    DEFAULT_GENERIC_ERRORS, MAX_SCORE,
};
pub use error::CatalogError;
