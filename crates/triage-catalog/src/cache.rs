//! Shared catalog cache
//!
//! Evaluations in one batch usually carry the same catalog text. The cache
//! keeps the most recently loaded catalog together with its source text so
//! the TOML is parsed and validated once per distinct text.

use crate::RuleCatalog;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Trimmed source text (`None` for the built-in default) and its catalog
type Entry = (Option<String>, Arc<RuleCatalog>);

/// Single-entry cache of the last loaded [`RuleCatalog`]
#[derive(Debug, Default)]
pub struct CatalogCache {
    entry: RwLock<Option<Entry>>,
    loads: AtomicU64,
}

impl CatalogCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the catalog for `source`, loading it on a miss
    pub fn get_or_load(&self, source: Option<&str>) -> Arc<RuleCatalog> {
        let key = source_key(source);

        {
            let guard = self.entry.read().unwrap_or_else(|e| e.into_inner());
            if let Some((cached_key, catalog)) = guard.as_ref() {
                if cached_key.as_deref() == key {
                    return Arc::clone(catalog);
                }
            }
        }

        let catalog = Arc::new(RuleCatalog::load(source));
        self.loads.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            "Loaded rule catalog ({} areas, {} warnings)",
            catalog.areas.len(),
            catalog.warnings.len()
        );

        let mut guard = self.entry.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some((key.map(str::to_string), Arc::clone(&catalog)));
        catalog
    }

    /// Drop the cached catalog
    pub fn invalidate(&self) {
        let mut guard = self.entry.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }

    /// Number of times a catalog was actually loaded
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }
}

/// Blank and absent sources both mean the built-in default
fn source_key(source: Option<&str>) -> Option<&str> {
    source.map(str::trim).filter(|s| !s.is_empty())
}
