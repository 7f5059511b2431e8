//! Catalog command implementation.

use super::read_catalog;
use crate::cli::{CatalogAction, CatalogArgs};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::Path;
use triage_catalog::RuleCatalog;

/// Execute a catalog action.
pub fn execute_catalog(args: CatalogArgs, formatter: &Formatter) -> Result<()> {
    match args.action {
        CatalogAction::Check { catalog, strict } => {
            let loaded = check_catalog(catalog.as_deref(), strict)?;
            println!("{}", formatter.format_catalog(&loaded)?);
        }
        CatalogAction::Default => {
            print!("{}", RuleCatalog::built_in().to_toml()?);
        }
    }

    Ok(())
}

/// Load a catalog file; in strict mode any problem is an error
pub fn check_catalog(path: Option<&Path>, strict: bool) -> Result<RuleCatalog> {
    let source = read_catalog(path)?;

    if !strict {
        return Ok(RuleCatalog::load(source.as_deref()));
    }

    let catalog = match source {
        Some(text) => RuleCatalog::from_toml(&text)?,
        None => RuleCatalog::built_in(),
    };
    if !catalog.warnings.is_empty() {
        return Err(CliError::InvalidInput(catalog.warnings.join("; ")));
    }
    Ok(catalog)
}
