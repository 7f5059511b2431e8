//! Rule Catalog error types

use thiserror::Error;

/// Errors raised while loading a Rule Catalog
///
/// None of these is fatal to an evaluation: the loader records each one as a
/// warning and either drops the offending entry or falls back to the
/// built-in default catalog.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// Catalog text is not valid TOML or does not match the schema
    #[error("Config parse error: {0}")]
    ConfigParse(String),

    /// Two areas share a name
    #[error("Duplicate area '{0}': keeping the first definition")]
    DuplicateArea(String),

    /// An area has no keywords
    #[error("Area '{0}' has no keywords and was rejected")]
    EmptyKeywords(String),

    /// An area has a blank name
    #[error("Area at position {0} has an empty name and was rejected")]
    EmptyAreaName(usize),

    /// A path glob does not compile
    #[error("Area '{area}': invalid path glob '{glob}': {reason}")]
    InvalidGlob {
        /// Area holding the glob
        area: String,
        /// The glob text
        glob: String,
        /// Why it failed to compile
        reason: String,
    },

    /// Duplicate band cut-points or similarity thresholds are inconsistent
    #[error("Invalid thresholds: {0}")]
    InvalidThresholds(String),

    /// Catalog could not be rendered back to TOML
    #[error("Serialization error: {0}")]
    Serialize(String),
}

impl From<toml::de::Error> for CatalogError {
    fn from(e: toml::de::Error) -> Self {
        CatalogError::ConfigParse(e.to_string())
    }
}

impl From<toml::ser::Error> for CatalogError {
    fn from(e: toml::ser::Error) -> Self {
        CatalogError::Serialize(e.to_string())
    }
}
