//! Command implementations.

pub mod batch;
pub mod catalog;
pub mod evaluate;

pub use self::batch::execute_batch;
pub use self::catalog::execute_catalog;
pub use self::evaluate::execute_evaluate;

use crate::error::Result;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Read a request document from a file, or stdin for "-"
pub fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

/// Read a catalog file given on the command line
pub fn read_catalog(path: Option<&Path>) -> Result<Option<String>> {
    match path {
        Some(path) => {
            tracing::debug!("Reading rule catalog from {}", path.display());
            Ok(Some(fs::read_to_string(path)?))
        }
        None => Ok(None),
    }
}
