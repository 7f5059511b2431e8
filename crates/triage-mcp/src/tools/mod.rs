//! MCP tool implementations

mod catalog;
mod evaluate;

pub use catalog::{handle_check_catalog, AreaInfo, CheckCatalogParams, CheckCatalogResult};
pub use evaluate::handle_evaluate;
