//! Triage MCP Server
//!
//! Model Context Protocol server exposing the triage decision engine to AI
//! clients over stdio.
//!
//! Provides 2 MCP tools:
//! - `triage_evaluate` - Evaluate one issue into a Verdict
//! - `triage_check_catalog` - Load a rule catalog and report areas and warnings
//!
//! # Example
//!
//! ```no_run
//! use triage_mcp::McpServer;
//!
//! let server = McpServer::new().with_default_catalog("[sla]\ntolerance_days = 3\n");
//! server.run().unwrap();
//! ```

#![warn(missing_docs)]

mod error;
mod protocol;
mod server;
mod tools;

pub use error::McpError;
pub use protocol::PROTOCOL_VERSION;
pub use server::McpServer;
