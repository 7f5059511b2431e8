//! Triage MCP Server - Main entry point

use anyhow::Context;
use std::env;
use tracing_subscriber::EnvFilter;
use triage_mcp::McpServer;

fn main() -> anyhow::Result<()> {
    // Initialize tracing (log to stderr; stdout carries the protocol)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut server = McpServer::new();

    // Default catalog for requests that carry none
    if let Ok(path) = env::var("TRIAGE_CATALOG") {
        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read rule catalog {}", path))?;
        tracing::info!("Default rule catalog: {}", path);
        server = server.with_default_catalog(source);
    }

    // Run server (blocks until stdin closes)
    server.run().context("MCP server error")?;
    Ok(())
}
