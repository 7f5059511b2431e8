//! Error types for MCP server operations.

use thiserror::Error;

/// MCP server error types
#[derive(Error, Debug)]
pub enum McpError {
    /// Request is not a valid JSON-RPC message
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown method
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Unknown tool
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool arguments do not match the tool's schema
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// The engine rejected the request
    #[error("Engine error: {0}")]
    Engine(#[from] triage_engine::EngineError),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl McpError {
    /// Convert to JSON-RPC error code
    pub fn error_code(&self) -> i32 {
        match self {
            McpError::JsonError(_) => -32700,
            McpError::InvalidRequest(_) => -32600,
            McpError::MethodNotFound(_) | McpError::ToolNotFound(_) => -32601,
            McpError::InvalidParams(_) => -32602,
            McpError::Engine(_) | McpError::IoError(_) => -32000,
        }
    }
}
