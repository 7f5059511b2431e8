//! MCP server implementation

use serde::Serialize;
use serde_json::{json, Value};
use std::io::{BufRead, Write};
use tracing::{debug, error, info};
use triage_engine::TriageEngine;

use crate::error::McpError;
use crate::protocol::*;
use crate::tools;

/// MCP Server
///
/// Handles Model Context Protocol requests via stdio transport. Every tool
/// call is answered synchronously from the in-process engine.
pub struct McpServer {
    engine: TriageEngine,
    default_catalog: Option<String>,
}

impl Default for McpServer {
    fn default() -> Self {
        Self::new()
    }
}

impl McpServer {
    /// Create a server using the built-in catalog by default
    pub fn new() -> Self {
        Self {
            engine: TriageEngine::new(),
            default_catalog: None,
        }
    }

    /// Catalog text used when a request carries none
    pub fn with_default_catalog(mut self, source: impl Into<String>) -> Self {
        self.default_catalog = Some(source.into());
        self
    }

    /// Run the MCP server on stdin/stdout until stdin closes
    pub fn run(&self) -> Result<(), McpError> {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        self.serve(stdin.lock(), &mut stdout)
    }

    /// Serve newline-delimited JSON-RPC from `reader`, answering on `writer`
    pub fn serve<R: BufRead, W: Write>(&self, reader: R, writer: &mut W) -> Result<(), McpError> {
        info!("MCP server started");

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            debug!("Received request: {}", line);
            if let Some(response) = self.handle_line(&line) {
                write_response(writer, &response)?;
            }
        }

        info!("MCP server stopped");
        Ok(())
    }

    /// Handle one raw message; notifications produce no response
    pub fn handle_line(&self, line: &str) -> Option<Value> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                return Some(error_value(None, -32700, format!("Parse error: {}", e)));
            }
        };

        if request.jsonrpc != "2.0" {
            let err = McpError::InvalidRequest(format!("unsupported jsonrpc version '{}'", request.jsonrpc));
            return Some(error_value(request.id, err.error_code(), err.to_string()));
        }

        if request.id.is_none() && request.method.starts_with("notifications/") {
            debug!("Notification: {}", request.method);
            return None;
        }

        Some(self.handle_request(request))
    }

    /// Handle a JSON-RPC request
    fn handle_request(&self, request: JsonRpcRequest) -> Value {
        let id = request.id.clone();

        let result = match request.method.as_str() {
            "initialize" => to_value(&self.initialize()),
            "tools/list" => to_value(&ToolListResponse {
                tools: tool_definitions(),
            }),
            "tools/call" => self.handle_tool_call(request.params),
            other => Err(McpError::MethodNotFound(other.to_string())),
        };

        match result {
            Ok(value) => success_value(id, value),
            Err(e) => {
                debug!("Request failed: {}", e);
                error_value(id, e.error_code(), e.to_string())
            }
        }
    }

    fn initialize(&self) -> InitializeResponse {
        InitializeResponse {
            protocol_version: PROTOCOL_VERSION.to_string(),
            server_info: ServerInfo {
                name: "triage-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            capabilities: Capabilities {
                tools: ToolsCapability { list_changed: false },
            },
        }
    }

    /// Handle tools/call request
    fn handle_tool_call(&self, params: Value) -> Result<Value, McpError> {
        let tool_name = params
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| McpError::InvalidParams("Missing tool name".to_string()))?;

        let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));
        let default_catalog = self.default_catalog.as_deref();

        match tool_name {
            "triage_evaluate" => {
                let verdict = tools::handle_evaluate(&self.engine, default_catalog, arguments)?;
                to_value(&verdict)
            }
            "triage_check_catalog" => {
                let params: tools::CheckCatalogParams = serde_json::from_value(arguments)
                    .map_err(|e| McpError::InvalidParams(e.to_string()))?;
                let result = tools::handle_check_catalog(&self.engine, default_catalog, params)?;
                to_value(&result)
            }
            other => Err(McpError::ToolNotFound(other.to_string())),
        }
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, McpError> {
    Ok(serde_json::to_value(value)?)
}

fn success_value(id: Option<Value>, result: Value) -> Value {
    json!(JsonRpcResponse::new(id, result))
}

fn error_value(id: Option<Value>, code: i32, message: String) -> Value {
    json!(JsonRpcError::new(id, code, message))
}

/// Write response to the transport
fn write_response<W: Write>(writer: &mut W, response: &Value) -> Result<(), McpError> {
    let response_str = serde_json::to_string(response)?;
    writeln!(writer, "{}", response_str)?;
    writer.flush()?;
    debug!("Sent response: {}", response_str);
    Ok(())
}

// Tool definitions for tools/list response
fn tool_definitions() -> Vec<ToolDefinition> {
    let signal_set = json!({
        "type": "object",
        "properties": {
            "id": {"type": "integer", "minimum": 1},
            "title": {"type": "string"},
            "body": {"type": "string"},
            "labels": {"type": "array", "items": {"type": "string"}},
            "createdAt": {"type": "integer", "description": "Unix seconds, UTC"},
            "errorSignatures": {"type": "array", "items": {"type": "string"}},
            "reproSteps": {"type": "array", "items": {"type": "string"}},
            "crossReferences": {"type": "array", "items": {"type": "integer"}}
        },
        "required": ["id", "title", "createdAt"]
    });

    vec![
        ToolDefinition {
            name: "triage_evaluate".to_string(),
            description: "Evaluate one issue's signals into a triage verdict: criticality tier, duplicate candidates, SLA status, area and recommended labels/assignees".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "targetSignalSet": signal_set.clone(),
                    "candidatePool": {"type": "array", "items": signal_set, "description": "Issues to compare for duplicates and hot-issue clustering"},
                    "ruleCatalogSource": {"type": "string", "description": "Rule catalog TOML (server default when omitted)"},
                    "evaluationTimestamp": {"type": "integer", "description": "Evaluation time, Unix seconds, UTC"}
                },
                "required": ["targetSignalSet", "evaluationTimestamp"]
            }),
        },
        ToolDefinition {
            name: "triage_check_catalog".to_string(),
            description: "Load a rule catalog and report its areas, owners and load warnings".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "source": {"type": "string", "description": "Rule catalog TOML (server default when omitted)"}
                }
            }),
        },
    ]
}
