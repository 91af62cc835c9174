//! MCP server implementation.

use super::protocol::*;
use crate::tools::{definitions, ToolRegistry};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

const PROTOCOL_VERSION: &str = "2025-06-18";
const SERVER_NAME: &str = "klipp";
const SERVER_TITLE: &str = "Klipp media tools";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP Server for Klipp.
pub struct McpServer {
    registry: ToolRegistry,
}

impl McpServer {
    /// Create a new MCP server.
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// Run the MCP server (reads from stdin, writes to stdout).
    pub async fn run(&self) -> anyhow::Result<()> {
        info!("Klipp MCP server starting");
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve newline-delimited JSON-RPC until the reader is exhausted.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(response) = self.handle_line(line).await {
                let mut out = serde_json::to_string(&response)?;
                out.push('\n');
                writer.write_all(out.as_bytes()).await?;
                writer.flush().await?;
            }
        }

        info!("MCP input closed, shutting down");
        Ok(())
    }

    /// Handle one line of input. Returns `None` for notifications.
    async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                warn!("Failed to parse request: {}", e);
                return Some(JsonRpcResponse::error(Value::Null, PARSE_ERROR, "Parse error"));
            }
        };

        let Some(id) = request.id else {
            debug!("Notification: {}", request.method);
            return None;
        };

        Some(self.handle_request(id, &request.method, request.params).await)
    }

    /// Handle a single JSON-RPC request.
    async fn handle_request(&self, id: Value, method: &str, params: Option<Value>) -> JsonRpcResponse {
        debug!("Request: {}", method);
        match method {
            "initialize" => self.handle_initialize(id, params),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, params).await,
            _ => JsonRpcResponse::error(id, METHOD_NOT_FOUND, &format!("Method not found: {}", method)),
        }
    }

    /// Handle initialize request.
    fn handle_initialize(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params: InitializeParams = params
            .and_then(|p| serde_json::from_value(p).ok())
            .unwrap_or_default();
        if let Some(client) = &params.client_info {
            info!(
                "Client connected: {} {}",
                client.name,
                client.version.as_deref().unwrap_or("")
            );
        }
        if let Some(version) = params.protocol_version.as_deref() {
            if version != PROTOCOL_VERSION {
                debug!("Client asked for protocol {}, offering {}", version, PROTOCOL_VERSION);
            }
        }

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability { list_changed: false },
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                title: SERVER_TITLE.to_string(),
                version: SERVER_VERSION.to_string(),
            },
        };

        respond(id, &result)
    }

    /// Handle tools/list request.
    fn handle_tools_list(&self, id: Value) -> JsonRpcResponse {
        let result = ToolsListResult {
            tools: definitions().into_iter().map(Tool::from).collect(),
        };
        respond(id, &result)
    }

    /// Handle tools/call request.
    async fn handle_tools_call(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(id, INVALID_PARAMS, &format!("Invalid params: {}", e))
                }
            },
            None => return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params"),
        };

        let result = match self.registry.call(&params.name, params.arguments).await {
            Ok(output) => ToolCallResult::structured(output.summary, output.structured),
            Err(e) => {
                warn!("Tool {} failed: {}", params.name, e);
                ToolCallResult::error(e.to_string())
            }
        };

        respond(id, &result)
    }
}

fn respond<T: Serialize>(id: Value, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, &e.to_string()),
    }
}
