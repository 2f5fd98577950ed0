// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! MCP request handling and the newline-delimited stdio loop.

use std::sync::Arc;

use serde_json::{Value, json};
use taskwright_agent::ToolDispatcher;
use taskwright_core::{StorageAdapter, TaskwrightError, ToolResult};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::protocol::{
    INVALID_PARAMS, INVALID_REQUEST, JsonRpcRequest, MCP_VERSION, METHOD_NOT_FOUND,
    NOT_INITIALIZED, PARSE_ERROR, json_rpc_error, json_rpc_response, tool_text_content,
};
use crate::tools::ToolCatalog;

/// A stateful MCP session over one transport.
pub struct McpServer {
    name: String,
    version: String,
    initialized: bool,
    catalog: ToolCatalog,
    dispatcher: ToolDispatcher,
}

impl McpServer {
    pub fn new(storage: Arc<dyn StorageAdapter>, name: impl Into<String>) -> Result<Self, TaskwrightError> {
        Ok(Self {
            name: name.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            initialized: false,
            catalog: ToolCatalog::new()?,
            dispatcher: ToolDispatcher::new(storage),
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Handles one decoded request. Notifications yield `None`.
    pub async fn handle(&mut self, request: JsonRpcRequest) -> Option<Value> {
        let method = request.method.as_str();

        if method == "initialize" {
            return Some(json_rpc_response(
                request.id,
                json!({
                    "protocolVersion": MCP_VERSION,
                    "serverInfo": { "name": self.name, "version": self.version },
                    "capabilities": { "tools": {} }
                }),
            ));
        }

        if method == "notifications/initialized" {
            self.initialized = true;
            debug!("mcp client initialized");
            return None;
        }

        if request.id.is_none() {
            debug!(method, "ignoring notification");
            return None;
        }

        if !self.initialized {
            return Some(json_rpc_error(
                request.id,
                NOT_INITIALIZED,
                "Server not initialized",
            ));
        }

        match method {
            "ping" => Some(json_rpc_response(request.id, json!({}))),
            "tools/list" => Some(json_rpc_response(
                request.id,
                json!({ "tools": self.catalog.definitions() }),
            )),
            "tools/call" => Some(self.call(request.id, request.params).await),
            _ => Some(json_rpc_error(
                request.id,
                METHOD_NOT_FOUND,
                &format!("Method not found: {method}"),
            )),
        }
    }

    async fn call(&self, id: Option<Value>, params: Option<Value>) -> Value {
        let Some(Value::Object(params)) = params else {
            return json_rpc_error(id, INVALID_PARAMS, "params must be an object");
        };
        let Some(name) = params.get("name").and_then(Value::as_str) else {
            return json_rpc_error(id, INVALID_PARAMS, "params.name must be a string");
        };
        let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

        let result = self.run_tool(name, arguments).await;
        json_rpc_response(
            id,
            json!({
                "content": [tool_text_content(&result)],
                "isError": !result.success
            }),
        )
    }

    async fn run_tool(&self, name: &str, arguments: Value) -> ToolResult {
        if !self.catalog.contains(name) {
            return ToolResult::failure(format!("Unknown tool: {name}"));
        }

        let violations = self.catalog.validate(name, &arguments);
        if !violations.is_empty() {
            debug!(tool = name, ?violations, "tool arguments rejected");
            return ToolResult::failure(format!("Invalid arguments: {}", violations.join("; ")));
        }

        let Some(owner) = arguments.get("user_id").and_then(Value::as_str).map(str::to_string)
        else {
            return ToolResult::failure("Invalid arguments: user_id is required");
        };
        debug!(tool = name, owner = %owner, "mcp tool call");
        self.dispatcher.dispatch_named(&owner, name, arguments).await
    }

    /// Handles one raw line. Parse failures become JSON-RPC errors.
    pub async fn handle_line(&mut self, raw: &str) -> Option<Value> {
        let data: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => return Some(json_rpc_error(None, PARSE_ERROR, &format!("Parse error: {e}"))),
        };

        let Some(object) = data.as_object() else {
            return Some(json_rpc_error(None, INVALID_REQUEST, "Invalid Request"));
        };
        let id = object.get("id").cloned();
        if !object.contains_key("method") {
            return Some(json_rpc_error(id, INVALID_REQUEST, "Invalid Request"));
        }

        match serde_json::from_value::<JsonRpcRequest>(data) {
            Ok(request) => self.handle(request).await,
            Err(e) => Some(json_rpc_error(
                id,
                INVALID_REQUEST,
                &format!("Invalid Request: {e}"),
            )),
        }
    }

    /// Serves newline-delimited JSON-RPC until the reader is exhausted.
    pub async fn serve<R, W>(&mut self, reader: R, mut writer: W) -> Result<(), TaskwrightError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| TaskwrightError::Internal(format!("failed to read request: {e}")))?
        {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(line).await {
                let mut out = response.to_string();
                out.push('\n');
                writer
                    .write_all(out.as_bytes())
                    .await
                    .map_err(|e| TaskwrightError::Internal(format!("failed to write response: {e}")))?;
                writer
                    .flush()
                    .await
                    .map_err(|e| TaskwrightError::Internal(format!("failed to flush response: {e}")))?;
            }
        }
        Ok(())
    }
}

/// Serves MCP on the process's stdin/stdout.
///
/// Logs must go to stderr while this runs; stdout carries protocol frames only.
pub async fn serve_stdio(mut server: McpServer) -> Result<(), TaskwrightError> {
    info!(server = %server.name, "mcp server listening on stdio");
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    let result = server.serve(stdin, stdout).await;
    match &result {
        Ok(()) => info!("mcp client disconnected"),
        Err(e) => warn!(error = %e, "mcp transport failed"),
    }
    result
}
