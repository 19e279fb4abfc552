//! MCP stdio server implementation
//!
//! Requests are read line by line from stdin and each one is handled on its
//! own task, so a long evaluation does not hold up `ping` or `tools/list`.
//! Responses funnel through a single writer task to keep stdout lines whole.

use super::prompts::{get_prompt_definitions, prompt_messages};
use super::tools::{get_tool_definitions, handle_tool_call};
use super::types::{McpError, McpMessage, McpNotification, McpRequest, McpResponse};
use crate::config::Config;
use crate::nrepl::NreplClient;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// MCP Server implementation
pub struct McpServer {
    client: NreplClient,
    highlight: bool,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(config: &Config) -> Self {
        Self::with_client(NreplClient::from_config(&config.nrepl), config.output.highlight)
    }

    pub fn with_client(client: NreplClient, highlight: bool) -> Self {
        Self { client, highlight }
    }

    /// Run the MCP server loop over stdio until stdin closes
    pub async fn run(self) -> Result<(), McpError> {
        let server = Arc::new(self);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let (tx, mut rx) = mpsc::channel::<String>(64);

        let writer = tokio::spawn(async move {
            let mut stdout = tokio::io::stdout();
            while let Some(line) = rx.recv().await {
                stdout.write_all(line.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
            Ok::<(), std::io::Error>(())
        });

        info!(
            "MCP server starting on stdio, forwarding to nREPL at {}",
            server.client.address()
        );

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            debug!("Received: {}", line);

            let message: McpMessage = match serde_json::from_str(line) {
                Ok(m) => m,
                Err(e) => {
                    error!("Failed to parse message: {}", e);
                    let response =
                        McpResponse::error(None, McpError::parse_error(format!("Parse error: {}", e)));
                    send_response(&tx, &response).await;
                    continue;
                }
            };

            match message {
                McpMessage::Request(req) => {
                    let server = Arc::clone(&server);
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let response = server.handle_request(req).await;
                        send_response(&tx, &response).await;
                    });
                }
                McpMessage::Notification(notif) => {
                    server.handle_notification(notif);
                }
                McpMessage::Response(_) => {
                    warn!("Unexpected response message received");
                }
            }
        }

        info!("MCP server shutting down");

        // In-flight requests hold their own senders; the writer drains them.
        drop(tx);
        writer
            .await
            .map_err(|e| McpError::internal_error(e.to_string()))??;
        Ok(())
    }

    /// Handle an MCP request
    async fn handle_request(&self, request: McpRequest) -> McpResponse {
        let id = request.id.clone();

        if request.jsonrpc != "2.0" {
            return McpResponse::error(
                id,
                McpError::invalid_request(format!(
                    "Unsupported jsonrpc version: {}",
                    request.jsonrpc
                )),
            );
        }

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "ping" => McpResponse::success(id, json!({})),
            "tools/list" => McpResponse::success(id, json!({ "tools": get_tool_definitions() })),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            "prompts/list" => {
                McpResponse::success(id, json!({ "prompts": get_prompt_definitions() }))
            }
            "prompts/get" => self.handle_prompts_get(id, request.params),
            "resources/list" => McpResponse::success(id, json!({ "resources": [] })),
            _ => McpResponse::error(id, McpError::method_not_found(&request.method)),
        }
    }

    /// Handle notifications (fire-and-forget)
    fn handle_notification(&self, notification: McpNotification) {
        match notification.method.as_str() {
            "notifications/initialized" => {
                info!("Client initialized");
            }
            "notifications/cancelled" => {
                info!("Request cancelled");
            }
            _ => {
                debug!("Unknown notification: {}", notification.method);
            }
        }
    }

    /// Handle initialize request
    fn handle_initialize(&self, id: Option<Value>) -> McpResponse {
        McpResponse::success(
            id,
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {
                    "tools": {
                        "listChanged": false
                    },
                    "prompts": {
                        "listChanged": false
                    }
                },
                "serverInfo": {
                    "name": "nrepl-mcp",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        )
    }

    /// Handle tools/call request
    async fn handle_tools_call(&self, id: Option<Value>, params: Option<Value>) -> McpResponse {
        let params = match params {
            Some(p) => p,
            None => return McpResponse::error(id, McpError::invalid_params("Missing params")),
        };

        let name = match params.get("name").and_then(|v| v.as_str()) {
            Some(n) => n.to_string(),
            None => return McpResponse::error(id, McpError::invalid_params("Missing tool name")),
        };

        let arguments: HashMap<String, Value> = params
            .get("arguments")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default();

        debug!("Calling tool: {} with args: {:?}", name, arguments);

        let result = handle_tool_call(&name, &arguments, &self.client, self.highlight).await;

        McpResponse::success(
            id,
            json!({
                "content": result.content,
                "isError": result.is_error.unwrap_or(false)
            }),
        )
    }

    /// Handle prompts/get request
    fn handle_prompts_get(&self, id: Option<Value>, params: Option<Value>) -> McpResponse {
        let name = match params
            .as_ref()
            .and_then(|p| p.get("name"))
            .and_then(|v| v.as_str())
        {
            Some(n) => n,
            None => return McpResponse::error(id, McpError::invalid_params("Missing prompt name")),
        };

        match prompt_messages(name) {
            Some(messages) => McpResponse::success(id, json!({ "messages": messages })),
            None => McpResponse::error(
                id,
                McpError::invalid_params(format!("Unknown prompt: {}", name)),
            ),
        }
    }
}

async fn send_response(tx: &mpsc::Sender<String>, response: &McpResponse) {
    match serde_json::to_string(response) {
        Ok(line) => {
            debug!("Sending: {}", line);
            if tx.send(line).await.is_err() {
                warn!("Dropping response: stdout writer has stopped");
            }
        }
        Err(e) => error!("Failed to serialize response: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nrepl::testing::serve_once;
    use std::time::Duration;

    fn server(port: u16) -> McpServer {
        McpServer::with_client(
            NreplClient::new("127.0.0.1", port).with_timeout(Duration::from_secs(2)),
            false,
        )
    }

    fn request(method: &str, params: Option<Value>) -> McpRequest {
        McpRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(json!(7)),
            method: method.to_string(),
            params,
        }
    }

    #[tokio::test]
    async fn test_initialize_advertises_tools_and_prompts() {
        let resp = server(1).handle_request(request("initialize", None)).await;
        let result = resp.result.unwrap();
        assert_eq!(result["serverInfo"]["name"], "nrepl-mcp");
        assert!(result["capabilities"]["tools"].is_object());
        assert!(result["capabilities"]["prompts"].is_object());
        assert_eq!(resp.id, Some(json!(7)));
    }

    #[tokio::test]
    async fn test_tools_list() {
        let resp = server(1).handle_request(request("tools/list", None)).await;
        let tools = resp.result.unwrap()["tools"].as_array().unwrap().len();
        assert_eq!(tools, 6);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let resp = server(1).handle_request(request("sampling/create", None)).await;
        assert_eq!(resp.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_wrong_jsonrpc_version() {
        let mut req = request("ping", None);
        req.jsonrpc = "1.0".to_string();
        let resp = server(1).handle_request(req).await;
        assert_eq!(resp.error.unwrap().code, -32600);
    }

    #[tokio::test]
    async fn test_tools_call_without_name() {
        let resp = server(1)
            .handle_request(request("tools/call", Some(json!({}))))
            .await;
        assert_eq!(resp.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_tools_call_evaluates() {
        let port = serve_once(b"d5:value1:26:statusl4:doneee".to_vec()).await;
        let resp = server(port)
            .handle_request(request(
                "tools/call",
                Some(json!({"name": "eval_code", "arguments": {"code": "(+ 1 1)"}})),
            ))
            .await;
        let result = resp.result.unwrap();
        assert_eq!(result["content"][0]["text"], "2");
        assert_eq!(result["isError"], false);
    }

    #[tokio::test]
    async fn test_tools_call_connection_refused_is_a_result() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let resp = server(port)
            .handle_request(request(
                "tools/call",
                Some(json!({"name": "list_namespaces", "arguments": {}})),
            ))
            .await;
        assert!(resp.error.is_none());
        let result = resp.result.unwrap();
        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"]
            .as_str()
            .unwrap()
            .starts_with("Error: nREPL connection refused"));
    }

    #[tokio::test]
    async fn test_prompts_get() {
        let resp = server(1)
            .handle_request(request("prompts/get", Some(json!({"name": "basilisp-help"}))))
            .await;
        let result = resp.result.unwrap();
        assert_eq!(result["messages"][0]["role"], "user");
        assert_eq!(result["messages"][0]["content"]["type"], "text");

        let resp = server(1)
            .handle_request(request("prompts/get", Some(json!({"name": "missing"}))))
            .await;
        assert_eq!(resp.error.unwrap().code, -32602);
    }
}
