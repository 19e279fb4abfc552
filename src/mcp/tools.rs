//! MCP tool definitions and handlers

use super::types::{ToolDefinition, ToolResult};
use crate::commands::{cmd_check, cmd_docs, cmd_eval, cmd_namespaces, cmd_ns_vars};
use crate::nrepl::{NreplClient, Outcome};
use crate::render::render;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Get all available tool definitions
pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    let code_schema = json!({
        "type": "object",
        "properties": {
            "code": {
                "type": "string",
                "description": "Basilisp code to evaluate"
            }
        },
        "required": ["code"]
    });

    vec![
        ToolDefinition {
            name: "eval_code".to_string(),
            description: "Evaluate Basilisp code in nREPL and return the result.".to_string(),
            input_schema: code_schema.clone(),
        },
        ToolDefinition {
            name: "execute_basilisp".to_string(),
            description: "Execute Basilisp code in nREPL (alias for eval_code).".to_string(),
            input_schema: code_schema,
        },
        ToolDefinition {
            name: "get_docs".to_string(),
            description: "Get documentation for a Basilisp symbol.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "symbol": {
                        "type": "string",
                        "description": "The Basilisp symbol to get documentation for"
                    }
                },
                "required": ["symbol"]
            }),
        },
        ToolDefinition {
            name: "find_namespace_vars".to_string(),
            description: "List all public vars and macros in a namespace.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "namespace": {
                        "type": "string",
                        "description": "The namespace to list vars from"
                    }
                },
                "required": ["namespace"]
            }),
        },
        ToolDefinition {
            name: "list_namespaces".to_string(),
            description: "List all available namespaces.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        },
        ToolDefinition {
            name: "check_connection".to_string(),
            description: "Check if the nREPL server is running and responding.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        },
    ]
}

/// Handle a tool call. Never fails: every problem becomes an error result.
pub async fn handle_tool_call(
    name: &str,
    arguments: &HashMap<String, Value>,
    client: &NreplClient,
    highlight: bool,
) -> ToolResult {
    match name {
        "eval_code" | "execute_basilisp" => match required_str(arguments, "code") {
            Ok(code) => to_tool_result(cmd_eval(client, code).await, highlight),
            Err(e) => e,
        },
        "get_docs" => match required_str(arguments, "symbol") {
            Ok(symbol) => to_tool_result(cmd_docs(client, symbol).await, highlight),
            Err(e) => e,
        },
        "find_namespace_vars" => match required_str(arguments, "namespace") {
            Ok(namespace) => to_tool_result(cmd_ns_vars(client, namespace).await, highlight),
            Err(e) => e,
        },
        "list_namespaces" => to_tool_result(cmd_namespaces(client).await, highlight),
        "check_connection" => ToolResult::text(cmd_check(client).await.to_string()),
        _ => ToolResult::error(format!("Unknown tool: {}", name)),
    }
}

fn to_tool_result(outcome: Outcome, highlight: bool) -> ToolResult {
    let text = render(&outcome, highlight);
    if outcome.is_value() {
        ToolResult::text(text)
    } else {
        ToolResult::error(text)
    }
}

fn required_str<'a>(
    arguments: &'a HashMap<String, Value>,
    key: &str,
) -> std::result::Result<&'a str, ToolResult> {
    match arguments.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.as_str()),
        _ => Err(ToolResult::error(format!(
            "Missing required parameter: {}",
            key
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nrepl::testing::serve_once;
    use std::time::Duration;

    fn args(pairs: &[(&str, &str)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect()
    }

    #[test]
    fn test_tool_definitions() {
        let names: Vec<String> = get_tool_definitions().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "eval_code",
                "execute_basilisp",
                "get_docs",
                "find_namespace_vars",
                "list_namespaces",
                "check_connection"
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_argument_is_reported() {
        let client = NreplClient::new("127.0.0.1", 1);
        let result = handle_tool_call("get_docs", &HashMap::new(), &client, false).await;
        assert_eq!(result.is_error, Some(true));
        assert_eq!(result.first_text(), Some("Missing required parameter: symbol"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let client = NreplClient::new("127.0.0.1", 1);
        let result = handle_tool_call("rm_rf", &HashMap::new(), &client, false).await;
        assert_eq!(result.first_text(), Some("Unknown tool: rm_rf"));
    }

    #[tokio::test]
    async fn test_eval_code_value() {
        let port = serve_once(b"d5:value1:26:statusl4:doneee".to_vec()).await;
        let client = NreplClient::new("127.0.0.1", port).with_timeout(Duration::from_secs(2));

        let result =
            handle_tool_call("execute_basilisp", &args(&[("code", "(+ 1 1)")]), &client, false)
                .await;
        assert_eq!(result.is_error, None);
        assert_eq!(result.first_text(), Some("2"));
    }

    #[tokio::test]
    async fn test_eval_code_error_is_flagged() {
        let port = serve_once(b"d3:err9:bad input6:statusl4:doneee".to_vec()).await;
        let client = NreplClient::new("127.0.0.1", port).with_timeout(Duration::from_secs(2));

        let result =
            handle_tool_call("eval_code", &args(&[("code", "(oops")]), &client, true).await;
        assert_eq!(result.is_error, Some(true));
        assert_eq!(result.first_text(), Some("Error: bad input"));
    }
}
