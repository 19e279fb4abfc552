//! MCP (Model Context Protocol) server implementation
//!
//! Exposes nREPL evaluation as MCP tools over stdio.

mod prompts;
mod server;
mod tools;
mod types;

pub use server::McpServer;
pub use tools::{get_tool_definitions, handle_tool_call};
pub use types::{McpError, McpRequest, McpResponse, ToolResult};
