//! nrepl-mcp - An MCP server backed by a Basilisp nREPL
//!
//! This crate provides:
//! - A minimal bencode codec and a per-evaluation nREPL client
//! - Rendering of evaluation results (traceback condensing, highlighting)
//! - An MCP server over stdio exposing evaluation as tools
//! - CLI commands running the same operations from a shell

pub mod commands;
pub mod config;
pub mod error;
pub mod mcp;
pub mod nrepl;
pub mod render;

pub use config::Config;
pub use error::{Error, Result};
