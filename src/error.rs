//! Custom error types for nrepl-mcp

use thiserror::Error;

/// Main error type for nrepl-mcp operations
///
/// Evaluation failures never show up here: the nREPL client folds them into
/// an [`Outcome`](crate::nrepl::Outcome).
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("MCP protocol error: {0}")]
    McpProtocol(String),
}

/// Result type alias for nrepl-mcp
pub type Result<T> = std::result::Result<T, Error>;
