//! CLI commands implementation
//!
//! Each command is shared by the CLI subcommands and the MCP tools.

pub mod check;
pub mod eval;
pub mod init;
pub mod namespaces;

pub use check::*;
pub use eval::*;
pub use init::*;
pub use namespaces::*;
