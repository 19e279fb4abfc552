//! nrepl-mcp CLI entry point

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use nrepl_mcp::{
    commands::{cmd_check, cmd_docs, cmd_eval, cmd_init, cmd_namespaces, cmd_ns_vars},
    config::Config,
    error::{Error, Result},
    mcp::McpServer,
    nrepl::{NreplClient, Outcome},
    render::render,
};
use std::path::{Path, PathBuf};
use tracing::{debug, error};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "nrepl-mcp")]
#[command(version, about = "MCP server that evaluates code in a Basilisp nREPL", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// nREPL host (overrides config)
    #[arg(long, global = true)]
    host: Option<String>,

    /// nREPL port (overrides config)
    #[arg(long, global = true)]
    nrepl_port: Option<u16>,

    /// Per-operation timeout in seconds (overrides config)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Print results without ANSI highlighting
    #[arg(long, global = true)]
    no_highlight: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server on stdio (default)
    Mcp,

    /// Evaluate Basilisp code
    Eval {
        /// Code to evaluate
        code: String,
    },

    /// Show documentation for a symbol
    Doc {
        /// Symbol to look up
        symbol: String,
    },

    /// List public vars and macros in a namespace
    Vars {
        /// Namespace to inspect
        namespace: String,
    },

    /// List loaded namespaces
    Namespaces,

    /// Check that the nREPL server is responding
    Check,

    /// Write a default config file
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    match run().await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    // stdout carries the MCP stream, so logs go to stderr
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let command = cli.command.unwrap_or(Commands::Mcp);

    if let Commands::Init { force } = command {
        return handle_init(cli.config.as_deref(), force).await;
    }

    if let Commands::Completions { shell } = command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "nrepl-mcp", &mut std::io::stdout());
        return Ok(0);
    }

    let mut config = match cli.config.as_deref() {
        Some(path) => Config::load(path)?,
        None => Config::load_from(None)?,
    };

    if let Some(host) = cli.host {
        config.nrepl.host = host;
    }
    if let Some(port) = cli.nrepl_port {
        config.nrepl.port = port;
    }
    if let Some(timeout) = cli.timeout {
        config.nrepl.timeout_secs = timeout;
    }
    if cli.no_highlight {
        config.output.highlight = false;
    }
    config.validate()?;
    debug!("Effective config: {:?}", config);

    let client = NreplClient::from_config(&config.nrepl);
    let highlight = config.output.highlight;

    match command {
        Commands::Mcp => {
            let server = McpServer::new(&config);
            server
                .run()
                .await
                .map_err(|e| Error::McpProtocol(e.to_string()))?;
            Ok(0)
        }
        Commands::Eval { code } => Ok(print_outcome(cmd_eval(&client, &code).await, highlight)),
        Commands::Doc { symbol } => {
            Ok(print_outcome(cmd_docs(&client, &symbol).await, highlight))
        }
        Commands::Vars { namespace } => Ok(print_outcome(
            cmd_ns_vars(&client, &namespace).await,
            highlight,
        )),
        Commands::Namespaces => Ok(print_outcome(cmd_namespaces(&client).await, highlight)),
        Commands::Check => {
            let status = cmd_check(&client).await;
            println!("{}", status);
            Ok(if status.is_connected() { 0 } else { 1 })
        }
        Commands::Init { .. } | Commands::Completions { .. } => unreachable!(),
    }
}

/// Print a rendered outcome, returning the process exit code
fn print_outcome(outcome: Outcome, highlight: bool) -> i32 {
    println!("{}", render(&outcome, highlight));
    if outcome.is_value() {
        0
    } else {
        1
    }
}

async fn handle_init(config: Option<&Path>, force: bool) -> Result<i32> {
    // A .toml path names the file itself; anything else is a directory
    let base_dir = match config {
        Some(path) if path.extension().map_or(false, |e| e == "toml") => path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(Config::default_base_dir),
        Some(path) => path.to_path_buf(),
        None => Config::default_base_dir(),
    };

    match cmd_init(Some(base_dir), force).await {
        Ok(path) => {
            println!("✓ nrepl-mcp initialized successfully");
            println!("  Config: {}", path.display());
            println!("\nNext steps:");
            println!("  1. Start a Basilisp nREPL server: basilisp nrepl-server");
            println!("  2. Edit the config file if it listens elsewhere");
            println!("  3. Register `nrepl-mcp mcp` with your MCP client");
            Ok(0)
        }
        Err(Error::AlreadyInitialized(path)) => {
            eprintln!(
                "Config file already exists at: {}\nUse --force to overwrite.",
                path
            );
            Ok(1)
        }
        Err(e) => Err(e),
    }
}
