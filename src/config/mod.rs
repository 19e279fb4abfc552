//! Configuration management for nrepl-mcp
//!
//! Handles loading, saving, and validating configuration from TOML files.
//! A missing config file is not an error: every field has a default.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// nREPL connection settings
    #[serde(default)]
    pub nrepl: NreplConfig,

    /// Result formatting
    #[serde(default)]
    pub output: OutputConfig,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// nREPL connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NreplConfig {
    /// Host the nREPL server listens on
    #[serde(default = "default_nrepl_host")]
    pub host: String,

    /// nREPL server port
    #[serde(default = "default_nrepl_port")]
    pub port: u16,

    /// Timeout in seconds for each socket operation
    #[serde(default = "default_nrepl_timeout")]
    pub timeout_secs: u64,

    /// Maximum reads while waiting for an evaluation to report `done`
    #[serde(default = "default_nrepl_max_reads")]
    pub max_reads: usize,

    /// Bytes requested per socket read
    #[serde(default = "default_nrepl_read_buffer_size")]
    pub read_buffer_size: usize,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Colorize successful results with ANSI escapes
    #[serde(default = "default_highlight")]
    pub highlight: bool,
}

/// Internal paths configuration
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Base directory for nrepl-mcp data
    pub base_dir: PathBuf,

    /// Path to config file
    pub config_file: PathBuf,
}

impl Default for NreplConfig {
    fn default() -> Self {
        Self {
            host: default_nrepl_host(),
            port: default_nrepl_port(),
            timeout_secs: default_nrepl_timeout(),
            max_reads: default_nrepl_max_reads(),
            read_buffer_size: default_nrepl_read_buffer_size(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            highlight: default_highlight(),
        }
    }
}

impl Config {
    /// Get the default base directory (~/.nrepl-mcp)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".nrepl-mcp")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    /// Initialize paths configuration
    fn init_paths(&mut self, base_dir: Option<PathBuf>) {
        let base = base_dir.unwrap_or_else(Self::default_base_dir);
        self.paths = PathsConfig {
            config_file: base.join("config.toml"),
            base_dir: base,
        };
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        let base = config_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        config.paths = PathsConfig {
            config_file: config_path.to_path_buf(),
            base_dir: base,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a base directory, falling back to defaults
    pub fn load_from(base_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = Config::default();
        config.init_paths(base_dir);

        if config.paths.config_file.exists() {
            debug!("Loading config from {:?}", config.paths.config_file);
            let content = std::fs::read_to_string(&config.paths.config_file)?;
            let mut loaded: Config = toml::from_str(&content)?;
            loaded.paths = config.paths;
            config = loaded;
        } else {
            debug!("No config file found, using defaults");
        }

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.paths.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.paths.config_file, content)?;
        info!("Saved config to {:?}", self.paths.config_file);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.nrepl.host.trim().is_empty() {
            return Err(Error::Config("nrepl.host must not be empty".to_string()));
        }

        if self.nrepl.port == 0 {
            return Err(Error::Config("nrepl.port must be non-zero".to_string()));
        }

        if self.nrepl.timeout_secs == 0 {
            return Err(Error::Config(
                "nrepl.timeout_secs must be positive".to_string(),
            ));
        }

        if self.nrepl.max_reads == 0 {
            return Err(Error::Config("nrepl.max_reads must be at least 1".to_string()));
        }

        if self.nrepl.read_buffer_size < 64 {
            return Err(Error::Config(
                "nrepl.read_buffer_size must be at least 64 bytes".to_string(),
            ));
        }

        Ok(())
    }
}
