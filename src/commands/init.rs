//! Init command implementation

use crate::config::Config;
use crate::error::{Error, Result};
use std::path::PathBuf;
use tracing::info;

/// Write a default config file, returning its path
pub async fn cmd_init(base_dir: Option<PathBuf>, force: bool) -> Result<PathBuf> {
    let mut config = Config::default();
    let base = base_dir.unwrap_or_else(Config::default_base_dir);
    config.paths.config_file = base.join("config.toml");
    config.paths.base_dir = base;

    if config.paths.config_file.exists() && !force {
        return Err(Error::AlreadyInitialized(
            config.paths.config_file.display().to_string(),
        ));
    }

    config.save()?;
    info!("Initialized config at {:?}", config.paths.config_file);
    Ok(config.paths.config_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_writes_loadable_config() {
        let tmp = TempDir::new().unwrap();
        let path = cmd_init(Some(tmp.path().to_path_buf()), false).await.unwrap();
        assert!(path.exists());
        assert!(Config::load(&path).is_ok());
    }

    #[tokio::test]
    async fn test_init_refuses_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        cmd_init(Some(tmp.path().to_path_buf()), false).await.unwrap();

        let err = cmd_init(Some(tmp.path().to_path_buf()), false).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyInitialized(_)));

        assert!(cmd_init(Some(tmp.path().to_path_buf()), true).await.is_ok());
    }
}
