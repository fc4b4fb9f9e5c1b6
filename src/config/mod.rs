//! Configuration management for relcache
//!
//! Once a config file is loaded, relative cache paths (including the
//! defaults for keys the file omits) are taken relative to the directory
//! holding that file. Without a file the defaults stay relative to the
//! working directory.

pub mod schema;

pub use schema::Config;

use crate::error::{RelcacheError, RelcacheResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("relcache")
            .join("config.toml")
    }

    /// Load configuration, using defaults if the file does not exist
    pub async fn load(&self) -> RelcacheResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> RelcacheResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| RelcacheError::io(format!("reading config from {}", path.display()), e))?;

        let mut config: Config = toml::from_str(&content).map_err(|e| RelcacheError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.cache.root = resolve_relative(base, &config.cache.root);
        config.cache.packages_root = resolve_relative(base, &config.cache.packages_root);
        debug!(
            "Cache root {} and packages root {} from {}",
            config.cache.root.display(),
            config.cache.packages_root.display(),
            path.display()
        );

        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> RelcacheResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            RelcacheError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> RelcacheResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| RelcacheError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

/// `path` joined onto `base` unless it is already absolute
fn resolve_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    // "./metadata_dir" and "metadata_dir" resolve to the same place
    let trimmed: PathBuf = path
        .components()
        .filter(|c| !matches!(c, std::path::Component::CurDir))
        .collect();
    base.join(trimmed)
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_default_when_missing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nonexistent.toml");
        let manager = ConfigManager::with_path(path);

        let config = manager.load().await.unwrap();
        assert_eq!(config.cache.root, PathBuf::from("./metadata_dir"));
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/config.toml");
        let manager = ConfigManager::with_path(path);

        let mut config = Config::default();
        config.cache.root = PathBuf::from("/var/cache/relcache");

        manager.save(&config).await.unwrap();
        let loaded = manager.load().await.unwrap();

        assert_eq!(loaded.cache.root, PathBuf::from("/var/cache/relcache"));
    }

    #[tokio::test]
    async fn relative_cache_paths_follow_config_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("site/config.toml");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            "[cache]\nroot = \"./metadata_dir\"\npackages_root = \"/srv/packages\"\n",
        )
        .unwrap();

        let config = ConfigManager::with_path(path).load().await.unwrap();
        assert_eq!(config.cache.root, temp.path().join("site/metadata_dir"));
        assert_eq!(config.cache.packages_root, PathBuf::from("/srv/packages"));
    }

    #[tokio::test]
    async fn omitted_cache_paths_resolve_next_to_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[upstream]\ntimeout_secs = 5\n").unwrap();

        let config = ConfigManager::with_path(path).load().await.unwrap();
        assert_eq!(config.cache.root, temp.path().join("metadata_dir"));
        assert_eq!(config.cache.packages_root, temp.path().join("packages"));
        assert_eq!(config.upstream.timeout_secs, 5);
    }

    #[tokio::test]
    async fn invalid_file_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[cache\nroot = 1").unwrap();

        let err = ConfigManager::with_path(path.clone()).load().await.unwrap_err();
        match err {
            RelcacheError::ConfigInvalid { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
