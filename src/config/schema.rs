//! Configuration schema for relcache
//!
//! Configuration is stored at `~/.config/relcache/config.toml`

use crate::catalog::Catalog;
use crate::error::{RelcacheError, RelcacheResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Local cache layout and mirroring
    pub cache: CacheConfig,

    /// Remote release service
    pub upstream: UpstreamConfig,

    /// Known products
    pub catalog: CatalogConfig,
}

impl Config {
    /// Build the project catalog, falling back to the built-in products
    pub fn catalog(&self) -> RelcacheResult<Catalog> {
        match &self.catalog.projects {
            Some(projects) => Catalog::new(projects),
            None => Ok(Catalog::default()),
        }
    }

    /// Parsed `cache.mirror_base_url`, if set
    pub fn mirror_base_url(&self) -> RelcacheResult<Option<Url>> {
        self.cache
            .mirror_base_url
            .as_deref()
            .map(|raw| {
                Url::parse(raw).map_err(|e| RelcacheError::ConfigInvalid {
                    path: "cache.mirror_base_url".into(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Cache layout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding one subdirectory per channel
    pub root: PathBuf,

    /// Directory receiving mirrored artifacts
    pub packages_root: PathBuf,

    /// Mirror artifacts and use the unified backend (default: false)
    pub mirror: bool,

    /// When mirroring, rewrite package URLs to this base
    pub mirror_base_url: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./metadata_dir"),
            packages_root: PathBuf::from("./packages"),
            mirror: false,
            mirror_base_url: None,
        }
    }
}

/// Remote release service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Endpoint used without mirroring
    pub endpoint: String,

    /// Endpoint used when mirroring is enabled
    pub mirror_endpoint: String,

    /// Timeout for every network call, in seconds
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://packages.example.com".to_string(),
            mirror_endpoint: "https://packages-acceptance.example.com".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Product catalog override
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Replaces the built-in product list when set
    pub projects: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[cache]"));
        assert!(toml.contains("[upstream]"));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.cache.root, PathBuf::from("./metadata_dir"));
        assert!(!config.cache.mirror);
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [cache]
            mirror = true

            [catalog]
            projects = ["widget"]
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.cache.mirror);
        assert_eq!(config.upstream.timeout_secs, 60); // default preserved
        assert_eq!(config.catalog().unwrap().projects().len(), 1);
    }

    #[test]
    fn invalid_mirror_base_url() {
        let mut config = Config::default();
        assert!(config.mirror_base_url().unwrap().is_none());

        config.cache.mirror_base_url = Some("::".to_string());
        assert!(config.mirror_base_url().is_err());
    }
}
