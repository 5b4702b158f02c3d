//! Hierarchical configuration loader with precedence
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. Home config (<dnvm home>/dnvm-config.yaml)
//! 3. Environment variables (DNVM_* prefix)
//! 4. CLI flags (handled by caller)

use crate::config::runtime_config::{normalize_url, RuntimeConfig};
use crate::error::{Error, Result};
use crate::home::CONFIG_FILE_NAME;
use camino::{Utf8Path, Utf8PathBuf};
use rust_embed::RustEmbed;
use serde::de::DeserializeOwned;
use std::env;
use std::fs;
use tracing::debug;

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

/// Configuration hierarchy loader
pub struct HierarchicalConfigLoader {
    /// Directory holding dnvm-config.yaml (the managed home)
    config_dir: Utf8PathBuf,
}

impl HierarchicalConfigLoader {
    /// Create a loader reading its config file from `config_dir`
    pub fn with_dir(config_dir: Utf8PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a loader for a std path, which must be valid UTF-8
    pub fn for_path(config_dir: &std::path::Path) -> Result<Self> {
        let config_dir = Utf8PathBuf::from_path_buf(config_dir.to_path_buf()).map_err(|p| {
            Error::invalid_config(format!("Config directory is not valid UTF-8: {}", p.display()))
        })?;
        Ok(Self::with_dir(config_dir))
    }

    /// Load runtime configuration with hierarchical precedence
    pub fn load_runtime_config(&self) -> Result<RuntimeConfig> {
        let mut config = Self::load_embedded_config::<RuntimeConfig>("runtime-defaults.yaml")?;

        let config_path = self.config_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            debug!("Loading configuration from {}", config_path);
            let file_config = self.load_yaml_file::<RuntimeConfig>(&config_path)?;
            config = Self::merge_runtime_config(config, file_config);
        }

        config = self.apply_env_overrides(config)?;

        config.feed.feed_url = normalize_url(&config.feed.feed_url);
        Ok(config)
    }

    /// Load an embedded configuration file
    fn load_embedded_config<T: DeserializeOwned>(filename: &str) -> Result<T> {
        let embedded_file = EmbeddedConfigs::get(filename).ok_or_else(|| {
            Error::invalid_config(format!("Embedded config not found: {}", filename))
        })?;

        let content = std::str::from_utf8(&embedded_file.data).map_err(|_| {
            Error::invalid_config(format!("Invalid UTF-8 in embedded config: {}", filename))
        })?;

        let config: T = serde_yaml_ng::from_str(content).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to parse embedded config {}: {}",
                filename, e
            ))
        })?;

        Ok(config)
    }

    /// Load a YAML file and parse it
    fn load_yaml_file<T: DeserializeOwned>(&self, path: &Utf8Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        let config: T = serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))?;
        Ok(config)
    }

    /// Merge two runtime configs (base is overridden by overlay)
    fn merge_runtime_config(_base: RuntimeConfig, overlay: RuntimeConfig) -> RuntimeConfig {
        // Every field of the overlay is defaulted on parse, so the overlay is
        // already complete.
        RuntimeConfig {
            feed: overlay.feed,
            network: overlay.network,
        }
    }

    /// Apply environment variable overrides to runtime config
    fn apply_env_overrides(&self, mut config: RuntimeConfig) -> Result<RuntimeConfig> {
        if let Ok(val) = env::var("DNVM_FEED_URL") {
            config.feed.feed_url = val;
        }

        if let Ok(val) = env::var("DNVM_RELEASES_URL") {
            config.feed.releases_url = val;
        }

        if let Ok(val) = env::var("DNVM_HTTP_TIMEOUT_SECS") {
            config.network.http_timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("DNVM_HTTP_TIMEOUT_SECS must be a valid number")
            })?;
        }

        Ok(config)
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime_config::{DEFAULT_FEED_URL, DEFAULT_RELEASES_URL};
    use serial_test::serial;
    use tempfile::TempDir;

    fn create_temp_loader() -> (HierarchicalConfigLoader, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let loader = HierarchicalConfigLoader::for_path(temp_dir.path()).unwrap();
        (loader, temp_dir)
    }

    #[test]
    #[serial]
    fn test_load_runtime_config_defaults() {
        let (loader, _temp) = create_temp_loader();
        let config = loader.load_runtime_config().unwrap();
        assert_eq!(config.feed.feed_url, DEFAULT_FEED_URL);
        assert_eq!(config.feed.releases_url, DEFAULT_RELEASES_URL);
        assert_eq!(config.network.http_timeout_secs, 300);
    }

    #[test]
    #[serial]
    fn test_load_runtime_config_from_file() {
        let (loader, _temp) = create_temp_loader();

        let config_content = r#"
feed:
  feed-url: "https://mirror.example.com/dotnet/"
network:
  http-timeout-secs: 60
"#;
        fs::write(loader.config_dir().join(CONFIG_FILE_NAME), config_content).unwrap();

        let config = loader.load_runtime_config().unwrap();
        assert_eq!(config.feed.feed_url, "https://mirror.example.com/dotnet");
        assert_eq!(config.feed.releases_url, DEFAULT_RELEASES_URL);
        assert_eq!(config.network.http_timeout_secs, 60);
    }

    #[test]
    #[serial]
    fn test_invalid_file_is_an_error() {
        let (loader, _temp) = create_temp_loader();
        fs::write(loader.config_dir().join(CONFIG_FILE_NAME), "feed: [1, 2").unwrap();

        let err = loader.load_runtime_config().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        let (loader, _temp) = create_temp_loader();

        env::set_var("DNVM_FEED_URL", "http://localhost:9999/");
        env::set_var("DNVM_HTTP_TIMEOUT_SECS", "5");

        let config = loader.load_runtime_config();

        env::remove_var("DNVM_FEED_URL");
        env::remove_var("DNVM_HTTP_TIMEOUT_SECS");

        let config = config.unwrap();
        assert_eq!(config.feed.feed_url, "http://localhost:9999");
        assert_eq!(config.network.http_timeout_secs, 5);
    }

    #[test]
    #[serial]
    fn test_bad_env_override() {
        let (loader, _temp) = create_temp_loader();

        env::set_var("DNVM_HTTP_TIMEOUT_SECS", "soon");
        let result = loader.load_runtime_config();
        env::remove_var("DNVM_HTTP_TIMEOUT_SECS");

        assert!(result.is_err());
    }
}
