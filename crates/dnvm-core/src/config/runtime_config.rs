//! Runtime configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::home::DnvmHome;

pub const DEFAULT_FEED_URL: &str = "https://dotnetcli.azureedge.net/dotnet";
pub const DEFAULT_RELEASES_URL: &str =
    "https://github.com/dn-vm/dn-vm.github.io/raw/gh-pages/releases.json";

/// Complete runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuntimeConfig {
    /// Where SDKs and dnvm releases come from
    #[serde(default)]
    pub feed: FeedConfig,

    /// HTTP settings
    #[serde(default)]
    pub network: NetworkConfig,
}

/// Feed locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FeedConfig {
    /// Base URL of the SDK feed
    #[serde(default = "default_feed_url")]
    pub feed_url: String,

    /// URL of the dnvm release descriptor
    #[serde(default = "default_releases_url")]
    pub releases_url: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            releases_url: default_releases_url(),
        }
    }
}

/// Network and HTTP configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkConfig {
    /// HTTP timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// User agent string for HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: default_http_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_string()
}

fn default_releases_url() -> String {
    DEFAULT_RELEASES_URL.to_string()
}

fn default_http_timeout() -> u64 {
    300
}

fn default_user_agent() -> String {
    format!("dnvm/{}", env!("CARGO_PKG_VERSION"))
}

/// Trim trailing slashes so URLs can be joined with `/`
pub fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Locations every command works against
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// The managed home
    pub home: DnvmHome,

    /// The user's home directory (shell profiles live here)
    pub user_home: PathBuf,
}

impl GlobalOptions {
    pub fn new(home: DnvmHome, user_home: impl Into<PathBuf>) -> Self {
        Self {
            home,
            user_home: user_home.into(),
        }
    }

    /// Resolve from `DNVM_HOME` / `HOME`
    pub fn from_env() -> crate::Result<Self> {
        Ok(Self {
            home: DnvmHome::from_env()?,
            user_home: crate::utils::get_home_dir()?,
        })
    }
}
