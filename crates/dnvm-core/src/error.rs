//! Error types for dnvm-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using dnvm-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for dnvm
#[derive(Error, Debug)]
pub enum Error {
    /// A channel string that is neither a known token nor `major.minor`
    #[error("Invalid channel: {value}. Expected one of: lts, sts, latest, preview, or <major>.<minor>")]
    InvalidChannel { value: String },

    /// A directory name that cannot be used as an SDK install directory
    #[error("Invalid SDK directory name '{name}': {reason}")]
    InvalidSdkDirName { name: String, reason: String },

    /// No manifest has been written yet
    #[error("Manifest not found: {}", path.display())]
    ManifestNotFound { path: PathBuf },

    /// The manifest carries a schema version this build does not understand
    #[error("Unrecognized manifest schema in {}: {reason}", path.display())]
    InvalidSchema { path: PathBuf, reason: String },

    /// The manifest exists but cannot be used
    #[error("Manifest at {} is corrupt: {message}", path.display())]
    CorruptManifest { path: PathBuf, message: String },

    /// Invalid configuration format
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Home directory could not be determined
    #[error("Could not determine home directory")]
    HomeNotFound,

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid channel error
    pub fn invalid_channel(value: impl Into<String>) -> Self {
        Self::InvalidChannel {
            value: value.into(),
        }
    }

    /// Create an invalid SDK directory name error
    pub fn invalid_sdk_dir(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSdkDirName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid schema error
    pub fn invalid_schema(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidSchema {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a corrupt manifest error
    pub fn corrupt_manifest(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::CorruptManifest {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Whether this error means "no manifest yet" rather than a real failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ManifestNotFound { .. })
    }
}
