//! Error types for dnvm-update

use dnvm_core::{Channel, SdkDirName};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using dnvm-update's error type
pub type Result<T> = std::result::Result<T, UpdateError>;

/// Errors raised while installing SDKs or replacing the dnvm executable
#[derive(Error, Debug)]
pub enum UpdateError {
    /// The feed could not be reached or returned something unusable
    #[error("Network failure fetching {url}: {message}")]
    NetworkFailure { url: String, message: String },

    /// The release index has no release line matching the channel
    #[error("No release found for channel '{channel}'")]
    ChannelNotFound { channel: Channel },

    /// Download, extraction or registration of an SDK failed
    #[error("Install failed: {message}")]
    InstallFailed { message: String },

    /// No SDK is installed in the requested directory
    #[error("No SDK is installed in '{dir}'")]
    SdkDirNotInstalled { dir: SdkDirName },

    /// Copying or swapping the dnvm executable failed
    #[error("Self-install failed: {message}")]
    SelfInstallFailed { message: String },

    /// dnvm is already installed in the managed home
    #[error("dnvm is already installed at {}", path.display())]
    AlreadyInstalled { path: PathBuf },

    /// Error from dnvm-core (manifest, configuration, environment)
    #[error(transparent)]
    Core(#[from] dnvm_core::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl UpdateError {
    /// Create a network failure error
    pub fn network(url: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::NetworkFailure {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create an install failure error
    pub fn install_failed(message: impl Into<String>) -> Self {
        Self::InstallFailed {
            message: message.into(),
        }
    }

    /// Create a self-install failure error
    pub fn self_install_failed(message: impl Into<String>) -> Self {
        Self::SelfInstallFailed {
            message: message.into(),
        }
    }
}
