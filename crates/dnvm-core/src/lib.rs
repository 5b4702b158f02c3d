//! # dnvm-core
//!
//! Core library for dnvm providing:
//! - Release channels (`lts`, `sts`, `latest`, `preview`, `major.minor`)
//! - The installation manifest, its schema history and atomic persistence
//! - The layout of the managed home directory
//! - Runtime configuration loading
//! - Cross-platform user environment synchronization (PATH / DOTNET_ROOT)
//!
//! A managed home is meant to be used by one dnvm process at a time; nothing
//! locks it (see [`manifest::ManifestStore`]).

pub mod channel;
pub mod config;
pub mod env;
pub mod error;
pub mod home;
pub mod manifest;
pub mod sdk_dir;
pub mod utils;

pub use channel::Channel;
pub use config::{GlobalOptions, HierarchicalConfigLoader, RuntimeConfig};
pub use error::{Error, Result};
pub use home::{DnvmHome, EXE_SUFFIX};
pub use manifest::{InstalledSdk, Manifest, ManifestStore, TrackedChannel};
pub use sdk_dir::SdkDirName;
pub use utils::get_home_dir;
