//! Layout of the managed home directory
//!
//! ```text
//! <home>/
//!   dnvm[.exe]              installed executable
//!   dnvm[.exe].bak          previous executable during a self-update
//!   dnvmManifest.json       manifest
//!   dnvm-config.yaml        optional user configuration
//!   env                     shell environment script (Unix)
//!   dn/ preview/ ...        one directory per SdkDirName
//!   current -> dn           link to the current SDK directory
//!   dotnet -> dn/dotnet     link to the current dotnet executable (Unix)
//! ```

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::manifest::{ManifestStore, MANIFEST_FILE_NAME};
use crate::sdk_dir::SdkDirName;

/// Platform executable suffix
pub const EXE_SUFFIX: &str = std::env::consts::EXE_SUFFIX;

/// Environment variable overriding the managed home location
pub const HOME_ENV_VAR: &str = "DNVM_HOME";

/// Name of the optional configuration file inside the home
pub const CONFIG_FILE_NAME: &str = "dnvm-config.yaml";

/// Name of the environment script inside the home
pub const ENV_SCRIPT_NAME: &str = "env";

/// Name of the link to the current SDK directory
pub const CURRENT_LINK_NAME: &str = "current";

/// The managed home directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnvmHome {
    root: PathBuf,
}

impl DnvmHome {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the home from `DNVM_HOME`, falling back to the platform's
    /// per-user data directory
    pub fn from_env() -> Result<Self> {
        if let Some(root) = std::env::var_os(HOME_ENV_VAR).filter(|v| !v.is_empty()) {
            return Ok(Self::new(root));
        }
        Self::default_location().map(Self::new)
    }

    /// `<local data dir>/dnvm`
    pub fn default_location() -> Result<PathBuf> {
        dirs::data_local_dir()
            .map(|d| d.join("dnvm"))
            .ok_or(Error::HomeNotFound)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE_NAME)
    }

    pub fn manifest_store(&self) -> ManifestStore {
        ManifestStore::new(self.manifest_path())
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    pub fn env_script_path(&self) -> PathBuf {
        self.root.join(ENV_SCRIPT_NAME)
    }

    /// Canonical path of the installed executable
    pub fn exe_path(&self) -> PathBuf {
        self.root.join(format!("dnvm{}", EXE_SUFFIX))
    }

    /// Backup path used while swapping the executable
    pub fn backup_exe_path(&self) -> PathBuf {
        self.root.join(format!("dnvm{}.bak", EXE_SUFFIX))
    }

    /// Directory holding the SDKs installed into `dir`
    pub fn sdk_dir(&self, dir: &SdkDirName) -> PathBuf {
        self.root.join(dir)
    }

    /// `dotnet` executable inside an SDK directory
    pub fn dotnet_exe(&self, dir: &SdkDirName) -> PathBuf {
        self.sdk_dir(dir).join(format!("dotnet{}", EXE_SUFFIX))
    }

    pub fn current_link(&self) -> PathBuf {
        self.root.join(CURRENT_LINK_NAME)
    }

    /// Link to the current `dotnet` executable in the home root
    pub fn dotnet_link(&self) -> PathBuf {
        self.root.join(format!("dotnet{}", EXE_SUFFIX))
    }

    /// Whether `exe` is the installed executable of this home
    pub fn is_installed_exe(&self, exe: &Path) -> bool {
        match (exe.canonicalize(), self.exe_path().canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}
