//! User environment synchronization
//!
//! Keeps `PATH` and `DOTNET_ROOT` pointing at the managed home. Two backends
//! sit behind [`EnvironmentSync`]:
//!
//! - [`UserVariableSync`] writes persistent per-user variables directly
//!   (the registry on Windows). New terminals only see the change after a
//!   restart, so callers must tell the user.
//! - [`ShellProfileSync`] writes an `env` script into the home and sources it
//!   from the user's shell start-up files.
//!
//! [`default_sync`] picks the backend for the running platform.

mod profile;
#[cfg(windows)]
mod registry;
mod vars;

pub use profile::{render_env_script, source_line, ShellProfileSync, PROFILE_FILES};
#[cfg(windows)]
pub use registry::RegistryVarStore;
pub use vars::{MemoryVarStore, ProcessVarStore, UserVarStore};

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::home::DnvmHome;
use crate::sdk_dir::SdkDirName;

pub const PATH_VAR: &str = "PATH";
pub const DOTNET_ROOT_VAR: &str = "DOTNET_ROOT";

/// Separator between `PATH` entries
#[cfg(windows)]
pub const PATH_SEPARATOR: char = ';';
#[cfg(not(windows))]
pub const PATH_SEPARATOR: char = ':';

/// Locations that must be visible in the user environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPaths {
    /// Managed home; goes on `PATH`
    pub home: PathBuf,

    /// Current SDK directory; becomes `DOTNET_ROOT`
    pub sdk_dir: PathBuf,
}

impl InstallPaths {
    pub fn new(home: &DnvmHome, sdk_dir: &SdkDirName) -> Self {
        Self {
            home: home.root().to_path_buf(),
            sdk_dir: home.sdk_dir(sdk_dir),
        }
    }
}

/// What an [`EnvironmentSync::apply`] call changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Human-readable list of changes
    pub changes: Vec<String>,

    /// Files that could not be updated (best effort)
    pub skipped: Vec<PathBuf>,

    /// Warnings the user should see
    pub warnings: Vec<String>,
}

/// Platform environment backend
pub trait EnvironmentSync {
    /// Read a persistent user variable
    fn get(&self, name: &str) -> Result<Option<String>>;

    /// Write a persistent user variable
    fn set(&mut self, name: &str, value: &str) -> Result<()>;

    /// Make `paths` visible to new shells
    fn apply(&mut self, paths: &InstallPaths) -> Result<SyncReport>;

    /// Re-point an existing setup at `paths` after a self-update or a change
    /// of the current SDK directory. Never adds new profile entries.
    fn refresh(&mut self, paths: &InstallPaths) -> Result<SyncReport>;

    /// Drop `entry` from `PATH` if present
    fn remove_from_path(&mut self, entry: &Path) -> Result<()> {
        let Some(current) = self.get(PATH_VAR)? else {
            return Ok(());
        };
        let entry = entry.to_string_lossy();
        let kept: Vec<&str> = current
            .split(PATH_SEPARATOR)
            .filter(|p| *p != entry)
            .collect();
        let updated = kept.join(&PATH_SEPARATOR.to_string());
        if updated != current {
            debug!("Removing {} from PATH", entry);
            self.set(PATH_VAR, &updated)?;
        }
        Ok(())
    }

    /// Whether `DOTNET_ROOT` or `PATH` do not yet point at `paths`
    fn missing_from_env(&self, paths: &InstallPaths) -> Result<bool> {
        let dotnet_root = self.get(DOTNET_ROOT_VAR)?;
        let path = self.get(PATH_VAR)?.unwrap_or_default();
        let sdk_dir = paths.sdk_dir.to_string_lossy();

        Ok(dotnet_root.as_deref() != Some(&*sdk_dir)
            || !path_contains(&path, &paths.home))
    }

    /// Whether the user must restart their terminal to see the change
    fn needs_restart_notice(&self) -> bool;
}

/// Whether `path_var` has `entry` as one of its entries
pub fn path_contains(path_var: &str, entry: &Path) -> bool {
    let entry = entry.to_string_lossy();
    path_var.split(PATH_SEPARATOR).any(|p| p == entry)
}

/// Backend writing persistent user variables directly
#[derive(Debug)]
pub struct UserVariableSync<S: UserVarStore> {
    store: S,
}

impl<S: UserVarStore> UserVariableSync<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: UserVarStore> EnvironmentSync for UserVariableSync<S> {
    fn get(&self, name: &str) -> Result<Option<String>> {
        self.store.get(name)
    }

    fn set(&mut self, name: &str, value: &str) -> Result<()> {
        self.store.set(name, value)
    }

    fn apply(&mut self, paths: &InstallPaths) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        if let Some(system_path) = self.store.system_path()? {
            let shadowed = system_path
                .split(PATH_SEPARATOR)
                .filter(|p| !p.is_empty())
                .any(|p| Path::new(p).join("dotnet.exe").is_file());
            if shadowed {
                let message = "Found 'dotnet.exe' inside the system PATH. The system PATH is \
                    searched before the user PATH, so the dnvm-installed dotnet will not be used \
                    until it is removed from the system PATH."
                    .to_string();
                warn!("{}", message);
                report.warnings.push(message);
            }
        }

        let current = self.store.get(PATH_VAR)?.unwrap_or_default();
        if !path_contains(&current, &paths.home) {
            let home = paths.home.to_string_lossy();
            let updated = if current.is_empty() {
                home.to_string()
            } else {
                format!("{}{}{}", home, PATH_SEPARATOR, current)
            };
            info!("Adding install directory to user PATH: {}", home);
            self.store.set(PATH_VAR, &updated)?;
            report.changes.push(format!("Added {} to PATH", home));
        }

        let sdk_dir = paths.sdk_dir.to_string_lossy();
        if self.store.get(DOTNET_ROOT_VAR)?.as_deref() != Some(&*sdk_dir) {
            info!("Setting DOTNET_ROOT: {}", sdk_dir);
            self.store.set(DOTNET_ROOT_VAR, &sdk_dir)?;
            report.changes.push(format!("Set DOTNET_ROOT to {}", sdk_dir));
        }

        Ok(report)
    }

    fn refresh(&mut self, paths: &InstallPaths) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        // Older installs put the SDK directory itself on PATH
        if path_contains(&self.store.get(PATH_VAR)?.unwrap_or_default(), &paths.sdk_dir) {
            self.remove_from_path(&paths.sdk_dir)?;
            report
                .changes
                .push(format!("Removed {} from PATH", paths.sdk_dir.display()));
        }

        let sdk_dir = paths.sdk_dir.to_string_lossy();
        match self.store.get(DOTNET_ROOT_VAR)? {
            Some(root) if root != sdk_dir => {
                self.store.set(DOTNET_ROOT_VAR, &sdk_dir)?;
                report.changes.push(format!("Set DOTNET_ROOT to {}", sdk_dir));
            }
            _ => {}
        }

        Ok(report)
    }

    fn needs_restart_notice(&self) -> bool {
        true
    }
}

/// The backend for the running platform
#[cfg(windows)]
pub fn default_sync(_home: &DnvmHome, _user_home: &Path) -> Box<dyn EnvironmentSync> {
    Box::new(UserVariableSync::new(RegistryVarStore::new()))
}

/// The backend for the running platform
#[cfg(not(windows))]
pub fn default_sync(home: &DnvmHome, user_home: &Path) -> Box<dyn EnvironmentSync> {
    Box::new(ShellProfileSync::new(
        home.env_script_path(),
        user_home,
        ProcessVarStore,
    ))
}
