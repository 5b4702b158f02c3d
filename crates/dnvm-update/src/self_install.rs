//! Installing dnvm into its managed home and updating it in place
//!
//! ```text
//! NotInstalled --install--> Installed
//! Installed --self_update--> Installed | (rolled back) Installed
//! ```
//!
//! Both entry points first check that the running process is a single-file
//! dnvm executable; nothing on disk is touched otherwise.

use dnvm_core::config::RuntimeConfig;
use dnvm_core::env::{EnvironmentSync, InstallPaths, SyncReport};
use dnvm_core::{Channel, DnvmHome, SdkDirName, EXE_SUFFIX};
use semver::Version;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::download::{extract, ArchiveFetcher, ArchiveKind};
use crate::error::{Result, UpdateError};
use crate::install::{InstallOutcome, SdkInstaller};
use crate::link::retarget_current;
use crate::releases::{current_rid, ToolRelease, ToolReleaseFeed};
use crate::updater::{make_executable, verify_binary, BinarySwap, FileOps, StdFileOps, SwapReport};

/// Refuse to self-install from anything but a standalone `dnvm` executable
/// (for example `cargo run`, a test harness or a renamed copy).
pub fn ensure_self_contained(exe: &Path) -> Result<()> {
    let meta = fs::metadata(exe).map_err(|e| {
        UpdateError::self_install_failed(format!(
            "Cannot inspect running executable {}: {}",
            exe.display(),
            e
        ))
    })?;

    let stem = exe.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    if !meta.is_file() || stem != "dnvm" {
        return Err(UpdateError::self_install_failed(format!(
            "{} is not a self-contained dnvm executable; self-install is only supported from a \
             single-file dnvm build",
            exe.display()
        )));
    }

    Ok(())
}

/// Whether dnvm is present in the managed home
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallState {
    NotInstalled,
    Installed { exe: PathBuf },
}

/// Options for a fresh self-install
#[derive(Debug, Clone)]
pub struct SelfInstallOptions {
    pub channel: Channel,
    pub sdk_dir: Option<SdkDirName>,
    pub force: bool,
    pub update_user_environment: bool,
}

/// What a fresh self-install did
#[derive(Debug)]
pub struct SelfInstallReport {
    pub exe: PathBuf,
    pub sdk: InstallOutcome,
    pub environment: Option<SyncReport>,
}

/// Drives self-install and self-update for one managed home
pub struct SelfInstaller {
    home: DnvmHome,
    exe: PathBuf,
}

impl SelfInstaller {
    /// `exe` is the running executable
    pub fn new(home: DnvmHome, exe: impl Into<PathBuf>) -> Self {
        Self {
            home,
            exe: exe.into(),
        }
    }

    pub fn home(&self) -> &DnvmHome {
        &self.home
    }

    pub fn detect_state(&self) -> InstallState {
        let exe = self.home.exe_path();
        if exe.is_file() {
            InstallState::Installed { exe }
        } else {
            InstallState::NotInstalled
        }
    }

    /// Copy the running executable into the home, install the channel's SDK
    /// and optionally update the user environment
    pub async fn install(
        &self,
        opts: &SelfInstallOptions,
        installer: &SdkInstaller,
        sync: &mut dyn EnvironmentSync,
    ) -> Result<SelfInstallReport> {
        ensure_self_contained(&self.exe)?;

        if let InstallState::Installed { exe } = self.detect_state() {
            if !opts.force {
                return Err(UpdateError::AlreadyInstalled { path: exe });
            }
        }

        let target = self.home.exe_path();
        fs::create_dir_all(self.home.root())?;
        if self.home.is_installed_exe(&self.exe) {
            debug!("Running executable is already the installed one");
        } else {
            info!("Copying {:?} to {:?}", self.exe, target);
            fs::copy(&self.exe, &target).map_err(|e| {
                UpdateError::self_install_failed(format!(
                    "Could not copy {} to {}: {}",
                    self.exe.display(),
                    target.display(),
                    e
                ))
            })?;
            make_executable(&target)?;
        }

        let sdk = installer
            .install_channel(opts.channel, opts.sdk_dir.clone(), false)
            .await?;

        let manifest = self.home.manifest_store().read()?;
        retarget_current(&self.home, &manifest.current_sdk_dir)?;

        let environment = if opts.update_user_environment {
            let paths = InstallPaths::new(&self.home, &manifest.current_sdk_dir);
            Some(sync.apply(&paths)?)
        } else {
            None
        };

        Ok(SelfInstallReport {
            exe: target,
            sdk,
            environment,
        })
    }

    /// Swap the running (staged) executable over the installed one
    pub fn self_update(&self, sync: &mut dyn EnvironmentSync) -> Result<SwapReport> {
        self.self_update_with(sync, StdFileOps)
    }

    /// [`self_update`](Self::self_update) with explicit filesystem operations
    pub fn self_update_with<F: FileOps>(
        &self,
        sync: &mut dyn EnvironmentSync,
        ops: F,
    ) -> Result<SwapReport> {
        ensure_self_contained(&self.exe)?;

        let current_dir = match self.home.manifest_store().read() {
            Ok(manifest) => manifest.current_sdk_dir,
            Err(e) if e.is_not_found() => {
                debug!("No manifest yet, using the default SDK directory");
                SdkDirName::default_dir()
            }
            Err(e) => return Err(e.into()),
        };

        let report = BinarySwap::with_ops(
            self.home.exe_path(),
            &self.exe,
            self.home.backup_exe_path(),
            ops,
        )
        .swap()?;

        if self.home.sdk_dir(&current_dir).is_dir() {
            retarget_current(&self.home, &current_dir)?;
        } else {
            debug!("SDK directory '{}' does not exist, not retargeting", current_dir);
        }

        let paths = InstallPaths::new(&self.home, &current_dir);
        if let Err(e) = sync.refresh(&paths) {
            warn!("Could not refresh the user environment: {}", e);
        }

        Ok(report)
    }
}

/// A downloaded dnvm build waiting to replace the installed one
#[derive(Debug)]
pub struct StagedBinary {
    _dir: TempDir,
    pub exe: PathBuf,
    pub version: Version,
}

/// Downloads a newer dnvm and hands over to it for the swap
pub struct SelfUpdateLauncher {
    home: DnvmHome,
    feed: ToolReleaseFeed,
    fetcher: ArchiveFetcher,
}

impl SelfUpdateLauncher {
    pub fn new(home: DnvmHome, config: &RuntimeConfig) -> Result<Self> {
        Ok(Self {
            home,
            feed: ToolReleaseFeed::new(config)?,
            fetcher: ArchiveFetcher::new(config)?,
        })
    }

    pub fn with_releases_url(mut self, url: &str) -> Self {
        self.feed = self.feed.with_releases_url(url);
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.fetcher = self.fetcher.with_progress(show);
        self
    }

    /// The newest published build, if newer than `current`
    pub async fn check(&self, current: &Version, include_preview: bool) -> Result<Option<ToolRelease>> {
        self.feed.newer_than(current, include_preview).await
    }

    /// Download and unpack `release` next to the installed executable
    pub async fn download(&self, release: &ToolRelease) -> Result<StagedBinary> {
        let rid = current_rid();
        let url = release.artifact_for(&rid).ok_or_else(|| {
            UpdateError::self_install_failed(format!(
                "dnvm {} has no build for {}",
                release.version, rid
            ))
        })?;

        fs::create_dir_all(self.home.root())?;
        let dir = tempfile::Builder::new()
            .prefix(".dnvm-update-")
            .tempdir_in(self.home.root())?;

        let exe_name = format!("dnvm{}", EXE_SUFFIX);
        match ArchiveKind::from_name(url) {
            Some(kind) => {
                let archive = self.fetcher.download(url).await?;
                extract(&archive, kind, dir.path())?;
            }
            None => {
                let file = self.fetcher.download(url).await?;
                fs::copy(&file, dir.path().join(&exe_name))?;
            }
        }

        let exe = dir.path().join(&exe_name);
        make_executable(&exe)?;
        verify_binary(&exe)?;

        Ok(StagedBinary {
            _dir: dir,
            exe,
            version: release.version.clone(),
        })
    }

    /// Run `<staged> self-install --update` and wait for it
    pub fn launch(&self, staged: &StagedBinary) -> Result<()> {
        info!("Running {:?} self-install --update", staged.exe);
        let status = Command::new(&staged.exe)
            .args(["self-install", "--update"])
            .env(dnvm_core::home::HOME_ENV_VAR, self.home.root())
            .status()
            .map_err(|e| {
                UpdateError::self_install_failed(format!("Could not start the new dnvm: {}", e))
            })?;

        if !status.success() {
            return Err(UpdateError::self_install_failed(format!(
                "The new dnvm exited with {}",
                status
            )));
        }
        Ok(())
    }
}
