//! SDK installation
//!
//! Every operation follows the same order: resolve against the feed, fetch and
//! extract, then record the result in the manifest and retarget the `current`
//! link. The manifest is only written after extraction has finished, so a
//! failed download never leaves a half-registered SDK behind.

use dnvm_core::config::RuntimeConfig;
use dnvm_core::{Channel, DnvmHome, InstalledSdk, Manifest, SdkDirName};
use semver::Version;
use tracing::{debug, info};

use crate::download::ArchiveFetcher;
use crate::error::{Result, UpdateError};
use crate::link::retarget_current;
use crate::releases::{ReleaseManager, ResolvedRelease};

/// Result of an install request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// A new SDK was downloaded and registered
    Installed {
        version: Version,
        dir: SdkDirName,
        /// Whether `dir` is now the current SDK directory
        current: bool,
    },

    /// The resolved version was already present; nothing was downloaded
    AlreadyInstalled { version: Version, dir: SdkDirName },
}

/// A tracked channel with a newer SDK on the feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailableUpdate {
    pub channel: Channel,
    pub dir: SdkDirName,
    pub installed: Option<Version>,
    pub release: ResolvedRelease,
}

/// Installs SDKs into a managed home
pub struct SdkInstaller {
    home: DnvmHome,
    releases: ReleaseManager,
    fetcher: ArchiveFetcher,
}

impl SdkInstaller {
    pub fn new(home: DnvmHome, config: &RuntimeConfig) -> Result<Self> {
        Ok(Self {
            home,
            releases: ReleaseManager::new(config)?,
            fetcher: ArchiveFetcher::new(config)?,
        })
    }

    /// Use a different SDK feed
    pub fn with_feed_url(mut self, feed_url: &str) -> Self {
        self.releases = self.releases.with_feed_url(feed_url);
        self
    }

    /// Enable or disable download progress bars
    pub fn with_progress(mut self, show: bool) -> Self {
        self.fetcher = self.fetcher.with_progress(show);
        self
    }

    pub fn home(&self) -> &DnvmHome {
        &self.home
    }

    /// Install the newest SDK of `channel`.
    ///
    /// `sdk_dir` defaults to the channel's directory (`preview` for previews,
    /// `dn` otherwise). An SDK that is already installed is not downloaded
    /// again unless `force` is set, but the channel is still recorded as
    /// tracked.
    pub async fn install_channel(
        &self,
        channel: Channel,
        sdk_dir: Option<SdkDirName>,
        force: bool,
    ) -> Result<InstallOutcome> {
        let store = self.home.manifest_store();
        let manifest = store.read_or_empty()?;
        let dir = sdk_dir.unwrap_or_else(|| SdkDirName::for_channel(&channel));

        let release = self.releases.resolve(&channel).await?;

        if manifest.is_installed(&release.version, &dir) && !force {
            info!(
                "Version {} is already installed in '{}', skipping download",
                release.version, dir
            );
            if manifest.tracked(&channel, &dir).is_none() {
                let manifest =
                    manifest.add_sdk(InstalledSdk::in_dir(release.version.clone(), dir.clone()), channel);
                store.write(&manifest)?;
            }
            return Ok(InstallOutcome::AlreadyInstalled {
                version: release.version,
                dir,
            });
        }

        self.install_release(manifest, channel, dir, &release).await
    }

    /// Tracked channels whose feed has a newer SDK than the newest installed
    /// through them
    pub async fn check_updates(&self) -> Result<Vec<AvailableUpdate>> {
        let manifest = self.home.manifest_store().read_or_empty()?;
        let mut updates = Vec::new();

        for tracked in &manifest.tracked_channels {
            let release = match self.releases.resolve(&tracked.channel_name).await {
                Ok(release) => release,
                Err(UpdateError::ChannelNotFound { channel }) => {
                    info!("Channel '{}' no longer has releases, skipping", channel);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let installed = tracked.latest_version().cloned();
            if installed.as_ref().is_some_and(|v| *v >= release.version) {
                debug!(
                    "Channel '{}' in '{}' is up to date",
                    tracked.channel_name, tracked.sdk_dir_name
                );
                continue;
            }

            updates.push(AvailableUpdate {
                channel: tracked.channel_name,
                dir: tracked.sdk_dir_name.clone(),
                installed,
                release,
            });
        }

        Ok(updates)
    }

    /// Install one update found by [`check_updates`](Self::check_updates)
    pub async fn apply_update(&self, update: &AvailableUpdate) -> Result<InstallOutcome> {
        let manifest = self.home.manifest_store().read_or_empty()?;
        if manifest.is_installed(&update.release.version, &update.dir) {
            let manifest = manifest.add_sdk(
                InstalledSdk::in_dir(update.release.version.clone(), update.dir.clone()),
                update.channel,
            );
            self.home.manifest_store().write(&manifest)?;
            return Ok(InstallOutcome::AlreadyInstalled {
                version: update.release.version.clone(),
                dir: update.dir.clone(),
            });
        }

        self.install_release(manifest, update.channel, update.dir.clone(), &update.release)
            .await
    }

    /// Check every tracked channel and install what is newer
    pub async fn update_channels(&self) -> Result<Vec<InstallOutcome>> {
        let mut outcomes = Vec::new();
        for update in self.check_updates().await? {
            outcomes.push(self.apply_update(&update).await?);
        }
        Ok(outcomes)
    }

    /// Make `dir` the current SDK directory
    pub fn select(&self, dir: &SdkDirName) -> Result<Manifest> {
        let store = self.home.manifest_store();
        let manifest = store.read()?;

        if manifest.sdks_in(dir).next().is_none() {
            return Err(UpdateError::SdkDirNotInstalled { dir: dir.clone() });
        }

        let manifest = manifest.with_current_sdk_dir(dir.clone());
        store.write(&manifest)?;
        retarget_current(&self.home, dir)?;

        info!("Selected '{}' as the current SDK directory", dir);
        Ok(manifest)
    }

    async fn install_release(
        &self,
        manifest: Manifest,
        channel: Channel,
        dir: SdkDirName,
        release: &ResolvedRelease,
    ) -> Result<InstallOutcome> {
        let url = release.download_url.as_deref().ok_or_else(|| {
            UpdateError::install_failed(format!("No download URL for SDK {}", release.version))
        })?;

        let dest = self.home.sdk_dir(&dir);
        info!("Installing SDK {} into {}", release.version, dest.display());
        self.fetcher.fetch_and_extract(url, &dest).await?;

        let dotnet = self.home.dotnet_exe(&dir);
        if !dotnet.is_file() {
            return Err(UpdateError::install_failed(format!(
                "Archive for SDK {} did not contain {}",
                release.version,
                dotnet.display()
            )));
        }

        let mut manifest = manifest.add_sdk(
            InstalledSdk::in_dir(release.version.clone(), dir.clone()),
            channel,
        );
        if manifest.sdks_in(&manifest.current_sdk_dir).next().is_none() {
            manifest = manifest.with_current_sdk_dir(dir.clone());
        }
        let current = manifest.current_sdk_dir == dir;

        self.home.manifest_store().write(&manifest)?;

        if current {
            retarget_current(&self.home, &dir)?;
        }

        info!("Installed SDK {} ({})", release.version, channel);
        Ok(InstallOutcome::Installed {
            version: release.version.clone(),
            dir,
            current,
        })
    }
}
