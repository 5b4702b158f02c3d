//! Installation manifest
//!
//! The manifest is the single source of truth for which SDKs are installed,
//! which channels are tracked, and which SDK directory is current. It lives at
//! `<dnvm home>/dnvmManifest.json`:
//!
//! ```json
//! {
//!   "version": 3,
//!   "currentSdkDir": "dn",
//!   "installedSdkVersions": [{ "version": "8.0.100", "sdkDirName": "dn" }],
//!   "trackedChannels": [
//!     { "channelName": "lts", "sdkDirName": "dn", "installedSdkVersions": ["8.0.100"] }
//!   ]
//! }
//! ```
//!
//! All operations here are pure: they take a manifest by value and return the
//! updated one. Reading and writing the file is [`ManifestStore`]'s job.

pub mod schema;
mod store;

pub use store::{ManifestStore, StagedManifest, MANIFEST_FILE_NAME};

use semver::Version;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::channel::Channel;
use crate::sdk_dir::SdkDirName;

/// One concretely installed SDK build
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledSdk {
    /// SDK version (e.g. `8.0.100`)
    pub version: Version,

    /// Directory under the managed home holding this SDK
    pub sdk_dir_name: SdkDirName,
}

impl InstalledSdk {
    /// An SDK in the default directory
    pub fn new(version: Version) -> Self {
        Self {
            version,
            sdk_dir_name: SdkDirName::default_dir(),
        }
    }

    /// An SDK in a specific directory
    pub fn in_dir(version: Version, sdk_dir_name: SdkDirName) -> Self {
        Self {
            version,
            sdk_dir_name,
        }
    }
}

/// A channel being followed, and the versions installed through it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedChannel {
    /// Release track being followed
    pub channel_name: Channel,

    /// Directory new installs for this channel go into
    pub sdk_dir_name: SdkDirName,

    /// Versions installed through this channel, in install order
    pub installed_sdk_versions: Vec<Version>,
}

impl TrackedChannel {
    /// Newest version installed through this channel
    pub fn latest_version(&self) -> Option<&Version> {
        self.installed_sdk_versions.iter().max()
    }
}

/// The persisted manifest (current schema)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// SDK directory the `current` link points at
    pub current_sdk_dir: SdkDirName,

    /// Every installed SDK; `(version, sdkDirName)` pairs are unique
    pub installed_sdk_versions: Vec<InstalledSdk>,

    /// Tracked channels; at most one entry per `(channelName, sdkDirName)`
    pub tracked_channels: Vec<TrackedChannel>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self::empty()
    }
}

impl Manifest {
    /// Manifest for a fresh managed home
    pub fn empty() -> Self {
        Self {
            current_sdk_dir: SdkDirName::default_dir(),
            installed_sdk_versions: Vec::new(),
            tracked_channels: Vec::new(),
        }
    }

    /// Record an installed SDK under `channel`.
    ///
    /// The SDK is added to the global list if absent, and to the tracked
    /// channel matching `(channel, sdk.sdk_dir_name)`, which is created on the
    /// first install through that channel.
    pub fn add_sdk(mut self, sdk: InstalledSdk, channel: Channel) -> Self {
        if !self.installed_sdk_versions.contains(&sdk) {
            self.installed_sdk_versions.push(sdk.clone());
        }

        match self
            .tracked_channels
            .iter_mut()
            .find(|c| c.channel_name == channel && c.sdk_dir_name == sdk.sdk_dir_name)
        {
            Some(tracked) => {
                if !tracked.installed_sdk_versions.contains(&sdk.version) {
                    tracked.installed_sdk_versions.push(sdk.version);
                }
            }
            None => self.tracked_channels.push(TrackedChannel {
                channel_name: channel,
                sdk_dir_name: sdk.sdk_dir_name,
                installed_sdk_versions: vec![sdk.version],
            }),
        }

        self
    }

    /// Point the manifest at a different current SDK directory
    pub fn with_current_sdk_dir(mut self, dir: SdkDirName) -> Self {
        self.current_sdk_dir = dir;
        self
    }

    /// Whether `version` is installed in `dir`
    pub fn is_installed(&self, version: &Version, dir: &SdkDirName) -> bool {
        self.installed_sdk_versions
            .iter()
            .any(|sdk| &sdk.version == version && &sdk.sdk_dir_name == dir)
    }

    /// SDKs installed in `dir`
    pub fn sdks_in<'a>(&'a self, dir: &'a SdkDirName) -> impl Iterator<Item = &'a InstalledSdk> {
        self.installed_sdk_versions
            .iter()
            .filter(move |sdk| &sdk.sdk_dir_name == dir)
    }

    /// Tracked entry for `(channel, dir)`
    pub fn tracked(&self, channel: &Channel, dir: &SdkDirName) -> Option<&TrackedChannel> {
        self.tracked_channels
            .iter()
            .find(|c| &c.channel_name == channel && &c.sdk_dir_name == dir)
    }

    /// Newest version installed through `(channel, dir)`
    pub fn latest_in_channel(&self, channel: &Channel, dir: &SdkDirName) -> Option<&Version> {
        self.tracked(channel, dir).and_then(|c| c.latest_version())
    }

    /// Check the manifest's invariants.
    ///
    /// Several channels may share one directory with different version sets;
    /// each set only has to be covered by the SDKs installed in that
    /// directory. Two entries for the same `(channel, directory)` pair are
    /// rejected rather than merged.
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for sdk in &self.installed_sdk_versions {
            if !seen.insert((&sdk.version, &sdk.sdk_dir_name)) {
                return Err(format!(
                    "SDK {} is listed twice for directory '{}'",
                    sdk.version, sdk.sdk_dir_name
                ));
            }
        }

        let mut tracked = HashSet::new();
        for channel in &self.tracked_channels {
            if !tracked.insert((&channel.channel_name, &channel.sdk_dir_name)) {
                return Err(format!(
                    "channel '{}' is tracked twice for directory '{}'",
                    channel.channel_name, channel.sdk_dir_name
                ));
            }

            let mut versions = HashSet::new();
            for version in &channel.installed_sdk_versions {
                if !versions.insert(version) {
                    return Err(format!(
                        "version {} is listed twice under channel '{}'",
                        version, channel.channel_name
                    ));
                }
                if !self.is_installed(version, &channel.sdk_dir_name) {
                    return Err(format!(
                        "channel '{}' lists {} in '{}', but no such SDK is installed",
                        channel.channel_name, version, channel.sdk_dir_name
                    ));
                }
            }
        }

        if !self.installed_sdk_versions.is_empty()
            && self.sdks_in(&self.current_sdk_dir).next().is_none()
        {
            return Err(format!(
                "current SDK directory '{}' contains no installed SDK",
                self.current_sdk_dir
            ));
        }

        Ok(())
    }
}
