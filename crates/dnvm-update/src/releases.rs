//! Release index resolution
//!
//! The SDK feed publishes `release-metadata/releases-index.json`, one entry per
//! release line:
//!
//! ```json
//! {
//!   "releases-index": [
//!     {
//!       "channel-version": "8.0",
//!       "latest-sdk": "8.0.100",
//!       "release-type": "lts",
//!       "support-phase": "active"
//!     }
//!   ]
//! }
//! ```
//!
//! Every resolution re-fetches the index; nothing is cached between runs.

use dnvm_core::config::{normalize_url, RuntimeConfig};
use dnvm_core::Channel;
use semver::Version;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{Result, UpdateError};

/// Path of the release index below the feed URL
pub const RELEASE_INDEX_PATH: &str = "release-metadata/releases-index.json";

/// Release support type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleaseType {
    Lts,
    Sts,
    #[serde(other)]
    Unknown,
}

/// Where a release line is in its support lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SupportPhase {
    Preview,
    GoLive,
    Active,
    Maintenance,
    Eol,
    #[serde(other)]
    Unknown,
}

/// One release line (`8.0`, `9.0`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReleaseLine {
    pub channel_version: String,
    pub latest_sdk: String,
    pub release_type: ReleaseType,
    pub support_phase: SupportPhase,
    #[serde(default)]
    pub sdk_download_url: Option<String>,
}

impl ReleaseLine {
    /// The latest SDK as a semantic version, if it parses
    pub fn sdk_version(&self) -> Option<Version> {
        Version::parse(&self.latest_sdk).ok()
    }

    fn matches(&self, channel: &Channel) -> bool {
        match channel {
            Channel::Versioned { major, minor } => {
                self.channel_version == format!("{}.{}", major, minor)
            }
            Channel::Lts => {
                self.release_type == ReleaseType::Lts && self.support_phase == SupportPhase::Active
            }
            Channel::Sts => {
                self.release_type == ReleaseType::Sts && self.support_phase == SupportPhase::Active
            }
            Channel::Latest => {
                matches!(self.release_type, ReleaseType::Lts | ReleaseType::Sts)
                    && self.support_phase == SupportPhase::Active
            }
            Channel::Preview => matches!(
                self.support_phase,
                SupportPhase::Preview | SupportPhase::GoLive
            ),
        }
    }
}

/// The feed's release index
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseIndex {
    #[serde(rename = "releases-index")]
    pub releases: Vec<ReleaseLine>,
}

/// A channel resolved to a concrete SDK
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRelease {
    pub version: Version,
    pub channel_version: String,
    /// Download URL announced by the index, if any
    pub download_url: Option<String>,
}

/// Pick the newest release line matching `channel`.
///
/// Lines whose `latest-sdk` is not a valid semantic version are ignored.
pub fn select_release(index: &ReleaseIndex, channel: &Channel) -> Option<ResolvedRelease> {
    index
        .releases
        .iter()
        .filter(|line| line.matches(channel))
        .filter_map(|line| match line.sdk_version() {
            Some(version) => Some((version, line)),
            None => {
                debug!(
                    "Ignoring release line {} with unparseable SDK version {}",
                    line.channel_version, line.latest_sdk
                );
                None
            }
        })
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(version, line)| ResolvedRelease {
            version,
            channel_version: line.channel_version.clone(),
            download_url: line.sdk_download_url.clone(),
        })
}

/// Runtime identifier of the running platform (`linux-x64`, `osx-arm64`, ...)
pub fn current_rid() -> String {
    let os = if cfg!(target_os = "windows") {
        "win"
    } else if cfg!(target_os = "macos") {
        "osx"
    } else if cfg!(all(target_os = "linux", target_env = "musl")) {
        "linux-musl"
    } else {
        "linux"
    };

    let arch = match std::env::consts::ARCH {
        "x86_64" => "x64",
        "aarch64" => "arm64",
        "x86" => "x86",
        "arm" => "arm",
        other => other,
    };

    format!("{}-{}", os, arch)
}

/// Archive extension SDKs are published with on this platform
pub fn archive_extension() -> &'static str {
    if cfg!(windows) {
        "zip"
    } else {
        "tar.gz"
    }
}

/// `{feed}/Sdk/{version}/dotnet-sdk-{version}-{rid}.{ext}`
pub fn default_download_url(feed_url: &str, version: &Version, rid: &str) -> String {
    format!(
        "{}/Sdk/{}/dotnet-sdk-{}-{}.{}",
        normalize_url(feed_url),
        version,
        version,
        rid,
        archive_extension()
    )
}

pub(crate) fn http_client(config: &RuntimeConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(&config.network.user_agent)
        .timeout(Duration::from_secs(config.network.http_timeout_secs))
        .build()
        .map_err(|e| UpdateError::network("<client>", e))
}

/// Resolves channels against an SDK feed
pub struct ReleaseManager {
    client: reqwest::Client,
    feed_url: String,
    rid: String,
}

impl ReleaseManager {
    /// Create a release manager for the configured feed
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
            feed_url: normalize_url(&config.feed.feed_url),
            rid: current_rid(),
        })
    }

    /// Use a different feed
    pub fn with_feed_url(mut self, feed_url: &str) -> Self {
        self.feed_url = normalize_url(feed_url);
        self
    }

    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }

    /// Fetch the release index
    pub async fn fetch_index(&self) -> Result<ReleaseIndex> {
        let url = format!("{}/{}", self.feed_url, RELEASE_INDEX_PATH);
        debug!("Fetching release index from: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| UpdateError::network(&url, e))?;

        if !response.status().is_success() {
            return Err(UpdateError::network(
                &url,
                format!("server returned {}", response.status()),
            ));
        }

        response
            .json::<ReleaseIndex>()
            .await
            .map_err(|e| UpdateError::network(&url, format!("invalid release index: {}", e)))
    }

    /// Resolve `channel` to the newest matching SDK and its download URL
    pub async fn resolve(&self, channel: &Channel) -> Result<ResolvedRelease> {
        let index = self.fetch_index().await?;
        let mut release = select_release(&index, channel)
            .ok_or(UpdateError::ChannelNotFound { channel: *channel })?;

        if release.download_url.is_none() {
            release.download_url = Some(default_download_url(
                &self.feed_url,
                &release.version,
                &self.rid,
            ));
        }

        info!(
            "Channel '{}' resolved to SDK {} ({})",
            channel, release.version, release.channel_version
        );
        Ok(release)
    }
}

/// A published dnvm build
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolRelease {
    pub version: Version,
    /// Archive URL per runtime identifier
    pub artifacts: HashMap<String, String>,
}

impl ToolRelease {
    /// Archive URL for the running platform
    pub fn artifact_for(&self, rid: &str) -> Option<&str> {
        self.artifacts.get(rid).map(String::as_str)
    }
}

/// The dnvm release descriptor
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolReleases {
    pub latest_version: ToolRelease,
    #[serde(default)]
    pub latest_preview: Option<ToolRelease>,
}

/// Fetches the dnvm release descriptor used by self-update
pub struct ToolReleaseFeed {
    client: reqwest::Client,
    releases_url: String,
}

impl ToolReleaseFeed {
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
            releases_url: config.feed.releases_url.clone(),
        })
    }

    pub fn with_releases_url(mut self, url: &str) -> Self {
        self.releases_url = url.to_string();
        self
    }

    pub async fn fetch(&self) -> Result<ToolReleases> {
        debug!("Fetching dnvm releases from: {}", self.releases_url);

        let response = self
            .client
            .get(&self.releases_url)
            .send()
            .await
            .map_err(|e| UpdateError::network(&self.releases_url, e))?;

        if !response.status().is_success() {
            return Err(UpdateError::network(
                &self.releases_url,
                format!("server returned {}", response.status()),
            ));
        }

        response.json::<ToolReleases>().await.map_err(|e| {
            UpdateError::network(&self.releases_url, format!("invalid release descriptor: {}", e))
        })
    }

    /// The newest release if it is newer than `current`
    pub async fn newer_than(&self, current: &Version, include_preview: bool) -> Result<Option<ToolRelease>> {
        let releases = self.fetch().await?;
        let mut candidate = releases.latest_version;
        if include_preview {
            if let Some(preview) = releases.latest_preview {
                if preview.version > candidate.version {
                    candidate = preview;
                }
            }
        }

        if candidate.version > *current {
            Ok(Some(candidate))
        } else {
            Ok(None)
        }
    }
}
