//! Manifest schema history and upgrades
//!
//! Every manifest on disk carries a `version` tag. Older shapes are parsed
//! into their own structs and walked forward one step at a time until they
//! reach the current shape:
//!
//! | version | shape |
//! |---|---|
//! | 1 | flat list of installed versions, all in the default directory |
//! | 2 | installed SDKs and tracked channels carry an `sdkDirName` |
//! | 3 | adds `currentSdkDir` (current) |
//!
//! Each upgrade is a pure function of the previous shape. Versions newer than
//! [`CURRENT_VERSION`] are rejected.

use semver::Version;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

use super::{InstalledSdk, Manifest, TrackedChannel};
use crate::channel::Channel;
use crate::error::{Error, Result};
use crate::sdk_dir::SdkDirName;

/// Schema version written by this build
pub const CURRENT_VERSION: u64 = 3;

/// Name of the discriminator field
pub const VERSION_FIELD: &str = "version";

/// Schema version 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestV1 {
    pub installed_versions: Vec<Version>,
    #[serde(default)]
    pub tracked_channels: Vec<TrackedChannelV1>,
}

/// Tracked channel in schema version 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedChannelV1 {
    pub channel_name: Channel,
    pub installed_sdk_versions: Vec<Version>,
}

/// Schema version 2
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestV2 {
    pub installed_sdk_versions: Vec<InstalledSdk>,
    #[serde(default)]
    pub tracked_channels: Vec<TrackedChannel>,
}

/// Serialization envelope adding the version tag in front of the body
#[derive(Serialize)]
struct Tagged<'a, T: Serialize> {
    version: u64,
    #[serde(flatten)]
    body: &'a T,
}

/// v1 -> v2: everything moves into the default SDK directory
pub fn upgrade_v1(v1: ManifestV1) -> ManifestV2 {
    let dir = SdkDirName::default_dir();

    let mut installed_sdk_versions: Vec<InstalledSdk> = Vec::new();
    for version in v1.installed_versions {
        let sdk = InstalledSdk::in_dir(version, dir.clone());
        if !installed_sdk_versions.contains(&sdk) {
            installed_sdk_versions.push(sdk);
        }
    }

    let tracked_channels = v1
        .tracked_channels
        .into_iter()
        .map(|c| TrackedChannel {
            channel_name: c.channel_name,
            sdk_dir_name: dir.clone(),
            installed_sdk_versions: c.installed_sdk_versions,
        })
        .collect();

    ManifestV2 {
        installed_sdk_versions,
        tracked_channels,
    }
}

/// v2 -> v3: choose a current directory.
///
/// The default directory wins if it holds an SDK; otherwise the directory of
/// the first installed SDK; otherwise the default.
pub fn upgrade_v2(v2: ManifestV2) -> Manifest {
    let default_dir = SdkDirName::default_dir();
    let current_sdk_dir = if v2
        .installed_sdk_versions
        .iter()
        .any(|sdk| sdk.sdk_dir_name == default_dir)
    {
        default_dir
    } else {
        v2.installed_sdk_versions
            .first()
            .map(|sdk| sdk.sdk_dir_name.clone())
            .unwrap_or(default_dir)
    };

    Manifest {
        current_sdk_dir,
        installed_sdk_versions: v2.installed_sdk_versions,
        tracked_channels: v2.tracked_channels,
    }
}

/// Parse a manifest of any supported schema version into the current shape.
///
/// `path` is only used for error messages.
pub fn parse_any(text: &str, path: &Path) -> Result<Manifest> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| Error::corrupt_manifest(path, format!("not valid JSON: {}", e)))?;

    let version = match value.get(VERSION_FIELD) {
        Some(Value::Number(n)) => n.as_u64().ok_or_else(|| {
            Error::invalid_schema(path, format!("schema version {} is not a valid version", n))
        })?,
        Some(other) => {
            return Err(Error::invalid_schema(
                path,
                format!("schema version tag has unexpected value {}", other),
            ))
        }
        None => return Err(Error::invalid_schema(path, "missing schema version tag")),
    };

    debug!("Reading manifest schema version {}", version);

    let corrupt = |e: serde_json::Error| {
        Error::corrupt_manifest(path, format!("invalid schema version {} manifest: {}", version, e))
    };

    let manifest = match version {
        1 => {
            let v1: ManifestV1 = serde_json::from_value(value).map_err(corrupt)?;
            upgrade_v2(upgrade_v1(v1))
        }
        2 => {
            let v2: ManifestV2 = serde_json::from_value(value).map_err(corrupt)?;
            upgrade_v2(v2)
        }
        CURRENT_VERSION => serde_json::from_value::<Manifest>(value).map_err(corrupt)?,
        other => {
            return Err(Error::invalid_schema(
                path,
                format!(
                    "schema version {} is not supported (this build reads versions 1 to {})",
                    other, CURRENT_VERSION
                ),
            ))
        }
    };

    manifest
        .validate()
        .map_err(|message| Error::corrupt_manifest(path, message))?;

    Ok(manifest)
}

/// Serialize a manifest in the current schema
pub fn to_json(manifest: &Manifest) -> Result<String> {
    Ok(serde_json::to_string_pretty(&Tagged {
        version: CURRENT_VERSION,
        body: manifest,
    })?)
}

/// Serialize an older shape with its version tag (used to build fixtures)
pub fn to_json_versioned<T: Serialize>(version: u64, body: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(&Tagged { version, body })?)
}
