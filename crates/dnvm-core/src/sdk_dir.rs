//! SDK install directory names

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::channel::Channel;
use crate::error::{Error, Result};
use crate::home::{CONFIG_FILE_NAME, CURRENT_LINK_NAME, ENV_SCRIPT_NAME};
use crate::manifest::MANIFEST_FILE_NAME;

/// Directory shared by every channel that is not isolated
pub const DEFAULT_SDK_DIR: &str = "dn";

/// Directory preview SDKs are isolated into
pub const PREVIEW_SDK_DIR: &str = "preview";

/// Entries of the managed home root that are not SDK directories
const RESERVED_NAMES: [&str; 10] = [
    CURRENT_LINK_NAME,
    ENV_SCRIPT_NAME,
    CONFIG_FILE_NAME,
    MANIFEST_FILE_NAME,
    "dotnet",
    "dotnet.exe",
    "dnvm",
    "dnvm.exe",
    "dnvm.bak",
    "dnvm.exe.bak",
];

/// Prefix of the temporary entries dnvm creates in the home root
const RESERVED_PREFIX: &str = ".dnvm";

/// Name of a subdirectory of the managed home that holds one SDK installation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SdkDirName(String);

impl SdkDirName {
    /// Validate and wrap a directory name
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();

        if name.is_empty() {
            return Err(Error::invalid_sdk_dir(name, "name is empty"));
        }
        if name == "." || name == ".." {
            return Err(Error::invalid_sdk_dir(name, "relative directory references are not allowed"));
        }
        if name.contains(['/', '\\']) {
            return Err(Error::invalid_sdk_dir(name, "name must not contain path separators"));
        }
        if name.trim() != name {
            return Err(Error::invalid_sdk_dir(name, "name must not start or end with whitespace"));
        }
        // Case-insensitive: Windows and macOS homes usually are
        let lower = name.to_ascii_lowercase();
        if RESERVED_NAMES.iter().any(|r| r.to_ascii_lowercase() == lower)
            || lower.starts_with(RESERVED_PREFIX)
        {
            return Err(Error::invalid_sdk_dir(
                name,
                "name is used by dnvm itself in the managed home",
            ));
        }

        Ok(Self(name))
    }

    /// The shared default directory (`dn`)
    pub fn default_dir() -> Self {
        Self(DEFAULT_SDK_DIR.to_string())
    }

    /// Where installs for `channel` go when no directory is given explicitly.
    ///
    /// Preview builds always get their own directory so they never shadow a
    /// stable install.
    pub fn for_channel(channel: &Channel) -> Self {
        match channel {
            Channel::Preview => Self(PREVIEW_SDK_DIR.to_string()),
            Channel::Versioned { .. } | Channel::Lts | Channel::Sts | Channel::Latest => {
                Self::default_dir()
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SdkDirName {
    fn default() -> Self {
        Self::default_dir()
    }
}

impl fmt::Display for SdkDirName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SdkDirName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for SdkDirName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<SdkDirName> for String {
    fn from(value: SdkDirName) -> Self {
        value.0
    }
}

impl AsRef<std::path::Path> for SdkDirName {
    fn as_ref(&self) -> &std::path::Path {
        std::path::Path::new(&self.0)
    }
}
