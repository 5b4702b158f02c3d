//! Release channels
//!
//! A channel names a release track that resolves to a concrete SDK version at
//! install time. The stored form is lowercase:
//!
//! ```text
//! lts | sts | latest | preview | <major>.<minor>
//! ```

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A release track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// A specific `major.minor` release line
    Versioned { major: u32, minor: u32 },

    /// Newest Long Term Support release
    Lts,

    /// Newest Standard Term Support release
    Sts,

    /// Latest supported version from either the LTS or STS channels
    Latest,

    /// Latest preview version
    Preview,
}

impl Channel {
    /// Channels offered in interactive prompts, in display order
    pub fn promptable() -> [Channel; 4] {
        [Channel::Latest, Channel::Lts, Channel::Sts, Channel::Preview]
    }

    /// Human-readable explanation, only used for prompts
    pub fn describe(&self) -> String {
        match self {
            Channel::Versioned { .. } => {
                format!("The latest version in the {} support channel", self)
            }
            Channel::Lts => "The latest version in Long-Term support".to_string(),
            Channel::Sts => "The latest version in Short-Term support".to_string(),
            Channel::Latest => {
                "The latest supported version from either the LTS or STS support channels"
                    .to_string()
            }
            Channel::Preview => "The latest preview version".to_string(),
        }
    }

    /// Display name used in prompts and tables (`LTS`, `Preview`, `8.0`, ...)
    pub fn display_name(&self) -> String {
        match self {
            Channel::Versioned { major, minor } => format!("{}.{}", major, minor),
            Channel::Lts => "LTS".to_string(),
            Channel::Sts => "STS".to_string(),
            Channel::Latest => "Latest".to_string(),
            Channel::Preview => "Preview".to_string(),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Versioned { major, minor } => write!(f, "{}.{}", major, minor),
            Channel::Lts => f.write_str("lts"),
            Channel::Sts => f.write_str("sts"),
            Channel::Latest => f.write_str("latest"),
            Channel::Preview => f.write_str("preview"),
        }
    }
}

impl FromStr for Channel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lts" => Ok(Channel::Lts),
            "sts" => Ok(Channel::Sts),
            "latest" => Ok(Channel::Latest),
            "preview" => Ok(Channel::Preview),
            other => {
                let mut parts = other.split('.');
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(major), Some(minor), None) => Ok(Channel::Versioned {
                        major: parse_component(major).ok_or_else(|| Error::invalid_channel(s))?,
                        minor: parse_component(minor).ok_or_else(|| Error::invalid_channel(s))?,
                    }),
                    _ => Err(Error::invalid_channel(s)),
                }
            }
        }
    }
}

/// Digits only: `u32::from_str` would also accept a leading `+`
fn parse_component(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl Serialize for Channel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Channel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_tokens_round_trip() {
        for token in ["lts", "sts", "latest", "preview"] {
            let channel: Channel = token.parse().unwrap();
            assert_eq!(channel.to_string(), token);
        }
    }

    #[test]
    fn test_versioned_round_trip() {
        for (major, minor) in [(0, 0), (6, 0), (8, 0), (10, 12), (u32::MAX, 1)] {
            let channel = Channel::Versioned { major, minor };
            let parsed: Channel = channel.to_string().parse().unwrap();
            assert_eq!(parsed, channel);
        }
    }

    #[test]
    fn test_malformed_strings_rejected() {
        for bad in [
            "", "8", "8.0.1", "8.", ".0", "a.b", "8.x", "-1.0", "+8.0", " 8.0", "LTS", "stable",
            "8..0",
        ] {
            let err = bad.parse::<Channel>().unwrap_err();
            assert!(
                matches!(err, Error::InvalidChannel { ref value } if value == bad),
                "expected InvalidChannel for {:?}, got {:?}",
                bad,
                err
            );
        }
    }

    #[test]
    fn test_serde_uses_string_form() {
        let json = serde_json::to_string(&Channel::Versioned { major: 7, minor: 0 }).unwrap();
        assert_eq!(json, "\"7.0\"");

        let channel: Channel = serde_json::from_str("\"preview\"").unwrap();
        assert_eq!(channel, Channel::Preview);

        assert!(serde_json::from_str::<Channel>("\"nightly\"").is_err());
    }

    #[test]
    fn test_describe_and_display_name() {
        assert_eq!(Channel::Lts.display_name(), "LTS");
        assert_eq!(
            Channel::Sts.describe(),
            "The latest version in Short-Term support"
        );
        assert!(Channel::Versioned { major: 8, minor: 0 }
            .describe()
            .contains("8.0"));
        for channel in Channel::promptable() {
            assert!(!channel.describe().is_empty());
        }
    }
}
