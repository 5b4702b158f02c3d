//! Version command
//!
//! Besides the build, prints what this binary expects from its surroundings:
//! the runtime identifier it downloads SDKs for and the manifest schema it
//! writes.

use anyhow::Result;
use dnvm_core::manifest::schema::CURRENT_VERSION;
use dnvm_update::releases::current_rid;
use serde::Serialize;
use std::fmt;

use crate::cli::VersionArgs;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BuildInfo {
    version: &'static str,
    commit: Option<&'static str>,
    build_date: Option<&'static str>,
    rid: String,
    manifest_schema: u64,
}

impl BuildInfo {
    fn current() -> Self {
        Self {
            version: dnvm_update::VERSION,
            commit: option_env!("GIT_SHA"),
            build_date: option_env!("BUILD_DATE"),
            rid: current_rid(),
            manifest_schema: CURRENT_VERSION,
        }
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dnvm {}", self.version)?;
        if let Some(commit) = self.commit {
            write!(f, " ({})", commit)?;
        }
        writeln!(f)?;
        writeln!(f, "Runtime identifier: {}", self.rid)?;
        write!(f, "Manifest schema: v{}", self.manifest_schema)?;
        if let Some(date) = self.build_date {
            write!(f, "\nBuilt: {}", date)?;
        }
        Ok(())
    }
}

pub fn run(args: VersionArgs) -> Result<()> {
    let info = BuildInfo::current();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("{}", info);
    }
    Ok(())
}
