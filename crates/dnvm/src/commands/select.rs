//! Select command

use anyhow::{bail, Result};
use dnvm_core::SdkDirName;
use dnvm_update::UpdateError;
use std::collections::BTreeSet;

use super::{refresh_environment, Context};
use crate::cli::SelectArgs;
use crate::output;

pub fn run(args: SelectArgs, ctx: &Context) -> Result<()> {
    let installer = ctx.installer(None)?;

    match installer.select(&args.dir) {
        Ok(_) => {}
        Err(UpdateError::SdkDirNotInstalled { dir }) => {
            let manifest = ctx.home.manifest_store().read()?;
            let dirs: BTreeSet<&SdkDirName> = manifest
                .installed_sdk_versions
                .iter()
                .map(|sdk| &sdk.sdk_dir_name)
                .collect();
            let valid: Vec<&str> = dirs.iter().map(|d| d.as_str()).collect();
            bail!(
                "No SDK is installed in '{}'. Installed directories: {}",
                dir,
                valid.join(", ")
            );
        }
        Err(e) => return Err(e.into()),
    }

    output::success(&format!("Selected '{}' as the current SDK directory", args.dir));
    refresh_environment(ctx, &args.dir)
}
