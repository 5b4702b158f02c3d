//! Self-install command
//!
//! `dnvm self-install` places the running executable into the managed home and
//! installs a first SDK. `dnvm self-install --update` is run by `dnvm update
//! --self` from the freshly downloaded binary to swap it over the installed one.

use anyhow::{bail, Context as _, Result};
use dialoguer::{Confirm, Select};
use dnvm_core::Channel;
use dnvm_update::{
    ensure_self_contained, InstallOutcome, InstallState, SelfInstallOptions, SelfInstaller,
    UpdateError,
};
use std::path::Path;

use super::{print_sync_report, Context};
use crate::cli::SelfInstallArgs;
use crate::output;

pub async fn run(args: SelfInstallArgs, ctx: &Context) -> Result<()> {
    let exe = std::env::current_exe().context("Could not determine the running executable")?;
    ensure_self_contained(&exe)?;
    let installer = SelfInstaller::new(ctx.home.clone(), exe);

    if args.update {
        return update(&installer, ctx);
    }

    if let InstallState::Installed { exe } = installer.detect_state() {
        if !args.force {
            bail!(already_installed(&exe));
        }
    }

    let channel = match args.channel {
        Some(channel) => channel,
        None if args.yes => Channel::Latest,
        None => prompt_channel()?,
    };
    let update_user_environment = args.update_user_environment
        || args.yes
        || Confirm::new()
            .with_prompt("Add dnvm to PATH and set DOTNET_ROOT for new shells?")
            .default(true)
            .interact()?;

    output::info(&format!("Installing dnvm into {}", ctx.home.root().display()));

    let sdk_installer = ctx.installer(args.feed_url.as_deref())?;
    let mut sync = ctx.environment();
    let opts = SelfInstallOptions {
        channel,
        sdk_dir: args.sdk_dir,
        force: args.force,
        update_user_environment,
    };

    let report = match installer.install(&opts, &sdk_installer, &mut *sync).await {
        Ok(report) => report,
        Err(UpdateError::AlreadyInstalled { path }) => bail!(already_installed(&path)),
        Err(e) => return Err(e.into()),
    };

    output::success(&format!("Installed dnvm to {}", report.exe.display()));
    match report.sdk {
        InstallOutcome::Installed { version, dir, .. } => {
            output::success(&format!("Installed SDK {} into '{}'", version, dir));
        }
        InstallOutcome::AlreadyInstalled { version, dir } => {
            output::info(&format!("SDK {} is already installed in '{}'", version, dir));
        }
    }

    match report.environment {
        Some(env) => print_sync_report(&env, sync.needs_restart_notice()),
        None => output::info(&format!(
            "Add {} to PATH to use dnvm and dotnet",
            ctx.home.root().display()
        )),
    }

    Ok(())
}

fn update(installer: &SelfInstaller, ctx: &Context) -> Result<()> {
    let mut sync = ctx.environment();
    let report = installer.self_update(&mut *sync)?;

    if !report.backup_removed {
        output::warning(&format!(
            "Could not delete the previous binary at {}",
            ctx.home.backup_exe_path().display()
        ));
    }
    output::success(&format!("Replaced {}", report.target.display()));
    Ok(())
}

fn already_installed(path: &Path) -> String {
    format!(
        "dnvm is already installed at {}. Did you mean to run `dnvm update`? \
         Use --force to reinstall",
        path.display()
    )
}

fn prompt_channel() -> Result<Channel> {
    let channels = Channel::promptable();
    let items: Vec<String> = channels
        .iter()
        .map(|c| format!("{}: {}", c.display_name(), c.describe()))
        .collect();

    let selection = Select::new()
        .with_prompt("Which channel should dnvm track?")
        .items(&items)
        .default(0)
        .interact()?;

    Ok(channels[selection])
}
