//! Update command
//!
//! Without `--self`, installs newer SDKs for every tracked channel. With
//! `--self`, downloads a newer dnvm and lets it swap itself into place.

use anyhow::{bail, Result};
use dialoguer::Confirm;
use dnvm_update::{InstallOutcome, SelfUpdateLauncher, VERSION};
use semver::Version;

use super::Context;
use crate::cli::UpdateArgs;
use crate::output;

pub async fn run(args: UpdateArgs, ctx: &Context) -> Result<()> {
    if args.self_update {
        return update_self(&args, ctx).await;
    }

    let installer = ctx.installer(args.feed_url.as_deref())?;

    let spinner = output::spinner("Checking tracked channels...", ctx.show_progress);
    let updates = installer.check_updates().await;
    spinner.finish_and_clear();
    let updates = updates?;

    if updates.is_empty() {
        output::success("All tracked channels are up to date");
        return Ok(());
    }

    output::header("Available updates");
    for update in &updates {
        let installed = update
            .installed
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "none".to_string());
        println!(
            "  {} ({}): {} -> {}",
            update.channel.display_name(),
            update.dir,
            installed,
            update.release.version
        );
    }
    println!();

    if !args.yes
        && !Confirm::new()
            .with_prompt("Install these updates?")
            .default(true)
            .interact()?
    {
        output::info("Update cancelled");
        return Ok(());
    }

    for update in &updates {
        match installer.apply_update(update).await? {
            InstallOutcome::Installed { version, dir, .. } => {
                output::success(&format!("Installed SDK {} into '{}'", version, dir));
            }
            InstallOutcome::AlreadyInstalled { version, dir } => {
                output::info(&format!("SDK {} is already installed in '{}'", version, dir));
            }
        }
    }

    Ok(())
}

async fn update_self(args: &UpdateArgs, ctx: &Context) -> Result<()> {
    if !ctx.home.exe_path().is_file() {
        bail!(
            "dnvm is not installed in {}. Run 'dnvm self-install' first",
            ctx.home.root().display()
        );
    }

    let mut launcher =
        SelfUpdateLauncher::new(ctx.home.clone(), &ctx.config)?.with_progress(ctx.show_progress);
    if let Some(url) = &args.releases_url {
        launcher = launcher.with_releases_url(url);
    }

    let current = Version::parse(VERSION)?;
    output::info(&format!("Current version: {}", current));

    let spinner = output::spinner("Checking for updates...", ctx.show_progress);
    let release = launcher.check(&current, args.preview).await;
    spinner.finish_and_clear();

    let Some(release) = release? else {
        output::success("dnvm is up to date");
        return Ok(());
    };

    output::info(&format!("Update available: {} -> {}", current, release.version));
    if !args.yes
        && !Confirm::new()
            .with_prompt(format!("Update dnvm to {}?", release.version))
            .default(true)
            .interact()?
    {
        output::info("Update cancelled");
        return Ok(());
    }

    let staged = launcher.download(&release).await?;
    launcher.launch(&staged)?;

    output::success(&format!("Updated dnvm to {}", release.version));
    Ok(())
}
