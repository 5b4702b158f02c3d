//! Install command

use anyhow::Result;
use dnvm_update::InstallOutcome;

use super::{hint_environment, update_environment, Context};
use crate::cli::InstallArgs;
use crate::output;

pub async fn run(args: InstallArgs, ctx: &Context) -> Result<()> {
    let installer = ctx.installer(args.feed_url.as_deref())?;

    output::info(&format!(
        "Installing the latest SDK from the {} channel",
        args.channel.display_name()
    ));

    match installer
        .install_channel(args.channel, args.sdk_dir, args.force)
        .await?
    {
        InstallOutcome::Installed {
            version,
            dir,
            current,
        } => {
            output::success(&format!("Installed SDK {} into '{}'", version, dir));
            if !current {
                output::info(&format!("Run 'dnvm select {}' to make it the current SDK", dir));
            } else if args.update_user_environment {
                update_environment(ctx, &dir)?;
            } else {
                hint_environment(ctx, &dir);
            }
        }
        InstallOutcome::AlreadyInstalled { version, dir } => {
            output::info(&format!(
                "SDK {} is already installed in '{}'; use --force to reinstall",
                version, dir
            ));
        }
    }

    Ok(())
}
