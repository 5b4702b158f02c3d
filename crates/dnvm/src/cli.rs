//! CLI argument parsing with clap

use clap::{Args, Parser, Subcommand};
use dnvm_core::{Channel, SdkDirName};
use std::path::PathBuf;

/// dnvm - install and manage .NET SDKs
#[derive(Parser, Debug)]
#[command(name = "dnvm")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_long_help = "\
dnvm does not lock its home directory. Running several dnvm commands against \
the same home at once may interleave their manifest updates unpredictably.
If a self-update is interrupted, the previous executable is left next to the \
installed one as dnvm.bak (dnvm.exe.bak on Windows) and can be renamed back by hand.")]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Managed home directory [default: $DNVM_HOME, then the platform data directory]
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install the newest SDK from a channel
    Install(InstallArgs),

    /// Install newer SDKs for tracked channels, or update dnvm itself
    Update(UpdateArgs),

    /// List installed SDKs
    List,

    /// Make an SDK directory the current one
    Select(SelectArgs),

    /// Install dnvm into its managed home
    SelfInstall(SelfInstallArgs),

    /// Show version information
    Version(VersionArgs),
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Channel to install from: lts, sts, latest, preview or <major>.<minor>
    pub channel: Channel,

    /// SDK directory to install into [default: dn, or preview for the preview channel]
    #[arg(long)]
    pub sdk_dir: Option<SdkDirName>,

    /// Download and extract even if the version is already installed
    #[arg(short, long)]
    pub force: bool,

    /// Override the SDK feed
    #[arg(long)]
    pub feed_url: Option<String>,

    /// Add dnvm to PATH and set DOTNET_ROOT for new shells
    #[arg(long)]
    pub update_user_environment: bool,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Update dnvm itself instead of the tracked channels
    #[arg(long = "self")]
    pub self_update: bool,

    /// Skip confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Consider preview builds of dnvm (with --self)
    #[arg(long, requires = "self_update")]
    pub preview: bool,

    /// Override the SDK feed
    #[arg(long, conflicts_with = "self_update")]
    pub feed_url: Option<String>,

    /// Override the dnvm release descriptor (with --self)
    #[arg(long, requires = "self_update")]
    pub releases_url: Option<String>,
}

#[derive(Args, Debug)]
pub struct SelectArgs {
    /// SDK directory to make current (e.g. dn, preview)
    pub dir: SdkDirName,
}

#[derive(Args, Debug)]
pub struct SelfInstallArgs {
    /// Reinstall even if dnvm is already installed
    #[arg(short, long)]
    pub force: bool,

    /// Accept defaults instead of prompting
    #[arg(short, long)]
    pub yes: bool,

    /// Replace the installed dnvm with this executable
    #[arg(long, hide = true, conflicts_with_all = ["force", "channel", "sdk_dir"])]
    pub update: bool,

    /// Channel to install an SDK from [default: prompt, or latest with --yes]
    #[arg(long)]
    pub channel: Option<Channel>,

    /// SDK directory to install into
    #[arg(long)]
    pub sdk_dir: Option<SdkDirName>,

    /// Override the SDK feed
    #[arg(long)]
    pub feed_url: Option<String>,

    /// Add dnvm to PATH and set DOTNET_ROOT without prompting
    #[arg(long)]
    pub update_user_environment: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
