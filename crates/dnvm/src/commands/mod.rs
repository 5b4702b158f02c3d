//! CLI command implementations

pub mod install;
pub mod list;
pub mod select;
pub mod self_install;
pub mod update;
pub mod version;

use anyhow::{Context as _, Result};
use dnvm_core::env::{default_sync, EnvironmentSync, InstallPaths, SyncReport};
use dnvm_core::{DnvmHome, GlobalOptions, HierarchicalConfigLoader, RuntimeConfig, SdkDirName};
use dnvm_update::SdkInstaller;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::output;

/// Resolved locations and configuration shared by the commands
pub struct Context {
    pub home: DnvmHome,
    pub user_home: PathBuf,
    pub config: RuntimeConfig,
    pub show_progress: bool,
}

impl Context {
    /// Resolve the managed home (`--home`, then `DNVM_HOME`, then the platform
    /// default) and load its configuration
    pub fn load(home: Option<&Path>, quiet: bool) -> Result<Self> {
        let mut options = GlobalOptions::from_env().context("Could not locate the dnvm home")?;
        if let Some(home) = home {
            options.home = DnvmHome::new(home);
        }

        let config = HierarchicalConfigLoader::for_path(options.home.root())
            .and_then(|loader| loader.load_runtime_config())
            .context("Could not load configuration")?;
        debug!(
            "Using home {} with feed {}",
            options.home.root().display(),
            config.feed.feed_url
        );

        Ok(Self {
            home: options.home,
            user_home: options.user_home,
            config,
            show_progress: !quiet,
        })
    }

    /// An SDK installer for this home, optionally against another feed
    pub fn installer(&self, feed_url: Option<&str>) -> Result<SdkInstaller> {
        let mut installer =
            SdkInstaller::new(self.home.clone(), &self.config)?.with_progress(self.show_progress);
        if let Some(url) = feed_url {
            installer = installer.with_feed_url(url);
        }
        Ok(installer)
    }

    /// The environment backend for this platform
    pub fn environment(&self) -> Box<dyn EnvironmentSync> {
        default_sync(&self.home, &self.user_home)
    }

    pub fn paths(&self, dir: &SdkDirName) -> InstallPaths {
        InstallPaths::new(&self.home, dir)
    }
}

/// Make `dir` visible to new shells
pub fn update_environment(ctx: &Context, dir: &SdkDirName) -> Result<()> {
    let mut sync = ctx.environment();
    let report = sync
        .apply(&ctx.paths(dir))
        .context("Could not update the user environment")?;
    print_sync_report(&report, sync.needs_restart_notice());
    Ok(())
}

/// Re-point an existing environment setup at `dir`
pub fn refresh_environment(ctx: &Context, dir: &SdkDirName) -> Result<()> {
    let mut sync = ctx.environment();
    let report = sync
        .refresh(&ctx.paths(dir))
        .context("Could not refresh the user environment")?;
    print_sync_report(&report, sync.needs_restart_notice());
    Ok(())
}

/// Tell the user how to get `dir` onto their environment if it is not there yet
pub fn hint_environment(ctx: &Context, dir: &SdkDirName) {
    let sync = ctx.environment();
    if let Ok(true) = sync.missing_from_env(&ctx.paths(dir)) {
        output::info(&format!(
            "{} is not on PATH for this shell. Rerun with --update-user-environment \
             or add it to PATH and set DOTNET_ROOT to {}",
            ctx.home.root().display(),
            ctx.home.sdk_dir(dir).display()
        ));
    }
}

pub fn print_sync_report(report: &SyncReport, restart_notice: bool) {
    for change in &report.changes {
        output::kv("Environment", change);
    }
    for warning in &report.warnings {
        output::warning(warning);
    }
    for skipped in &report.skipped {
        output::warning(&format!("Could not update {}", skipped.display()));
    }
    if restart_notice && !report.changes.is_empty() {
        output::info("Restart your terminal for the changes to take effect");
    }
}
