//! dnvm - install and manage .NET SDKs
//!
//! Main entry point for the dnvm command-line interface.

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};
use commands::Context;

#[tokio::main]
async fn main() -> ExitCode {
    // Must run before any TLS operation
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let context = || Context::load(cli.home.as_deref(), cli.quiet);

    match cli.command {
        Commands::Install(args) => commands::install::run(args, &context()?).await,
        Commands::Update(args) => commands::update::run(args, &context()?).await,
        Commands::List => commands::list::run(&context()?),
        Commands::Select(args) => commands::select::run(args, &context()?),
        Commands::SelfInstall(args) => commands::self_install::run(args, &context()?).await,
        Commands::Version(args) => commands::version::run(args),
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
