mod app;
mod artifact;
mod cli;
mod config;
mod error;
mod git;
mod menu;
mod scan;
mod workdir;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> Result<ExitCode> {
    let args = cli::Args::parse();

    // Handle shell completion generation
    if let Some(shell) = args.completions {
        cli::generate_completions(shell);
        return Ok(ExitCode::SUCCESS);
    }

    // RUST_LOG takes precedence over --verbose
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let app = app::App::new(args)?;
    let succeeded = app.run()?;

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
