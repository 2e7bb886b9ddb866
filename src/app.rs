use crate::artifact::Outcome;
use crate::cli::{Args, Mode};
use crate::config::{self, Config};
use crate::error::SnapshotResult;
use crate::git::DiffComposer;
use crate::menu;
use crate::scan;
use anyhow::{Context, Result};
use std::io;
use std::path::PathBuf;

pub struct App {
    config: Config,
    output_dir: PathBuf,
    mode: Option<Mode>,
}

impl App {
    pub fn new(args: Args) -> Result<Self> {
        let output_dir = match args.output_dir {
            Some(dir) => dir,
            None => std::env::current_dir().context("Failed to read current directory")?,
        };
        let output_dir = std::path::absolute(&output_dir)
            .with_context(|| format!("Invalid output directory: {}", output_dir.display()))?;

        Ok(Self {
            config: config::load(),
            output_dir,
            mode: args.mode,
        })
    }

    /// Run the selected mode. Returns whether it succeeded.
    pub fn run(self) -> Result<bool> {
        let mode = match self.mode.clone() {
            Some(mode) => mode,
            None => {
                let stdin = io::stdin();
                match menu::prompt(&mut stdin.lock(), &mut io::stdout())
                    .context("Failed to read menu input")?
                {
                    Some(mode) => mode,
                    None => return Ok(false),
                }
            }
        };

        tracing::info!("{} for: {}", mode.label(), mode.path().display());
        let result = self.dispatch(&mode);
        Ok(report(&mode, result))
    }

    fn dispatch(&self, mode: &Mode) -> SnapshotResult<Outcome> {
        match mode {
            Mode::Code { path } => scan::extract_code(path, &self.output_dir, &self.config),
            Mode::Branch { path, base, remote } => {
                let mut config = self.config.clone();
                if let Some(base) = base {
                    config.base_branch = base.clone();
                }
                if let Some(remote) = remote {
                    config.remote = remote.clone();
                }
                DiffComposer::new(&config, &self.output_dir)?.branch_diff(path)
            }
            Mode::Unstaged { path } => {
                DiffComposer::new(&self.config, &self.output_dir)?.unstaged_diff(path)
            }
        }
    }
}

/// Log the result of a mode for the user and reduce it to success or failure.
fn report(mode: &Mode, result: SnapshotResult<Outcome>) -> bool {
    match result {
        Ok(outcome) => {
            match outcome {
                Outcome::Written(path) => tracing::info!("Output file: {}", path.display()),
                Outcome::NothingToCompare { branch } => {
                    tracing::info!("Nothing to compare on \"{}\"; no file written.", branch)
                }
                Outcome::NoDifferences { base_ref, branch } => tracing::info!(
                    "\"{}\" and \"{}\" do not differ; no file written.",
                    base_ref,
                    branch
                ),
                Outcome::NoChanges { path } => {
                    tracing::info!("No changes in \"{}\"; no file written.", path.display())
                }
            }
            tracing::info!("{} completed successfully.", mode.label());
            true
        }
        Err(err) => {
            tracing::error!("{} failed: {}", mode.label(), err);
            if let Some(detail) = err.detail() {
                tracing::error!("Detail: {}", detail);
            }
            false
        }
    }
}
