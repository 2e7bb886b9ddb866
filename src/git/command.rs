//! Thin wrapper over the `git` executable.
//!
//! Commands run in the process working directory; callers position it with
//! [`crate::workdir::WorkdirGuard`].

use std::process::{Command, Output};

/// A failed git invocation
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("failed to execute git {command}. Is it installed?")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "git {command} exited with status {}: {}",
        status.map_or_else(|| "unknown".to_string(), |code| code.to_string()),
        stderr.trim()
    )]
    Failed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("not inside a git working tree")]
    NotAWorkTree,
}

impl GitError {
    /// The tool's own error text, empty when there is none.
    pub fn stderr(&self) -> &str {
        match self {
            GitError::Failed { stderr, .. } => stderr,
            _ => "",
        }
    }

    pub fn command(&self) -> &str {
        match self {
            GitError::Spawn { command, .. } | GitError::Failed { command, .. } => command.as_str(),
            GitError::NotAWorkTree => "rev-parse --is-inside-work-tree",
        }
    }
}

fn run(args: &[&str]) -> Result<Output, GitError> {
    let command = args.join(" ");
    let output = Command::new("git")
        .args(args)
        .output()
        .map_err(|source| GitError::Spawn {
            command: command.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(GitError::Failed {
            command,
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(output)
}

/// Run git and return its stdout as text.
pub fn output(args: &[&str]) -> Result<String, GitError> {
    let output = run(args)?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Run git and return its stdout split on NUL bytes, for `-z` listings.
pub fn output_nul_separated(args: &[&str]) -> Result<Vec<String>, GitError> {
    let output = run(args)?;
    Ok(output
        .stdout
        .split(|b| *b == 0)
        .filter(|item| !item.is_empty())
        .map(|item| String::from_utf8_lossy(item).into_owned())
        .collect())
}

/// Run git for its side effect, forwarding whatever it printed to the debug log.
pub fn run_quiet(args: &[&str]) -> Result<(), GitError> {
    let output = run(args)?;
    for line in String::from_utf8_lossy(&output.stderr)
        .lines()
        .chain(String::from_utf8_lossy(&output.stdout).lines())
        .filter(|line| !line.trim().is_empty())
    {
        tracing::debug!("git {}: {}", args.first().unwrap_or(&""), line);
    }
    Ok(())
}
