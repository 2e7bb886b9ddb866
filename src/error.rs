//! Error types shared by the extraction modes.

use std::path::PathBuf;

/// Failures that abort an extraction run.
///
/// Each variant renders as the single message shown to the user for that
/// cause. Unreadable files never show up here; they are skipped with a
/// warning where they are encountered.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Target path is missing or is not a directory.
    #[error("The path does not exist or is not a directory: {}", path.display())]
    InvalidInput { path: PathBuf },

    /// Target directory is not inside a git working tree.
    #[error("The folder \"{}\" does not seem to be a Git repository.", path.display())]
    NotAWorkTree { path: PathBuf },

    /// The base branch or its remote-tracking ref does not exist.
    #[error("Could not find the branch \"{branch}\" or \"{remote_ref}\" in the repository.")]
    RefNotFound { branch: String, remote_ref: String },

    /// Any other git failure; `stderr` is shown as a fallback detail.
    #[error("git {command} failed")]
    Git { command: String, stderr: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SnapshotError {
    /// Raw tool output worth showing under the main message, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            SnapshotError::Git { stderr, .. } if !stderr.trim().is_empty() => Some(stderr.trim()),
            _ => None,
        }
    }
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;
