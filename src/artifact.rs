//! Artifact naming and the outcome reported by each mode.

use chrono::{DateTime, SecondsFormat, Utc};
use std::path::{Path, PathBuf};

use crate::scan::display_name;

/// How a successful run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// An artifact was written to this path.
    Written(PathBuf),
    /// Branch mode was started on the base branch itself.
    NothingToCompare { branch: String },
    /// Branch mode found no differences against the remote base.
    NoDifferences { base_ref: String, branch: String },
    /// Unstaged mode found neither tracked nor untracked changes.
    NoChanges { path: PathBuf },
}

impl Outcome {
    pub fn artifact(&self) -> Option<&Path> {
        match self {
            Outcome::Written(path) => Some(path),
            _ => None,
        }
    }
}

/// Timestamp written in the code extraction header
pub fn header_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Replace path separators so a branch name can be used in a file name.
pub fn sanitize_branch(branch: &str) -> String {
    branch.replace(['/', '\\'], "-")
}

pub fn code_artifact_name(target: &Path, now: DateTime<Utc>) -> String {
    format!(
        "codigo_extraido_{}_{}.txt",
        display_name(target),
        now.timestamp_millis()
    )
}

pub fn branch_diff_artifact_name(branch: &str, base_branch: &str) -> String {
    format!(
        "diff_{}__{}.txt",
        sanitize_branch(branch),
        sanitize_branch(base_branch)
    )
}

pub fn unstaged_artifact_name(target: &Path, now: DateTime<Utc>) -> String {
    format!(
        "unstaged_diff_{}_{}.txt",
        display_name(target),
        now.timestamp_millis()
    )
}
