use super::command::{self, GitError};
use std::path::{Path, PathBuf};

/// The working tree containing the current directory
pub struct Repository {
    toplevel: PathBuf,
}

impl Repository {
    /// Open the repository at the current directory
    pub fn open_current_dir() -> Result<Self, GitError> {
        let inside = command::output(&["rev-parse", "--is-inside-work-tree"])?;
        if inside.trim() != "true" {
            return Err(GitError::NotAWorkTree);
        }

        let toplevel = command::output(&["rev-parse", "--show-toplevel"])?;
        Ok(Self {
            toplevel: PathBuf::from(toplevel.trim()),
        })
    }

    /// Root of the working tree; untracked paths are relative to it.
    pub fn toplevel(&self) -> &Path {
        &self.toplevel
    }

    /// Short name of the checked-out branch (`HEAD` when detached)
    pub fn current_branch(&self) -> Result<String, GitError> {
        Ok(command::output(&["rev-parse", "--abbrev-ref", "HEAD"])?
            .trim()
            .to_string())
    }

    /// Refresh remote-tracking refs from `remote`
    pub fn fetch(&self, remote: &str) -> Result<(), GitError> {
        command::run_quiet(&["fetch", remote])
    }

    /// Diff from the merge base of `base_ref` and HEAD to HEAD
    pub fn diff_since_merge_base(&self, base_ref: &str) -> Result<String, GitError> {
        let range = format!("{}...HEAD", base_ref);
        command::output(&["diff", "--no-color", "--no-ext-diff", &range])
    }

    /// Diff of tracked files (staged or not) against the last commit.
    ///
    /// Before the first commit the empty tree stands in for it, so files
    /// already added to the index still show up as new files.
    pub fn diff_worktree(&self) -> Result<String, GitError> {
        let base = if self.has_commits() {
            "HEAD".to_string()
        } else {
            self.empty_tree()?
        };
        command::output(&["diff", "--no-color", "--no-ext-diff", "--patience", &base])
    }

    fn has_commits(&self) -> bool {
        command::output(&["rev-parse", "--verify", "--quiet", "HEAD"]).is_ok()
    }

    /// Object id of the empty tree in this repository's hash format
    fn empty_tree(&self) -> Result<String, GitError> {
        // stdin is closed for captured commands, so git hashes zero bytes.
        Ok(command::output(&["hash-object", "-t", "tree", "--stdin"])?
            .trim()
            .to_string())
    }

    /// Untracked files that are not ignored, relative to the top level
    pub fn untracked_files(&self) -> Result<Vec<String>, GitError> {
        command::output_nul_separated(&[
            "ls-files",
            "-z",
            "--others",
            "--exclude-standard",
            "--full-name",
        ])
    }
}
