//! The two diff modes: branch comparison and unstaged changes.

use super::command::GitError;
use super::patch::{ChangeSet, DiffEntry};
use super::repository::Repository;
use crate::artifact::{self, Outcome};
use crate::config::Config;
use crate::error::{SnapshotError, SnapshotResult};
use crate::scan::display_name;
use crate::workdir::WorkdirGuard;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

const NOT_A_REPO_MARKERS: &[&str] = &["not a git repository"];
const MISSING_REF_MARKERS: &[&str] = &[
    "unknown revision",
    "bad revision",
    "ambiguous argument",
    "did not match",
    "couldn't find remote ref",
    "does not appear to be a git repository",
];

/// Map a git failure onto the user-facing taxonomy.
fn classify(err: GitError, target: &Path) -> SnapshotError {
    let stderr = err.stderr();
    if matches!(err, GitError::NotAWorkTree) || NOT_A_REPO_MARKERS.iter().any(|m| stderr.contains(m))
    {
        return SnapshotError::NotAWorkTree {
            path: target.to_path_buf(),
        };
    }

    SnapshotError::Git {
        command: err.command().to_string(),
        stderr: match &err {
            GitError::Failed { stderr, .. } => stderr.clone(),
            other => other.to_string(),
        },
    }
}

/// Like [`classify`], but recognizes a missing base branch or remote.
fn classify_ref(err: GitError, target: &Path, config: &Config) -> SnapshotError {
    if MISSING_REF_MARKERS.iter().any(|m| err.stderr().contains(m)) {
        return SnapshotError::RefNotFound {
            branch: config.base_branch.clone(),
            remote_ref: config.remote_base_ref(),
        };
    }
    classify(err, target)
}

/// Produces diff artifacts for a repository.
///
/// Every run moves the process into the target repository for its duration
/// and moves it back before returning, whatever the result.
pub struct DiffComposer<'a> {
    config: &'a Config,
    output_dir: PathBuf,
}

impl<'a> DiffComposer<'a> {
    pub fn new(config: &'a Config, output_dir: &Path) -> std::io::Result<Self> {
        Ok(Self {
            config,
            output_dir: std::path::absolute(output_dir)?,
        })
    }

    /// Check the target, enter it and open its repository.
    fn enter(&self, target: &Path) -> SnapshotResult<(PathBuf, WorkdirGuard, Repository)> {
        let target = std::path::absolute(target)?;
        if !target.is_dir() {
            return Err(SnapshotError::InvalidInput { path: target });
        }

        let guard = WorkdirGuard::enter(&target)?;
        tracing::debug!(
            "Entered {} (will return to {})",
            target.display(),
            guard.original().display()
        );
        let repo = Repository::open_current_dir().map_err(|e| classify(e, &target))?;
        Ok((target, guard, repo))
    }

    /// Diff the current branch against `<remote>/<base>` since their merge base.
    pub fn branch_diff(&self, target: &Path) -> SnapshotResult<Outcome> {
        let (target, _guard, repo) = self.enter(target)?;
        let config = self.config;

        let branch = repo.current_branch().map_err(|e| classify(e, &target))?;
        tracing::info!("Repository: {}", display_name(&target));
        tracing::info!("Current branch: {}", branch);

        if branch == config.base_branch {
            tracing::warn!(
                "Already on branch \"{}\". Nothing to compare.",
                config.base_branch
            );
            return Ok(Outcome::NothingToCompare { branch });
        }

        tracing::info!("Fetching remote refs from {}...", config.remote);
        repo.fetch(&config.remote)
            .map_err(|e| classify_ref(e, &target, config))?;

        let base_ref = config.remote_base_ref();
        tracing::info!("Generating diff between \"{}\" and \"{}\"...", base_ref, branch);
        let diff = repo
            .diff_since_merge_base(&base_ref)
            .map_err(|e| classify_ref(e, &target, config))?;

        if diff.trim().is_empty() {
            tracing::info!(
                "No differences between \"{}\" and \"{}\". No file will be generated.",
                base_ref,
                branch
            );
            return Ok(Outcome::NoDifferences { base_ref, branch });
        }

        let output_path = self.output_dir.join(artifact::branch_diff_artifact_name(
            &branch,
            &config.base_branch,
        ));
        fs::write(&output_path, diff)?;
        tracing::info!("Diff saved to: {}", output_path.display());
        Ok(Outcome::Written(output_path))
    }

    /// Diff tracked changes since the last commit plus every untracked file.
    pub fn unstaged_diff(&self, target: &Path) -> SnapshotResult<Outcome> {
        let (target, _guard, repo) = self.enter(target)?;
        tracing::info!(
            "Generating unstaged diff for repository: {}",
            display_name(&target)
        );

        let changes = self.collect_changes(&repo, &target)?;
        if changes.is_blank() {
            tracing::info!(
                "No unstaged changes found in \"{}\". No file will be generated.",
                target.display()
            );
            return Ok(Outcome::NoChanges { path: target });
        }

        tracing::debug!("{} new files included", changes.synthetic().len());
        let output_path = self
            .output_dir
            .join(artifact::unstaged_artifact_name(&target, Utc::now()));
        fs::write(&output_path, changes.render())?;
        tracing::info!("Unstaged diff saved to: {}", output_path.display());
        Ok(Outcome::Written(output_path))
    }

    fn collect_changes(&self, repo: &Repository, target: &Path) -> SnapshotResult<ChangeSet> {
        let native = repo.diff_worktree().map_err(|e| classify(e, target))?;
        let untracked = repo.untracked_files().map_err(|e| classify(e, target))?;
        if !untracked.is_empty() {
            tracing::info!("Found {} new (untracked) files.", untracked.len());
        }

        let mut changes = ChangeSet::new(native);
        for file in untracked {
            let relative = Path::new(&file);
            match new_file_entry(&repo.toplevel().join(relative), relative) {
                Ok(Some(entry)) => changes.push(entry),
                Ok(None) => tracing::debug!("Skipping empty new file {}", file),
                Err(e) => tracing::warn!("Could not read new file {}, skipping: {}", file, e),
            }
        }

        Ok(changes)
    }
}

/// Synthetic entry for an untracked path. Symlinks are recorded by their
/// link text, never followed.
fn new_file_entry(full: &Path, relative: &Path) -> std::io::Result<Option<DiffEntry>> {
    if fs::symlink_metadata(full)?.file_type().is_symlink() {
        let target = fs::read_link(full)?;
        return Ok(Some(DiffEntry::new_symlink(
            relative,
            &target.to_string_lossy(),
        )));
    }

    let content = fs::read_to_string(full)?;
    Ok(DiffEntry::new_file(relative, &content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use crate::git::testing::{git, init_empty_repo, init_repo};
    use tempfile::TempDir;

    fn cwd() -> PathBuf {
        std::env::current_dir().unwrap()
    }

    fn artifacts(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect()
    }

    #[test]
    #[serial]
    fn test_unstaged_native_then_synthetic() {
        let repo = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        init_repo(repo.path());
        fs::write(repo.path().join("tracked.txt"), "one\nchanged\n").unwrap();
        fs::create_dir_all(repo.path().join("src").join("nested")).unwrap();
        fs::write(
            repo.path().join("src").join("nested").join("new.rs"),
            "fn x() {}\nfn y() {}\n",
        )
        .unwrap();
        fs::write(repo.path().join("empty.txt"), "").unwrap();
        fs::write(repo.path().join("debug.log"), "ignored\n").unwrap();

        let before = cwd();
        let config = Config::default();
        let outcome = DiffComposer::new(&config, out.path())
            .unwrap()
            .unstaged_diff(repo.path())
            .unwrap();
        assert_eq!(cwd(), before);

        let path = outcome.artifact().unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("unstaged_diff_"));
        let text = fs::read_to_string(path).unwrap();

        let native = text.find("diff --git a/tracked.txt b/tracked.txt").unwrap();
        let synthetic = text
            .find("diff --git a/src/nested/new.rs b/src/nested/new.rs")
            .unwrap();
        assert!(native < synthetic);
        assert!(text.contains("+changed\n"));
        assert!(text.contains(
            "new file mode 100644\n\
             index 0000000..e69de29\n\
             --- /dev/null\n\
             +++ b/src/nested/new.rs\n\
             @@ -0,0 +1,2 @@\n\
             +fn x() {}\n\
             +fn y() {}\n"
        ));
        assert!(!text.contains("empty.txt"));
        assert!(!text.contains("debug.log"));
    }

    #[test]
    #[serial]
    fn test_unstaged_from_subdirectory_uses_repository_paths() {
        let repo = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        init_repo(repo.path());
        fs::create_dir(repo.path().join("sub")).unwrap();
        fs::write(repo.path().join("sub").join("notes.md"), "hello\n").unwrap();

        let config = Config::default();
        let outcome = DiffComposer::new(&config, out.path())
            .unwrap()
            .unstaged_diff(&repo.path().join("sub"))
            .unwrap();

        let text = fs::read_to_string(outcome.artifact().unwrap()).unwrap();
        assert!(text.starts_with("diff --git a/sub/notes.md b/sub/notes.md\n"));
    }

    #[test]
    #[serial]
    fn test_unstaged_clean_repo_writes_nothing() {
        let repo = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        init_repo(repo.path());
        fs::write(repo.path().join("blank.txt"), "   \n").unwrap();

        let config = Config::default();
        let outcome = DiffComposer::new(&config, out.path())
            .unwrap()
            .unstaged_diff(repo.path())
            .unwrap();

        assert!(matches!(outcome, Outcome::NoChanges { .. }));
        assert!(artifacts(out.path()).is_empty());
    }

    #[test]
    #[serial]
    fn test_unstaged_before_first_commit_includes_staged_files() {
        let repo = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        init_empty_repo(repo.path());
        fs::write(repo.path().join("staged.js"), "let a = 1;\n").unwrap();
        git(repo.path(), &["add", "staged.js"]);

        let config = Config::default();
        let outcome = DiffComposer::new(&config, out.path())
            .unwrap()
            .unstaged_diff(repo.path())
            .unwrap();

        let text = fs::read_to_string(outcome.artifact().unwrap()).unwrap();
        assert!(text.contains("diff --git a/staged.js b/staged.js\n"));
        assert!(text.contains("+let a = 1;\n"));
    }

    #[test]
    #[serial]
    fn test_unreadable_new_file_is_skipped() {
        let repo = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        init_repo(repo.path());
        fs::write(repo.path().join("binary.dat"), [0xff, 0xfe]).unwrap();
        fs::write(repo.path().join("valid.md"), "kept\n").unwrap();

        let config = Config::default();
        let outcome = DiffComposer::new(&config, out.path())
            .unwrap()
            .unstaged_diff(repo.path())
            .unwrap();

        let text = fs::read_to_string(outcome.artifact().unwrap()).unwrap();
        assert!(text.contains("diff --git a/valid.md b/valid.md\n"));
        assert!(text.contains("+kept\n"));
        assert!(!text.contains("binary.dat"));
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn test_new_symlink_records_link_text() {
        let repo = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        init_repo(repo.path());
        std::os::unix::fs::symlink("tracked.txt", repo.path().join("link")).unwrap();

        let config = Config::default();
        let outcome = DiffComposer::new(&config, out.path())
            .unwrap()
            .unstaged_diff(repo.path())
            .unwrap();

        let text = fs::read_to_string(outcome.artifact().unwrap()).unwrap();
        assert!(text.contains(
            "diff --git a/link b/link\n\
             new file mode 120000\n\
             index 0000000..e69de29\n\
             --- /dev/null\n\
             +++ b/link\n\
             @@ -0,0 +1,1 @@\n\
             +tracked.txt\n\
             \\ No newline at end of file\n"
        ));
        assert!(!text.contains("+one\n"));
    }

    #[test]
    #[serial]
    fn test_not_a_repository() {
        let plain = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();

        let before = cwd();
        let config = Config::default();
        let composer = DiffComposer::new(&config, out.path()).unwrap();

        let err = composer.unstaged_diff(plain.path()).unwrap_err();
        assert!(matches!(err, SnapshotError::NotAWorkTree { .. }));
        let err = composer.branch_diff(plain.path()).unwrap_err();
        assert!(matches!(err, SnapshotError::NotAWorkTree { .. }));

        assert_eq!(cwd(), before);
        assert!(artifacts(out.path()).is_empty());
    }

    #[test]
    #[serial]
    fn test_missing_target_is_invalid_input() {
        let out = TempDir::new().unwrap();
        let config = Config::default();
        let composer = DiffComposer::new(&config, out.path()).unwrap();

        let err = composer
            .branch_diff(&out.path().join("missing"))
            .unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidInput { .. }));
    }

    #[test]
    #[serial]
    fn test_branch_on_base_has_nothing_to_compare() {
        let repo = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        init_repo(repo.path());

        let before = cwd();
        let config = Config::default();
        let outcome = DiffComposer::new(&config, out.path())
            .unwrap()
            .branch_diff(repo.path())
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::NothingToCompare {
                branch: "develop".to_string()
            }
        );
        assert!(artifacts(out.path()).is_empty());
        assert_eq!(cwd(), before);
    }

    /// A clone of a `develop` repository, checked out on `feature/login`.
    fn feature_clone(scratch: &Path) -> PathBuf {
        let origin = scratch.join("origin");
        let clone = scratch.join("clone");
        fs::create_dir(&origin).unwrap();
        init_repo(&origin);
        git(
            scratch,
            &["clone", "-q", origin.to_str().unwrap(), clone.to_str().unwrap()],
        );
        git(&clone, &["checkout", "-q", "-b", "feature/login"]);
        clone
    }

    #[test]
    #[serial]
    fn test_branch_diff_written_under_sanitized_name() {
        let scratch = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let clone = feature_clone(scratch.path());
        fs::write(clone.join("login.js"), "export const login = true;\n").unwrap();
        git(&clone, &["add", "login.js"]);
        git(&clone, &["commit", "-q", "-m", "add login"]);

        let config = Config::default();
        let outcome = DiffComposer::new(&config, out.path())
            .unwrap()
            .branch_diff(&clone)
            .unwrap();

        let path = outcome.artifact().unwrap();
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "diff_feature-login__develop.txt"
        );
        let text = fs::read_to_string(path).unwrap();
        assert!(text.starts_with("diff --git a/login.js b/login.js\n"));
        assert!(text.contains("+export const login = true;\n"));
    }

    #[test]
    #[serial]
    fn test_branch_without_changes_reports_no_differences() {
        let scratch = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let clone = feature_clone(scratch.path());

        let config = Config::default();
        let outcome = DiffComposer::new(&config, out.path())
            .unwrap()
            .branch_diff(&clone)
            .unwrap();

        assert!(matches!(outcome, Outcome::NoDifferences { .. }));
        assert!(artifacts(out.path()).is_empty());
    }

    #[test]
    #[serial]
    fn test_missing_base_branch_is_ref_not_found() {
        let scratch = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let clone = feature_clone(scratch.path());

        let before = cwd();
        let config = Config {
            base_branch: "release".to_string(),
            ..Config::default()
        };
        let err = DiffComposer::new(&config, out.path())
            .unwrap()
            .branch_diff(&clone)
            .unwrap_err();

        match err {
            SnapshotError::RefNotFound { branch, remote_ref } => {
                assert_eq!(branch, "release");
                assert_eq!(remote_ref, "origin/release");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(cwd(), before);
    }

    #[test]
    #[serial]
    fn test_missing_remote_is_ref_not_found() {
        let repo = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        init_repo(repo.path());
        git(repo.path(), &["checkout", "-q", "-b", "feature"]);

        let config = Config::default();
        let err = DiffComposer::new(&config, out.path())
            .unwrap()
            .branch_diff(repo.path())
            .unwrap_err();

        assert!(matches!(err, SnapshotError::RefNotFound { .. }));
    }

    #[test]
    fn test_classify_generic_failure_keeps_detail() {
        let err = GitError::Failed {
            command: "diff".to_string(),
            status: Some(128),
            stderr: "fatal: something odd\n".to_string(),
        };
        let classified = classify(err, Path::new("/repo"));
        assert!(matches!(classified, SnapshotError::Git { .. }));
        assert_eq!(classified.detail(), Some("fatal: something odd"));
    }

    #[test]
    fn test_classify_not_a_repository_message() {
        let err = GitError::Failed {
            command: "rev-parse --is-inside-work-tree".to_string(),
            status: Some(128),
            stderr: "fatal: not a git repository (or any of the parent directories): .git\n"
                .to_string(),
        };
        assert!(matches!(
            classify(err, Path::new("/repo")),
            SnapshotError::NotAWorkTree { .. }
        ));
    }
}
