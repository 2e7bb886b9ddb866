//! Throwaway git repositories for tests.

use std::fs;
use std::path::Path;
use std::process::Command;

/// Run git in `dir` with a fixed identity, failing the test on error.
pub fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args([
            "-c",
            "user.name=Test",
            "-c",
            "user.email=test@example.com",
            "-c",
            "commit.gpgsign=false",
            "-c",
            "init.defaultBranch=develop",
        ])
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Empty repository on `develop`, no commits yet.
pub fn init_empty_repo(dir: &Path) {
    git(dir, &["init", "-q"]);
    git(dir, &["symbolic-ref", "HEAD", "refs/heads/develop"]);
}

/// Repository on `develop` with one committed file.
pub fn init_repo(dir: &Path) {
    init_empty_repo(dir);
    fs::write(dir.join("tracked.txt"), "one\ntwo\n").unwrap();
    fs::write(dir.join(".gitignore"), "*.log\n").unwrap();
    git(dir, &["add", "."]);
    git(dir, &["commit", "-q", "-m", "initial"]);
}
