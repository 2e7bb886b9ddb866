//! Scoped change of the process working directory.
//!
//! git is driven from inside the target repository, which means moving the
//! whole process there. The guard serializes those moves and always puts the
//! original directory back.

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

static WORKDIR_LOCK: Mutex<()> = Mutex::new(());

/// Holds the process inside another directory until dropped.
///
/// Only one guard exists at a time; a second `enter` blocks until the first
/// guard is dropped. Dropping restores the original directory before the
/// lock is released, on success, early return, `?` and unwinding alike.
#[derive(Debug)]
pub struct WorkdirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl WorkdirGuard {
    pub fn enter(dir: impl AsRef<Path>) -> io::Result<Self> {
        let lock = WORKDIR_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let original = env::current_dir()?;
        env::set_current_dir(dir.as_ref())?;

        Ok(Self {
            original,
            _lock: lock,
        })
    }

    /// The directory restored on drop
    pub fn original(&self) -> &Path {
        &self.original
    }
}

impl Drop for WorkdirGuard {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.original) {
            tracing::error!(
                "Could not restore working directory {}: {}",
                self.original.display(),
                e
            );
        }
    }
}
