//! Pruned, depth-first traversal of a directory tree.

use super::filter::PathFilter;
use std::borrow::Cow;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const INDENT: &str = "    ";
const DIR_GLYPH: &str = "┗━━ ";
const LEAF_GLYPH: &str = "┣━━ ";

/// Kind of a traversed entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// Symlinks and special files: listed in the structure, never read.
    Other,
}

/// One entry of a traversal, relative to the traversal root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub relative_path: PathBuf,
    pub kind: EntryKind,
}

impl TreeEntry {
    pub fn name(&self) -> Cow<'_, str> {
        self.relative_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default()
    }

    /// Nesting level; children of the root are at depth 1.
    pub fn depth(&self) -> usize {
        self.relative_path.components().count()
    }
}

/// A directory (or entry) the walker could not read. The walk continues past it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkError {
    pub relative_path: PathBuf,
    pub message: String,
}

impl WalkError {
    fn from_walkdir(root: &Path, err: walkdir::Error) -> Self {
        let relative_path = err
            .path()
            .map(|p| p.strip_prefix(root).unwrap_or(p).to_path_buf())
            .unwrap_or_default();
        let message = err
            .io_error()
            .map(|e| e.to_string())
            .unwrap_or_else(|| err.to_string());
        Self {
            relative_path,
            message,
        }
    }

    fn depth(&self) -> usize {
        self.relative_path.components().count()
    }
}

pub type WalkItem = Result<TreeEntry, WalkError>;

/// Enumerates a directory under a [`PathFilter`].
///
/// Entries come out parent first, in the order the filesystem lists them at
/// each level. Ignored names are pruned before descent, so nothing under an
/// ignored directory is ever read. The root itself is never pruned.
#[derive(Debug, Clone, Copy)]
pub struct TreeWalker<'a> {
    filter: &'a PathFilter,
}

impl<'a> TreeWalker<'a> {
    pub fn new(filter: &'a PathFilter) -> Self {
        Self { filter }
    }

    /// Lazily walk `root`. Every call reads the filesystem again.
    pub fn walk(&self, root: &Path) -> impl Iterator<Item = WalkItem> + 'a {
        let filter = self.filter;
        let root = root.to_path_buf();

        WalkDir::new(&root)
            .min_depth(1)
            .into_iter()
            .filter_entry(move |entry| {
                entry.depth() == 0 || !filter.should_ignore(&entry.file_name().to_string_lossy())
            })
            .map(move |item| match item {
                Ok(entry) => {
                    let file_type = entry.file_type();
                    let kind = if file_type.is_dir() {
                        EntryKind::Directory
                    } else if file_type.is_file() {
                        EntryKind::File
                    } else {
                        EntryKind::Other
                    };
                    Ok(TreeEntry {
                        relative_path: entry
                            .path()
                            .strip_prefix(&root)
                            .unwrap_or(entry.path())
                            .to_path_buf(),
                        kind,
                    })
                }
                Err(err) => Err(WalkError::from_walkdir(&root, err)),
            })
    }

    /// Indented drawing of the same pruned traversal as [`TreeWalker::walk`].
    ///
    /// The first line is the root's own name.
    pub fn render_tree(&self, root: &Path) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", display_name(root));

        for item in self.walk(root) {
            match item {
                Ok(entry) => {
                    let glyph = if entry.kind == EntryKind::Directory {
                        DIR_GLYPH
                    } else {
                        LEAF_GLYPH
                    };
                    let _ = writeln!(
                        out,
                        "{}{}{}",
                        INDENT.repeat(entry.depth()),
                        glyph,
                        entry.name()
                    );
                }
                Err(err) => {
                    tracing::warn!(
                        "Could not read directory structure of {}: {}",
                        root.join(&err.relative_path).display(),
                        err.message
                    );
                    let name = err
                        .relative_path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| display_name(root));
                    let _ = writeln!(
                        out,
                        "{}{}ERROR AL LEER DIRECTORIO: {}",
                        INDENT.repeat(err.depth() + 1),
                        LEAF_GLYPH,
                        name
                    );
                }
            }
        }

        out
    }
}

/// Base name of `path`, or the whole path when it has none (e.g. `/`).
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
