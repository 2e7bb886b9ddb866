//! Unified diff entries for files git cannot diff on its own.
//!
//! Untracked files have no blob in the index, so `git diff` never mentions
//! them. The entries built here use the exact header shape git prints for a
//! freshly added file, and are appended after git's own output.

use std::fmt;
use std::path::{Component, Path};

pub const NULL_DEVICE: &str = "/dev/null";
pub const NEW_FILE_MODE: &str = "100644";
pub const SYMLINK_MODE: &str = "120000";
/// Abbreviated hashes of the null blob and the empty blob.
pub const PLACEHOLDER_INDEX: &str = "0000000..e69de29";
pub const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";

/// A hunk in a diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffHunk {
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
    /// Body lines, each with its `+`, `-` or ` ` prefix.
    pub body: Vec<String>,
    /// The last line of the new side has no trailing newline.
    pub no_newline_at_end: bool,
}

impl DiffHunk {
    /// Hunk adding every line of `content` to an empty file.
    fn addition(content: &str) -> Self {
        let body: Vec<String> = content.lines().map(|line| format!("+{}", line)).collect();

        Self {
            old_start: 0,
            old_lines: 0,
            new_start: 1,
            new_lines: u32::try_from(body.len()).unwrap_or(u32::MAX),
            body,
            no_newline_at_end: !content.ends_with('\n'),
        }
    }

    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_lines, self.new_start, self.new_lines
        )
    }
}

impl fmt::Display for DiffHunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header())?;
        for line in &self.body {
            writeln!(f, "{}", line)?;
        }
        if self.no_newline_at_end {
            writeln!(f, "{}", NO_NEWLINE_MARKER)?;
        }
        Ok(())
    }
}

/// One file's section of a unified diff, for a file that did not exist before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEntry {
    /// Repository-relative path, always with `/` separators.
    pub path: String,
    pub mode: &'static str,
    pub hunks: Vec<DiffHunk>,
}

impl DiffEntry {
    /// Entry adding `content` as a new file at `relative_path`.
    ///
    /// Returns `None` for empty or whitespace-only content; such files carry
    /// nothing worth reviewing and are left out of the change set.
    pub fn new_file(relative_path: &Path, content: &str) -> Option<Self> {
        if content.trim().is_empty() {
            return None;
        }

        Some(Self {
            path: git_path(relative_path),
            mode: NEW_FILE_MODE,
            hunks: vec![DiffHunk::addition(content)],
        })
    }

    /// Entry adding a symlink: git records the link text, not the target's content.
    pub fn new_symlink(relative_path: &Path, target: &str) -> Self {
        Self {
            path: git_path(relative_path),
            mode: SYMLINK_MODE,
            hunks: vec![DiffHunk::addition(target)],
        }
    }
}

impl fmt::Display for DiffEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let old = quote_path("a/", &self.path);
        let new = quote_path("b/", &self.path);
        writeln!(f, "diff --git {} {}", old, new)?;
        writeln!(f, "new file mode {}", self.mode)?;
        writeln!(f, "index {}", PLACEHOLDER_INDEX)?;
        writeln!(f, "--- {}", NULL_DEVICE)?;
        writeln!(f, "+++ {}", new)?;
        for hunk in &self.hunks {
            write!(f, "{}", hunk)?;
        }
        Ok(())
    }
}

/// Render `path` the way git prints paths in diff headers: `/`-separated,
/// whatever the host separator is.
pub fn git_path(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn needs_quoting(byte: u8) -> bool {
    byte < 0x20 || byte >= 0x7f || byte == b'"' || byte == b'\\'
}

/// `prefix` + `path`, C-quoted the way git quotes header paths under the
/// default `core.quotePath`: control bytes, non-ASCII bytes, `"` and `\` are
/// escaped and the whole name is wrapped in double quotes.
pub fn quote_path(prefix: &str, path: &str) -> String {
    let name = format!("{}{}", prefix, path);
    if !name.bytes().any(needs_quoting) {
        return name;
    }

    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for byte in name.bytes() {
        match byte {
            0x07 => quoted.push_str("\\a"),
            0x08 => quoted.push_str("\\b"),
            b'\t' => quoted.push_str("\\t"),
            b'\n' => quoted.push_str("\\n"),
            0x0b => quoted.push_str("\\v"),
            0x0c => quoted.push_str("\\f"),
            b'\r' => quoted.push_str("\\r"),
            b'"' => quoted.push_str("\\\""),
            b'\\' => quoted.push_str("\\\\"),
            byte if needs_quoting(byte) => quoted.push_str(&format!("\\{:03o}", byte)),
            byte => quoted.push(byte as char),
        }
    }
    quoted.push('"');
    quoted
}

/// Git's own diff text followed by synthetic entries for untracked files.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    native: String,
    synthetic: Vec<DiffEntry>,
}

impl ChangeSet {
    pub fn new(native: String) -> Self {
        Self {
            native,
            synthetic: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: DiffEntry) {
        self.synthetic.push(entry);
    }

    pub fn synthetic(&self) -> &[DiffEntry] {
        &self.synthetic
    }

    pub fn is_blank(&self) -> bool {
        self.native.trim().is_empty() && self.synthetic.is_empty()
    }

    /// Native text first, then the synthetic entries, one blank line between
    /// consecutive sections.
    pub fn render(&self) -> String {
        let synthetic = self
            .synthetic
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");

        if self.native.trim().is_empty() {
            return synthetic;
        }
        if synthetic.is_empty() {
            return self.native.clone();
        }

        let mut out = self.native.clone();
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&synthetic);
        out
    }
}
