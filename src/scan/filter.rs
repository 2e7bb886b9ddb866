//! Name and extension rules deciding which entries take part in a scan.

use crate::config::Config;
use std::collections::HashSet;
use std::path::Path;

/// Exclusion by exact entry name, inclusion by file extension.
#[derive(Debug, Clone)]
pub struct PathFilter {
    ignore_names: HashSet<String>,
    include_extensions: HashSet<String>,
}

impl PathFilter {
    pub fn new<I, E>(ignore_names: I, include_extensions: E) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Self {
            ignore_names: ignore_names.into_iter().map(Into::into).collect(),
            include_extensions: include_extensions
                .into_iter()
                .map(|ext| normalize_extension(ext.as_ref()))
                .collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.ignore_names.iter().cloned(),
            config.include_extensions.iter(),
        )
    }

    /// True iff `name` is exactly one of the ignored names. No glob or prefix matching.
    pub fn should_ignore(&self, name: &str) -> bool {
        self.ignore_names.contains(name)
    }

    /// True iff the extension of `path`, lower-cased with its leading dot, is included.
    ///
    /// Only meaningful for files; callers check the entry kind first.
    pub fn is_included(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.include_extensions
                    .contains(&format!(".{}", ext.to_lowercase()))
            })
    }
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}
