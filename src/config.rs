//! Configuration for reposnap.
//!
//! Built-in defaults can be overridden by `~/.config/reposnap/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Rules and refs shared by every extraction mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Branch the current branch is compared against in branch mode.
    pub base_branch: String,
    /// Remote holding the base branch.
    pub remote: String,
    /// Exact entry names pruned from every traversal, at any depth.
    pub ignore_names: Vec<String>,
    /// File extensions whose content is aggregated.
    pub include_extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_branch: "develop".to_string(),
            remote: "origin".to_string(),
            ignore_names: [
                "node_modules",
                ".git",
                ".vscode",
                "dist",
                "build",
                "coverage",
                ".DS_Store",
            ]
            .map(String::from)
            .to_vec(),
            include_extensions: [
                ".js", ".jsx", ".ts", ".tsx", ".py", ".java", ".c", ".cpp", ".cs", ".go", ".rb",
                ".php", ".swift", ".html", ".css", ".scss", ".less", ".json", ".xml", ".yaml",
                ".yml", ".md", ".sh", ".bash", ".sql",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

impl Config {
    /// `<remote>/<base>`, the ref branch mode diffs against.
    pub fn remote_base_ref(&self) -> String {
        format!("{}/{}", self.remote, self.base_branch)
    }
}

/// Returns the path to the config file: `~/.config/reposnap/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("reposnap").join("config.toml"))
}

/// Load configuration from disk. Returns default if file is missing or invalid.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => parse(&contents),
        Err(_) => Config::default(),
    }
}

fn parse(contents: &str) -> Config {
    match toml::from_str(contents) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Ignoring invalid config file: {}", e);
            Config::default()
        }
    }
}
