use clap::{CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

/// reposnap - text snapshots of a codebase for humans and AI tools
#[derive(Parser, Debug)]
#[command(name = "reposnap", version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub mode: Option<Mode>,

    /// Directory the artifact is written to (defaults to the current directory)
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    pub output_dir: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Generate shell completions
    #[arg(long, value_enum)]
    pub completions: Option<Shell>,
}

/// What to extract
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Concatenate a project's source files into one annotated text file
    Code {
        #[arg(value_hint = ValueHint::DirPath)]
        path: PathBuf,
    },
    /// Diff the current branch against the remote base branch
    Branch {
        #[arg(value_hint = ValueHint::DirPath)]
        path: PathBuf,
        /// Base branch to compare against
        #[arg(long)]
        base: Option<String>,
        /// Remote the base branch is fetched from
        #[arg(long)]
        remote: Option<String>,
    },
    /// Diff uncommitted changes, new untracked files included
    Unstaged {
        #[arg(value_hint = ValueHint::DirPath)]
        path: PathBuf,
    },
}

impl Mode {
    /// Build a mode from a menu choice (`1`, `2` or `3`)
    pub fn from_choice(choice: &str, path: PathBuf) -> Option<Self> {
        match choice.trim() {
            "1" => Some(Mode::Code { path }),
            "2" => Some(Mode::Branch {
                path,
                base: None,
                remote: None,
            }),
            "3" => Some(Mode::Unstaged { path }),
            _ => None,
        }
    }

    pub fn path(&self) -> &PathBuf {
        match self {
            Mode::Code { path } | Mode::Branch { path, .. } | Mode::Unstaged { path } => path,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Code { .. } => "Code extraction",
            Mode::Branch { .. } => "Branch diff",
            Mode::Unstaged { .. } => "Unstaged diff",
        }
    }
}

/// Generate shell completions to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Args::command();
    generate(shell, &mut cmd, "reposnap", &mut io::stdout());
}
