//! Concatenation of included files into one annotated text artifact.

use super::filter::PathFilter;
use super::walker::{EntryKind, TreeWalker};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

const RULE_WIDTH: usize = 80;

const TITLE: &str = "EXTRACCIÓN DE CÓDIGO PARA ENTRENAMIENTO DE IA";
const STRUCTURE_HEADING: &str = "ESTRUCTURA DEL PROYECTO:";
const CONTENT_HEADING: &str = "CONTENIDO DE LOS ARCHIVOS:";
const FILE_LABEL: &str = "ARCHIVO: ";

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Counts reported after a content pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateSummary {
    pub files_written: usize,
    pub files_skipped: usize,
}

/// Streams every included file under a root into a sink, one block per file.
///
/// Blocks are written as soon as each file is read, so at most one file's
/// content is held in memory.
pub struct ContentAggregator<'a> {
    filter: &'a PathFilter,
}

impl<'a> ContentAggregator<'a> {
    pub fn new(filter: &'a PathFilter) -> Self {
        Self { filter }
    }

    /// Write the full artifact: header, structure section, then file contents.
    pub fn write_artifact<W: Write>(
        &self,
        root: &Path,
        generated_at: &str,
        sink: &mut W,
    ) -> io::Result<AggregateSummary> {
        self.write_header(root, generated_at, sink)?;
        self.write_structure(root, sink)?;
        self.aggregate(root, sink)
    }

    pub fn write_header<W: Write>(
        &self,
        root: &Path,
        generated_at: &str,
        sink: &mut W,
    ) -> io::Result<()> {
        writeln!(sink, "{}", TITLE)?;
        writeln!(sink, "Fecha de extracción: {}", generated_at)?;
        writeln!(sink, "Directorio base: {}", root.display())?;
        write!(sink, "{}\n\n", rule())
    }

    pub fn write_structure<W: Write>(&self, root: &Path, sink: &mut W) -> io::Result<()> {
        writeln!(sink, "{}", STRUCTURE_HEADING)?;
        sink.write_all(TreeWalker::new(self.filter).render_tree(root).as_bytes())?;
        write!(sink, "\n{}\n\n", rule())?;
        writeln!(sink, "{}", CONTENT_HEADING)
    }

    /// Content pass. Unreadable files and directories are skipped with a
    /// warning; only sink errors stop the pass.
    pub fn aggregate<W: Write>(&self, root: &Path, sink: &mut W) -> io::Result<AggregateSummary> {
        let mut summary = AggregateSummary::default();

        for item in TreeWalker::new(self.filter).walk(root) {
            let entry = match item {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(
                        "Could not read directory {}: {}",
                        root.join(&err.relative_path).display(),
                        err.message
                    );
                    continue;
                }
            };

            if entry.kind != EntryKind::File || !self.filter.is_included(&entry.relative_path) {
                continue;
            }

            let content = match fs::read_to_string(root.join(&entry.relative_path)) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(
                        "Could not read file {}: {}",
                        entry.relative_path.display(),
                        e
                    );
                    summary.files_skipped += 1;
                    continue;
                }
            };

            let rule = rule();
            write!(
                sink,
                "\n\n{}\n{}{}\n{}\n\n",
                rule,
                FILE_LABEL,
                entry.relative_path.display(),
                rule
            )?;
            sink.write_all(content.as_bytes())?;

            tracing::info!("Processed: {}", entry.relative_path.display());
            summary.files_written += 1;
        }

        Ok(summary)
    }
}
