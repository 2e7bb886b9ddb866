//! Code extraction: filtered traversal and content aggregation.

mod aggregate;
mod filter;
mod walker;

pub use aggregate::ContentAggregator;
pub use filter::PathFilter;
pub use walker::display_name;

use crate::artifact::{self, Outcome};
use crate::config::Config;
use crate::error::{SnapshotError, SnapshotResult};
use chrono::Utc;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Extract every included file under `target` into a new artifact in `output_dir`.
pub fn extract_code(target: &Path, output_dir: &Path, config: &Config) -> SnapshotResult<Outcome> {
    let target = std::path::absolute(target)?;
    if !target.is_dir() {
        return Err(SnapshotError::InvalidInput { path: target });
    }

    let now = Utc::now();
    let output_path = output_dir.join(artifact::code_artifact_name(&target, now));
    tracing::info!("Extracting code from: {}", target.display());
    tracing::info!("Output will be saved to: {}", output_path.display());

    let filter = PathFilter::from_config(config);
    let mut sink = BufWriter::new(File::create(&output_path)?);
    let summary = ContentAggregator::new(&filter).write_artifact(
        &target,
        &artifact::header_timestamp(now),
        &mut sink,
    )?;
    sink.flush()?;

    tracing::info!(
        "Extracted {} files ({} skipped) into {}",
        summary.files_written,
        summary.files_skipped,
        output_path.display()
    );
    Ok(Outcome::Written(output_path))
}
