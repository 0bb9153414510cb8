use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::io::{list_html_files, load_minutes_file, write_json};
use crate::models::Minutes;
use crate::parser::{DocumentKind, ScannedConfig};

/// Configuration for Stage 1 segmentation
#[derive(Debug, Clone, Default)]
pub struct Stage1Config {
    pub scanned: ScannedConfig,
    /// Directory for one `<file>.json` per transcript, if any
    pub per_file_output: Option<PathBuf>,
}

/// Result of Stage 1 segmentation
#[derive(Debug, Default)]
pub struct Stage1Result {
    pub minutes: Vec<Minutes>,
    /// Files that could not be parsed
    pub skipped: Vec<PathBuf>,
}

/// Execute Stage 1: segment every transcript in the given directories
///
/// Each `(dir, kind)` pair is processed in order. A document that fails to
/// parse is logged and skipped; the batch continues.
pub fn execute_stage1(sources: &[(PathBuf, DocumentKind)], config: &Stage1Config) -> Result<Stage1Result> {
    let mut result = Stage1Result::default();

    for (dir, kind) in sources {
        for path in list_html_files(dir)? {
            info!("Processing {:?} ({:?})", path, kind);
            match load_minutes_file(&path, *kind, &config.scanned) {
                Ok(minutes) => {
                    if let Some(out_dir) = &config.per_file_output {
                        if let Err(e) = write_per_file(out_dir, &path, &minutes) {
                            warn!("Skipping transcript {:?}: {:#}", path, e);
                            result.skipped.push(path);
                            continue;
                        }
                    }
                    result.minutes.push(minutes);
                }
                Err(e) => {
                    warn!("Skipping transcript: {}", e);
                    result.skipped.push(path);
                }
            }
        }
    }

    info!(
        "Stage 1: {} transcripts parsed, {} skipped",
        result.minutes.len(),
        result.skipped.len()
    );
    Ok(result)
}

fn write_per_file(out_dir: &Path, source: &Path, minutes: &Minutes) -> Result<()> {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let path = out_dir.join(format!("{}.json", name));
    debug!("Writing {:?}", path);
    write_json(minutes, &path)?;
    Ok(())
}
