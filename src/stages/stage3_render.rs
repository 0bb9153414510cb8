use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::io::{write_json, CsvEncoding, KhCoderText, SpeakerTable};
use crate::models::{MemberList, Minutes, Rosters, WorkingGroupList};

/// Configuration for Stage 3 rendering
#[derive(Debug, Clone)]
pub struct Stage3Config {
    /// Whether to write `all.json`
    pub generate_json: bool,
    /// Whether to write `all_speaker.csv`
    pub generate_csv: bool,
    pub csv_encoding: CsvEncoding,
    /// Whether to write `all_khcoder.txt`
    pub generate_kh_coder: bool,
}

impl Default for Stage3Config {
    fn default() -> Self {
        Self {
            generate_json: true,
            generate_csv: true,
            csv_encoding: CsvEncoding::default(),
            generate_kh_coder: true,
        }
    }
}

/// Result of Stage 3 rendering
#[derive(Debug, Default)]
pub struct Stage3Result {
    pub json_path: Option<PathBuf>,
    pub csv_path: Option<PathBuf>,
    pub kh_coder_path: Option<PathBuf>,
    pub roster_paths: Vec<PathBuf>,
}

/// Execute Stage 3: Rendering
///
/// Produces the combined views of a batch in `output_dir`:
/// 1. `all.json`: every transcript, structured
/// 2. `all_speaker.csv`: one row per distinct speaker per transcript
/// 3. `all_khcoder.txt`: plain text for KH Coder
/// 4. `memberlist/<roster>.json`: each parsed roster
pub fn execute_stage3(
    minutes: &[Minutes],
    rosters: &Rosters,
    roster_files: &[(PathBuf, MemberList)],
    working_groups: Option<&WorkingGroupList>,
    output_dir: &Path,
    config: &Stage3Config,
) -> Result<Stage3Result> {
    let mut result = Stage3Result::default();

    if config.generate_json {
        let path = output_dir.join("all.json");
        info!("Writing combined transcripts to {:?}", path);
        write_json(minutes, &path)?;
        result.json_path = Some(path);
    }

    if config.generate_csv {
        let path = output_dir.join("all_speaker.csv");
        info!("Writing speaker table to {:?}", path);
        SpeakerTable::new(minutes, rosters).write_file(&path, config.csv_encoding)?;
        result.csv_path = Some(path);
    }

    if config.generate_kh_coder {
        let path = output_dir.join("all_khcoder.txt");
        info!("Writing KH Coder text to {:?}", path);
        KhCoderText::new(minutes, working_groups).write_file(&path)?;
        result.kh_coder_path = Some(path);
    }

    if !roster_files.is_empty() {
        let dir = output_dir.join("memberlist");
        std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create {:?}", dir))?;
        for (source, member_list) in roster_files {
            let stem = source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let path = dir.join(format!("{}.json", stem));
            write_json(member_list, &path)?;
            result.roster_paths.push(path);
        }
    }

    Ok(result)
}
