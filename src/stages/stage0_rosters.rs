use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::io::{list_html_files, load_member_list_file};
use crate::models::{MemberList, Rosters};

/// Result of Stage 0 roster loading
#[derive(Debug, Default)]
pub struct Stage0Result {
    /// Rosters keyed by working-group order
    pub rosters: Rosters,
    /// Every parsed roster with its source file, for export
    pub files: Vec<(PathBuf, MemberList)>,
}

/// Execute Stage 0: load every roster file in `dir`
///
/// Files without a working-group order in their name are exported but not
/// used for resolution. A later file for the same order replaces an earlier one.
pub fn execute_stage0(dir: &Path) -> Result<Stage0Result> {
    let mut result = Stage0Result::default();

    for path in list_html_files(dir)? {
        let member_list = match load_member_list_file(&path) {
            Ok(list) => list,
            Err(e) => {
                warn!("Skipping roster: {}", e);
                continue;
            }
        };
        debug!("Roster {:?}: {} members", path, member_list.len());

        match &member_list.working_group_order {
            Some(order) => {
                if result
                    .rosters
                    .insert(order.clone(), member_list.clone())
                    .is_some()
                {
                    debug!("Roster {:?} replaces an earlier roster for no{}", path, order);
                }
            }
            None => warn!("No working-group order in roster file name {:?}", path),
        }
        result.files.push((path, member_list));
    }

    info!(
        "Stage 0: {} roster files, {} working groups",
        result.files.len(),
        result.rosters.len()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(name: &str) -> String {
        format!(
            r#"<div id="contentsMain"><table><tr><th>主査</th><td>{}</td><td>X大学</td></tr></table></div>"#,
            name
        )
    }

    #[test]
    fn test_stage0_keys_by_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("no01wg050-a.htm"), roster("山田花子")).unwrap();
        std::fs::write(dir.path().join("no01wg050-b.htm"), roster("鈴木一郎")).unwrap();
        std::fs::write(dir.path().join("no02wg051-a.htm"), roster("佐藤次郎")).unwrap();
        std::fs::write(dir.path().join("meibo.htm"), roster("田中三郎")).unwrap();

        let result = execute_stage0(dir.path()).unwrap();

        assert_eq!(result.files.len(), 4);
        assert_eq!(result.rosters.len(), 2);
        assert_eq!(result.rosters["01"].members[0].name, "鈴木一郎");
        assert_eq!(result.rosters["02"].members[0].name, "佐藤次郎");
    }
}
