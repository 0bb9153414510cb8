use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::models::{MemberList, Minutes, WorkingGroupList};
use crate::parser::{self, DocumentKind, ScannedConfig};

/// Read a document as UTF-8 text
pub fn read_document(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    String::from_utf8(bytes).map_err(|_| Error::Encoding {
        path: path.to_path_buf(),
    })
}

/// List `*.htm` and `*.html` files in `dir`, sorted by name
pub fn list_html_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        let is_html = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("htm") || ext.eq_ignore_ascii_case("html"));
        if path.is_file() && is_html {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Parse a minutes file of the given kind
pub fn load_minutes_file(path: &Path, kind: DocumentKind, config: &ScannedConfig) -> Result<Minutes> {
    let markup = read_document(path)?;
    let file_name = path.to_string_lossy();
    match kind {
        DocumentKind::Html => parser::html::parse_minutes(&markup, &file_name),
        DocumentKind::Scanned => Ok(parser::scanned::parse_minutes(&markup, &file_name, config)),
    }
}

/// Parse a roster file, taking the working-group order from its name
pub fn load_member_list_file(path: &Path) -> Result<MemberList> {
    let markup = read_document(path)?;
    let mut member_list = parser::parse_member_list(&markup);
    member_list.working_group_order = path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(parser::roster_order);
    Ok(member_list)
}

/// Load the working-group list written by the downloader
pub fn load_working_groups(path: &Path) -> Result<WorkingGroupList> {
    let content = read_document(path)?;
    Ok(serde_json::from_str(&content)?)
}
