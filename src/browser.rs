//! Directory listing and `cd`-style navigation for the file panel.

use crate::host::OsFamily;
use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const TEXT_EXTENSIONS: &[&str] = &["py", "js", "html", "css", "txt", "md", "json"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BrowseError {
    #[error("no directory given")]
    Empty,

    #[error("Directory not found: {0}")]
    NotADirectory(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntryKind {
    Directory,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
    pub is_text: bool,
}

impl DirEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

fn has_text_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            TEXT_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Directories first, then files; each group ordered by name.
pub fn list_directory(dir: &Path) -> io::Result<Vec<DirEntry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!("skipping unreadable entry in {}: {err}", dir.display());
                continue;
            }
        };
        let path = entry.path();
        let kind = if path.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        entries.push(DirEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_text: kind == EntryKind::File && has_text_extension(&path),
            path,
            kind,
        });
    }

    entries.sort_by(|a, b| match a.kind.cmp(&b.kind) {
        Ordering::Equal => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        other => other,
    });
    Ok(entries)
}

pub fn parent_of(dir: &Path) -> Option<PathBuf> {
    dir.parent().map(Path::to_path_buf)
}

/// `X:\...` only; `X:foo` is relative to the drive's current directory.
fn is_drive_path(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'\\'
}

/// Resolves user input from the path box against `current`.
pub fn resolve_cd(current: &Path, input: &str, os_family: OsFamily) -> Result<PathBuf, BrowseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(BrowseError::Empty);
    }

    let candidate = if input == ".." {
        parent_of(current).unwrap_or_else(|| current.to_path_buf())
    } else if input.starts_with('/') || (os_family == OsFamily::Windows && is_drive_path(input)) {
        PathBuf::from(input)
    } else {
        current.join(input)
    };

    if candidate.is_dir() {
        Ok(candidate)
    } else {
        Err(BrowseError::NotADirectory(input.to_string()))
    }
}
