use std::path::{Path, PathBuf};

pub mod store;

pub const MAX_RECENT_FILES: usize = 10;

/// Most-recent-first list of files opened through the launcher.
#[derive(Debug, Clone, Default)]
pub struct RecentFiles {
    path: PathBuf,
    entries: Vec<String>,
}

impl RecentFiles {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            entries: Vec::new(),
        }
    }

    /// Missing file means an empty list; anything unreadable is reported as
    /// a warning and also yields an empty list.
    pub fn load(path: PathBuf) -> (Self, Option<String>) {
        match store::read_entries(&path) {
            Ok(mut entries) => {
                entries.truncate(MAX_RECENT_FILES);
                (Self { path, entries }, None)
            }
            Err(warning) => (Self::new(path), Some(warning)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Entries whose file is still on disk, with their index in `entries`.
    pub fn existing(&self) -> Vec<(usize, &str)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| Path::new(entry.as_str()).exists())
            .map(|(index, entry)| (index, entry.as_str()))
            .collect()
    }

    /// Moves `file` to the front. Returns false when the file does not exist.
    pub fn add(&mut self, file: &Path) -> bool {
        if !file.exists() {
            return false;
        }
        let entry = file.to_string_lossy().into_owned();
        self.entries.retain(|existing| existing != &entry);
        self.entries.insert(0, entry);
        self.entries.truncate(MAX_RECENT_FILES);
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub fn save(&mut self) -> std::io::Result<()> {
        self.entries.truncate(MAX_RECENT_FILES);
        store::write_entries(&self.path, &self.entries)
    }
}
