use std::fs;
use std::io;
use std::path::Path;

pub fn read_entries(path: &Path) -> Result<Vec<String>, String> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let data = fs::read(path).map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    serde_json::from_slice(&data).map_err(|err| format!("failed to parse {}: {err}", path.display()))
}

/// Writes through a sibling tmp file, then moves it over `path`.
pub fn write_entries(path: &Path, entries: &[String]) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let bytes = serde_json::to_vec_pretty(entries)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))?;

    let staged = path.with_extension("json.tmp");
    fs::write(&staged, bytes)?;
    move_over(&staged, path)
}

/// Renaming onto an existing file fails on some platforms; clear it and retry.
fn move_over(staged: &Path, target: &Path) -> io::Result<()> {
    let Err(first_attempt) = fs::rename(staged, target) else {
        return Ok(());
    };
    if !target.exists() {
        return Err(first_attempt);
    }
    fs::remove_file(target)?;
    fs::rename(staged, target)
}
