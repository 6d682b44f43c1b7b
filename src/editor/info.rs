use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

const BUILTIN_EDITOR_INFO: &str = include_str!("editor_info.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorInfo {
    pub name: String,
    pub description: String,
    pub usage: String,
    #[serde(default)]
    pub key_commands: Vec<String>,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Default)]
pub struct EditorInfoCatalog {
    entries: BTreeMap<String, EditorInfo>,
}

fn parse_entries(raw: &str) -> Result<BTreeMap<String, EditorInfo>, serde_json::Error> {
    serde_json::from_str(raw)
}

impl EditorInfoCatalog {
    /// Built-in entries overlaid with `user_file` when it exists. Problems
    /// come back as warnings; the catalog is always usable.
    pub fn load(user_file: &Path) -> (Self, Vec<String>) {
        let mut warnings = Vec::new();
        let mut entries = match parse_entries(BUILTIN_EDITOR_INFO) {
            Ok(entries) => entries,
            Err(err) => {
                warnings.push(format!("built-in editor info is invalid: {err}"));
                BTreeMap::new()
            }
        };

        match fs::read_to_string(user_file) {
            Ok(raw) => match parse_entries(&raw) {
                Ok(overrides) => entries.extend(overrides),
                Err(err) => warnings.push(format!(
                    "failed to parse {}: {err}",
                    user_file.display()
                )),
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warnings.push(format!("failed to read {}: {err}", user_file.display())),
        }

        (Self { entries }, warnings)
    }

    pub fn get(&self, editor_id: &str) -> Option<&EditorInfo> {
        self.entries.get(editor_id)
    }

    /// Text for the editor info window.
    pub fn describe(&self, editor_id: &str, invocation_path: &str) -> Option<String> {
        let info = self.get(editor_id)?;
        let mut text = format!(
            "Name: {}\n\nDescription: {}\n\nUsage: {}\n\nKey Commands:\n",
            info.name, info.description, info.usage
        );
        for command in &info.key_commands {
            text.push_str(&format!("• {command}\n"));
        }
        text.push_str(&format!("\nPath: {invocation_path}"));
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_entries, EditorInfoCatalog, BUILTIN_EDITOR_INFO};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "editor_launcher_info_{prefix}_{}_{}.json",
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn builtin_info_covers_default_candidates() {
        let entries = parse_entries(BUILTIN_EDITOR_INFO).expect("builtin info should parse");
        for id in ["nano", "vim", "nvim", "gedit", "notepad", "code"] {
            let info = entries.get(id).expect("every default candidate should have info");
            assert!(!info.key_commands.is_empty());
        }
    }

    #[test]
    fn missing_user_file_is_silent() {
        let (catalog, warnings) = EditorInfoCatalog::load(&temp_file("missing"));
        assert!(warnings.is_empty());
        assert_eq!(catalog.get("vim").map(|i| i.name.as_str()), Some("Vim"));
    }

    #[test]
    fn user_file_overrides_and_extends_builtin_entries() {
        let path = temp_file("override");
        let data = r#"{
  "vim": { "name": "Vim (custom)", "description": "d", "usage": "u" },
  "micro": { "name": "micro", "description": "d", "usage": "micro <file>", "key_commands": ["Ctrl+Q quit"] }
}"#;
        fs::write(&path, data).expect("override fixture should write");

        let (catalog, warnings) = EditorInfoCatalog::load(&path);
        assert!(warnings.is_empty());
        assert_eq!(catalog.get("vim").map(|i| i.name.as_str()), Some("Vim (custom)"));
        assert!(catalog.get("micro").is_some());
        assert!(catalog.get("nano").is_some());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn malformed_user_file_is_reported_and_ignored() {
        let path = temp_file("malformed");
        fs::write(&path, "{ not json").expect("malformed fixture should write");

        let (catalog, warnings) = EditorInfoCatalog::load(&path);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("failed to parse"));
        assert_eq!(catalog.get("nano").map(|i| i.name.as_str()), Some("GNU nano"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn describe_lists_key_commands_and_path() {
        let (catalog, _) = EditorInfoCatalog::load(&temp_file("describe"));
        let text = catalog
            .describe("nano", "/usr/bin/nano")
            .expect("nano should be described");
        assert!(text.starts_with("Name: GNU nano"));
        assert!(text.contains("• Ctrl+X  exit"));
        assert!(text.ends_with("Path: /usr/bin/nano"));
        assert!(catalog.describe("unknown", "x").is_none());
    }
}
