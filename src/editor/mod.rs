//! Editor discovery.
//!
//! Discovery runs once at startup and produces an [`EditorRegistry`] that is
//! read-only for the rest of the run.

pub mod info;
pub mod probe;

use crate::host::{HostContext, OsFamily};
use probe::Probe;
use std::path::PathBuf;

pub const NOTEPAD_ID: &str = "notepad";
const NOTEPAD_COMMAND: &str = "notepad.exe";
const VSCODE_ID: &str = "code";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCategory {
    /// Needs an interactive terminal.
    Terminal,
    Gui,
}

impl EditorCategory {
    pub fn for_id(id: &str, terminal_editors: &[String]) -> Self {
        if terminal_editors.iter().any(|terminal| terminal == id) {
            Self::Terminal
        } else {
            Self::Gui
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Terminal => "terminal",
            Self::Gui => "gui",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorDescriptor {
    pub id: String,
    /// Absolute path, or a bare command name for bridge editors.
    pub invocation_path: String,
    pub category: EditorCategory,
    /// Found only inside the WSL bridge.
    pub via_bridge: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EditorRegistry {
    editors: Vec<EditorDescriptor>,
}

impl EditorRegistry {
    pub fn new(editors: Vec<EditorDescriptor>) -> Self {
        Self { editors }
    }

    pub fn get(&self, id: &str) -> Option<&EditorDescriptor> {
        self.editors.iter().find(|editor| editor.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.editors.iter().map(|editor| editor.id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &EditorDescriptor> {
        self.editors.iter()
    }

    pub fn len(&self) -> usize {
        self.editors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.editors.is_empty()
    }
}

/// Lazily evaluated so the bridge is asked at most once per pass.
struct BridgeState<'a> {
    probe: &'a dyn Probe,
    responsive: Option<bool>,
}

impl BridgeState<'_> {
    fn responsive(&mut self) -> bool {
        if let Some(responsive) = self.responsive {
            return responsive;
        }
        let responsive = self.probe.bridge_responsive();
        if responsive {
            tracing::info!("WSL bridge available");
        } else {
            tracing::debug!("WSL bridge unavailable");
        }
        self.responsive = Some(responsive);
        responsive
    }
}

/// Resolves `candidates` against the host. Never fails: an editor that cannot
/// be resolved is left out.
pub fn discover(
    candidates: &[String],
    terminal_editors: &[String],
    host: HostContext,
    probe: &dyn Probe,
) -> EditorRegistry {
    tracing::info!(
        os_family = %host.os_family(),
        "checking for editors: {}",
        candidates.join(", ")
    );

    let mut bridge = BridgeState {
        probe,
        responsive: None,
    };
    let mut editors = Vec::new();

    for id in candidates {
        if editors.iter().any(|editor: &EditorDescriptor| &editor.id == id) {
            continue;
        }

        let category = EditorCategory::for_id(id, terminal_editors);
        let resolved = match host.os_family() {
            OsFamily::Windows => resolve_on_windows(id, probe, &mut bridge),
            OsFamily::Linux | OsFamily::Other => probe
                .which(id)
                .map(|path| (path.to_string_lossy().to_string(), false)),
        };

        match resolved {
            Some((invocation_path, via_bridge)) => {
                tracing::info!(
                    editor = %id,
                    category = category.as_str(),
                    via_bridge,
                    "found editor at {invocation_path}"
                );
                editors.push(EditorDescriptor {
                    id: id.clone(),
                    invocation_path,
                    category,
                    via_bridge,
                });
            }
            None => tracing::info!(editor = %id, "editor not found"),
        }
    }

    if editors.is_empty() && host.os_family() == OsFamily::Windows {
        tracing::warn!("no editors found, falling back to {NOTEPAD_COMMAND}");
        editors.push(notepad());
    }

    EditorRegistry::new(editors)
}

fn notepad() -> EditorDescriptor {
    EditorDescriptor {
        id: NOTEPAD_ID.to_string(),
        invocation_path: NOTEPAD_COMMAND.to_string(),
        category: EditorCategory::Gui,
        via_bridge: false,
    }
}

fn resolve_on_windows(
    id: &str,
    probe: &dyn Probe,
    bridge: &mut BridgeState<'_>,
) -> Option<(String, bool)> {
    match id {
        NOTEPAD_ID => Some((NOTEPAD_COMMAND.to_string(), false)),
        VSCODE_ID => vscode_install_paths(probe)
            .into_iter()
            .find(|path| probe.is_file(path))
            .or_else(|| probe.which(VSCODE_ID))
            .map(|path| (path.to_string_lossy().to_string(), false)),
        _ => {
            if let Some(path) = probe.which(id) {
                return Some((path.to_string_lossy().to_string(), false));
            }
            if bridge.responsive() && probe.bridge_which(id) {
                return Some((id.to_string(), true));
            }
            None
        }
    }
}

/// Conventional VS Code install locations, user install first.
fn vscode_install_paths(probe: &dyn Probe) -> Vec<PathBuf> {
    let roots = [
        ("LOCALAPPDATA", &["Programs", "Microsoft VS Code"][..]),
        ("ProgramFiles", &["Microsoft VS Code"][..]),
        ("ProgramFiles(x86)", &["Microsoft VS Code"][..]),
    ];

    roots
        .iter()
        .filter_map(|(var, segments)| {
            let mut path = PathBuf::from(probe.env_var(var)?);
            for segment in *segments {
                path.push(segment);
            }
            path.push("Code.exe");
            Some(path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::probe::fake::FakeProbe;
    use super::{discover, vscode_install_paths, EditorCategory, NOTEPAD_ID};
    use crate::config::EditorsConfig;
    use crate::host::{HostContext, OsFamily};
    use std::path::PathBuf;

    fn windows() -> HostContext {
        HostContext::new(OsFamily::Windows, None)
    }

    fn linux() -> HostContext {
        HostContext::new(OsFamily::Linux, Some("6.8.0-generic"))
    }

    fn run(host: HostContext, probe: &FakeProbe) -> super::EditorRegistry {
        let config = EditorsConfig::default();
        discover(&config.candidates, &config.terminal_editors, host, probe)
    }

    #[test]
    fn nothing_resolvable_on_windows_leaves_only_notepad() {
        let probe = FakeProbe::default();
        let config = EditorsConfig::default();
        let candidates: Vec<String> = config
            .candidates
            .iter()
            .filter(|id| id.as_str() != NOTEPAD_ID)
            .cloned()
            .collect();

        let registry = discover(&candidates, &config.terminal_editors, windows(), &probe);
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec![NOTEPAD_ID]);

        let registry = run(windows(), &probe);
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec![NOTEPAD_ID]);
        assert_eq!(
            registry.get(NOTEPAD_ID).map(|e| e.invocation_path.as_str()),
            Some("notepad.exe")
        );
    }

    #[test]
    fn nothing_resolvable_on_linux_is_empty() {
        let registry = run(linux(), &FakeProbe::default());
        assert!(registry.is_empty());

        let other = HostContext::new(OsFamily::Other, None);
        assert!(run(other, &FakeProbe::default()).is_empty());
    }

    #[test]
    fn linux_uses_search_path_and_keeps_candidate_order() {
        let probe = FakeProbe::default()
            .with_path("code", "/usr/bin/code")
            .with_path("nano", "/usr/bin/nano");

        let registry = run(linux(), &probe);
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["nano", "code"]);

        let nano = registry.get("nano").expect("nano should resolve");
        assert_eq!(nano.invocation_path, "/usr/bin/nano");
        assert_eq!(nano.category, EditorCategory::Terminal);
        assert!(!nano.via_bridge);
        assert_eq!(
            registry.get("code").map(|e| e.category),
            Some(EditorCategory::Gui)
        );
    }

    #[test]
    fn linux_never_probes_the_bridge_or_special_cases_notepad() {
        let probe = FakeProbe::default().with_bridge(&["nvim"]);
        let registry = run(linux(), &probe);
        assert!(registry.is_empty());
        assert_eq!(probe.bridge_check_count(), 0);
    }

    #[test]
    fn windows_vscode_prefers_install_directories_in_order() {
        let probe = FakeProbe::default()
            .with_env("LOCALAPPDATA", r"C:\Users\me\AppData\Local")
            .with_env("ProgramFiles", r"C:\Program Files")
            .with_file(
                PathBuf::from(r"C:\Program Files")
                    .join("Microsoft VS Code")
                    .join("Code.exe"),
            )
            .with_path("code", r"C:\bin\code.cmd");

        let registry = run(windows(), &probe);
        let code = registry.get("code").expect("code should resolve");
        assert!(code.invocation_path.ends_with("Code.exe"));
        assert!(code.invocation_path.starts_with(r"C:\Program Files"));
    }

    #[test]
    fn windows_vscode_falls_back_to_search_path() {
        let probe = FakeProbe::default()
            .with_env("LOCALAPPDATA", r"C:\Users\me\AppData\Local")
            .with_path("code", r"C:\bin\code.cmd");

        let registry = run(windows(), &probe);
        assert_eq!(
            registry.get("code").map(|e| e.invocation_path.as_str()),
            Some(r"C:\bin\code.cmd")
        );
    }

    #[test]
    fn unset_install_roots_are_skipped() {
        let probe = FakeProbe::default().with_env("ProgramFiles", r"C:\Program Files");
        let paths = vscode_install_paths(&probe);
        assert_eq!(paths.len(), 1);
    }

    #[test]
    fn windows_bridge_editor_records_bare_name() {
        let probe = FakeProbe::default().with_bridge(&["nvim", "vim"]);

        let registry = run(windows(), &probe);
        let nvim = registry.get("nvim").expect("nvim should resolve via bridge");
        assert_eq!(nvim.invocation_path, "nvim");
        assert!(nvim.via_bridge);
        assert!(registry.contains("vim"));
        assert!(!registry.contains("nano"));
        assert_eq!(probe.bridge_check_count(), 1);
    }

    #[test]
    fn windows_native_install_beats_bridge() {
        let probe = FakeProbe::default()
            .with_path("vim", r"C:\Program Files\Vim\vim.exe")
            .with_bridge(&["vim"]);

        let registry = run(windows(), &probe);
        let vim = registry.get("vim").expect("vim should resolve");
        assert!(!vim.via_bridge);
        assert_eq!(vim.invocation_path, r"C:\Program Files\Vim\vim.exe");
    }

    #[test]
    fn unresponsive_bridge_omits_editors_without_failing() {
        let mut probe = FakeProbe::default().with_bridge(&["nano"]);
        probe.bridge_up = false;

        let registry = run(windows(), &probe);
        assert!(!registry.contains("nano"));
        assert!(registry.contains(NOTEPAD_ID));
    }

    #[test]
    fn duplicate_candidates_resolve_once() {
        let probe = FakeProbe::default().with_path("vim", "/usr/bin/vim");
        let candidates = vec!["vim".to_string(), "vim".to_string()];
        let registry = discover(&candidates, &[], linux(), &probe);
        assert_eq!(registry.len(), 1);
    }
}
