//! Chooses how a launch is spawned on the current host.

use super::path::convert_path_for_platform;
use super::terminal::{select_terminal, TerminalEmulator};
use crate::editor::probe::{Probe, BRIDGE_COMMAND};
use crate::editor::{EditorCategory, EditorDescriptor};
use crate::host::{Bridge, HostContext, OsFamily};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// The editor binary itself, target as its only argument.
    Direct,
    /// Routed into WSL through the bridge command.
    Bridge,
    /// Hosted inside the named terminal emulator.
    Terminal(String),
    /// Terminal editor started directly because no emulator was found. It
    /// gets no terminal of its own.
    DirectWithoutTerminal,
    /// Interactive shell window in a directory.
    ShellWindow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub strategy: Strategy,
    pub program: String,
    pub args: Vec<String>,
    /// Shell-style rendering of `program` + `args`, for logs and dialogs.
    pub command_line: String,
    pub working_dir: Option<PathBuf>,
    /// Open in a new console window (Windows).
    pub new_console: bool,
}

impl LaunchPlan {
    fn direct(strategy: Strategy, program: &str, target: String) -> Self {
        Self {
            strategy,
            program: program.to_string(),
            command_line: format!("{program} \"{target}\""),
            args: vec![target],
            working_dir: None,
            new_console: false,
        }
    }

    fn bridge(editor_id: &str, target: String) -> Self {
        Self {
            strategy: Strategy::Bridge,
            program: BRIDGE_COMMAND.to_string(),
            command_line: format!("{BRIDGE_COMMAND} {editor_id} \"{target}\""),
            args: vec![editor_id.to_string(), target],
            working_dir: None,
            new_console: false,
        }
    }

    fn in_terminal(terminal: &TerminalEmulator, editor: &str, target: &str) -> Self {
        let wrapped = terminal.wrap_editor(editor, target);
        Self {
            strategy: Strategy::Terminal(terminal.program.clone()),
            program: terminal.program.clone(),
            args: wrapped.args,
            command_line: wrapped.command_line,
            working_dir: None,
            new_console: false,
        }
    }
}

/// Decision table for an editor launch. First match wins:
///
/// | bridge  | category / origin       | strategy                  |
/// |---------|-------------------------|---------------------------|
/// | Outside | terminal, or via bridge | bridge                    |
/// | Outside | gui                     | direct                    |
/// | Inside  | any                     | terminal, else direct     |
/// | Absent  | terminal                | terminal, else direct     |
/// | Absent  | gui                     | direct                    |
pub fn plan_launch(
    editor: &EditorDescriptor,
    target: &str,
    host: HostContext,
    terminals: &[TerminalEmulator],
    probe: &dyn Probe,
) -> LaunchPlan {
    match (host.bridge(), editor.category, editor.via_bridge) {
        (Bridge::Outside, EditorCategory::Terminal, _) | (Bridge::Outside, _, true) => {
            LaunchPlan::bridge(&editor.id, convert_path_for_platform(target, OsFamily::Linux))
        }
        (Bridge::Outside, EditorCategory::Gui, false) => LaunchPlan::direct(
            Strategy::Direct,
            &editor.invocation_path,
            convert_path_for_platform(target, OsFamily::Windows),
        ),
        (Bridge::Inside, _, _) | (Bridge::Absent, EditorCategory::Terminal, _) => {
            let target = convert_path_for_platform(target, host.os_family());
            match select_terminal(terminals, probe) {
                Some(terminal) => LaunchPlan::in_terminal(terminal, &editor.invocation_path, &target),
                None => {
                    tracing::warn!(
                        editor = %editor.id,
                        "no terminal emulator found; starting editor without a terminal"
                    );
                    LaunchPlan::direct(
                        Strategy::DirectWithoutTerminal,
                        &editor.invocation_path,
                        target,
                    )
                }
            }
        }
        (Bridge::Absent, EditorCategory::Gui, _) => LaunchPlan::direct(
            Strategy::Direct,
            &editor.invocation_path,
            convert_path_for_platform(target, host.os_family()),
        ),
    }
}

const POWERSHELL_VERSION_ENV: &str = "POWERSHELL_VERSION";
const FALLBACK_TERMINAL: &str = "xterm";

/// Interactive shell window opened in `directory`.
pub fn plan_shell_window(
    directory: &str,
    host: HostContext,
    terminals: &[TerminalEmulator],
    probe: &dyn Probe,
) -> LaunchPlan {
    if host.os_family() == OsFamily::Windows {
        let under_powershell = probe.env_var(POWERSHELL_VERSION_ENV).is_some()
            || probe
                .env_var("SHELL")
                .map(|shell| shell.to_ascii_lowercase().ends_with("powershell.exe"))
                .unwrap_or(false);

        let (program, args, command_line) = if under_powershell {
            (
                "powershell.exe",
                vec!["-NoExit".to_string()],
                format!(
                    "start powershell.exe -NoExit -Command \"Set-Location -Path '{directory}'\""
                ),
            )
        } else {
            (
                "cmd.exe",
                Vec::new(),
                format!("start cmd.exe /K \"cd /d {directory}\""),
            )
        };

        return LaunchPlan {
            strategy: Strategy::ShellWindow,
            program: program.to_string(),
            args,
            command_line,
            working_dir: Some(PathBuf::from(directory)),
            new_console: true,
        };
    }

    match select_terminal(terminals, probe) {
        Some(terminal) => {
            let wrapped = terminal.wrap_shell_in(directory);
            LaunchPlan {
                strategy: Strategy::ShellWindow,
                program: terminal.program.clone(),
                args: wrapped.args,
                command_line: wrapped.command_line,
                working_dir: None,
                new_console: false,
            }
        }
        None => {
            let script = format!("cd '{directory}'; bash");
            LaunchPlan {
                strategy: Strategy::ShellWindow,
                program: FALLBACK_TERMINAL.to_string(),
                command_line: format!("{FALLBACK_TERMINAL} -e \"{script}\""),
                args: vec!["-e".to_string(), script],
                working_dir: None,
                new_console: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{plan_launch, plan_shell_window, Strategy};
    use crate::editor::probe::fake::FakeProbe;
    use crate::editor::{EditorCategory, EditorDescriptor};
    use crate::host::{HostContext, OsFamily};
    use crate::launch::terminal::TerminalEmulator;
    use std::path::PathBuf;

    fn editor(id: &str, path: &str, category: EditorCategory, via_bridge: bool) -> EditorDescriptor {
        EditorDescriptor {
            id: id.to_string(),
            invocation_path: path.to_string(),
            category,
            via_bridge,
        }
    }

    fn windows() -> HostContext {
        HostContext::new(OsFamily::Windows, None)
    }

    fn linux() -> HostContext {
        HostContext::new(OsFamily::Linux, Some("6.8.0-generic"))
    }

    fn wsl() -> HostContext {
        HostContext::new(OsFamily::Linux, Some("5.15.0-microsoft-standard-WSL2"))
    }

    #[test]
    fn windows_bridge_editor_gets_wsl_shell_string_with_converted_path() {
        let nvim = editor("nvim", "nvim", EditorCategory::Terminal, true);
        let plan = plan_launch(
            &nvim,
            r"C:\Users\me\file.txt",
            windows(),
            &TerminalEmulator::default_preferences(),
            &FakeProbe::default(),
        );

        assert_eq!(plan.strategy, Strategy::Bridge);
        assert_eq!(plan.program, "wsl");
        assert_eq!(plan.args, vec!["nvim", "/mnt/c/Users/me/file.txt"]);
        assert!(plan.command_line.contains("nvim"));
        assert!(plan.command_line.contains("\"/mnt/c/Users/me/file.txt\""));
    }

    #[test]
    fn windows_terminal_editor_uses_bridge_even_when_installed_natively() {
        let vim = editor("vim", r"C:\Vim\vim.exe", EditorCategory::Terminal, false);
        let plan = plan_launch(&vim, r"C:\a.txt", windows(), &[], &FakeProbe::default());
        assert_eq!(plan.strategy, Strategy::Bridge);
        assert_eq!(plan.command_line, "wsl vim \"/mnt/c/a.txt\"");
    }

    #[test]
    fn windows_bridge_resolved_gui_editor_routes_through_bridge() {
        let gedit = editor("gedit", "gedit", EditorCategory::Gui, true);
        let plan = plan_launch(&gedit, r"C:\a.txt", windows(), &[], &FakeProbe::default());
        assert_eq!(plan.strategy, Strategy::Bridge);
    }

    #[test]
    fn windows_gui_editor_is_spawned_directly_with_windows_path() {
        let code = editor("code", r"C:\VSCode\Code.exe", EditorCategory::Gui, false);
        let plan = plan_launch(&code, "/mnt/d/src/main.rs", windows(), &[], &FakeProbe::default());
        assert_eq!(plan.strategy, Strategy::Direct);
        assert_eq!(plan.program, r"C:\VSCode\Code.exe");
        assert_eq!(plan.args, vec![r"D:\src\main.rs"]);
    }

    #[test]
    fn linux_terminal_editor_uses_second_emulator_when_only_it_exists() {
        let vim = editor("vim", "/usr/bin/vim", EditorCategory::Terminal, false);
        let probe = FakeProbe::default().with_path("konsole", "/usr/bin/konsole");
        let plan = plan_launch(
            &vim,
            "/home/me/a.txt",
            linux(),
            &TerminalEmulator::default_preferences(),
            &probe,
        );

        assert_eq!(plan.strategy, Strategy::Terminal("konsole".to_string()));
        assert_eq!(plan.args, vec!["-e", "/usr/bin/vim '/home/me/a.txt'"]);
        assert!(!plan.args.contains(&"--".to_string()));
    }

    #[test]
    fn linux_terminal_editor_prefers_first_emulator() {
        let vim = editor("vim", "/usr/bin/vim", EditorCategory::Terminal, false);
        let probe = FakeProbe::default()
            .with_path("gnome-terminal", "/usr/bin/gnome-terminal")
            .with_path("xterm", "/usr/bin/xterm");
        let plan = plan_launch(
            &vim,
            "/home/me/a.txt",
            linux(),
            &TerminalEmulator::default_preferences(),
            &probe,
        );
        assert_eq!(plan.strategy, Strategy::Terminal("gnome-terminal".to_string()));
        assert_eq!(plan.args[0], "--");
    }

    #[test]
    fn linux_terminal_editor_without_emulator_falls_back_to_direct() {
        let nano = editor("nano", "/usr/bin/nano", EditorCategory::Terminal, false);
        let plan = plan_launch(
            &nano,
            "/home/me/a.txt",
            linux(),
            &TerminalEmulator::default_preferences(),
            &FakeProbe::default(),
        );
        assert_eq!(plan.strategy, Strategy::DirectWithoutTerminal);
        assert_eq!(plan.program, "/usr/bin/nano");
        assert_eq!(plan.args, vec!["/home/me/a.txt"]);
    }

    #[test]
    fn linux_gui_editor_is_spawned_directly() {
        let gedit = editor("gedit", "/usr/bin/gedit", EditorCategory::Gui, false);
        let probe = FakeProbe::default().with_path("xterm", "/usr/bin/xterm");
        let plan = plan_launch(
            &gedit,
            r"C:\notes.txt",
            linux(),
            &TerminalEmulator::default_preferences(),
            &probe,
        );
        assert_eq!(plan.strategy, Strategy::Direct);
        assert_eq!(plan.args, vec!["/mnt/c/notes.txt"]);
    }

    #[test]
    fn inside_wsl_every_editor_is_terminal_wrapped() {
        let gedit = editor("gedit", "/usr/bin/gedit", EditorCategory::Gui, false);
        let probe = FakeProbe::default().with_path("xterm", "/usr/bin/xterm");
        let plan = plan_launch(
            &gedit,
            r"C:\Users\me\a.txt",
            wsl(),
            &TerminalEmulator::default_preferences(),
            &probe,
        );
        assert_eq!(plan.strategy, Strategy::Terminal("xterm".to_string()));
        assert_eq!(plan.command_line, "xterm -e \"/usr/bin/gedit '/mnt/c/Users/me/a.txt'\"");
    }

    #[test]
    fn other_hosts_behave_like_plain_linux() {
        let other = HostContext::new(OsFamily::Other, None);
        let vim = editor("vim", "/opt/homebrew/bin/vim", EditorCategory::Terminal, false);
        let plan = plan_launch(&vim, r"C:\x.txt", other, &[], &FakeProbe::default());
        assert_eq!(plan.strategy, Strategy::DirectWithoutTerminal);
        assert_eq!(plan.args, vec![r"C:\x.txt"]);
    }

    #[test]
    fn shell_window_on_windows_uses_cmd_unless_under_powershell() {
        let plan = plan_shell_window(r"C:\work", windows(), &[], &FakeProbe::default());
        assert_eq!(plan.program, "cmd.exe");
        assert_eq!(plan.working_dir, Some(PathBuf::from(r"C:\work")));
        assert!(plan.new_console);

        let probe = FakeProbe::default().with_env("POWERSHELL_VERSION", "7.4");
        let plan = plan_shell_window(r"C:\work", windows(), &[], &probe);
        assert_eq!(plan.program, "powershell.exe");
        assert!(plan.command_line.contains("Set-Location -Path 'C:\\work'"));
    }

    #[test]
    fn shell_window_on_linux_wraps_bash_or_falls_back_to_xterm() {
        let probe = FakeProbe::default().with_path("gnome-terminal", "/usr/bin/gnome-terminal");
        let plan = plan_shell_window(
            "/srv",
            linux(),
            &TerminalEmulator::default_preferences(),
            &probe,
        );
        assert_eq!(plan.program, "gnome-terminal");
        assert_eq!(plan.args, vec!["--", "bash", "-c", "cd '/srv'; exec bash"]);

        let plan = plan_shell_window(
            "/srv",
            linux(),
            &TerminalEmulator::default_preferences(),
            &FakeProbe::default(),
        );
        assert_eq!(plan.program, "xterm");
        assert_eq!(plan.args, vec!["-e", "cd '/srv'; bash"]);
    }
}
