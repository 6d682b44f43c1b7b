//! Terminal emulators used to host terminal-only editors.

use crate::editor::probe::Probe;
use serde::{Deserialize, Serialize};

/// How an emulator takes the command it should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalSyntax {
    /// `<emulator> -- <program> <args...>`
    Separator,
    /// `<emulator> -e "<command>"`
    Exec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalEmulator {
    pub program: String,
    pub syntax: TerminalSyntax,
}

/// Argument vector plus the equivalent shell-style command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedCommand {
    pub args: Vec<String>,
    pub command_line: String,
}

impl TerminalEmulator {
    pub fn new(program: impl Into<String>, syntax: TerminalSyntax) -> Self {
        Self {
            program: program.into(),
            syntax,
        }
    }

    pub fn default_preferences() -> Vec<Self> {
        vec![
            Self::new("gnome-terminal", TerminalSyntax::Separator),
            Self::new("konsole", TerminalSyntax::Exec),
            Self::new("xterm", TerminalSyntax::Exec),
        ]
    }

    pub fn wrap_editor(&self, editor: &str, path: &str) -> WrappedCommand {
        match self.syntax {
            TerminalSyntax::Separator => WrappedCommand {
                args: vec!["--".to_string(), editor.to_string(), path.to_string()],
                command_line: format!("{} -- {editor} \"{path}\"", self.program),
            },
            TerminalSyntax::Exec => {
                let inner = format!("{editor} '{path}'");
                WrappedCommand {
                    command_line: format!("{} -e \"{inner}\"", self.program),
                    args: vec!["-e".to_string(), inner],
                }
            }
        }
    }

    /// Interactive bash session started in `directory`.
    pub fn wrap_shell_in(&self, directory: &str) -> WrappedCommand {
        match self.syntax {
            TerminalSyntax::Separator => {
                let script = format!("cd '{directory}'; exec bash");
                WrappedCommand {
                    command_line: format!("{} -- bash -c \"{script}\"", self.program),
                    args: vec![
                        "--".to_string(),
                        "bash".to_string(),
                        "-c".to_string(),
                        script,
                    ],
                }
            }
            TerminalSyntax::Exec => {
                let inner = format!("bash -c 'cd \"{directory}\"; exec bash'");
                WrappedCommand {
                    command_line: format!("{} -e \"{inner}\"", self.program),
                    args: vec!["-e".to_string(), inner],
                }
            }
        }
    }
}

/// First emulator in preference order that is on the search path.
pub fn select_terminal<'a>(
    preferences: &'a [TerminalEmulator],
    probe: &dyn Probe,
) -> Option<&'a TerminalEmulator> {
    preferences
        .iter()
        .find(|terminal| probe.which(&terminal.program).is_some())
}
