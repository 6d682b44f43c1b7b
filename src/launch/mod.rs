//! Launch dispatch.
//!
//! Each launch runs on the blocking pool of the tokio runtime and reports
//! exactly one [`LaunchOutcome`] back to the UI thread, whether it spawned,
//! failed, or the worker panicked. There is no cancellation and no retry.

pub mod path;
pub mod plan;
pub mod spawn;
pub mod terminal;

use crate::editor::probe::Probe;
use crate::editor::EditorRegistry;
use crate::event::{AppEvent, EventSender};
use crate::host::HostContext;
use plan::{plan_launch, plan_shell_window, LaunchPlan};
use spawn::Spawner;
use std::io;
use std::sync::Arc;
use terminal::TerminalEmulator;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Editor {0} not found.")]
    EditorNotFound(String),

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("launch worker stopped unexpectedly: {0}")]
    WorkerPanicked(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub editor_id: String,
    /// File or directory; passed through as an opaque string.
    pub target_path: String,
}

impl LaunchRequest {
    pub fn new(editor_id: impl Into<String>, target_path: impl Into<String>) -> Self {
        Self {
            editor_id: editor_id.into(),
            target_path: target_path.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchTarget {
    Editor(LaunchRequest),
    ShellWindow { directory: String },
}

impl LaunchTarget {
    pub fn describe(&self) -> String {
        match self {
            Self::Editor(request) => format!("{} {}", request.editor_id, request.target_path),
            Self::ShellWindow { directory } => format!("terminal in {directory}"),
        }
    }
}

#[derive(Debug)]
pub struct LaunchOutcome {
    pub target: LaunchTarget,
    pub result: Result<LaunchPlan, LaunchError>,
}

/// Everything a worker needs; cheap to clone into a task.
#[derive(Clone)]
struct Worker {
    registry: Arc<EditorRegistry>,
    host: HostContext,
    terminals: Arc<Vec<TerminalEmulator>>,
    probe: Arc<dyn Probe>,
    spawner: Arc<dyn Spawner>,
}

impl Worker {
    fn run(&self, target: &LaunchTarget) -> Result<LaunchPlan, LaunchError> {
        let plan = match target {
            LaunchTarget::Editor(request) => {
                let editor = self
                    .registry
                    .get(&request.editor_id)
                    .ok_or_else(|| LaunchError::EditorNotFound(request.editor_id.clone()))?;
                plan_launch(
                    editor,
                    &request.target_path,
                    self.host,
                    &self.terminals,
                    self.probe.as_ref(),
                )
            }
            LaunchTarget::ShellWindow { directory } => {
                plan_shell_window(directory, self.host, &self.terminals, self.probe.as_ref())
            }
        };

        tracing::info!(strategy = ?plan.strategy, "launching: {}", plan.command_line);
        self.spawner
            .spawn(&plan)
            .map_err(|source| LaunchError::Spawn {
                program: plan.program.clone(),
                source,
            })?;
        Ok(plan)
    }
}

pub struct Dispatcher {
    worker: Worker,
    runtime: Handle,
    events: EventSender,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<EditorRegistry>,
        host: HostContext,
        terminals: Vec<TerminalEmulator>,
        probe: Arc<dyn Probe>,
        spawner: Arc<dyn Spawner>,
        runtime: Handle,
        events: EventSender,
    ) -> Self {
        Self {
            worker: Worker {
                registry,
                host,
                terminals: Arc::new(terminals),
                probe,
                spawner,
            },
            runtime,
            events,
        }
    }

    pub fn registry(&self) -> &EditorRegistry {
        &self.worker.registry
    }

    pub fn host(&self) -> HostContext {
        self.worker.host
    }

    /// Opens `request.target_path` in the requested editor. Returns at once;
    /// the outcome arrives as [`AppEvent::Launch`].
    pub fn launch(&self, request: LaunchRequest) -> JoinHandle<()> {
        self.submit(LaunchTarget::Editor(request))
    }

    /// Opens an interactive shell window in `directory`.
    pub fn open_terminal(&self, directory: impl Into<String>) -> JoinHandle<()> {
        self.submit(LaunchTarget::ShellWindow {
            directory: directory.into(),
        })
    }

    fn submit(&self, target: LaunchTarget) -> JoinHandle<()> {
        let worker = self.worker.clone();
        let events = self.events.clone();

        self.runtime.spawn(async move {
            let job_target = target.clone();
            let joined = tokio::task::spawn_blocking(move || worker.run(&job_target)).await;
            let result = match joined {
                Ok(result) => result,
                Err(err) => Err(LaunchError::WorkerPanicked(err.to_string())),
            };

            if let Err(err) = &result {
                tracing::warn!("launch of {} failed: {err}", target.describe());
            }
            events.send(AppEvent::Launch(LaunchOutcome { target, result }));
        })
    }
}
