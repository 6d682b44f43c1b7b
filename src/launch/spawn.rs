use super::plan::LaunchPlan;
use std::io;
use tokio::process::Command;

#[cfg(windows)]
const CREATE_NEW_CONSOLE: u32 = 0x0000_0010;

pub trait Spawner: Send + Sync {
    /// Starts the planned process without waiting for it to exit.
    fn spawn(&self, plan: &LaunchPlan) -> io::Result<()>;
}

/// Spawns real processes. Must be called from within the tokio runtime,
/// which reaps the children once they exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSpawner;

impl Spawner for SystemSpawner {
    fn spawn(&self, plan: &LaunchPlan) -> io::Result<()> {
        let mut command = Command::new(&plan.program);
        command.args(&plan.args);
        if let Some(dir) = &plan.working_dir {
            command.current_dir(dir);
        }

        #[cfg(windows)]
        if plan.new_console {
            command.creation_flags(CREATE_NEW_CONSOLE);
        }

        let child = command.spawn()?;
        tracing::debug!(pid = ?child.id(), "spawned {}", plan.command_line);
        Ok(())
    }
}
