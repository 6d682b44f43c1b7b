//! Host probing used by editor discovery and terminal selection.
//!
//! Everything that asks the host "is this installed?" goes through
//! [`Probe`], so discovery and dispatch can run against a fake host.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

pub const BRIDGE_COMMAND: &str = "wsl";
pub const BRIDGE_PROBE_TIMEOUT: Duration = Duration::from_secs(2);
const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} did not answer within {timeout:?}")]
    Timeout { program: String, timeout: Duration },
}

pub trait Probe: Send + Sync {
    /// Executable search path lookup.
    fn which(&self, program: &str) -> Option<PathBuf>;

    fn is_file(&self, path: &Path) -> bool;

    fn env_var(&self, key: &str) -> Option<String>;

    /// Whether the WSL bridge command runs and answers a trivial echo in time.
    fn bridge_responsive(&self) -> bool;

    /// Whether `program` is on the search path inside the bridge.
    fn bridge_which(&self, program: &str) -> bool;
}

#[derive(Debug, Clone)]
pub struct SystemProbe {
    bridge_timeout: Duration,
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self {
            bridge_timeout: BRIDGE_PROBE_TIMEOUT,
        }
    }
}

struct BoundedOutput {
    success: bool,
    stdout: String,
}

impl SystemProbe {
    fn run_bridge(&self, args: &[&str]) -> Result<BoundedOutput, ProbeError> {
        let mut command = Command::new(BRIDGE_COMMAND);
        command.args(args);
        run_bounded(BRIDGE_COMMAND, command, self.bridge_timeout)
    }
}

impl Probe for SystemProbe {
    fn which(&self, program: &str) -> Option<PathBuf> {
        which::which(program)
            .inspect_err(|err| tracing::trace!("{program} not on PATH: {err}"))
            .ok()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn env_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|value| !value.is_empty())
    }

    fn bridge_responsive(&self) -> bool {
        match self.run_bridge(&["echo", "WSL Available"]) {
            Ok(output) => output.success,
            Err(err) => {
                tracing::debug!("bridge probe failed: {err}");
                false
            }
        }
    }

    fn bridge_which(&self, program: &str) -> bool {
        match self.run_bridge(&["which", program]) {
            Ok(output) => output.success && !output.stdout.trim().is_empty(),
            Err(err) => {
                tracing::debug!("bridge lookup for {program} failed: {err}");
                false
            }
        }
    }
}

/// Runs `command` to completion, killing it once `timeout` elapses.
fn run_bounded(
    program: &str,
    mut command: Command,
    timeout: Duration,
) -> Result<BoundedOutput, ProbeError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());

    let mut child = command.spawn().map_err(|source| ProbeError::Spawn {
        program: program.to_string(),
        source,
    })?;

    let deadline = Instant::now() + timeout;
    loop {
        let status = child.try_wait().map_err(|source| ProbeError::Wait {
            program: program.to_string(),
            source,
        })?;

        match status {
            Some(status) => {
                let mut stdout = String::new();
                if let Some(mut pipe) = child.stdout.take() {
                    let _ = pipe.read_to_string(&mut stdout);
                }
                return Ok(BoundedOutput {
                    success: status.success(),
                    stdout,
                });
            }
            None if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ProbeError::Timeout {
                    program: program.to_string(),
                    timeout,
                });
            }
            None => thread::sleep(POLL_INTERVAL),
        }
    }
}
