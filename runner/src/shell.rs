use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

use crate::error::RunnerError;

/// Runs one shell command to completion.
pub trait CommandExecutor {
    /// Returns whether the command succeeded.
    fn run(&mut self, command: &str) -> Result<bool, RunnerError>;
}

/// Executes commands through the platform shell with inherited stdio.
pub struct ShellExecutor {
    workdir: PathBuf,
}

impl ShellExecutor {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        ShellExecutor {
            workdir: workdir.into(),
        }
    }
}

impl CommandExecutor for ShellExecutor {
    fn run(&mut self, command: &str) -> Result<bool, RunnerError> {
        let status = shell(command)
            .current_dir(&self.workdir)
            .status()
            .map_err(|e| RunnerError::io("starting a shell in", &self.workdir, e))?;
        debug!(command, code = ?status.code(), "command finished");
        Ok(status.success())
    }
}

fn shell(command: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}
