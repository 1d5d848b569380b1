// src/exec/shell.rs

//! Shell command task body.

use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::task::{BoxFuture, TaskBody, TaskError};

/// Runs a command line through `sh -c` (or `cmd /C` on Windows).
///
/// Stdout and stderr are consumed line by line and logged at debug level.
/// A non-zero exit status is reported as [`TaskError::CommandFailed`].
#[derive(Debug, Clone)]
pub struct ShellTask {
    cmd: String,
}

impl ShellTask {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self { cmd: cmd.into() }
    }

    pub fn command(&self) -> &str {
        &self.cmd
    }

    async fn run(&self) -> Result<(), TaskError> {
        info!(cmd = %self.cmd, "starting shell command");

        // Build a shell command appropriate for the platform.
        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(&self.cmd);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(&self.cmd);
            c
        };

        cmd.stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn()?;

        let mut readers = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            let cmd = self.cmd.clone();
            readers.push(tokio::spawn(async move {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(cmd = %cmd, "stdout: {}", line);
                }
            }));
        }
        if let Some(stderr) = child.stderr.take() {
            let cmd = self.cmd.clone();
            readers.push(tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(cmd = %cmd, "stderr: {}", line);
                }
            }));
        }

        let status = child.wait().await?;
        for reader in readers {
            let _ = reader.await;
        }

        let code = status.code().unwrap_or(-1);
        info!(
            cmd = %self.cmd,
            exit_code = code,
            success = status.success(),
            "shell command exited"
        );

        if status.success() {
            Ok(())
        } else {
            Err(TaskError::CommandFailed(code))
        }
    }
}

impl TaskBody for ShellTask {
    fn execute(&self) -> BoxFuture<'_, Result<(), TaskError>> {
        Box::pin(self.run())
    }

    fn kind(&self) -> &'static str {
        "shell"
    }
}
