use super::{Command, Output};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Mutex;
use tracing::{debug, info};

/// Executes a single command attempt.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn execute(&self, cmd: &Command) -> Result<Output>;
}

/// Spawns real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubprocessBackend;

#[async_trait]
impl Backend for SubprocessBackend {
    async fn execute(&self, cmd: &Command) -> Result<Output> {
        debug!("Running command: {}", cmd.argv_line());
        let output = tokio::process::Command::new(cmd.app())
            .args(cmd.args())
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| Error::BackendSpawnFailed {
                command: cmd.raw().to_string(),
                source,
            })?;

        Ok(Output {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            // killed by a signal
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}

/// Succeeds without running anything, keeping the argv of every command
/// it was handed.
#[derive(Debug, Default)]
pub struct DryRunBackend {
    executed: Mutex<Vec<String>>,
}

impl DryRunBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Argv lines in the order they were executed.
    pub fn executed(&self) -> Vec<String> {
        match self.executed.lock() {
            Ok(executed) => executed.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl Backend for DryRunBackend {
    async fn execute(&self, cmd: &Command) -> Result<Output> {
        let line = cmd.argv_line();
        info!("dry run: {}", line);
        match self.executed.lock() {
            Ok(mut executed) => executed.push(line),
            Err(poisoned) => poisoned.into_inner().push(line),
        }
        Ok(Output::default())
    }
}
