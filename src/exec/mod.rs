//! Command execution.
//!
//! Every process the cacher starts goes through a [`Backend`]. Commands
//! carry their own timeout and retry budget; [`run`] applies them so
//! callers only describe what to run.

use crate::error::{Error, Result};
use std::fmt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

mod backend;
mod pipeline;

pub use backend::{Backend, DryRunBackend, SubprocessBackend};
pub use pipeline::Pipeline;


/// Exit code `timeout(1)` reports when the deadline elapsed.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_COMMAND_WAIT: Duration = Duration::from_secs(3);

/// Timeout and retry budget of one command.
#[derive(Debug, Clone)]
pub struct CommandConfig {
    pub timeout: Option<Duration>,
    pub wait: Duration,
    /// Total attempts; 0 and 1 both mean a single attempt.
    pub max_retries: u32,
    /// Run between failed attempts, e.g. to repair package manager state.
    pub on_retryable_failure: Option<Box<Command>>,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_COMMAND_TIMEOUT),
            wait: DEFAULT_COMMAND_WAIT,
            max_retries: 0,
            on_retryable_failure: None,
        }
    }
}

impl CommandConfig {
    pub fn retrying(max_retries: u32, wait: Duration, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            wait,
            max_retries,
            on_retryable_failure: None,
        }
    }

    fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }
}

/// A process invocation: the raw text plus the argv actually executed.
#[derive(Debug, Clone)]
pub struct Command {
    raw: String,
    app: String,
    args: Vec<String>,
    cfg: CommandConfig,
}

impl Command {
    /// Splits `raw` on spaces. With a config, the argv is prefixed with
    /// `timeout <secs>` so an elapsed deadline exits with 124.
    pub fn new(raw: &str, cfg: Option<CommandConfig>) -> Result<Self> {
        let parts: Vec<String> = raw.split_whitespace().map(str::to_string).collect();
        Self::from_argv(raw, parts, cfg)
    }

    pub(crate) fn from_argv(raw: &str, argv: Vec<String>, cfg: Option<CommandConfig>) -> Result<Self> {
        if argv.is_empty() {
            return Err(Error::InvalidConfig("cannot execute empty command".to_string()));
        }
        let argv = match cfg.as_ref().and_then(|c| c.timeout) {
            Some(timeout) => with_timeout(argv, timeout),
            None => argv,
        };
        let mut argv = argv.into_iter();
        let app = argv.next().unwrap_or_default();
        Ok(Self {
            raw: raw.to_string(),
            app,
            args: argv.collect(),
            cfg: cfg.unwrap_or(CommandConfig {
                timeout: None,
                ..CommandConfig::default()
            }),
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn config(&self) -> &CommandConfig {
        &self.cfg
    }

    /// The argv joined back into one line.
    pub fn argv_line(&self) -> String {
        std::iter::once(self.app.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn with_timeout(argv: Vec<String>, timeout: Duration) -> Vec<String> {
    let mut wrapped = vec!["timeout".to_string(), timeout.as_secs().to_string()];
    wrapped.extend(argv);
    wrapped
}

/// What a finished process left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Output {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl Output {
    pub fn failed(&self) -> bool {
        self.exit_code != 0
    }

    pub fn timed_out(&self) -> bool {
        self.exit_code == TIMEOUT_EXIT_CODE
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exit code: {}", self.exit_code)?;
        if !self.stdout.is_empty() {
            write!(f, "\n--------------stdout--------------\n{}", self.stdout)?;
        }
        if !self.stderr.is_empty() {
            write!(f, "\n--------------stderr--------------\n{}", self.stderr)?;
        }
        if !self.stdout.is_empty() || !self.stderr.is_empty() {
            writeln!(f, "----------------------------------")?;
        }
        Ok(())
    }
}

/// Runs `cmd` until it exits zero or its attempts are used up.
///
/// A non-zero exit is retried after the configured wait. A process that
/// could not be spawned is returned at once.
pub async fn run(backend: &dyn Backend, cmd: &Command) -> Result<Output> {
    run_cancellable(backend, cmd, &CancellationToken::new()).await
}

/// Like [`run`], but stops retrying once `cancel` fires. The attempt in
/// flight runs to completion; a failed attempt is then not retried and
/// the wait before the next attempt is cut short.
pub async fn run_cancellable(backend: &dyn Backend, cmd: &Command, cancel: &CancellationToken) -> Result<Output> {
    let attempts = cmd.cfg.attempts();
    let mut attempt = 1;
    loop {
        let output = backend.execute(cmd).await?;
        if !output.failed() {
            return Ok(output);
        }
        if attempt >= attempts {
            let timed_out = output.timed_out() && cmd.cfg.timeout.is_some();
            let (command, output) = (cmd.raw.clone(), output.to_string());
            return Err(if timed_out {
                Error::CommandTimeout {
                    command,
                    attempts,
                    output,
                }
            } else {
                Error::CommandFailed {
                    command,
                    attempts,
                    output,
                }
            });
        }
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        warn!(
            command = %cmd,
            attempt,
            attempts,
            exit_code = output.exit_code,
            "command failed, retrying"
        );
        if let Some(repair) = &cmd.cfg.on_retryable_failure {
            match backend.execute(repair).await {
                Ok(out) if out.failed() => warn!(command = %repair, "recovery command failed\n{}", out),
                Ok(_) => {}
                Err(e) => warn!(command = %repair, "recovery command failed: {}", e),
            }
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            _ = tokio::time::sleep(cmd.cfg.wait) => {}
        }
        attempt += 1;
    }
}
