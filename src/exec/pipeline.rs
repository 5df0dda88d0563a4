use super::{run, Backend, Command, CommandConfig, Output};
use crate::error::{Error, Result};

/// Commands joined by shell pipes and run as one `bash -c` invocation.
///
/// The pipeline's retry budget applies to the whole line, independent
/// of any budget its parts were written with.
#[derive(Debug, Clone)]
pub struct Pipeline {
    commands: Vec<String>,
    cfg: Option<CommandConfig>,
}

impl Pipeline {
    pub fn new(cfg: Option<CommandConfig>) -> Self {
        Self {
            commands: Vec::new(),
            cfg,
        }
    }

    pub fn add_command(&mut self, command: impl Into<String>) -> &mut Self {
        self.commands.push(command.into());
        self
    }

    pub fn script(&self) -> String {
        self.commands.join(" | ")
    }

    pub fn as_command(&self) -> Result<Command> {
        if self.commands.is_empty() {
            return Err(Error::InvalidConfig("cannot execute empty pipeline".to_string()));
        }
        let script = self.script();
        let raw = format!("bash -c \"{}\"", script);
        let argv = vec!["bash".to_string(), "-c".to_string(), script];
        Command::from_argv(&raw, argv, self.cfg.clone())
    }

    pub async fn execute(&self, backend: &dyn Backend) -> Result<Output> {
        run(backend, &self.as_command()?).await
    }
}
