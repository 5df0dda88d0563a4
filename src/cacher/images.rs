use super::host::Host;
use crate::components::ContainerImage;
use crate::error::{Error, Result};
use crate::exec::{run, run_cancellable, Backend, Command, CommandConfig};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const PULL_MAX_RETRIES: u32 = 60;
const PULL_WAIT: Duration = Duration::from_secs(1);
const PULL_TIMEOUT: Duration = Duration::from_secs(1200);

/// Container CLI used to pull images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliTool {
    Ctr,
    Crictl,
    Docker,
}

impl CliTool {
    pub const ALL: [CliTool; 3] = [CliTool::Ctr, CliTool::Crictl, CliTool::Docker];

    pub fn binary(&self) -> &'static str {
        match self {
            CliTool::Ctr => "ctr",
            CliTool::Crictl => "crictl",
            CliTool::Docker => "docker",
        }
    }

    /// First tool found on `PATH`.
    pub fn detect() -> Option<CliTool> {
        Self::ALL
            .into_iter()
            .find(|tool| which::which(tool.binary()).is_ok())
    }

    fn pull(&self, reference: &str) -> String {
        match self {
            CliTool::Ctr => format!("ctr --namespace k8s.io image pull {}", reference),
            CliTool::Crictl => format!("crictl pull {}", reference),
            CliTool::Docker => format!("docker pull {}", reference),
        }
    }

    fn init_command(&self) -> Option<&'static str> {
        match self {
            CliTool::Ctr => Some("ctr namespace create k8s.io"),
            _ => None,
        }
    }
}

impl FromStr for CliTool {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.binary().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::InvalidConfig(format!(
                    "cannot create container image installer with unrecognized cli tool: {:?}",
                    s
                ))
            })
    }
}

impl fmt::Display for CliTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

/// Pulls container images with bounded parallelism.
pub struct ImageInstaller {
    tool: CliTool,
    backend: Arc<dyn Backend>,
    parallelism: usize,
}

impl ImageInstaller {
    /// Prepares the tool; for `ctr` that creates the `k8s.io` namespace.
    pub async fn new(tool: CliTool, backend: Arc<dyn Backend>, parallelism: usize) -> Result<Self> {
        if let Some(init) = tool.init_command() {
            let output = run(backend.as_ref(), &Command::new(init, None)?).await?;
            info!("executed init command for {} image installer: {}", tool, output);
        }
        Ok(Self {
            tool,
            backend,
            parallelism: parallelism.max(1),
        })
    }

    pub fn tool(&self) -> CliTool {
        self.tool
    }

    /// One retried pull command per selected tag, in manifest order.
    pub fn pull_commands(&self, images: &[ContainerImage], host: &Host) -> Result<Vec<Command>> {
        let mut commands = Vec::new();
        for image in images {
            for tag in image.tags_for(host.is_amd64()) {
                let reference = image.reference(tag)?;
                let cfg = CommandConfig::retrying(PULL_MAX_RETRIES, PULL_WAIT, PULL_TIMEOUT);
                commands.push(Command::new(&self.tool.pull(&reference), Some(cfg))?);
            }
        }
        Ok(commands)
    }

    /// Runs every pull. Once `cancel` fires no new pull starts and no
    /// failed pull is retried; attempts already running finish before
    /// [`Error::Cancelled`] is returned.
    pub async fn install(&self, images: &[ContainerImage], host: &Host, cancel: &CancellationToken) -> Result<()> {
        let commands = self.pull_commands(images, host)?;
        info!(pulls = commands.len(), parallelism = self.parallelism, "pulling container images");

        let semaphore = Arc::new(Semaphore::new(self.parallelism));
        let mut set = JoinSet::new();
        let mut cancelled = false;

        for cmd in commands {
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                permit = Arc::clone(&semaphore).acquire_owned() => permit,
            };
            let Ok(permit) = permit else {
                break;
            };
            let backend = Arc::clone(&self.backend);
            let cancel = cancel.clone();
            set.spawn(async move {
                let result = run_cancellable(backend.as_ref(), &cmd, &cancel).await;
                drop(permit);
                if result.is_ok() {
                    debug!("pulled {}", cmd);
                }
                result.map(|_| ())
            });
        }

        let mut errors = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => errors.push(e),
                Err(e) => errors.push(Error::Io(std::io::Error::other(e))),
            }
        }

        if cancelled || cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::CacheAggregate(errors))
        }
    }
}
