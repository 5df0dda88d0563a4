use super::host::Host;
use crate::components::{Package, ReleaseDownloadUri};
use crate::error::{Error, Result};
use crate::exec::{run, Backend, Command, CommandConfig, Output, Pipeline};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const DOWNLOAD_MAX_RETRIES: u32 = 10;
const DOWNLOAD_WAIT: Duration = Duration::from_secs(3);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

const APT_MAX_RETRIES: u32 = 10;
const APT_WAIT: Duration = Duration::from_secs(5);
const APT_TIMEOUT: Duration = Duration::from_secs(300);

/// Where `kubelet` and `kubectl` land, suffixed with their version.
pub const KUBE_BINARIES_DIR: &str = "/usr/local/bin";
pub const ORAS_DOWNLOAD_DIR: &str = "/opt/oras/downloads";

// runc builds that ship with the image on ARM hosts
const LEGACY_RUNC_VERSIONS: [&str; 2] = ["1.0.0-rc92", "1.0.0-rc95"];

/// Downloads and installs packages one at a time.
pub struct PackageInstaller {
    backend: Arc<dyn Backend>,
    host: Host,
}

impl PackageInstaller {
    pub fn new(backend: Arc<dyn Backend>, host: Host) -> Self {
        Self { backend, host }
    }

    /// The OS-specific release if the manifest has one, else the default.
    pub fn release<'a>(&self, package: &'a Package) -> Option<&'a ReleaseDownloadUri> {
        let uris = &package.download_uris;
        let specialized = if self.host.is_mariner() {
            uris.mariner.as_ref()
        } else {
            uris.ubuntu.as_ref()
        };
        specialized
            .and_then(|s| s.current.as_ref())
            .or_else(|| package.default_release())
    }

    /// Installs every package in order. A failed package does not stop the
    /// ones after it; cancellation does.
    pub async fn install_all(&self, packages: &[Package], cancel: &CancellationToken) -> Result<()> {
        let mut errors = Vec::new();
        for package in packages {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            if let Err(e) = self.install(package).await {
                warn!(package = %package.name, "package install failed: {}", e);
                errors.push(e);
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::CacheAggregate(errors))
        }
    }

    pub async fn install(&self, package: &Package) -> Result<()> {
        let release = self.release(package).ok_or_else(|| Error::MalformedManifest {
            location: format!("package {}", package.name),
            reason: "no download URIs for this OS".to_string(),
        })?;
        info!(package = %package.name, versions = ?release.versions, "installing package");

        match package.name.as_str() {
            "runc" => self.install_runc(release).await,
            "kubernetes-binaries" => self.install_kube_binaries(package, release).await,
            "azure-cni" => self.install_azure_cni(package, release).await,
            "oras" => self.install_oras(package, release).await,
            _ => self.install_download(package, release).await,
        }
    }

    async fn install_runc(&self, release: &ReleaseDownloadUri) -> Result<()> {
        if self.host.is_mariner() {
            info!("runc is provided by the Mariner image, skipping");
            return Ok(());
        }
        let version = match release.versions.as_slice() {
            [] => return Ok(()),
            [version] => version,
            many => {
                return Err(Error::InvalidConfig(format!(
                    "runc expects exactly one version, got {}",
                    many.len()
                )))
            }
        };
        if self.host.is_arm() && LEGACY_RUNC_VERSIONS.contains(&version.as_str()) {
            info!(version = %version, "legacy runc on ARM, skipping");
            return Ok(());
        }
        apt_get_install(&format!("moby-runc={}", version))?
            .execute(self.backend.as_ref())
            .await?;
        Ok(())
    }

    async fn install_kube_binaries(&self, package: &Package, release: &ReleaseDownloadUri) -> Result<()> {
        let dir = &package.download_location;
        for version in &release.versions {
            let url = release.url_for(version, &self.host.arch);
            let tarball = artifact_path(dir, &url);
            self.ensure_directory(dir).await?;
            self.get_tarball(&tarball, &url).await?;

            let argv = vec![
                "tar".to_string(),
                format!("--transform=s|.*|&-{}|", version),
                "--show-transformed-names".to_string(),
                "-xzvf".to_string(),
                tarball.clone(),
                "--strip-components=3".to_string(),
                "-C".to_string(),
                KUBE_BINARIES_DIR.to_string(),
                "kubernetes/node/bin/kubelet".to_string(),
                "kubernetes/node/bin/kubectl".to_string(),
            ];
            let raw = argv.join(" ");
            run(self.backend.as_ref(), &Command::from_argv(&raw, argv, None)?).await?;
            self.remove(&tarball).await?;
        }
        Ok(())
    }

    async fn install_azure_cni(&self, package: &Package, release: &ReleaseDownloadUri) -> Result<()> {
        let dir = &package.download_location;
        for version in &release.versions {
            let url = release.url_for(version, &self.host.arch);
            let tarball = artifact_path(dir, &url);
            self.ensure_directory(dir).await?;
            self.get_tarball(&tarball, &url).await?;

            let target = format!("{}/{}", dir.trim_end_matches('/'), version);
            self.ensure_directory(&target).await?;
            self.extract_tarball(&tarball, &target).await?;
            self.remove(&tarball).await?;
        }
        Ok(())
    }

    async fn install_oras(&self, package: &Package, release: &ReleaseDownloadUri) -> Result<()> {
        let dir = &package.download_location;
        self.ensure_directory(ORAS_DOWNLOAD_DIR).await?;
        self.ensure_directory(dir).await?;
        for version in &release.versions {
            let url = release.url_for(version, &self.host.arch);
            let tarball = artifact_path(ORAS_DOWNLOAD_DIR, &url);
            self.get_tarball(&tarball, &url).await?;
            self.extract_tarball(&tarball, dir).await?;
        }
        self.remove(ORAS_DOWNLOAD_DIR).await?;
        Ok(())
    }

    async fn install_download(&self, package: &Package, release: &ReleaseDownloadUri) -> Result<()> {
        let dir = &package.download_location;
        self.ensure_directory(dir).await?;
        for version in &release.versions {
            let url = release.url_for(version, &self.host.arch);
            let path = artifact_path(dir, &url);
            if is_tarball(&path) {
                self.get_tarball(&path, &url).await?;
            } else {
                self.download(&path, &url).await?;
            }
        }
        Ok(())
    }

    /// Downloads `url` unless `path` already exists, then checks the archive lists.
    async fn get_tarball(&self, path: &str, url: &str) -> Result<()> {
        if !Path::new(path).exists() {
            self.download(path, url).await?;
        }
        self.exec(&format!("tar -tzf {}", path), None).await?;
        Ok(())
    }

    async fn download(&self, path: &str, url: &str) -> Result<()> {
        let cfg = CommandConfig::retrying(DOWNLOAD_MAX_RETRIES, DOWNLOAD_WAIT, DOWNLOAD_TIMEOUT);
        self.exec(&format!("curl -fsSLv {} -o {}", url, path), Some(cfg))
            .await?;
        Ok(())
    }

    async fn extract_tarball(&self, path: &str, target: &str) -> Result<()> {
        self.exec(&format!("tar -xzf {} -C {}", path, target), None)
            .await?;
        Ok(())
    }

    async fn ensure_directory(&self, dir: &str) -> Result<()> {
        self.exec(&format!("mkdir -p {}", dir), None).await?;
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<()> {
        self.exec(&format!("rm -rf {}", path), None).await?;
        Ok(())
    }

    async fn exec(&self, raw: &str, cfg: Option<CommandConfig>) -> Result<Output> {
        run(self.backend.as_ref(), &Command::new(raw, cfg)?).await
    }
}

fn artifact_path(dir: &str, url: &str) -> String {
    let name = url.rsplit('/').next().unwrap_or(url);
    format!("{}/{}", dir.trim_end_matches('/'), name)
}

fn is_tarball(path: &str) -> bool {
    path.ends_with(".tgz") || path.ends_with(".tar.gz")
}

fn apt_config() -> CommandConfig {
    CommandConfig::retrying(APT_MAX_RETRIES, APT_WAIT, APT_TIMEOUT)
}

/// Repairs dpkg state and refreshes the package index.
pub fn apt_get_update() -> Pipeline {
    let mut pipeline = Pipeline::new(Some(apt_config()));
    pipeline
        .add_command("dpkg --configure -a --force-confdef")
        .add_command("apt-get -o DPkg::Lock::Timeout=-1 -f -y install")
        .add_command("apt-get -o DPkg::Lock::Timeout=-1 update");
    pipeline
}

/// Installs `package`, running [`apt_get_update`] after each failed attempt.
pub fn apt_get_install(package: &str) -> Result<Pipeline> {
    let mut cfg = apt_config();
    cfg.on_retryable_failure = Some(Box::new(apt_get_update().as_command()?));
    let mut pipeline = Pipeline::new(Some(cfg));
    pipeline
        .add_command("dpkg --configure -a --force-confdef")
        .add_command(format!(
            "apt-get install -o DPkg::Lock::Timeout=-1 -o Dpkg::Options::=--force-confold --no-install-recommends -y {}",
            package
        ));
    Ok(pipeline)
}
