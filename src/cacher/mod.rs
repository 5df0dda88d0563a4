//! VHD component cacher.
//!
//! Pulls every container image in a [`Components`] manifest through a
//! bounded worker pool, then installs the manifest's packages one by
//! one. All processes go through an [`exec::Backend`](crate::exec::Backend),
//! so a dry-run backend yields the full schedule without touching the host.

use crate::components::Components;
use crate::error::{Error, Result};
use crate::exec::Backend;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub mod host;
pub mod images;
pub mod packages;

pub use host::{Host, OsType};
pub use images::{CliTool, ImageInstaller};
pub use packages::PackageInstaller;

#[cfg(test)]
mod tests;

pub const DEFAULT_PARALLELISM: usize = 10;

pub struct Cacher {
    host: Host,
    images: ImageInstaller,
    packages: PackageInstaller,
}

impl Cacher {
    /// Fails when the CLI tool's init command fails.
    pub async fn new(tool: CliTool, parallelism: usize, backend: Arc<dyn Backend>, host: Host) -> Result<Self> {
        let images = ImageInstaller::new(tool, Arc::clone(&backend), parallelism).await?;
        let packages = PackageInstaller::new(backend, host.clone());
        Ok(Self {
            host,
            images,
            packages,
        })
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    /// Caches every image, then every package.
    ///
    /// Failures are collected rather than short-circuiting, and come back as
    /// one [`Error::CacheAggregate`]. A fired `cancel` wins over any failure.
    pub async fn cache(&self, components: &Components, cancel: &CancellationToken) -> Result<()> {
        info!(
            os = %self.host.os,
            arch = %self.host.arch,
            tool = %self.images.tool(),
            images = components.container_images.len(),
            packages = components.packages.len(),
            "caching components"
        );

        let mut errors = Vec::new();
        absorb(
            self.images
                .install(&components.container_images, &self.host, cancel)
                .await,
            &mut errors,
        )?;
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        absorb(
            self.packages.install_all(&components.packages, cancel).await,
            &mut errors,
        )?;

        if errors.is_empty() {
            info!("all components cached");
            Ok(())
        } else {
            Err(Error::CacheAggregate(errors))
        }
    }
}

fn absorb(result: Result<()>, errors: &mut Vec<Error>) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(Error::Cancelled) => Err(Error::Cancelled),
        Err(Error::CacheAggregate(inner)) => {
            errors.extend(inner);
            Ok(())
        }
        Err(e) => {
            errors.push(e);
            Ok(())
        }
    }
}
