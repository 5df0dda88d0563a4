//! Components manifest: the container images and packages baked into a VHD.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[cfg(test)]
mod tests;

/// Placeholder in an image repo replaced by each tag.
pub const TAG_PLACEHOLDER: char = '*';

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default)]
    pub container_images: Vec<ContainerImage>,
    #[serde(default)]
    pub packages: Vec<Package>,
}

/// Binaries to unpack from one tag of an image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefetchOptimization {
    pub version: String,
    #[serde(default)]
    pub binaries: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerImage {
    #[serde(rename = "downloadURL")]
    pub repo: String,
    #[serde(rename = "amd64OnlyVersions", default)]
    pub amd64_only_tags: Vec<String>,
    #[serde(rename = "multiArchVersions", default)]
    pub multi_arch_tags: Vec<String>,
    #[serde(rename = "prefetchOptimizations", default)]
    pub prefetch_optimizations: Vec<PrefetchOptimization>,
}

impl ContainerImage {
    /// Pullable reference for `tag`.
    pub fn reference(&self, tag: &str) -> Result<String> {
        if self.repo.matches(TAG_PLACEHOLDER).count() != 1 {
            return Err(Error::MalformedRepo(self.repo.clone()));
        }
        Ok(self.repo.replace(TAG_PLACEHOLDER, tag))
    }

    /// Tags to pull on a host; amd64-only tags are skipped on ARM.
    pub fn tags_for(&self, amd64: bool) -> impl Iterator<Item = &str> {
        let amd64_only = self.amd64_only_tags.iter().filter(move |_| amd64);
        self.multi_arch_tags
            .iter()
            .chain(amd64_only)
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseDownloadUri {
    #[serde(default)]
    pub versions: Vec<String>,
    #[serde(rename = "downloadURL", default)]
    pub download_url: String,
}

impl ReleaseDownloadUri {
    /// Download URL for `version` on a `cpu_arch` host.
    pub fn url_for(&self, version: &str, cpu_arch: &str) -> String {
        self.download_url
            .replace("${CPU_ARCH}", cpu_arch)
            .replace("${version}", version)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsDistroUris {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<ReleaseDownloadUri>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadUris {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<OsDistroUris>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ubuntu: Option<OsDistroUris>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mariner: Option<OsDistroUris>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub name: String,
    #[serde(default)]
    pub download_location: String,
    #[serde(rename = "downloadURIs", default)]
    pub download_uris: DownloadUris,
}

impl Package {
    pub fn default_release(&self) -> Option<&ReleaseDownloadUri> {
        self.download_uris
            .default
            .as_ref()
            .and_then(|d| d.current.as_ref())
    }
}

impl Components {
    /// Reads and validates a manifest file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| Error::MalformedManifest {
            location: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let components: Components =
            serde_json::from_str(raw).map_err(|e| Error::MalformedManifest {
                location: format!("line {} column {}", e.line(), e.column()),
                reason: e.to_string(),
            })?;
        components.validate()?;
        Ok(components)
    }

    pub fn validate(&self) -> Result<()> {
        for (i, image) in self.container_images.iter().enumerate() {
            if image.repo.matches(TAG_PLACEHOLDER).count() != 1 {
                return Err(Error::MalformedManifest {
                    location: format!("containerImages[{}].downloadURL", i),
                    reason: format!("{:?} must contain exactly one '*'", image.repo),
                });
            }
        }

        let mut names = HashSet::new();
        for (i, package) in self.packages.iter().enumerate() {
            if package.default_release().is_none() {
                return Err(Error::MalformedManifest {
                    location: format!("packages[{}].downloadURIs.default.current", i),
                    reason: format!("package {:?} has no default release", package.name),
                });
            }
            if !names.insert(package.name.as_str()) {
                return Err(Error::MalformedManifest {
                    location: format!("packages[{}].name", i),
                    reason: format!("duplicate package {:?}", package.name),
                });
            }
        }
        Ok(())
    }
}
