//! Shared Image Gallery coordinates for node images.
//!
//! Each distro has a template naming its gallery, resource group,
//! definition and version. A per-cloud [`SigConfig`] rewrites the
//! gallery, resource group and subscription through option functions,
//! so the same logical image can live in a different subscription in
//! every cloud.

use crate::cloud::get_cloud_target_env;
use crate::distro::Distro;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[cfg(test)]
mod tests;

pub const AKS_UBUNTU_GALLERY: &str = "AKSUbuntu";
pub const AKS_UBUNTU_RESOURCE_GROUP: &str = "AKS-Ubuntu";
pub const AKS_CBL_MARINER_GALLERY: &str = "AKSCBLMariner";
pub const AKS_CBL_MARINER_RESOURCE_GROUP: &str = "AKS-CBLMariner";
pub const AKS_AZURE_LINUX_GALLERY: &str = "AKSAzureLinux";
pub const AKS_AZURE_LINUX_RESOURCE_GROUP: &str = "AKS-AzureLinux";
pub const AKS_WINDOWS_GALLERY: &str = "AKSWindows";
pub const AKS_WINDOWS_RESOURCE_GROUP: &str = "AKS-Windows";
pub const AKS_UBUNTU_EDGE_ZONE_GALLERY: &str = "AKSUbuntuEdgeZone";
pub const AKS_UBUNTU_EDGE_ZONE_RESOURCE_GROUP: &str = "AKS-Ubuntu-EdgeZone";

pub const AZURE_PUBLIC_CLOUD_SIG_TENANT_ID: &str = "33e01921-4d64-4f8c-a055-5bdaffd5e33d";
pub const AZURE_PUBLIC_CLOUD_SIG_SUBSCRIPTION: &str = "109a5e88-712a-48ae-9078-9ca8b3c81345";

/// Last SIG version built for the Docker based Linux images.
pub const FROZEN_LINUX_SIG_IMAGE_VERSION_FOR_DOCKER: &str = "2022.08.29";
pub const WINDOWS_SIG_IMAGE_VERSION: &str = "17763.2213.210922";

/// Gallery keys a [`SigConfig`] must always provide.
const REQUIRED_GALLERIES: [&str; 3] = [AKS_UBUNTU_GALLERY, AKS_CBL_MARINER_GALLERY, AKS_WINDOWS_GALLERY];

const LINUX_SIG_VERSION_JSON: &str = include_str!("linux_sig_version.json");
const EDGE_ZONE_SIG_VERSION_JSON: &str = include_str!("edge_zone_sig_version.json");

#[derive(Debug, Deserialize)]
struct VersionFile {
    version: String,
}

/// SIG image versions, read once from the embedded version files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigVersions {
    pub linux: String,
    pub edge_zone: String,
    pub frozen_docker: String,
    pub windows: String,
}

impl SigVersions {
    pub fn embedded() -> Result<Self> {
        let linux: VersionFile = serde_json::from_str(LINUX_SIG_VERSION_JSON)?;
        let edge_zone: VersionFile = serde_json::from_str(EDGE_ZONE_SIG_VERSION_JSON)?;
        Ok(Self {
            linux: linux.version,
            edge_zone: edge_zone.version,
            frozen_docker: FROZEN_LINUX_SIG_IMAGE_VERSION_FOR_DOCKER.to_string(),
            windows: WINDOWS_SIG_IMAGE_VERSION.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigGalleryConfig {
    pub gallery_name: String,
    pub resource_group: String,
}

/// Per-cloud gallery placement, keyed by OS SKU.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigConfig {
    #[serde(rename = "tenantID", default)]
    pub tenant_id: String,
    #[serde(rename = "subscriptionID", default)]
    pub subscription_id: String,
    #[serde(default)]
    pub galleries: Option<HashMap<String, SigGalleryConfig>>,
}

impl SigConfig {
    /// The public cloud galleries AKS publishes to.
    pub fn azure_public() -> Self {
        let galleries = [
            (AKS_UBUNTU_GALLERY, AKS_UBUNTU_RESOURCE_GROUP),
            (AKS_CBL_MARINER_GALLERY, AKS_CBL_MARINER_RESOURCE_GROUP),
            (AKS_AZURE_LINUX_GALLERY, AKS_AZURE_LINUX_RESOURCE_GROUP),
            (AKS_WINDOWS_GALLERY, AKS_WINDOWS_RESOURCE_GROUP),
        ]
        .into_iter()
        .map(|(gallery, rg)| {
            (
                gallery.to_string(),
                SigGalleryConfig {
                    gallery_name: gallery.to_string(),
                    resource_group: rg.to_string(),
                },
            )
        })
        .collect();
        Self {
            tenant_id: AZURE_PUBLIC_CLOUD_SIG_TENANT_ID.to_string(),
            subscription_id: AZURE_PUBLIC_CLOUD_SIG_SUBSCRIPTION.to_string(),
            galleries: Some(galleries),
        }
    }
}

/// Gallery coordinate of one image version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigImageConfig {
    pub resource_group: String,
    pub gallery: String,
    pub definition: String,
    pub version: String,
    #[serde(rename = "subscriptionID")]
    pub subscription_id: String,
}

pub type SigImageConfigOpt = Box<dyn Fn(&mut SigImageConfig) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigImageConfigTemplate {
    pub resource_group: &'static str,
    pub gallery: &'static str,
    pub definition: &'static str,
    pub version: String,
}

impl SigImageConfigTemplate {
    pub fn with_options(&self, opts: &[SigImageConfigOpt]) -> SigImageConfig {
        let mut config = SigImageConfig {
            resource_group: self.resource_group.to_string(),
            gallery: self.gallery.to_string(),
            definition: self.definition.to_string(),
            version: self.version.clone(),
            subscription_id: String::new(),
        };
        for opt in opts {
            opt(&mut config);
        }
        config
    }
}

/// Rewrites gallery, resource group and subscription from `config`.
pub fn with_acs_sig_config(config: &SigConfig, os_sku: &str) -> Result<SigImageConfigOpt> {
    let gallery = config
        .galleries
        .as_ref()
        .and_then(|g| g.get(os_sku))
        .cloned()
        .ok_or_else(|| Error::MissingGalleryForSku(os_sku.to_string()))?;
    let subscription_id = config.subscription_id.clone();
    Ok(Box::new(move |c: &mut SigImageConfig| {
        c.gallery = gallery.gallery_name.clone();
        c.resource_group = gallery.resource_group.clone();
        c.subscription_id = subscription_id.clone();
    }))
}

pub fn with_subscription(subscription_id: &str) -> SigImageConfigOpt {
    let subscription_id = subscription_id.to_string();
    Box::new(move |c: &mut SigImageConfig| c.subscription_id = subscription_id.clone())
}

/// OS SKU gallery key and template for a distro. `None` for distros
/// that are not published to a gallery.
pub fn template_for(distro: Distro, versions: &SigVersions) -> Option<(&'static str, SigImageConfigTemplate)> {
    use Distro::*;

    let distro = distro.canonical();
    let linux_version = if distro.is_legacy_docker() {
        versions.frozen_docker.clone()
    } else if distro.is_edge_zone() {
        versions.edge_zone.clone()
    } else {
        versions.linux.clone()
    };
    let ubuntu = |definition| {
        (
            AKS_UBUNTU_GALLERY,
            SigImageConfigTemplate {
                resource_group: AKS_UBUNTU_RESOURCE_GROUP,
                gallery: AKS_UBUNTU_GALLERY,
                definition,
                version: linux_version.clone(),
            },
        )
    };
    let mariner = |definition| {
        (
            AKS_CBL_MARINER_GALLERY,
            SigImageConfigTemplate {
                resource_group: AKS_CBL_MARINER_RESOURCE_GROUP,
                gallery: AKS_CBL_MARINER_GALLERY,
                definition,
                version: linux_version.clone(),
            },
        )
    };
    let azure_linux = |definition| {
        (
            AKS_AZURE_LINUX_GALLERY,
            SigImageConfigTemplate {
                resource_group: AKS_AZURE_LINUX_RESOURCE_GROUP,
                gallery: AKS_AZURE_LINUX_GALLERY,
                definition,
                version: linux_version.clone(),
            },
        )
    };
    let edge_zone = |definition| {
        (
            AKS_UBUNTU_EDGE_ZONE_GALLERY,
            SigImageConfigTemplate {
                resource_group: AKS_UBUNTU_EDGE_ZONE_RESOURCE_GROUP,
                gallery: AKS_UBUNTU_EDGE_ZONE_GALLERY,
                definition,
                version: linux_version.clone(),
            },
        )
    };
    let windows = |definition| {
        (
            AKS_WINDOWS_GALLERY,
            SigImageConfigTemplate {
                resource_group: AKS_WINDOWS_RESOURCE_GROUP,
                gallery: AKS_WINDOWS_GALLERY,
                definition,
                version: versions.windows.clone(),
            },
        )
    };

    let entry = match distro {
        AKSUbuntu1604 => ubuntu("1604"),
        AKSUbuntu1804 => ubuntu("1804"),
        Ubuntu1804Gen2 => ubuntu("1804gen2"),
        AKSUbuntuGPU1804 => ubuntu("1804gpu"),
        AKSUbuntuGPU1804Gen2 => ubuntu("1804gen2gpu"),
        AKSUbuntuContainerd1804 => ubuntu("1804containerd"),
        AKSUbuntuContainerd1804Gen2 => ubuntu("1804gen2containerd"),
        AKSUbuntuGPUContainerd1804 => ubuntu("1804gpucontainerd"),
        AKSUbuntuGPUContainerd1804Gen2 => ubuntu("1804gen2gpucontainerd"),
        AKSUbuntuFipsContainerd1804 => ubuntu("1804fipscontainerd"),
        AKSUbuntuFipsContainerd1804Gen2 => ubuntu("1804gen2fipscontainerd"),
        AKSUbuntuFipsContainerd2004 => ubuntu("2004fipscontainerd"),
        AKSUbuntuFipsContainerd2004Gen2 => ubuntu("2004gen2fipscontainerd"),
        AKSUbuntuFipsContainerd2204 => ubuntu("2204fipscontainerd"),
        AKSUbuntuFipsContainerd2204Gen2 => ubuntu("2204gen2fipscontainerd"),
        AKSUbuntuContainerd2204 => ubuntu("2204containerd"),
        AKSUbuntuContainerd2204Gen2 => ubuntu("2204gen2containerd"),
        AKSUbuntuContainerd2004CVMGen2 => ubuntu("2004gen2CVMcontainerd"),
        AKSUbuntuContainerd2204TLGen2 => ubuntu("2204gen2TLcontainerd"),
        AKSUbuntuMinimalContainerd2204 => ubuntu("2204minimalcontainerd"),
        AKSUbuntuMinimalContainerd2204Gen2 => ubuntu("2204gen2minimalcontainerd"),
        AKSUbuntuContainerd2404 => ubuntu("2404containerd"),
        AKSUbuntuContainerd2404Gen2 => ubuntu("2404gen2containerd"),
        AKSUbuntuArm64Containerd2204Gen2 => ubuntu("2204gen2arm64containerd"),
        AKSUbuntuArm64Containerd2404Gen2 => ubuntu("2404gen2arm64containerd"),
        AKSUbuntuEdgeZoneContainerd1804 => edge_zone("1804containerd"),
        AKSUbuntuEdgeZoneContainerd1804Gen2 => edge_zone("1804gen2containerd"),
        AKSUbuntuEdgeZoneContainerd2204 => edge_zone("2204containerd"),
        AKSUbuntuEdgeZoneContainerd2204Gen2 => edge_zone("2204gen2containerd"),
        AKSCBLMarinerV1 => mariner("V1"),
        AKSCBLMarinerV2 => mariner("V2"),
        AKSCBLMarinerV2Gen2 => mariner("V2gen2"),
        AKSCBLMarinerV2FIPS => mariner("V2fips"),
        AKSCBLMarinerV2Gen2FIPS => mariner("V2gen2fips"),
        AKSCBLMarinerV2Arm64Gen2 => mariner("V2gen2arm64"),
        AKSAzureLinuxV2 => azure_linux("V2"),
        AKSAzureLinuxV2Gen2 => azure_linux("V2gen2"),
        AKSAzureLinuxV3 => azure_linux("V3"),
        AKSAzureLinuxV3Gen2 => azure_linux("V3gen2"),
        AKSAzureLinuxV3Gen2FIPS => azure_linux("V3gen2fips"),
        AKSAzureLinuxV3Arm64Gen2 => azure_linux("V3gen2arm64"),
        AKSWindows2019 => windows("windows-2019"),
        AKSWindows2019Containerd => windows("windows-2019-containerd"),
        AKSWindows2022Containerd => windows("windows-2022-containerd"),
        AKSWindows2022ContainerdGen2 => windows("windows-2022-containerd-gen2"),
        AKSWindows23H2 => windows("windows-23H2"),
        AKSWindows23H2Gen2 => windows("windows-23H2-gen2"),
        Ubuntu | Ubuntu1804 | AKSWindows2019PIR | CustomizedImage | CustomizedWindowsOSImage
        | AKS1604Deprecated | AKS1804Deprecated => return None,
    };
    Some(entry)
}

/// A cloud's view of every gallery, validated against its [`SigConfig`].
#[derive(Debug, Clone)]
pub struct SigEnvironment {
    pub cloud_name: &'static str,
    pub sig_tenant_id: String,
    pub subscription_id: String,
    config: SigConfig,
    versions: SigVersions,
}

impl SigEnvironment {
    pub fn new(config: &SigConfig, region: &str, versions: SigVersions) -> Result<Self> {
        if config.galleries.is_none() {
            return Err(Error::InvalidSigConfig("galleries not set".to_string()));
        }
        if config.subscription_id.is_empty() {
            return Err(Error::InvalidSigConfig("subscriptionID is empty".to_string()));
        }
        if config.tenant_id.is_empty() {
            return Err(Error::InvalidSigConfig("tenantID is empty".to_string()));
        }
        for os_sku in REQUIRED_GALLERIES {
            with_acs_sig_config(config, os_sku)?;
        }
        Ok(Self {
            cloud_name: get_cloud_target_env(region),
            sig_tenant_id: config.tenant_id.clone(),
            subscription_id: config.subscription_id.clone(),
            config: config.clone(),
            versions,
        })
    }

    pub fn versions(&self) -> &SigVersions {
        &self.versions
    }

    /// Gallery coordinate for `distro` in this cloud. Edge zone images
    /// ignore the galleries map and keep their fixed coordinates.
    pub fn resolve(&self, distro: Distro) -> Result<SigImageConfig> {
        let (os_sku, template) = template_for(distro, &self.versions)
            .ok_or_else(|| Error::UnsupportedSigDistro(distro.to_string()))?;
        let opt = if distro.is_edge_zone() {
            with_subscription(&self.subscription_id)
        } else {
            with_acs_sig_config(&self.config, os_sku)?
        };
        Ok(template.with_options(&[opt]))
    }
}

/// One-shot resolution of `distro` for `region`.
pub fn resolve(distro: Distro, config: &SigConfig, region: &str) -> Result<SigImageConfig> {
    SigEnvironment::new(config, region, SigVersions::embedded()?)?.resolve(distro)
}
