//! Cloud environments and the registry of their endpoint and image bases.

use crate::distro::Distro;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

mod images;

pub use images::{WINDOWS_SERVER_2019_IMAGE, AKS_WINDOWS_SERVER_2019_IMAGE};


/// A named Azure environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cloud {
    #[serde(rename = "AzurePublicCloud")]
    Public,
    #[serde(rename = "AzureChinaCloud")]
    China,
    #[serde(rename = "AzureUSGovernmentCloud")]
    USGov,
    #[serde(rename = "AzureGermanCloud")]
    German,
    #[serde(rename = "AzureStackCloud")]
    Stack,
    #[serde(rename = "USNatCloud")]
    USNat,
    #[serde(rename = "USSecCloud")]
    USSec,
    #[serde(rename = "AzureBleuCloud")]
    Bleu,
}

impl Cloud {
    pub const ALL: [Cloud; 8] = [
        Cloud::Public,
        Cloud::China,
        Cloud::USGov,
        Cloud::German,
        Cloud::Stack,
        Cloud::USNat,
        Cloud::USSec,
        Cloud::Bleu,
    ];

    /// Resolve the cloud a region belongs to. Azure Stack is never
    /// inferred from a location; it is selected by a custom cloud profile.
    pub fn from_location(location: &str) -> Cloud {
        let loc: String = location
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        if loc.starts_with("china") {
            Cloud::China
        } else if loc.starts_with("germany") {
            Cloud::German
        } else if loc.starts_with("usgov") || loc.starts_with("usdod") {
            Cloud::USGov
        } else if loc.starts_with("usnat") {
            Cloud::USNat
        } else if loc.starts_with("ussec") {
            Cloud::USSec
        } else if loc.starts_with("bleu") {
            Cloud::Bleu
        } else {
            Cloud::Public
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Cloud::Public => "AzurePublicCloud",
            Cloud::China => "AzureChinaCloud",
            Cloud::USGov => "AzureUSGovernmentCloud",
            Cloud::German => "AzureGermanCloud",
            Cloud::Stack => "AzureStackCloud",
            Cloud::USNat => "USNatCloud",
            Cloud::USSec => "USSecCloud",
            Cloud::Bleu => "AzureBleuCloud",
        }
    }
}

/// Cloud name string for a region, as used in SIG environment configs.
pub fn get_cloud_target_env(location: &str) -> &'static str {
    Cloud::from_location(location).name()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DockerSpecConfig {
    pub docker_engine_repo: String,
    #[serde(rename = "dockerComposeDownloadURL")]
    pub docker_compose_download_url: String,
}

/// Registry and download bases for Kubernetes components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesSpecConfig {
    #[serde(rename = "azureTelemetryPID", default)]
    pub azure_telemetry_pid: String,
    pub kubernetes_image_base: String,
    pub tiller_image_base: String,
    pub aci_connector_image_base: String,
    pub mcr_kubernetes_image_base: String,
    pub nvidia_image_base: String,
    #[serde(rename = "azureCNIImageBase")]
    pub azure_cni_image_base: String,
    #[serde(rename = "CalicoImageBase")]
    pub calico_image_base: String,
    #[serde(rename = "etcdDownloadURLBase")]
    pub etcd_download_url_base: String,
    #[serde(rename = "kubeBinariesSASURLBase")]
    pub kube_binaries_sas_url_base: String,
    #[serde(rename = "windowsTelemetryGUID")]
    pub windows_telemetry_guid: String,
    #[serde(rename = "cniPluginsDownloadURL")]
    pub cni_plugins_download_url: String,
    #[serde(rename = "vnetCNILinuxPluginsDownloadURL")]
    pub vnet_cni_linux_plugins_download_url: String,
    #[serde(rename = "vnetCNIWindowsPluginsDownloadURL")]
    pub vnet_cni_windows_plugins_download_url: String,
    #[serde(rename = "containerdDownloadURLBase")]
    pub containerd_download_url_base: String,
    #[serde(rename = "csiProxyDownloadURL")]
    pub csi_proxy_download_url: String,
    #[serde(rename = "windowsProvisioningScriptsPackageURL")]
    pub windows_provisioning_scripts_package_url: String,
    #[serde(rename = "windowsPauseImageURL")]
    pub windows_pause_image_url: String,
    #[serde(default)]
    pub always_pull_windows_pause_image: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointConfig {
    #[serde(rename = "resourceManagerVMDNSSuffix")]
    pub resource_manager_vm_dns_suffix: String,
    pub storage_endpoint_suffix: String,
    pub key_vault_dns_suffix: String,
}

/// Platform Image Repository coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OsImage {
    pub image_offer: String,
    pub image_sku: String,
    pub image_publisher: String,
    pub image_version: String,
}

impl OsImage {
    pub fn new(publisher: &str, offer: &str, sku: &str, version: &str) -> Self {
        Self {
            image_offer: offer.to_string(),
            image_sku: sku.to_string(),
            image_publisher: publisher.to_string(),
            image_version: version.to_string(),
        }
    }
}

/// Everything a cloud contributes to a node's bootstrap config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudSpec {
    pub cloud_name: String,
    pub docker_spec_config: DockerSpecConfig,
    pub kubernetes_spec_config: KubernetesSpecConfig,
    pub endpoint_config: EndpointConfig,
    #[serde(rename = "osImageConfig")]
    pub os_image_config: BTreeMap<Distro, OsImage>,
}

impl CloudSpec {
    pub fn os_image(&self, distro: Distro) -> Option<&OsImage> {
        self.os_image_config.get(&distro.canonical())
    }
}

/// Immutable lookup of every known cloud. Built once at startup and
/// shared by reference with the defaulting engine and bootstrap resolver.
#[derive(Debug, Clone)]
pub struct CloudSpecRegistry {
    specs: HashMap<Cloud, CloudSpec>,
}

impl Default for CloudSpecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CloudSpecRegistry {
    pub fn new() -> Self {
        let specs = Cloud::ALL
            .iter()
            .map(|cloud| (*cloud, images::build_spec(*cloud)))
            .collect();
        Self { specs }
    }

    pub fn spec(&self, cloud: Cloud) -> &CloudSpec {
        // every variant is inserted by new()
        &self.specs[&cloud]
    }

    pub fn spec_for_location(&self, location: &str) -> &CloudSpec {
        self.spec(Cloud::from_location(location))
    }
}
