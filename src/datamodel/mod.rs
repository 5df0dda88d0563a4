//! Cluster description consumed and produced by the defaulting engine.
//!
//! Field names follow the upstream Azure deployment JSON. Optional
//! scalars are omitted when unset so a defaulted value serializes back
//! into exactly the document it was parsed from.

use crate::constants::{network, orchestrator, tags};
use crate::distro::Distro;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;


pub(crate) fn is_zero_i32(v: &i32) -> bool {
    *v == 0
}

pub(crate) fn is_zero_f64(v: &f64) -> bool {
    *v == 0.0
}

pub(crate) fn is_false(v: &bool) -> bool {
    !*v
}

/// Top-level envelope of a cluster definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerService {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub location: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<ResourcePurchasePlan>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub resource_type: String,
    #[serde(default)]
    pub properties: Properties,
}

impl ContainerService {
    /// Looks up a tag by key, ignoring key case.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// True when a `SkipGPUDriverInstall` tag is present, whatever its value.
    pub fn skip_gpu_driver_install(&self) -> bool {
        self.tag(tags::SKIP_GPU_DRIVER_INSTALL).is_some()
    }

    pub fn agent_pool(&self, name: &str) -> Option<&AgentPoolProfile> {
        self.properties
            .agent_pool_profiles
            .iter()
            .find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePurchasePlan {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub product: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub promotion_code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub publisher: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Properties {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub provisioning_state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orchestrator_profile: Option<OrchestratorProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_profile: Option<MasterProfile>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agent_pool_profiles: Vec<AgentPoolProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linux_profile: Option<LinuxProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windows_profile: Option<WindowsProfile>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension_profiles: Vec<ExtensionProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_profile: Option<CertificateProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosted_master_profile: Option<HostedMasterProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_flags: Option<FeatureFlags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telemetry_profile: Option<TelemetryProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_cloud_profile: Option<CustomCloudProfile>,
}

impl Properties {
    pub fn has_windows(&self) -> bool {
        self.agent_pool_profiles.iter().any(|p| p.is_windows())
    }

    pub fn has_availability_zones(&self) -> bool {
        let master = self
            .master_profile
            .as_ref()
            .map(|m| !m.availability_zones.is_empty())
            .unwrap_or(false);
        master
            || self
                .agent_pool_profiles
                .iter()
                .any(|p| !p.availability_zones.is_empty())
    }

    pub fn total_nodes(&self) -> i32 {
        let masters = self.master_profile.as_ref().map(|m| m.count).unwrap_or(0);
        masters + self.agent_pool_profiles.iter().map(|p| p.count).sum::<i32>()
    }

    pub fn is_hosted_master(&self) -> bool {
        self.hosted_master_profile.is_some()
    }

    pub fn is_azure_stack_cloud(&self) -> bool {
        self.custom_cloud_profile.is_some()
    }

    pub fn feature_enabled(&self, feature: Feature) -> bool {
        self.feature_flags
            .as_ref()
            .map(|f| f.is_enabled(feature))
            .unwrap_or(false)
    }

    pub fn is_kubernetes(&self) -> bool {
        self.orchestrator_profile
            .as_ref()
            .map(|o| o.is_kubernetes())
            .unwrap_or(false)
    }

    pub fn is_azure_cni(&self) -> bool {
        self.orchestrator_profile
            .as_ref()
            .map(|o| o.is_azure_cni())
            .unwrap_or(false)
    }

    /// The cluster-wide Kubernetes config. Present on every defaulted value.
    pub fn kubernetes_config(&self) -> Option<&KubernetesConfig> {
        self.orchestrator_profile
            .as_ref()
            .and_then(|o| o.kubernetes_config.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestratorProfile {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub orchestrator_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub orchestrator_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_config: Option<KubernetesConfig>,
}

impl OrchestratorProfile {
    pub fn is_kubernetes(&self) -> bool {
        self.orchestrator_type == orchestrator::KUBERNETES
    }

    pub fn is_azure_cni(&self) -> bool {
        self.kubernetes_config
            .as_ref()
            .map(|k| k.network_plugin == network::PLUGIN_AZURE)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateCluster {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_hosts_config_agent: Option<bool>,
}

/// Tunables for the Kubernetes components of a cluster or of one pool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesConfig {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kubernetes_image_base: String,
    #[serde(
        rename = "mcrKubernetesImageBase",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub mcr_kubernetes_image_base: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cluster_subnet: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub network_policy: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub network_plugin: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub container_runtime: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub container_runtime_config: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub docker_bridge_subnet: String,
    #[serde(rename = "dnsServiceIP", default, skip_serializing_if = "String::is_empty")]
    pub dns_service_ip: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service_cidr: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub moby_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub containerd_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub custom_hyperkube_image: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub etcd_version: String,
    #[serde(rename = "etcdDiskSizeGB", default, skip_serializing_if = "String::is_empty")]
    pub etcd_disk_size_gb: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub etcd_encryption_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_data_encryption_at_rest: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_instance_metadata: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_rbac: Option<bool>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub enable_aggregated_apis: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_secure_kubelet: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_cloud_controller_manager: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_cluster: Option<PrivateCluster>,
    #[serde(rename = "gchighthreshold", default, skip_serializing_if = "is_zero_i32")]
    pub gc_high_threshold: i32,
    #[serde(rename = "gclowthreshold", default, skip_serializing_if = "is_zero_i32")]
    pub gc_low_threshold: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cloud_provider_backoff_mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_provider_backoff: Option<bool>,
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub cloud_provider_backoff_retries: i32,
    #[serde(default, skip_serializing_if = "is_zero_f64")]
    pub cloud_provider_backoff_jitter: f64,
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub cloud_provider_backoff_duration: i32,
    #[serde(default, skip_serializing_if = "is_zero_f64")]
    pub cloud_provider_backoff_exponent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_provider_rate_limit: Option<bool>,
    #[serde(rename = "cloudProviderRateLimitQPS", default, skip_serializing_if = "is_zero_f64")]
    pub cloud_provider_rate_limit_qps: f64,
    #[serde(
        rename = "cloudProviderRateLimitQPSWrite",
        default,
        skip_serializing_if = "is_zero_f64"
    )]
    pub cloud_provider_rate_limit_qps_write: f64,
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub cloud_provider_rate_limit_bucket: i32,
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub cloud_provider_rate_limit_bucket_write: i32,
    #[serde(rename = "cloudProviderDisableOutboundSNAT", default, skip_serializing_if = "Option::is_none")]
    pub cloud_provider_disable_outbound_snat: Option<bool>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub load_balancer_sku: String,
    #[serde(rename = "excludeMasterFromStandardLB", default, skip_serializing_if = "Option::is_none")]
    pub exclude_master_from_standard_lb: Option<bool>,
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub maximum_load_balancer_rule_count: i32,
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub outbound_rule_idle_timeout_in_minutes: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub proxy_mode: String,
    #[serde(rename = "azureCNIVersion", default, skip_serializing_if = "String::is_empty")]
    pub azure_cni_version: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub kubelet_config: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub controller_manager_config: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scheduler_config: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub api_server_config: BTreeMap<String, String>,
}

impl KubernetesConfig {
    pub fn is_rbac_enabled(&self) -> bool {
        self.enable_rbac.unwrap_or(false)
    }
}

/// Image in a Shared Image Gallery referenced by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageReference {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_group: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subscription_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub gallery: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterProfile {
    #[serde(default)]
    pub count: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub dns_prefix: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub vm_size: String,
    #[serde(rename = "osDiskSizeGB", default, skip_serializing_if = "is_zero_i32")]
    pub os_disk_size_gb: i32,
    #[serde(rename = "vnetSubnetID", default, skip_serializing_if = "String::is_empty")]
    pub vnet_subnet_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub vnet_cidr: String,
    #[serde(rename = "firstConsecutiveStaticIP", default, skip_serializing_if = "String::is_empty")]
    pub first_consecutive_static_ip: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subnet: String,
    #[serde(rename = "subnetIPv6", default, skip_serializing_if = "String::is_empty")]
    pub subnet_ipv6: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub agent_subnet: String,
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub ip_address_count: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub storage_profile: String,
    #[serde(rename = "HTTPSourceAddressPrefix", default, skip_serializing_if = "String::is_empty")]
    pub http_source_address_prefix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distro: Option<Distro>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_config: Option<KubernetesConfig>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub availability_profile: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub availability_zones: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single_placement_group: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cosmos_etcd: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_update_domain_count: Option<i32>,
    #[serde(rename = "imageReference", default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<ImageReference>,
}

impl MasterProfile {
    pub fn is_custom_vnet(&self) -> bool {
        !self.vnet_subnet_id.is_empty()
    }

    pub fn is_vmss(&self) -> bool {
        self.availability_profile == orchestrator::VIRTUAL_MACHINE_SCALE_SETS
    }
}

/// Sysctl and THP settings a pool asks for on its Linux nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomLinuxOsConfig {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sysctls: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub transparent_huge_page_enabled: String,
    #[serde(rename = "swapFileSizeMB", default, skip_serializing_if = "is_zero_i32")]
    pub swap_file_size_mb: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPoolProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub count: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub vm_size: String,
    #[serde(rename = "osDiskSizeGB", default, skip_serializing_if = "is_zero_i32")]
    pub os_disk_size_gb: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub os_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distro: Option<Distro>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub availability_profile: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub availability_zones: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub scale_set_priority: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub scale_set_eviction_policy: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spot_max_price: Option<f64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub storage_profile: String,
    #[serde(rename = "vnetSubnetID", default, skip_serializing_if = "String::is_empty")]
    pub vnet_subnet_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subnet: String,
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub ip_address_count: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_config: Option<KubernetesConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single_placement_group: Option<bool>,
    #[serde(rename = "vmssOverProvisioningEnabled", default, skip_serializing_if = "Option::is_none")]
    pub vmss_over_provisioning_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accelerated_networking_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accelerated_networking_enabled_windows: Option<bool>,
    #[serde(rename = "auditDEnabled", default, skip_serializing_if = "Option::is_none")]
    pub auditd_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preserve_nodes_properties: Option<bool>,
    #[serde(rename = "enableVMSSNodePublicIP", default, skip_serializing_if = "Option::is_none")]
    pub enable_vmss_node_public_ip: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_update_domain_count: Option<i32>,
    #[serde(rename = "imageReference", default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<ImageReference>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_node_labels: BTreeMap<String, String>,
    #[serde(rename = "customLinuxOSConfig", default, skip_serializing_if = "Option::is_none")]
    pub custom_linux_os_config: Option<CustomLinuxOsConfig>,
}

impl AgentPoolProfile {
    pub fn is_windows(&self) -> bool {
        self.os_type == orchestrator::WINDOWS
    }

    pub fn is_vmss(&self) -> bool {
        self.availability_profile == orchestrator::VIRTUAL_MACHINE_SCALE_SETS
    }

    /// Kubelet flags of this pool; empty before defaulting.
    pub fn kubelet_config(&self) -> BTreeMap<String, String> {
        self.kubernetes_config
            .as_ref()
            .map(|k| k.kubelet_config.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKey {
    #[serde(default)]
    pub key_data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SshConfig {
    #[serde(default)]
    pub public_keys: Vec<PublicKey>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinuxProfile {
    #[serde(default)]
    pub admin_username: String,
    #[serde(default)]
    pub ssh: SshConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowsProfile {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub admin_username: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub admin_password: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub windows_publisher: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub windows_offer: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub windows_sku: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub extension_parameters: String,
    #[serde(rename = "rootURL", default, skip_serializing_if = "String::is_empty")]
    pub root_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateProfile {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ca_certificate: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ca_private_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_server_certificate: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_server_private_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub client_certificate: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub client_private_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kube_config_certificate: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kube_config_private_key: String,
}

/// Control plane operated by the cloud provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostedMasterProfile {
    #[serde(rename = "fqdn", default, skip_serializing_if = "String::is_empty")]
    pub fqdn: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub dns_prefix: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subnet: String,
    #[serde(rename = "ipAddress", default, skip_serializing_if = "String::is_empty")]
    pub ip_address: String,
}

/// Preview features toggled per cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    CseRunInBackground,
    BlockOutboundInternet,
    Ipv6DualStack,
    Ipv6Only,
    WinDsr,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFlags {
    #[serde(rename = "enableCSERunInBackground", default, skip_serializing_if = "is_false")]
    pub enable_cse_run_in_background: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub block_outbound_internet: bool,
    #[serde(rename = "enableIPv6DualStack", default, skip_serializing_if = "is_false")]
    pub enable_ipv6_dual_stack: bool,
    #[serde(rename = "enableIPv6Only", default, skip_serializing_if = "is_false")]
    pub enable_ipv6_only: bool,
    #[serde(rename = "enableWinDSR", default, skip_serializing_if = "is_false")]
    pub enable_win_dsr: bool,
}

impl FeatureFlags {
    pub fn is_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::CseRunInBackground => self.enable_cse_run_in_background,
            Feature::BlockOutboundInternet => self.block_outbound_internet,
            Feature::Ipv6DualStack => self.enable_ipv6_dual_stack,
            Feature::Ipv6Only => self.enable_ipv6_only,
            Feature::WinDsr => self.enable_win_dsr,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryProfile {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub application_insights_key: String,
}

/// Endpoints of an Azure environment, filled from Azure Stack metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureEnvironment {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "managementPortalURL", default, skip_serializing_if = "String::is_empty")]
    pub management_portal_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service_management_endpoint: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_manager_endpoint: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub active_directory_endpoint: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub gallery_endpoint: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub graph_endpoint: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub storage_endpoint_suffix: String,
    #[serde(rename = "keyVaultDNSSuffix", default, skip_serializing_if = "String::is_empty")]
    pub key_vault_dns_suffix: String,
    #[serde(rename = "resourceManagerVMDNSSuffix", default, skip_serializing_if = "String::is_empty")]
    pub resource_manager_vm_dns_suffix: String,
}

impl AzureEnvironment {
    /// Every endpoint the metadata fetch would otherwise fill is present.
    pub fn is_complete(&self) -> bool {
        !(self.name.is_empty()
            || self.resource_manager_endpoint.is_empty()
            || self.service_management_endpoint.is_empty()
            || self.active_directory_endpoint.is_empty()
            || self.graph_endpoint.is_empty()
            || self.resource_manager_vm_dns_suffix.is_empty())
    }
}

/// Azure Stack Hub deployment target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomCloudProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<AzureEnvironment>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub identity_system: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub authentication_method: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub dependencies_location: String,
    #[serde(rename = "portalURL", default, skip_serializing_if = "String::is_empty")]
    pub portal_url: String,
}
