//! Node bootstrapping resolver.
//!
//! Takes a partial cluster plus the name of the pool a node joins and
//! produces the fully-defaulted parameter bundle the node consumes.

use crate::cloud::{get_cloud_target_env, CloudSpec, CloudSpecRegistry, OsImage};
use crate::constants::sysctl;
use crate::datamodel::{AgentPoolProfile, ContainerService};
use crate::defaults::{DefaultsParams, Defaulter, EndpointsFetcher};
use crate::distro::Distro;
use crate::error::{Error, Result};
use crate::overrides::{Entity, Overrides};
use crate::sig::{SigConfig, SigEnvironment, SigImageConfig, SigVersions};
use crate::sku;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};


/// What a caller asks the resolver for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeBootstrappingRequest {
    pub container_service: ContainerService,
    pub agent_pool_name: String,
    #[serde(rename = "subscriptionID", default)]
    pub subscription_id: String,
    #[serde(rename = "tenantID", default)]
    pub tenant_id: String,
    #[serde(default)]
    pub resource_group_name: String,
    #[serde(default)]
    pub gpu_instance_profile: String,
    #[serde(default)]
    pub is_upgrade: bool,
    #[serde(default)]
    pub is_scale: bool,
}

impl NodeBootstrappingRequest {
    pub fn entity(&self) -> Entity {
        Entity::new(&self.subscription_id, &self.tenant_id)
    }

    fn params(&self) -> DefaultsParams {
        DefaultsParams {
            is_upgrade: self.is_upgrade,
            is_scale: self.is_scale,
        }
    }
}

/// GPU settings of the node's SKU.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpuConfig {
    pub enable_nvidia: bool,
    /// False when the SKU has no GPU or the cluster opted out via tag.
    #[serde(rename = "configGPUDriverIfNeeded")]
    pub config_gpu_driver_if_needed: bool,
    pub driver_version: String,
    pub driver_type: String,
    #[serde(rename = "imageSHA")]
    pub image_sha: String,
    pub needs_fabric_manager: bool,
    pub gpu_instance_profile: String,
    #[serde(rename = "migNode")]
    pub mig_node: bool,
}

impl GpuConfig {
    fn for_pool(pool: &AgentPoolProfile, distro: Option<Distro>, skip_driver: bool, instance_profile: &str) -> Self {
        let vm_size = pool.vm_size.as_str();
        let enable_nvidia = if pool.is_windows() {
            sku::use_windows_cuda_driver(vm_size) || sku::use_windows_grid_driver(vm_size)
        } else if distro.is_some_and(|d| d.is_cbl_mariner()) {
            sku::is_mariner_nvidia_enabled(vm_size)
        } else {
            sku::is_nvidia_enabled(vm_size)
        };
        if !enable_nvidia {
            return Self::default();
        }

        let driver = sku::driver_version(vm_size);
        Self {
            enable_nvidia,
            config_gpu_driver_if_needed: !skip_driver,
            driver_version: driver.as_str().to_string(),
            driver_type: driver.driver_type().to_string(),
            image_sha: sku::gpu_image_sha(vm_size).to_string(),
            needs_fabric_manager: sku::needs_fabric_manager(vm_size),
            gpu_instance_profile: instance_profile.to_string(),
            mig_node: sku::is_mig_node(instance_profile),
        }
    }
}

/// The resolved bootstrap parameters of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeBootstrappingConfiguration {
    pub container_service: ContainerService,
    pub cloud_spec_config: CloudSpec,
    pub agent_pool_profile: AgentPoolProfile,
    pub cloud_target_env: String,
    #[serde(rename = "subscriptionID")]
    pub subscription_id: String,
    #[serde(rename = "tenantID")]
    pub tenant_id: String,
    #[serde(default)]
    pub resource_group_name: String,
    #[serde(rename = "isARM64")]
    pub is_arm64: bool,
    pub gpu: GpuConfig,
    pub network_plugin: String,
    pub network_policy: String,
    pub kubelet_config: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sysctls: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_image_config: Option<OsImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sig_image_config: Option<SigImageConfig>,
}

/// Resolves bootstrap requests against fixed startup state.
pub struct BootstrapResolver<'a> {
    defaulter: Defaulter<'a>,
    sig_config: SigConfig,
    sig_versions: SigVersions,
    overrides: Overrides,
}

impl<'a> BootstrapResolver<'a> {
    pub fn new(clouds: &'a CloudSpecRegistry, sig_config: SigConfig, overrides: Overrides) -> Result<Self> {
        Self::with_defaulter(Defaulter::new(clouds), sig_config, overrides)
    }

    pub fn with_fetcher(
        clouds: &'a CloudSpecRegistry,
        fetcher: Box<dyn EndpointsFetcher>,
        sig_config: SigConfig,
        overrides: Overrides,
    ) -> Result<Self> {
        Self::with_defaulter(Defaulter::with_fetcher(clouds, fetcher), sig_config, overrides)
    }

    fn with_defaulter(defaulter: Defaulter<'a>, sig_config: SigConfig, overrides: Overrides) -> Result<Self> {
        Ok(Self {
            defaulter,
            sig_config,
            sig_versions: SigVersions::embedded()?,
            overrides,
        })
    }

    pub async fn resolve(&self, request: NodeBootstrappingRequest) -> Result<NodeBootstrappingConfiguration> {
        let entity = request.entity();
        let params = request.params();
        let cs = self
            .defaulter
            .set_properties_defaults(request.container_service, params)
            .await?;

        let pool = cs
            .agent_pool(&request.agent_pool_name)
            .cloned()
            .ok_or_else(|| Error::UnknownAgentPool(request.agent_pool_name.clone()))?;
        let cloud_spec = self.defaulter.cloud_spec(&cs).clone();
        let distro = node_distro(&pool);
        info!(
            pool = %pool.name,
            distro = distro.map(|d| d.as_str()).unwrap_or("custom"),
            cloud = %cloud_spec.cloud_name,
            "resolving node bootstrapping configuration"
        );

        let gpu = GpuConfig::for_pool(
            &pool,
            distro,
            cs.skip_gpu_driver_install(),
            &request.gpu_instance_profile,
        );

        let (os_image_config, sig_image_config) = match distro {
            Some(distro) => self.images(&cs, &cloud_spec, &pool, distro, &entity)?,
            None => (None, None),
        };

        let (network_plugin, network_policy) = cs
            .properties
            .kubernetes_config()
            .map(|k| (k.network_plugin.clone(), k.network_policy.clone()))
            .unwrap_or_default();

        Ok(NodeBootstrappingConfiguration {
            cloud_target_env: get_cloud_target_env(&cs.location).to_string(),
            is_arm64: distro.is_some_and(|d| d.is_arm64()),
            kubelet_config: pool.kubelet_config(),
            sysctls: sysctls(&pool),
            network_plugin,
            network_policy,
            gpu,
            os_image_config,
            sig_image_config,
            subscription_id: request.subscription_id,
            tenant_id: request.tenant_id,
            resource_group_name: request.resource_group_name,
            agent_pool_profile: pool,
            cloud_spec_config: cloud_spec,
            container_service: cs,
        })
    }

    /// PIR and SIG coordinates for the node image. At least one must exist.
    fn images(
        &self,
        cs: &ContainerService,
        cloud_spec: &CloudSpec,
        pool: &AgentPoolProfile,
        distro: Distro,
        entity: &Entity,
    ) -> Result<(Option<OsImage>, Option<SigImageConfig>)> {
        let os_image = cloud_spec.os_image(distro).cloned();
        let env = SigEnvironment::new(&self.sig_config, &cs.location, self.sig_versions.clone())?;
        let mut sig_image = match env.resolve(distro) {
            Ok(config) => Some(config),
            Err(Error::UnsupportedSigDistro(_)) => None,
            Err(e) => return Err(e),
        };
        if sig_image.is_none() && os_image.is_none() {
            return Err(Error::UnsupportedSigDistro(distro.to_string()));
        }

        if !pool.is_windows() {
            if let Some(sig) = sig_image.as_mut() {
                let pins = self.overrides.linux_node_image_version(entity);
                if let Some(version) = pins.get(distro.as_str()) {
                    debug!(distro = distro.as_str(), version = %version, "pinning node image version");
                    sig.version = version.clone();
                }
            }
        }
        Ok((os_image, sig_image))
    }
}

/// `None` for pools built from a customer-supplied image.
fn node_distro(pool: &AgentPoolProfile) -> Option<Distro> {
    let distro = match pool.distro {
        Some(distro) => distro,
        None if pool.is_windows() => Distro::AKSWindows2019PIR,
        None => return None,
    };
    match distro {
        Distro::CustomizedImage | Distro::CustomizedWindowsOSImage => None,
        other => Some(other.canonical()),
    }
}

/// Node sysctls with the pool's own values layered over the defaults.
fn sysctls(pool: &AgentPoolProfile) -> BTreeMap<String, String> {
    if pool.is_windows() {
        return BTreeMap::new();
    }
    let mut values: BTreeMap<String, String> = sysctl::DEFAULTS
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    if let Some(custom) = &pool.custom_linux_os_config {
        values.extend(custom.sysctls.clone());
    }
    values
}
