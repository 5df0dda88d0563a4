//! Defaulting engine.
//!
//! Turns a partial [`ContainerService`] into a fully specified one. Each
//! stage takes the cluster by value and returns it with its defaults
//! applied; stages run in a fixed order because later stages read the
//! choices earlier ones made. Running the engine on its own output
//! changes nothing.

use crate::cloud::{Cloud, CloudSpec, CloudSpecRegistry};
use crate::datamodel::ContainerService;
use crate::error::Result;
use crate::versions::is_version_ge;
use std::collections::BTreeMap;
use tracing::debug;

mod agent;
mod control_plane;
mod custom_cloud;
mod kubelet;
mod master;
mod orchestrator;
mod profiles;

pub use custom_cloud::{
    metadata_url, AzureStackMetadataEndpoints, EndpointsFetcher, HttpsEndpointsFetcher,
    MetadataAuthentication,
};
pub use master::first_consecutive_static_ip;

#[cfg(test)]
mod tests;

/// Whether the cluster is being created, upgraded or scaled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultsParams {
    pub is_upgrade: bool,
    pub is_scale: bool,
}

impl DefaultsParams {
    pub fn create() -> Self {
        Self::default()
    }

    pub fn upgrade() -> Self {
        Self {
            is_upgrade: true,
            is_scale: false,
        }
    }

    pub fn scale() -> Self {
        Self {
            is_upgrade: false,
            is_scale: true,
        }
    }

    pub fn is_update(&self) -> bool {
        self.is_upgrade || self.is_scale
    }
}

/// Inputs every stage may read.
pub(crate) struct Context<'a> {
    pub params: DefaultsParams,
    pub cloud: &'a CloudSpec,
}

type Stage = fn(ContainerService, &Context<'_>) -> ContainerService;

const STAGES: &[(&str, Stage)] = &[
    ("master profile", master::set_master_profile_defaults),
    ("load balancer sku", agent::set_load_balancer_sku_defaults),
    ("agent pools", agent::set_agent_profile_defaults),
    ("storage", agent::set_storage_defaults),
    ("orchestrator", orchestrator::set_orchestrator_defaults),
    ("kubelet", kubelet::set_kubelet_config),
    ("ip address count", kubelet::set_ip_address_counts),
    ("control plane", control_plane::set_control_plane_config),
    ("extensions", profiles::set_extension_defaults),
    ("hosted master", profiles::set_hosted_master_profile_defaults),
    ("windows profile", profiles::set_windows_profile_defaults),
    ("telemetry", profiles::set_telemetry_profile_defaults),
];

/// Applies defaults using the cloud registry it was built with.
pub struct Defaulter<'a> {
    clouds: &'a CloudSpecRegistry,
    fetcher: Box<dyn EndpointsFetcher>,
}

impl<'a> Defaulter<'a> {
    /// Uses HTTPS to reach Azure Stack metadata endpoints.
    pub fn new(clouds: &'a CloudSpecRegistry) -> Self {
        Self::with_fetcher(clouds, Box::new(HttpsEndpointsFetcher))
    }

    pub fn with_fetcher(clouds: &'a CloudSpecRegistry, fetcher: Box<dyn EndpointsFetcher>) -> Self {
        Self { clouds, fetcher }
    }

    /// Cloud spec the cluster deploys into. Azure Stack is selected by a
    /// custom cloud profile, everything else by location.
    pub fn cloud_spec(&self, cs: &ContainerService) -> &'a CloudSpec {
        if cs.properties.is_azure_stack_cloud() {
            self.clouds.spec(Cloud::Stack)
        } else {
            self.clouds.spec_for_location(&cs.location)
        }
    }

    /// Runs the whole pass. Fails only when Azure Stack metadata cannot be
    /// retrieved, in which case nothing is returned.
    pub async fn set_properties_defaults(
        &self,
        cs: ContainerService,
        params: DefaultsParams,
    ) -> Result<ContainerService> {
        let cs = custom_cloud::set_custom_cloud_profile_defaults(cs, self.fetcher.as_ref()).await?;
        Ok(self.apply_stages(cs, params))
    }

    /// The infallible stages, in order.
    pub fn apply_stages(&self, cs: ContainerService, params: DefaultsParams) -> ContainerService {
        let ctx = Context {
            params,
            cloud: self.cloud_spec(&cs),
        };
        STAGES.iter().fold(cs, |cs, (name, stage)| {
            debug!(stage = *name, "applying defaults");
            stage(cs, &ctx)
        })
    }
}

/// Fills keys of `target` that are absent from `defaults`.
pub(crate) fn set_missing(target: &mut BTreeMap<String, String>, defaults: &BTreeMap<String, String>) {
    for (key, value) in defaults {
        target.entry(key.clone()).or_insert_with(|| value.clone());
    }
}

pub(crate) fn to_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Merges `k=v` lists; later inputs win, output is sorted by key.
pub fn combine_values(inputs: &[&str]) -> String {
    let mut values = BTreeMap::new();
    for input in inputs {
        for pair in input.split(',') {
            let parts: Vec<&str> = pair.trim().split('=').collect();
            if let [key, value] = parts.as_slice() {
                values.insert(key.to_string(), value.to_string());
            }
        }
    }
    values
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}

/// Adds `defaults` to `--feature-gates` when `version >= min_version`
/// (always when `min_version` is empty). A default replaces a user gate
/// of the same name.
pub(crate) fn add_default_feature_gates(
    config: &mut BTreeMap<String, String>,
    version: &str,
    min_version: &str,
    defaults: &str,
) {
    let existing = config.get("--feature-gates").cloned().unwrap_or_default();
    let applies = min_version.is_empty() || is_version_ge(version, min_version);
    let merged = if applies {
        combine_values(&[&existing, defaults])
    } else {
        combine_values(&[&existing])
    };
    config.insert("--feature-gates".to_string(), merged);
}
