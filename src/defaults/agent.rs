use super::Context;
use crate::constants::{network, orchestrator};
use crate::datamodel::{ContainerService, KubernetesConfig, OrchestratorProfile};
use crate::distro::Distro;
use crate::sku::accelerated_networking_supported;

/// Ensures an orchestrator profile with a Kubernetes config exists and
/// normalizes the load balancer sku casing.
pub(super) fn set_load_balancer_sku_defaults(mut cs: ContainerService, _ctx: &Context<'_>) -> ContainerService {
    let has_zones = cs.properties.has_availability_zones();
    let k = cs
        .properties
        .orchestrator_profile
        .get_or_insert_with(OrchestratorProfile::default)
        .kubernetes_config
        .get_or_insert_with(KubernetesConfig::default);

    if k.load_balancer_sku.is_empty() {
        k.load_balancer_sku = if has_zones {
            network::LOAD_BALANCER_SKU_STANDARD
        } else {
            network::LOAD_BALANCER_SKU_BASIC
        }
        .to_string();
    }

    if k.load_balancer_sku.eq_ignore_ascii_case(network::LOAD_BALANCER_SKU_BASIC) {
        k.load_balancer_sku = network::LOAD_BALANCER_SKU_BASIC.to_string();
    } else if k.load_balancer_sku.eq_ignore_ascii_case(network::LOAD_BALANCER_SKU_STANDARD) {
        k.load_balancer_sku = network::LOAD_BALANCER_SKU_STANDARD.to_string();
    }
    cs
}

pub(super) fn set_agent_profile_defaults(mut cs: ContainerService, ctx: &Context<'_>) -> ContainerService {
    let fresh = !ctx.params.is_update();
    let is_kubernetes = cs.properties.is_kubernetes();
    let standard_lb = cs
        .properties
        .kubernetes_config()
        .map(|k| k.load_balancer_sku.eq_ignore_ascii_case(network::LOAD_BALANCER_SKU_STANDARD))
        .unwrap_or(false);

    for pool in cs.properties.agent_pool_profiles.iter_mut() {
        if pool.availability_profile.is_empty() {
            pool.availability_profile = orchestrator::VIRTUAL_MACHINE_SCALE_SETS.to_string();
        }

        if pool.is_vmss() {
            let evictable = pool.scale_set_priority == orchestrator::SCALE_SET_PRIORITY_LOW
                || pool.scale_set_priority == orchestrator::SCALE_SET_PRIORITY_SPOT;
            if pool.scale_set_eviction_policy.is_empty() && evictable {
                pool.scale_set_eviction_policy = orchestrator::SCALE_SET_EVICTION_DELETE.to_string();
            }

            if pool.scale_set_priority == orchestrator::SCALE_SET_PRIORITY_SPOT && pool.spot_max_price.is_none() {
                pool.spot_max_price = Some(orchestrator::DEFAULT_SPOT_MAX_PRICE);
            }

            if pool.vmss_over_provisioning_enabled.is_none() {
                pool.vmss_over_provisioning_enabled =
                    Some(orchestrator::DEFAULT_VMSS_OVER_PROVISIONING && fresh);
            }

            if pool.single_placement_group.is_none() {
                pool.single_placement_group = Some(!standard_lb && orchestrator::DEFAULT_SINGLE_PLACEMENT_GROUP);
            }
        }

        if pool.os_type.is_empty() {
            pool.os_type = orchestrator::LINUX.to_string();
        }

        if pool.platform_update_domain_count.is_none() {
            pool.platform_update_domain_count = Some(orchestrator::DEFAULT_PLATFORM_UPDATE_DOMAIN_COUNT);
        }

        let accelerated = fresh && accelerated_networking_supported(&pool.vm_size);
        if pool.accelerated_networking_enabled.is_none() {
            pool.accelerated_networking_enabled =
                Some(orchestrator::DEFAULT_ACCELERATED_NETWORKING && accelerated);
        }
        if pool.accelerated_networking_enabled_windows.is_none() {
            pool.accelerated_networking_enabled_windows =
                Some(orchestrator::DEFAULT_ACCELERATED_NETWORKING_WINDOWS && accelerated);
        }

        if pool.auditd_enabled.is_none() {
            pool.auditd_enabled = Some(orchestrator::DEFAULT_AUDITD && fresh);
        }
        if pool.preserve_nodes_properties.is_none() {
            pool.preserve_nodes_properties = Some(orchestrator::DEFAULT_PRESERVE_NODES_PROPERTIES);
        }
        if pool.enable_vmss_node_public_ip.is_none() {
            pool.enable_vmss_node_public_ip = Some(orchestrator::DEFAULT_VMSS_NODE_PUBLIC_IP);
        }

        if !is_kubernetes {
            pool.distro = Some(Distro::Ubuntu);
        }
    }
    cs
}

pub(super) fn set_storage_defaults(mut cs: ContainerService, _ctx: &Context<'_>) -> ContainerService {
    let storage = if cs.properties.is_kubernetes() {
        orchestrator::MANAGED_DISKS
    } else {
        orchestrator::STORAGE_ACCOUNT
    };
    if let Some(master) = cs.properties.master_profile.as_mut() {
        if master.storage_profile.is_empty() {
            master.storage_profile = storage.to_string();
        }
    }
    for pool in cs.properties.agent_pool_profiles.iter_mut() {
        if pool.storage_profile.is_empty() {
            pool.storage_profile = storage.to_string();
        }
    }
    cs
}
