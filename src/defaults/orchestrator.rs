use super::master::first_consecutive_static_ip;
use super::Context;
use crate::cloud::Cloud;
use crate::constants::{cloudprovider, etcd, kubelet, network, orchestrator, runtime};
use crate::datamodel::{ContainerService, Feature, KubernetesConfig, PrivateCluster, Properties};
use crate::distro::Distro;
use crate::versions::{get_valid_patch_version, is_version_ge};
use base64::Engine;
use rand::RngCore;
use std::net::IpAddr;
use tracing::warn;

pub(super) fn set_orchestrator_defaults(mut cs: ContainerService, ctx: &Context<'_>) -> ContainerService {
    let has_windows = cs.properties.has_windows();
    let Some(o) = cs.properties.orchestrator_profile.as_mut() else {
        return cs;
    };
    if o.orchestrator_version.is_empty() {
        o.orchestrator_version = get_valid_patch_version(&o.orchestrator_type, "", has_windows);
    }
    if !o.is_kubernetes() {
        return cs;
    }

    let version = o.orchestrator_version.clone();
    let mut k = o.kubernetes_config.take().unwrap_or_default();
    let p = &cs.properties;

    translate_network_policy(&mut k);

    if k.kubernetes_image_base.is_empty() {
        k.kubernetes_image_base = ctx.cloud.kubernetes_spec_config.kubernetes_image_base.clone();
    }
    if k.mcr_kubernetes_image_base.is_empty() {
        k.mcr_kubernetes_image_base = ctx.cloud.kubernetes_spec_config.mcr_kubernetes_image_base.clone();
    }

    if k.etcd_version.is_empty() {
        k.etcd_version = etcd::DEFAULT_VERSION.to_string();
    } else if ctx.params.is_upgrade
        && k.etcd_version != etcd::DEFAULT_VERSION
        && !is_version_ge(&k.etcd_version, etcd::DEFAULT_VERSION)
    {
        warn!("etcd will be upgraded to version {}", etcd::DEFAULT_VERSION);
        k.etcd_version = etcd::DEFAULT_VERSION.to_string();
    }

    if k.network_plugin.is_empty() {
        k.network_plugin = if has_windows {
            network::PLUGIN_AZURE
        } else {
            network::PLUGIN_KUBENET
        }
        .to_string();
    }

    set_runtime_defaults(&mut k, ctx);
    set_subnet_defaults(&mut k, p, &version);
    set_cloud_provider_defaults(&mut k, &version);

    let private = k.private_cluster.get_or_insert_with(PrivateCluster::default);
    if private.enabled.is_none() {
        private.enabled = Some(orchestrator::DEFAULT_PRIVATE_CLUSTER);
    }
    if private.enable_hosts_config_agent.is_none() {
        private.enable_hosts_config_agent = Some(orchestrator::DEFAULT_PRIVATE_CLUSTER_HOSTS_CONFIG_AGENT);
    }

    if k.etcd_disk_size_gb.is_empty() {
        k.etcd_disk_size_gb = etcd_disk_size(p.total_nodes()).to_string();
    }

    if k.enable_data_encryption_at_rest.unwrap_or(false) && k.etcd_encryption_key.is_empty() {
        k.etcd_encryption_key = generate_etcd_encryption_key();
    }

    set_rbac_defaults(&mut k, &version, p, ctx);

    if k.enable_secure_kubelet.is_none() {
        k.enable_secure_kubelet = Some(orchestrator::DEFAULT_SECURE_KUBELET);
    }
    if k.use_instance_metadata.is_none() {
        k.use_instance_metadata = Some(orchestrator::DEFAULT_USE_INSTANCE_METADATA);
    }
    if k.use_cloud_controller_manager.is_none() {
        k.use_cloud_controller_manager = Some(orchestrator::DEFAULT_CLOUD_CONTROLLER_MANAGER);
    }

    let standard_lb = k.load_balancer_sku == network::LOAD_BALANCER_SKU_STANDARD;
    if standard_lb && k.exclude_master_from_standard_lb.is_none() {
        k.exclude_master_from_standard_lb = Some(orchestrator::DEFAULT_EXCLUDE_MASTER_FROM_STANDARD_LB);
    }

    if k.network_plugin == network::PLUGIN_AZURE {
        k.azure_cni_version = if has_windows {
            network::AZURE_CNI_VERSION_WINDOWS
        } else {
            network::AZURE_CNI_VERSION_LINUX
        }
        .to_string();
    }

    if k.maximum_load_balancer_rule_count == 0 {
        k.maximum_load_balancer_rule_count = network::DEFAULT_MAX_LOAD_BALANCER_RULE_COUNT;
    }
    if k.proxy_mode.is_empty() {
        k.proxy_mode = network::DEFAULT_KUBE_PROXY_MODE.to_string();
    }
    if standard_lb && k.outbound_rule_idle_timeout_in_minutes == 0 {
        k.outbound_rule_idle_timeout_in_minutes = network::DEFAULT_OUTBOUND_RULE_IDLE_TIMEOUT_MINUTES;
    }

    // only meaningful behind a Standard load balancer
    if !standard_lb || k.cloud_provider_disable_outbound_snat.is_none() {
        k.cloud_provider_disable_outbound_snat = Some(false);
    }

    let azure_cni = k.network_plugin == network::PLUGIN_AZURE;
    let cluster_subnet = k.cluster_subnet.clone();
    let custom_hyperkube = !k.custom_hyperkube_image.is_empty();

    if let Some(o) = cs.properties.orchestrator_profile.as_mut() {
        o.kubernetes_config = Some(k);
    }

    set_master_network_defaults(&mut cs.properties, azure_cni, &cluster_subnet, custom_hyperkube, ctx);
    set_pool_network_defaults(&mut cs.properties, custom_hyperkube, ctx);
    cs
}

/// Maps the overloaded legacy `networkPolicy` onto a plugin and policy pair.
pub(super) fn translate_network_policy(k: &mut KubernetesConfig) {
    match k.network_policy.as_str() {
        network::POLICY_AZURE => {
            if k.network_plugin.is_empty() {
                k.network_plugin = network::PLUGIN_AZURE.to_string();
                k.network_policy = String::new();
            }
        }
        network::POLICY_NONE => {
            k.network_plugin = network::PLUGIN_KUBENET.to_string();
            k.network_policy = String::new();
        }
        network::POLICY_CALICO => {
            if k.network_plugin.is_empty() {
                k.network_plugin = network::PLUGIN_KUBENET.to_string();
            }
        }
        network::POLICY_CILIUM => k.network_plugin = network::PLUGIN_CILIUM.to_string(),
        network::POLICY_ANTREA => k.network_plugin = network::PLUGIN_ANTREA.to_string(),
        _ => {}
    }
}

fn set_runtime_defaults(k: &mut KubernetesConfig, ctx: &Context<'_>) {
    if k.container_runtime.is_empty() {
        k.container_runtime = runtime::CONTAINERD.to_string();
    }
    let (current, default, name) = match k.container_runtime.as_str() {
        runtime::DOCKER => (&mut k.moby_version, runtime::DEFAULT_MOBY_VERSION, "moby"),
        runtime::CONTAINERD => (&mut k.containerd_version, runtime::DEFAULT_CONTAINERD_VERSION, "containerd"),
        _ => return,
    };
    if current.is_empty() || ctx.params.is_update() {
        if !current.is_empty() && current.as_str() != default {
            if ctx.params.is_upgrade {
                warn!("{} will be upgraded to version {}", name, default);
            } else if ctx.params.is_scale {
                warn!("any new nodes will have {} version {}", name, default);
            }
        }
        *current = default.to_string();
    }
}

fn default_cluster_subnet_v6(version: &str) -> &'static str {
    if is_version_ge(version, "1.17.0") {
        network::DEFAULT_CLUSTER_SUBNET_V6
    } else {
        network::DEFAULT_CLUSTER_SUBNET_V6_LEGACY
    }
}

fn set_subnet_defaults(k: &mut KubernetesConfig, p: &Properties, version: &str) {
    let ipv6_only = p.feature_enabled(Feature::Ipv6Only);
    let dual_stack = p.feature_enabled(Feature::Ipv6DualStack);
    let azure_cni = k.network_plugin == network::PLUGIN_AZURE;

    if k.cluster_subnet.is_empty() {
        k.cluster_subnet = if azure_cni {
            network::DEFAULT_AZURE_CNI_CLUSTER_SUBNET.to_string()
        } else if dual_stack {
            format!("{},{}", network::DEFAULT_CLUSTER_SUBNET, default_cluster_subnet_v6(version))
        } else if ipv6_only {
            network::DEFAULT_CLUSTER_SUBNET_V6.to_string()
        } else {
            network::DEFAULT_CLUSTER_SUBNET.to_string()
        };
    } else if dual_stack && !azure_cni && !k.cluster_subnet.contains(',') {
        // a malformed subnet is left for validation to report
        let first = k.cluster_subnet.split('/').next().unwrap_or_default();
        match first.parse::<IpAddr>() {
            Ok(IpAddr::V4(_)) => {
                k.cluster_subnet = format!("{},{}", k.cluster_subnet, default_cluster_subnet_v6(version));
            }
            Ok(IpAddr::V6(_)) => {
                k.cluster_subnet = format!("{},{}", network::DEFAULT_CLUSTER_SUBNET, k.cluster_subnet);
            }
            Err(_) => {}
        }
    }

    if k.gc_high_threshold == 0 {
        k.gc_high_threshold = kubelet::GC_HIGH_THRESHOLD;
    }
    if k.gc_low_threshold == 0 {
        k.gc_low_threshold = kubelet::GC_LOW_THRESHOLD;
    }
    if k.dns_service_ip.is_empty() {
        k.dns_service_ip = if ipv6_only {
            network::DEFAULT_DNS_SERVICE_IP_V6
        } else {
            network::DEFAULT_DNS_SERVICE_IP
        }
        .to_string();
    }
    if k.docker_bridge_subnet.is_empty() {
        k.docker_bridge_subnet = network::DEFAULT_DOCKER_BRIDGE_SUBNET.to_string();
    }
    if k.service_cidr.is_empty() {
        k.service_cidr = if ipv6_only {
            network::DEFAULT_SERVICE_CIDR_V6
        } else {
            network::DEFAULT_SERVICE_CIDR
        }
        .to_string();
    }
}

fn set_cloud_provider_defaults(k: &mut KubernetesConfig, version: &str) {
    let v2 = is_version_ge(version, cloudprovider::BACKOFF_MODE_V2_MIN_VERSION);
    k.cloud_provider_backoff_mode = if v2 {
        cloudprovider::BACKOFF_MODE_V2
    } else {
        cloudprovider::BACKOFF_MODE_V1
    }
    .to_string();
    if k.cloud_provider_backoff.is_none() {
        k.cloud_provider_backoff = Some(v2);
    }

    if k.cloud_provider_backoff_duration == 0 {
        k.cloud_provider_backoff_duration = cloudprovider::BACKOFF_DURATION;
    }
    if k.cloud_provider_backoff_retries == 0 {
        k.cloud_provider_backoff_retries = cloudprovider::BACKOFF_RETRIES;
    }
    if !k.cloud_provider_backoff_mode.eq_ignore_ascii_case(cloudprovider::BACKOFF_MODE_V2) {
        if k.cloud_provider_backoff_exponent == 0.0 {
            k.cloud_provider_backoff_exponent = cloudprovider::BACKOFF_EXPONENT;
        }
        if k.cloud_provider_backoff_jitter == 0.0 {
            k.cloud_provider_backoff_jitter = cloudprovider::BACKOFF_JITTER;
        }
    }

    if k.cloud_provider_rate_limit.is_none() {
        k.cloud_provider_rate_limit = Some(cloudprovider::RATE_LIMIT);
    }
    if k.cloud_provider_rate_limit_qps == 0.0 {
        k.cloud_provider_rate_limit_qps = cloudprovider::RATE_LIMIT_QPS;
    }
    if k.cloud_provider_rate_limit_qps_write == 0.0 {
        k.cloud_provider_rate_limit_qps_write = k.cloud_provider_rate_limit_qps;
    }
    if k.cloud_provider_rate_limit_bucket == 0 {
        k.cloud_provider_rate_limit_bucket = cloudprovider::RATE_LIMIT_BUCKET;
    }
    if k.cloud_provider_rate_limit_bucket_write == 0 {
        k.cloud_provider_rate_limit_bucket_write = k.cloud_provider_rate_limit_bucket;
    }
}

/// Etcd disk size tier for a cluster of `nodes` VMs.
pub(super) fn etcd_disk_size(nodes: i32) -> &'static str {
    match nodes {
        n if n > 20 => etcd::DISK_SIZE_GB_TIER3,
        n if n > 10 => etcd::DISK_SIZE_GB_TIER2,
        n if n > 3 => etcd::DISK_SIZE_GB_TIER1,
        _ => etcd::DISK_SIZE_GB_DEFAULT,
    }
}

/// 32 random bytes, base64 encoded.
pub(super) fn generate_etcd_encryption_key() -> String {
    let mut key = [0u8; etcd::ENCRYPTION_KEY_BYTES];
    rand::thread_rng().fill_bytes(&mut key);
    base64::engine::general_purpose::STANDARD.encode(key)
}

fn set_rbac_defaults(k: &mut KubernetesConfig, version: &str, p: &Properties, ctx: &Context<'_>) {
    if k.enable_rbac.is_none() {
        k.enable_rbac = Some(orchestrator::DEFAULT_RBAC);
    }

    if !k.is_rbac_enabled()
        && is_version_ge(version, kubelet::FORCE_RBAC_MIN_VERSION)
        && ctx.params.is_upgrade
        && !p.is_hosted_master()
    {
        warn!("RBAC will be enabled during upgrade to version {}", version);
        k.enable_rbac = Some(true);
    }

    if k.is_rbac_enabled() {
        k.enable_aggregated_apis = true;
    } else if ctx.params.is_update() && k.enable_aggregated_apis {
        k.enable_aggregated_apis = false;
    }
}

fn set_master_network_defaults(
    p: &mut Properties,
    azure_cni: bool,
    cluster_subnet: &str,
    custom_hyperkube: bool,
    ctx: &Context<'_>,
) {
    let Some(master) = p.master_profile.as_mut() else {
        return;
    };
    let keep_static_ip = ctx.params.is_upgrade && !master.first_consecutive_static_ip.is_empty();

    if !master.is_custom_vnet() {
        if azure_cni {
            master.subnet = cluster_subnet.to_string();
            if !keep_static_ip {
                if master.is_vmss() {
                    master.first_consecutive_static_ip = network::DEFAULT_FIRST_CONSECUTIVE_STATIC_IP_VMSS.to_string();
                    master.subnet = network::DEFAULT_MASTER_SUBNET.to_string();
                    master.agent_subnet = network::DEFAULT_AGENT_SUBNET_VMSS.to_string();
                } else {
                    master.first_consecutive_static_ip = first_consecutive_static_ip(&master.subnet, false);
                }
            }
        } else {
            master.subnet = network::DEFAULT_MASTER_SUBNET.to_string();
            master.subnet_ipv6 = network::DEFAULT_MASTER_SUBNET_V6.to_string();
            if !keep_static_ip {
                if master.is_vmss() {
                    master.first_consecutive_static_ip = network::DEFAULT_FIRST_CONSECUTIVE_STATIC_IP_VMSS.to_string();
                    master.agent_subnet = network::DEFAULT_AGENT_SUBNET_VMSS.to_string();
                } else {
                    master.first_consecutive_static_ip = network::DEFAULT_FIRST_CONSECUTIVE_STATIC_IP.to_string();
                }
            }
        }
    }

    if master.distro.is_none() && master.image_ref.is_none() {
        master.distro = Some(if custom_hyperkube {
            Distro::Ubuntu
        } else {
            Distro::AKSUbuntu1604
        });
    } else if ctx.params.is_update() {
        master.distro = master.distro.map(Distro::canonical);
    }

    // AKS images are not published to the German cloud
    if ctx.cloud.cloud_name == Cloud::German.name() {
        master.distro = Some(Distro::Ubuntu);
    }
}

fn set_pool_network_defaults(p: &mut Properties, custom_hyperkube: bool, ctx: &Context<'_>) {
    let master_subnet = p
        .master_profile
        .as_ref()
        .filter(|m| !m.is_custom_vnet() && !m.is_vmss())
        .map(|m| m.subnet.clone());
    let german = ctx.cloud.cloud_name == Cloud::German.name();

    for pool in p.agent_pool_profiles.iter_mut() {
        if let Some(subnet) = &master_subnet {
            pool.subnet = subnet.clone();
        }
        if pool.is_windows() {
            continue;
        }
        if pool.distro.is_none() && pool.image_ref.is_none() {
            let small_disk = pool.os_disk_size_gb != 0 && pool.os_disk_size_gb < orchestrator::VHD_DISK_SIZE_GB;
            pool.distro = Some(if custom_hyperkube || small_disk {
                Distro::Ubuntu
            } else {
                Distro::AKSUbuntu1604
            });
        } else if ctx.params.is_update() {
            pool.distro = pool.distro.map(Distro::canonical);
        }
        if german {
            pool.distro = Some(Distro::Ubuntu);
        }
    }
}
