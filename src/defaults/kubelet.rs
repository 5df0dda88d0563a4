use super::{add_default_feature_gates, set_missing, to_map, Context};
use crate::constants::{kubelet, network};
use crate::datamodel::{ContainerService, KubernetesConfig};
use crate::versions::is_version_ge;
use std::collections::BTreeMap;

/// Flags every Linux kubelet runs with; user values are replaced.
fn static_linux_config(dns_service_ip: &str) -> BTreeMap<String, String> {
    to_map(&[
        ("--address", "0.0.0.0"),
        ("--allow-privileged", "true"),
        ("--anonymous-auth", "false"),
        ("--authorization-mode", "Webhook"),
        ("--client-ca-file", "/etc/kubernetes/certs/ca.crt"),
        ("--pod-manifest-path", "/etc/kubernetes/manifests"),
        ("--cluster-dns", dns_service_ip),
        ("--cgroups-per-qos", "true"),
        ("--kubeconfig", "/var/lib/kubelet/kubeconfig"),
        ("--keep-terminated-pod-volumes", "false"),
        ("--tls-cert-file", "/etc/kubernetes/certs/kubeletserver.crt"),
        ("--tls-private-key-file", "/etc/kubernetes/certs/kubeletserver.key"),
        ("--v", "2"),
        ("--volume-plugin-dir", "/etc/kubernetes/volumeplugins"),
    ])
}

fn static_windows_config(dns_service_ip: &str) -> BTreeMap<String, String> {
    let mut config = static_linux_config(dns_service_ip);
    config.extend(to_map(&[
        ("--azure-container-registry-config", "c:\\k\\azure.json"),
        ("--pod-infra-container-image", kubelet::WINDOWS_PAUSE_IMAGE),
        ("--kubeconfig", "c:\\k\\config"),
        ("--cloud-config", "c:\\k\\azure.json"),
        ("--cgroups-per-qos", "false"),
        ("--enforce-node-allocatable", "\"\""),
        ("--system-reserved", "memory=2Gi"),
        ("--client-ca-file", "c:\\k\\ca.crt"),
        ("--hairpin-mode", "promiscuous-bridge"),
        ("--image-pull-progress-deadline", "20m"),
        ("--resolv-conf", "\"\""),
        ("--eviction-hard", "\"\""),
    ]));
    config
}

fn default_config(k: &KubernetesConfig, version: &str) -> BTreeMap<String, String> {
    let azure_cni = k.network_plugin == network::PLUGIN_AZURE;
    let max_pods = if azure_cni {
        network::DEFAULT_MAX_PODS_AZURE_CNI
    } else {
        network::DEFAULT_MAX_PODS
    };
    let non_masquerade = if azure_cni {
        network::DEFAULT_NON_MASQUERADE_CIDR
    } else {
        k.cluster_subnet.as_str()
    };
    let pause = format!("{}{}", k.mcr_kubernetes_image_base, kubelet::PAUSE_IMAGE);
    let gc_high = kubelet::GC_HIGH_THRESHOLD.to_string();
    let gc_low = kubelet::GC_LOW_THRESHOLD.to_string();
    let max_pods = max_pods.to_string();

    let mut config = to_map(&[
        ("--cluster-domain", "cluster.local"),
        ("--network-plugin", "cni"),
        ("--pod-infra-container-image", &pause),
        ("--max-pods", &max_pods),
        ("--eviction-hard", kubelet::HARD_EVICTION_THRESHOLD),
        ("--node-status-update-frequency", kubelet::NODE_STATUS_UPDATE_FREQUENCY),
        ("--image-gc-high-threshold", &gc_high),
        ("--image-gc-low-threshold", &gc_low),
        ("--non-masquerade-cidr", non_masquerade),
        ("--cloud-provider", "azure"),
        ("--cloud-config", "/etc/kubernetes/azure.json"),
        ("--azure-container-registry-config", "/etc/kubernetes/azure.json"),
        ("--event-qps", "0"),
        ("--cadvisor-port", "0"),
        ("--pod-max-pids", "-1"),
        ("--image-pull-progress-deadline", "30m"),
        ("--enforce-node-allocatable", "pods"),
        ("--streaming-connection-idle-timeout", "4h"),
        ("--tls-cipher-suites", kubelet::TLS_CIPHER_SUITES),
        ("--healthz-port", "10248"),
    ]);
    if is_version_ge(version, kubelet::ROTATE_CERTIFICATES_MIN_VERSION) {
        config.insert("--rotate-certificates".to_string(), "true".to_string());
    }
    config
}

/// Drops flags the kubelet at `version` no longer (or does not yet) accept.
pub(super) fn remove_kubelet_flags(config: &mut BTreeMap<String, String>, version: &str) {
    if !is_version_ge(version, kubelet::POD_MAX_PIDS_MIN_VERSION) {
        config.remove("--pod-max-pids");
    }
    if is_version_ge(version, kubelet::CADVISOR_PORT_REMOVED_VERSION) {
        config.remove("--cadvisor-port");
    }
    if is_version_ge(version, kubelet::ALLOW_PRIVILEGED_REMOVED_VERSION) {
        config.remove("--allow-privileged");
    }
}

pub(super) fn set_kubelet_config(mut cs: ContainerService, _ctx: &Context<'_>) -> ContainerService {
    let Some(o) = cs.properties.orchestrator_profile.as_mut() else {
        return cs;
    };
    if !o.is_kubernetes() {
        return cs;
    }
    let version = o.orchestrator_version.clone();
    let k = o.kubernetes_config.get_or_insert_with(KubernetesConfig::default);

    let defaults = default_config(k, &version);
    set_missing(&mut k.kubelet_config, &defaults);
    add_default_feature_gates(&mut k.kubelet_config, &version, "", "");
    add_default_feature_gates(
        &mut k.kubelet_config,
        &version,
        kubelet::ROTATE_CERTIFICATES_MIN_VERSION,
        kubelet::ROTATE_SERVER_CERTIFICATE_FEATURE_GATE,
    );

    if k.use_cloud_controller_manager.unwrap_or(false) {
        k.kubelet_config.insert("--cloud-provider".to_string(), "external".to_string());
    }

    if k.network_plugin == network::PLUGIN_KUBENET && k.network_policy != network::POLICY_CALICO {
        k.kubelet_config
            .insert("--network-plugin".to_string(), network::PLUGIN_KUBENET.to_string());
    }

    let linux_static = static_linux_config(&k.dns_service_ip);
    let windows_static = static_windows_config(&k.dns_service_ip);
    k.kubelet_config.extend(linux_static.clone());

    if !k.enable_secure_kubelet.unwrap_or(false) {
        k.kubelet_config.remove("--anonymous-auth");
        k.kubelet_config.remove("--client-ca-file");
    }
    remove_kubelet_flags(&mut k.kubelet_config, &version);
    let cluster = k.kubelet_config.clone();

    if let Some(master) = cs.properties.master_profile.as_mut() {
        let mk = master.kubernetes_config.get_or_insert_with(KubernetesConfig::default);
        set_missing(&mut mk.kubelet_config, &cluster);
        add_default_feature_gates(&mut mk.kubelet_config, &version, "", "");
        remove_kubelet_flags(&mut mk.kubelet_config, &version);
    }

    for pool in cs.properties.agent_pool_profiles.iter_mut() {
        let windows = pool.is_windows();
        let pk = pool.kubernetes_config.get_or_insert_with(|| {
            let statics = if windows { &windows_static } else { &linux_static };
            KubernetesConfig {
                kubelet_config: statics.clone(),
                ..KubernetesConfig::default()
            }
        });
        set_missing(&mut pk.kubelet_config, &cluster);
        if windows {
            pk.kubelet_config.remove("--pod-manifest-path");
        }
        remove_kubelet_flags(&mut pk.kubelet_config, &version);
    }
    cs
}

/// One address for the node, plus one per pod when pods get VNET IPs.
pub(super) fn set_ip_address_counts(mut cs: ContainerService, _ctx: &Context<'_>) -> ContainerService {
    let azure_cni = cs.properties.is_azure_cni();
    let pod_ips = |config: Option<&KubernetesConfig>| -> i32 {
        if !azure_cni {
            return 0;
        }
        config
            .and_then(|k| k.kubelet_config.get("--max-pods"))
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    };

    if let Some(master) = cs.properties.master_profile.as_mut() {
        if master.ip_address_count == 0 {
            master.ip_address_count = 1 + pod_ips(master.kubernetes_config.as_ref());
        }
    }
    for pool in cs.properties.agent_pool_profiles.iter_mut() {
        if pool.ip_address_count == 0 {
            pool.ip_address_count = 1 + pod_ips(pool.kubernetes_config.as_ref());
        }
    }
    cs
}
