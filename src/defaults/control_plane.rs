use super::{set_missing, to_map, Context};
use crate::constants::kubelet;
use crate::datamodel::{ContainerService, KubernetesConfig};
use crate::versions::is_version_ge;

/// First release that accepts `--encryption-provider-config`
const ENCRYPTION_PROVIDER_CONFIG_MIN_VERSION: &str = "1.13.0";

fn set_api_server_config(k: &mut KubernetesConfig, version: &str) {
    let statics = to_map(&[
        ("--bind-address", "0.0.0.0"),
        ("--advertise-address", "<kubernetesAPIServerIP>"),
        ("--allow-privileged", "true"),
        ("--secure-port", "443"),
        ("--etcd-cafile", "/etc/kubernetes/certs/ca.crt"),
        ("--etcd-certfile", "/etc/kubernetes/certs/etcdclient.crt"),
        ("--etcd-keyfile", "/etc/kubernetes/certs/etcdclient.key"),
        ("--etcd-servers", "https://127.0.0.1:2379"),
        ("--tls-cert-file", "/etc/kubernetes/certs/apiserver.crt"),
        ("--tls-private-key-file", "/etc/kubernetes/certs/apiserver.key"),
        ("--client-ca-file", "/etc/kubernetes/certs/ca.crt"),
        ("--service-account-key-file", "/etc/kubernetes/certs/apiserver.key"),
        ("--kubelet-client-certificate", "/etc/kubernetes/certs/client.crt"),
        ("--kubelet-client-key", "/etc/kubernetes/certs/client.key"),
        ("--service-cluster-ip-range", &k.service_cidr),
        ("--storage-backend", "etcd3"),
        ("--v", "4"),
    ]);
    let defaults = to_map(&[
        ("--anonymous-auth", "false"),
        ("--audit-log-maxage", "30"),
        ("--audit-log-maxbackup", "10"),
        ("--audit-log-maxsize", "100"),
        ("--audit-log-path", "/var/log/kubeaudit/audit.log"),
        ("--audit-policy-file", "/etc/kubernetes/addons/audit-policy.yaml"),
        ("--profiling", "false"),
        ("--repair-malformed-updates", "false"),
        ("--tls-cipher-suites", kubelet::TLS_CIPHER_SUITES),
    ]);

    set_missing(&mut k.api_server_config, &defaults);
    k.api_server_config.extend(statics);

    if k.is_rbac_enabled() {
        k.api_server_config
            .insert("--authorization-mode".to_string(), "Node,RBAC".to_string());
    }
    if k.enable_data_encryption_at_rest.unwrap_or(false)
        && is_version_ge(version, ENCRYPTION_PROVIDER_CONFIG_MIN_VERSION)
    {
        k.api_server_config.insert(
            "--encryption-provider-config".to_string(),
            "/etc/kubernetes/encryption-config.yaml".to_string(),
        );
    }
    if is_version_ge(version, kubelet::ALLOW_PRIVILEGED_REMOVED_VERSION) {
        k.api_server_config.remove("--allow-privileged");
    }
    if is_version_ge(version, "1.14.0") {
        k.api_server_config.remove("--repair-malformed-updates");
    }
}

fn set_controller_manager_config(k: &mut KubernetesConfig) {
    let cloud_provider = if k.use_cloud_controller_manager.unwrap_or(false) {
        "external"
    } else {
        "azure"
    };
    let statics = to_map(&[
        ("--kubeconfig", "/var/lib/kubelet/kubeconfig"),
        ("--allocate-node-cidrs", "false"),
        ("--cluster-cidr", &k.cluster_subnet),
        ("--cluster-name", "<clustername>"),
        ("--cloud-provider", cloud_provider),
        ("--cloud-config", "/etc/kubernetes/azure.json"),
        ("--root-ca-file", "/etc/kubernetes/certs/ca.crt"),
        ("--cluster-signing-cert-file", "/etc/kubernetes/certs/ca.crt"),
        ("--cluster-signing-key-file", "/etc/kubernetes/certs/ca.key"),
        ("--service-account-private-key-file", "/etc/kubernetes/certs/apiserver.key"),
        ("--leader-elect", "true"),
        ("--v", "2"),
    ]);
    let defaults = to_map(&[
        ("--node-monitor-grace-period", "40s"),
        ("--pod-eviction-timeout", "5m0s"),
        ("--route-reconciliation-period", "10s"),
        ("--terminated-pod-gc-threshold", "5000"),
        ("--use-service-account-credentials", "false"),
        ("--profiling", "false"),
    ]);

    set_missing(&mut k.controller_manager_config, &defaults);
    k.controller_manager_config.extend(statics);
}

fn set_scheduler_config(k: &mut KubernetesConfig) {
    let statics = to_map(&[
        ("--kubeconfig", "/var/lib/kubelet/kubeconfig"),
        ("--leader-elect", "true"),
    ]);
    let defaults = to_map(&[("--v", "2"), ("--profiling", "false")]);

    set_missing(&mut k.scheduler_config, &defaults);
    k.scheduler_config.extend(statics);
}

/// Apiserver, controller-manager and scheduler flags. Hosted control
/// planes are configured by the provider and are left untouched.
pub(super) fn set_control_plane_config(mut cs: ContainerService, _ctx: &Context<'_>) -> ContainerService {
    if cs.properties.is_hosted_master() {
        return cs;
    }
    let Some(o) = cs.properties.orchestrator_profile.as_mut() else {
        return cs;
    };
    if !o.is_kubernetes() {
        return cs;
    }
    let version = o.orchestrator_version.clone();
    let k = o.kubernetes_config.get_or_insert_with(KubernetesConfig::default);

    set_api_server_config(k, &version);
    set_controller_manager_config(k);
    set_scheduler_config(k);
    cs
}
