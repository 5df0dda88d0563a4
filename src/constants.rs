/// Orchestrator and profile enumerations as they appear on the wire
pub mod orchestrator {
    pub const KUBERNETES: &str = "Kubernetes";

    /// Minor release used when no orchestrator version is given
    pub const DEFAULT_RELEASE: &str = "1.13";

    /// Minor release used when no version is given and a Windows pool exists
    pub const DEFAULT_WINDOWS_RELEASE: &str = "1.14";

    pub const AVAILABILITY_SET: &str = "AvailabilitySet";
    pub const VIRTUAL_MACHINE_SCALE_SETS: &str = "VirtualMachineScaleSets";

    pub const MANAGED_DISKS: &str = "ManagedDisks";
    pub const STORAGE_ACCOUNT: &str = "StorageAccount";

    pub const LINUX: &str = "Linux";
    pub const WINDOWS: &str = "Windows";

    pub const SCALE_SET_PRIORITY_SPOT: &str = "Spot";
    pub const SCALE_SET_PRIORITY_LOW: &str = "Low";
    pub const SCALE_SET_EVICTION_DELETE: &str = "Delete";

    /// Spot max price meaning "pay up to the on-demand price"
    pub const DEFAULT_SPOT_MAX_PRICE: f64 = -1.0;

    pub const DEFAULT_PLATFORM_UPDATE_DOMAIN_COUNT: i32 = 3;

    /// OS disk size below which the AKS VHD cannot be used
    pub const VHD_DISK_SIZE_GB: i32 = 30;

    pub const DEFAULT_SINGLE_PLACEMENT_GROUP: bool = true;
    pub const DEFAULT_USE_COSMOS: bool = false;
    pub const DEFAULT_VMSS_OVER_PROVISIONING: bool = false;
    pub const DEFAULT_ACCELERATED_NETWORKING: bool = true;
    pub const DEFAULT_ACCELERATED_NETWORKING_WINDOWS: bool = false;
    pub const DEFAULT_AUDITD: bool = false;
    pub const DEFAULT_PRESERVE_NODES_PROPERTIES: bool = true;
    pub const DEFAULT_VMSS_NODE_PUBLIC_IP: bool = false;
    pub const DEFAULT_RBAC: bool = true;
    pub const DEFAULT_SECURE_KUBELET: bool = true;
    pub const DEFAULT_USE_INSTANCE_METADATA: bool = true;
    pub const DEFAULT_EXCLUDE_MASTER_FROM_STANDARD_LB: bool = true;
    pub const DEFAULT_CLOUD_CONTROLLER_MANAGER: bool = false;
    pub const DEFAULT_PRIVATE_CLUSTER: bool = false;
    pub const DEFAULT_PRIVATE_CLUSTER_HOSTS_CONFIG_AGENT: bool = false;
    pub const DEFAULT_WINDOWS_SSH: bool = true;

    /// Windows image version used when the requested sku is not the published one
    pub const LATEST_IMAGE_VERSION: &str = "latest";
}

/// Network plugin, policy and addressing defaults
pub mod network {
    pub const PLUGIN_AZURE: &str = "azure";
    pub const PLUGIN_KUBENET: &str = "kubenet";
    pub const PLUGIN_CILIUM: &str = "cilium";
    pub const PLUGIN_ANTREA: &str = "antrea";

    pub const POLICY_AZURE: &str = "azure";
    pub const POLICY_CALICO: &str = "calico";
    pub const POLICY_CILIUM: &str = "cilium";
    pub const POLICY_ANTREA: &str = "antrea";
    pub const POLICY_NONE: &str = "none";

    pub const LOAD_BALANCER_SKU_BASIC: &str = "Basic";
    pub const LOAD_BALANCER_SKU_STANDARD: &str = "Standard";

    pub const DEFAULT_DNS_SERVICE_IP: &str = "10.0.0.10";
    pub const DEFAULT_SERVICE_CIDR: &str = "10.0.0.0/16";
    pub const DEFAULT_CLUSTER_SUBNET: &str = "10.244.0.0/16";
    pub const DEFAULT_AZURE_CNI_CLUSTER_SUBNET: &str = "10.240.0.0/12";
    pub const DEFAULT_DOCKER_BRIDGE_SUBNET: &str = "172.17.0.1/16";

    pub const DEFAULT_DNS_SERVICE_IP_V6: &str = "fd00::10";
    pub const DEFAULT_SERVICE_CIDR_V6: &str = "fd00::/108";
    pub const DEFAULT_CLUSTER_SUBNET_V6: &str = "fc00::/48";
    /// IPv6 cluster subnet for releases before 1.17
    pub const DEFAULT_CLUSTER_SUBNET_V6_LEGACY: &str = "fc00::/8";

    pub const DEFAULT_MASTER_SUBNET: &str = "10.240.0.0/16";
    pub const DEFAULT_FIRST_CONSECUTIVE_STATIC_IP: &str = "10.240.255.5";
    pub const DEFAULT_FIRST_CONSECUTIVE_STATIC_IP_VMSS: &str = "10.240.0.4";
    pub const DEFAULT_AGENT_SUBNET_VMSS: &str = "10.248.0.0/13";
    pub const DEFAULT_MASTER_SUBNET_V6: &str = "fc00::/48";
    pub const DEFAULT_NON_MASQUERADE_CIDR: &str = "10.0.0.0/8";

    pub const AZURE_CNI_VERSION_LINUX: &str = "v1.4.59";
    pub const AZURE_CNI_VERSION_WINDOWS: &str = "v1.4.59";

    /// Pods per node with Azure CNI
    pub const DEFAULT_MAX_PODS_AZURE_CNI: i32 = 30;
    /// Pods per node with kubenet and other overlay plugins
    pub const DEFAULT_MAX_PODS: i32 = 110;

    pub const DEFAULT_MAX_LOAD_BALANCER_RULE_COUNT: i32 = 250;
    pub const DEFAULT_KUBE_PROXY_MODE: &str = "iptables";
    pub const DEFAULT_OUTBOUND_RULE_IDLE_TIMEOUT_MINUTES: i32 = 30;
}

/// Etcd sizing
pub mod etcd {
    pub const DEFAULT_VERSION: &str = "3.3.22";

    pub const DISK_SIZE_GB_DEFAULT: &str = "256";
    /// More than 3 nodes
    pub const DISK_SIZE_GB_TIER1: &str = "512";
    /// More than 10 nodes
    pub const DISK_SIZE_GB_TIER2: &str = "1024";
    /// More than 20 nodes
    pub const DISK_SIZE_GB_TIER3: &str = "2048";

    pub const ENCRYPTION_KEY_BYTES: usize = 32;
}

/// Azure cloud provider backoff and rate limiting
pub mod cloudprovider {
    pub const BACKOFF_MODE_V1: &str = "v1";
    pub const BACKOFF_MODE_V2: &str = "v2";
    /// First release that uses the v2 backoff mode
    pub const BACKOFF_MODE_V2_MIN_VERSION: &str = "1.14.0";

    pub const BACKOFF_RETRIES: i32 = 6;
    pub const BACKOFF_JITTER: f64 = 1.0;
    pub const BACKOFF_DURATION: i32 = 5;
    pub const BACKOFF_EXPONENT: f64 = 1.5;

    pub const RATE_LIMIT: bool = true;
    pub const RATE_LIMIT_QPS: f64 = 3.0;
    pub const RATE_LIMIT_BUCKET: i32 = 10;
}

/// Container runtime defaults
pub mod runtime {
    pub const CONTAINERD: &str = "containerd";
    pub const DOCKER: &str = "docker";
    pub const DEFAULT_CONTAINERD_VERSION: &str = "1.7.15";
    pub const DEFAULT_MOBY_VERSION: &str = "19.03.14";
}

/// Kubelet and control plane defaults
pub mod kubelet {
    pub const GC_HIGH_THRESHOLD: i32 = 85;
    pub const GC_LOW_THRESHOLD: i32 = 80;
    pub const HARD_EVICTION_THRESHOLD: &str =
        "memory.available<750Mi,nodefs.available<10%,nodefs.inodesFree<5%";
    pub const NODE_STATUS_UPDATE_FREQUENCY: &str = "10s";
    pub const PAUSE_IMAGE: &str = "oss/kubernetes/pause:3.6";
    pub const TLS_CIPHER_SUITES: &str = "TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305,TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305,TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,TLS_RSA_WITH_AES_256_GCM_SHA384,TLS_RSA_WITH_AES_128_GCM_SHA256";

    /// First release that rotates kubelet server certificates
    pub const ROTATE_CERTIFICATES_MIN_VERSION: &str = "1.11.9";
    /// First release that forces RBAC on upgrade
    pub const FORCE_RBAC_MIN_VERSION: &str = "1.15.0";
    pub const ROTATE_SERVER_CERTIFICATE_FEATURE_GATE: &str = "RotateKubeletServerCertificate=true";

    /// First release without `--cadvisor-port`
    pub const CADVISOR_PORT_REMOVED_VERSION: &str = "1.12.0";
    /// First release without `--allow-privileged`
    pub const ALLOW_PRIVILEGED_REMOVED_VERSION: &str = "1.15.0-beta.1";
    /// First release with `--pod-max-pids`
    pub const POD_MAX_PIDS_MIN_VERSION: &str = "1.10.0";

    pub const WINDOWS_PAUSE_IMAGE: &str = "kubletwin/pause";
}

/// Node sysctls applied to Linux pools unless the pool overrides them
pub mod sysctl {
    pub const DEFAULTS: &[(&str, &str)] = &[
        ("net.core.message_burst", "80"),
        ("net.core.message_cost", "40"),
        ("net.core.somaxconn", "16384"),
        ("net.ipv4.neigh.default.gc_thresh1", "4096"),
        ("net.ipv4.neigh.default.gc_thresh2", "8192"),
        ("net.ipv4.neigh.default.gc_thresh3", "16384"),
        ("net.ipv4.tcp_max_syn_backlog", "16384"),
        ("net.ipv4.tcp_retries2", "8"),
    ];
}

/// Azure Stack custom cloud defaults
pub mod customcloud {
    pub const AZURE_STACK_CLOUD: &str = "AzureStackCloud";
    pub const CLIENT_SECRET_AUTH_METHOD: &str = "client_secret";
    pub const AZURE_AD_IDENTITY_SYSTEM: &str = "azure_ad";
    pub const ADFS_IDENTITY_SYSTEM: &str = "adfs";
    pub const DEPENDENCIES_LOCATION_PUBLIC: &str = "public";

    /// Budget for the metadata endpoint request
    pub const METADATA_TIMEOUT_SECS: u64 = 30;
}

/// Telemetry defaults
pub mod telemetry {
    pub const DEFAULT_APPLICATION_INSIGHTS_KEY: &str = "c92d8284-b550-4b06-b7ba-e80fd7178faa";
}

/// Extension profile defaults
pub mod extensions {
    pub const DEFAULT_ROOT_URL: &str =
        "https://raw.githubusercontent.com/Azure/aks-engine/master/";
}

/// Tag keys honoured on the ContainerService envelope
pub mod tags {
    pub const SKIP_GPU_DRIVER_INSTALL: &str = "SkipGPUDriverInstall";
}
