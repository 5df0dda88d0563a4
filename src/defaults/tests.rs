#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::cloud::{CloudSpecRegistry, AKS_WINDOWS_SERVER_2019_IMAGE};
    use crate::datamodel::{
        AgentPoolProfile, CustomCloudProfile, FeatureFlags, HostedMasterProfile, KubernetesConfig,
        MasterProfile, OrchestratorProfile, Properties, WindowsProfile,
    };
    use crate::distro::Distro;
    use crate::error::Error;
    use async_trait::async_trait;
    use base64::Engine;
    use std::sync::{Arc, Mutex};

    fn cluster(version: &str, k: KubernetesConfig) -> ContainerService {
        ContainerService {
            location: "westus2".to_string(),
            properties: Properties {
                orchestrator_profile: Some(OrchestratorProfile {
                    orchestrator_type: "Kubernetes".to_string(),
                    orchestrator_version: version.to_string(),
                    kubernetes_config: Some(k),
                }),
                master_profile: Some(MasterProfile {
                    count: 1,
                    dns_prefix: "c1".to_string(),
                    vm_size: "Standard_D2_v3".to_string(),
                    ..MasterProfile::default()
                }),
                agent_pool_profiles: vec![AgentPoolProfile {
                    name: "pool1".to_string(),
                    count: 2,
                    vm_size: "Standard_D2_v3".to_string(),
                    ..AgentPoolProfile::default()
                }],
                ..Properties::default()
            },
            ..ContainerService::default()
        }
    }

    fn apply(cs: ContainerService, params: DefaultsParams) -> ContainerService {
        let clouds = CloudSpecRegistry::new();
        Defaulter::new(&clouds).apply_stages(cs, params)
    }

    fn k8s(cs: &ContainerService) -> &KubernetesConfig {
        cs.properties.kubernetes_config().unwrap()
    }

    #[test]
    fn test_kubernetes_114_defaults() {
        let cs = apply(cluster("1.14.0", KubernetesConfig::default()), DefaultsParams::create());
        let k = k8s(&cs);
        assert_eq!(k.cloud_provider_backoff_mode, "v2");
        assert_eq!(k.cloud_provider_backoff, Some(true));
        assert_eq!(k.enable_rbac, Some(true));
        assert_eq!(k.load_balancer_sku, "Basic");
        assert_eq!(k.network_plugin, "kubenet");
        assert_eq!(k.container_runtime, "containerd");
        assert_eq!(k.dns_service_ip, "10.0.0.10");
        assert_eq!(k.service_cidr, "10.0.0.0/16");
        assert_eq!(k.cluster_subnet, "10.244.0.0/16");
    }

    #[test]
    fn test_backoff_v1_before_114() {
        let cs = apply(cluster("1.13.12", KubernetesConfig::default()), DefaultsParams::create());
        let k = k8s(&cs);
        assert_eq!(k.cloud_provider_backoff_mode, "v1");
        assert_eq!(k.cloud_provider_backoff, Some(false));
        assert_eq!(k.cloud_provider_backoff_exponent, 1.5);
        assert_eq!(k.cloud_provider_backoff_jitter, 1.0);
    }

    #[test]
    fn test_rbac_hosted_master_exemption() {
        let mut cs = cluster(
            "1.15.0",
            KubernetesConfig {
                enable_rbac: Some(false),
                ..KubernetesConfig::default()
            },
        );
        cs.properties.master_profile = None;
        cs.properties.hosted_master_profile = Some(HostedMasterProfile {
            fqdn: "c1.hcp.westus2.azmk8s.io".to_string(),
            ..HostedMasterProfile::default()
        });
        let cs = apply(cs, DefaultsParams::upgrade());
        assert_eq!(k8s(&cs).enable_rbac, Some(false));
        assert!(!k8s(&cs).enable_aggregated_apis);
    }

    #[test]
    fn test_rbac_forced_on_upgrade() {
        let cs = cluster(
            "1.15.0",
            KubernetesConfig {
                enable_rbac: Some(false),
                ..KubernetesConfig::default()
            },
        );
        let created = apply(cs.clone(), DefaultsParams::create());
        assert_eq!(k8s(&created).enable_rbac, Some(false));

        let upgraded = apply(cs, DefaultsParams::upgrade());
        assert_eq!(k8s(&upgraded).enable_rbac, Some(true));
        assert!(k8s(&upgraded).enable_aggregated_apis);
        assert_eq!(
            k8s(&upgraded).api_server_config.get("--authorization-mode").map(String::as_str),
            Some("Node,RBAC")
        );
    }

    #[test]
    fn test_network_policy_translation() {
        let cases = [
            ("azure", "azure", ""),
            ("calico", "kubenet", "calico"),
            ("cilium", "cilium", "cilium"),
            ("antrea", "antrea", "antrea"),
            ("none", "kubenet", ""),
        ];
        for (policy, plugin, expected_policy) in cases {
            let cs = cluster(
                "1.18.14",
                KubernetesConfig {
                    network_policy: policy.to_string(),
                    ..KubernetesConfig::default()
                },
            );
            let cs = apply(cs, DefaultsParams::create());
            let k = k8s(&cs);
            assert_eq!(k.network_plugin, plugin, "policy {}", policy);
            assert_eq!(k.network_policy, expected_policy, "policy {}", policy);
        }
    }

    #[test]
    fn test_empty_version_becomes_latest_patch() {
        let cs = apply(cluster("", KubernetesConfig::default()), DefaultsParams::create());
        let version = &cs.properties.orchestrator_profile.as_ref().unwrap().orchestrator_version;
        assert_eq!(version, "1.13.12");

        let again = apply(cs.clone(), DefaultsParams::create());
        assert_eq!(
            again.properties.orchestrator_profile.unwrap().orchestrator_version,
            "1.13.12"
        );
    }

    #[test]
    fn test_windows_cluster_defaults() {
        let mut cs = cluster("", KubernetesConfig::default());
        cs.properties.agent_pool_profiles.push(AgentPoolProfile {
            name: "win".to_string(),
            count: 1,
            os_type: "Windows".to_string(),
            ..AgentPoolProfile::default()
        });
        cs.properties.windows_profile = Some(WindowsProfile {
            admin_username: "azureuser".to_string(),
            ..WindowsProfile::default()
        });
        let cs = apply(cs, DefaultsParams::create());

        let o = cs.properties.orchestrator_profile.as_ref().unwrap();
        assert_eq!(o.orchestrator_version, "1.14.8");
        assert_eq!(k8s(&cs).network_plugin, "azure");

        let w = cs.properties.windows_profile.as_ref().unwrap();
        assert_eq!(w.windows_publisher, AKS_WINDOWS_SERVER_2019_IMAGE.0);
        assert_eq!(w.windows_offer, AKS_WINDOWS_SERVER_2019_IMAGE.1);
        assert_eq!(w.windows_sku, AKS_WINDOWS_SERVER_2019_IMAGE.2);
        assert_eq!(w.image_version, AKS_WINDOWS_SERVER_2019_IMAGE.3);
        assert_eq!(w.ssh_enabled, Some(true));

        let win = cs.agent_pool("win").unwrap();
        let kubelet = win.kubelet_config();
        assert_eq!(kubelet.get("--kubeconfig").map(String::as_str), Some("c:\\k\\config"));
        assert!(!kubelet.contains_key("--pod-manifest-path"));
        assert!(win.distro.is_none());
    }

    #[test]
    fn test_windows_upgrade_keeps_image_family() {
        let mut cs = cluster("1.18.14", KubernetesConfig::default());
        cs.properties.agent_pool_profiles[0].os_type = "Windows".to_string();
        cs.properties.windows_profile = Some(WindowsProfile {
            windows_publisher: "contoso".to_string(),
            windows_offer: "custom-windows".to_string(),
            ..WindowsProfile::default()
        });
        let cs = apply(cs, DefaultsParams::upgrade());
        let w = cs.properties.windows_profile.unwrap();
        assert_eq!(w.windows_publisher, "contoso");
        assert_eq!(w.windows_offer, "custom-windows");
        assert!(w.windows_sku.is_empty());
        assert!(w.image_version.is_empty());
    }

    #[test]
    fn test_windows_create_unpublished_sku_uses_latest() {
        let mut cs = cluster("1.18.14", KubernetesConfig::default());
        cs.properties.agent_pool_profiles[0].os_type = "Windows".to_string();
        cs.properties.windows_profile = Some(WindowsProfile {
            windows_sku: "2019-datacenter-core-smalldisk-2104".to_string(),
            ..WindowsProfile::default()
        });
        let cs = apply(cs, DefaultsParams::create());
        assert_eq!(cs.properties.windows_profile.unwrap().image_version, "latest");
    }

    #[test]
    fn test_ipv6_only_service_addresses() {
        let mut cs = cluster("1.18.14", KubernetesConfig::default());
        cs.properties.feature_flags = Some(FeatureFlags {
            enable_ipv6_only: true,
            ..FeatureFlags::default()
        });
        let cs = apply(cs, DefaultsParams::create());
        let k = k8s(&cs);
        assert_eq!(k.service_cidr, "fd00::/108");
        assert_eq!(k.dns_service_ip, "fd00::10");
        assert_eq!(k.cluster_subnet, "fc00::/48");
        assert!(!k.service_cidr.contains(','));
    }

    #[test]
    fn test_dual_stack_cluster_subnet() {
        let flags = FeatureFlags {
            enable_ipv6_dual_stack: true,
            ..FeatureFlags::default()
        };

        let mut cs = cluster("1.18.14", KubernetesConfig::default());
        cs.properties.feature_flags = Some(flags.clone());
        let cs = apply(cs, DefaultsParams::create());
        assert_eq!(k8s(&cs).cluster_subnet, "10.244.0.0/16,fc00::/48");

        let mut cs = cluster(
            "1.16.15",
            KubernetesConfig {
                cluster_subnet: "fd12::/64".to_string(),
                ..KubernetesConfig::default()
            },
        );
        cs.properties.feature_flags = Some(flags.clone());
        let cs = apply(cs, DefaultsParams::create());
        assert_eq!(k8s(&cs).cluster_subnet, "10.244.0.0/16,fd12::/64");

        let mut cs = cluster(
            "1.16.15",
            KubernetesConfig {
                cluster_subnet: "10.1.0.0/16".to_string(),
                ..KubernetesConfig::default()
            },
        );
        cs.properties.feature_flags = Some(flags);
        let cs = apply(cs, DefaultsParams::create());
        assert_eq!(k8s(&cs).cluster_subnet, "10.1.0.0/16,fc00::/8");
    }

    #[test]
    fn test_etcd_disk_size_tiers() {
        assert_eq!(orchestrator::etcd_disk_size(1), "256");
        assert_eq!(orchestrator::etcd_disk_size(3), "256");
        assert_eq!(orchestrator::etcd_disk_size(4), "512");
        assert_eq!(orchestrator::etcd_disk_size(10), "512");
        assert_eq!(orchestrator::etcd_disk_size(11), "1024");
        assert_eq!(orchestrator::etcd_disk_size(21), "2048");

        let mut cs = cluster("1.18.14", KubernetesConfig::default());
        cs.properties.agent_pool_profiles[0].count = 12;
        let cs = apply(cs, DefaultsParams::create());
        assert_eq!(k8s(&cs).etcd_disk_size_gb, "1024");
    }

    #[test]
    fn test_etcd_encryption_key_generated_once() {
        let cs = cluster(
            "1.18.14",
            KubernetesConfig {
                enable_data_encryption_at_rest: Some(true),
                ..KubernetesConfig::default()
            },
        );
        let cs = apply(cs, DefaultsParams::create());
        let key = k8s(&cs).etcd_encryption_key.clone();
        let raw = base64::engine::general_purpose::STANDARD.decode(&key).unwrap();
        assert_eq!(raw.len(), 32);
        assert!(k8s(&cs).api_server_config.contains_key("--encryption-provider-config"));

        let again = apply(cs, DefaultsParams::create());
        assert_eq!(k8s(&again).etcd_encryption_key, key);
    }

    #[test]
    fn test_defaults_are_idempotent() {
        let mut cs = cluster(
            "1.18.14",
            KubernetesConfig {
                network_plugin: "azure".to_string(),
                enable_data_encryption_at_rest: Some(true),
                ..KubernetesConfig::default()
            },
        );
        cs.properties.agent_pool_profiles.push(AgentPoolProfile {
            name: "zoned".to_string(),
            count: 3,
            vm_size: "Standard_NC6s_v3".to_string(),
            availability_zones: vec!["1".to_string(), "2".to_string()],
            ..AgentPoolProfile::default()
        });
        for params in [DefaultsParams::create(), DefaultsParams::upgrade(), DefaultsParams::scale()] {
            let once = apply(cs.clone(), params);
            let twice = apply(once.clone(), params);
            assert_eq!(once, twice, "{:?}", params);
        }
    }

    #[test]
    fn test_defaulted_value_round_trips_through_json() {
        let cs = apply(cluster("1.14.0", KubernetesConfig::default()), DefaultsParams::create());
        let json = serde_json::to_string(&cs).unwrap();
        let back: ContainerService = serde_json::from_str(&json).unwrap();
        assert_eq!(cs, back);
    }

    #[test]
    fn test_availability_zones_select_standard_lb() {
        let mut cs = cluster("1.18.14", KubernetesConfig::default());
        cs.properties.agent_pool_profiles[0].availability_zones = vec!["1".to_string()];
        let cs = apply(cs, DefaultsParams::create());
        let k = k8s(&cs);
        assert_eq!(k.load_balancer_sku, "Standard");
        assert_eq!(k.exclude_master_from_standard_lb, Some(true));
        assert_eq!(k.outbound_rule_idle_timeout_in_minutes, 30);
        assert_eq!(cs.properties.agent_pool_profiles[0].single_placement_group, Some(false));
    }

    #[test]
    fn test_load_balancer_sku_casing_normalized() {
        let cs = cluster(
            "1.18.14",
            KubernetesConfig {
                load_balancer_sku: "standard".to_string(),
                ..KubernetesConfig::default()
            },
        );
        let cs = apply(cs, DefaultsParams::create());
        assert_eq!(k8s(&cs).load_balancer_sku, "Standard");
    }

    #[test]
    fn test_agent_pool_defaults() {
        let mut cs = cluster("1.18.14", KubernetesConfig::default());
        cs.properties.agent_pool_profiles[0].scale_set_priority = "Spot".to_string();
        cs.properties.agent_pool_profiles.push(AgentPoolProfile {
            name: "small".to_string(),
            count: 1,
            os_disk_size_gb: 20,
            ..AgentPoolProfile::default()
        });
        let cs = apply(cs, DefaultsParams::create());
        let pool = &cs.properties.agent_pool_profiles[0];
        assert_eq!(pool.availability_profile, "VirtualMachineScaleSets");
        assert_eq!(pool.scale_set_eviction_policy, "Delete");
        assert_eq!(pool.spot_max_price, Some(-1.0));
        assert_eq!(pool.os_type, "Linux");
        assert_eq!(pool.storage_profile, "ManagedDisks");
        assert_eq!(pool.distro, Some(Distro::AKSUbuntu1604));
        assert_eq!(cs.agent_pool("small").unwrap().distro, Some(Distro::Ubuntu));
    }

    #[test]
    fn test_accelerated_networking_off_on_update() {
        let mut cs = cluster("1.18.14", KubernetesConfig::default());
        cs.properties.agent_pool_profiles[0].vm_size = "Standard_D4s_v3".to_string();
        let scaled = apply(cs, DefaultsParams::scale());
        assert_eq!(
            scaled.properties.agent_pool_profiles[0].accelerated_networking_enabled,
            Some(false)
        );
    }

    #[test]
    fn test_ip_address_counts() {
        let cs = cluster(
            "1.18.14",
            KubernetesConfig {
                network_plugin: "azure".to_string(),
                ..KubernetesConfig::default()
            },
        );
        let cs = apply(cs, DefaultsParams::create());
        assert_eq!(cs.properties.agent_pool_profiles[0].ip_address_count, 31);
        assert_eq!(cs.properties.master_profile.as_ref().unwrap().ip_address_count, 31);

        let cs = apply(cluster("1.18.14", KubernetesConfig::default()), DefaultsParams::create());
        assert_eq!(cs.properties.agent_pool_profiles[0].ip_address_count, 1);
    }

    #[test]
    fn test_kubelet_flags_follow_version() {
        let cs = apply(cluster("1.11.10", KubernetesConfig::default()), DefaultsParams::create());
        let kubelet = &k8s(&cs).kubelet_config;
        assert_eq!(kubelet.get("--cadvisor-port").map(String::as_str), Some("0"));
        assert_eq!(kubelet.get("--allow-privileged").map(String::as_str), Some("true"));
        assert_eq!(
            kubelet.get("--feature-gates").map(String::as_str),
            Some("RotateKubeletServerCertificate=true")
        );
        assert_eq!(kubelet.get("--network-plugin").map(String::as_str), Some("kubenet"));

        let cs = apply(cluster("1.18.14", KubernetesConfig::default()), DefaultsParams::create());
        let kubelet = &k8s(&cs).kubelet_config;
        assert!(!kubelet.contains_key("--cadvisor-port"));
        assert!(!kubelet.contains_key("--allow-privileged"));
        assert_eq!(kubelet.get("--max-pods").map(String::as_str), Some("110"));
    }

    #[test]
    fn test_user_feature_gates_merged_and_sorted() {
        let mut config = BTreeMap::new();
        config.insert(
            "--feature-gates".to_string(),
            "Zeta=true,RotateKubeletServerCertificate=false,broken".to_string(),
        );
        add_default_feature_gates(&mut config, "1.18.14", "1.11.9", "RotateKubeletServerCertificate=true");
        assert_eq!(
            config.get("--feature-gates").map(String::as_str),
            Some("RotateKubeletServerCertificate=true,Zeta=true")
        );

        let mut config = BTreeMap::new();
        add_default_feature_gates(&mut config, "1.10.0", "1.11.9", "RotateKubeletServerCertificate=true");
        assert_eq!(config.get("--feature-gates").map(String::as_str), Some(""));
    }

    #[test]
    fn test_user_kubelet_values_survive() {
        let mut k = KubernetesConfig::default();
        k.kubelet_config.insert("--max-pods".to_string(), "50".to_string());
        k.kubelet_config.insert("--v".to_string(), "5".to_string());
        let cs = apply(cluster("1.18.14", k), DefaultsParams::create());
        let kubelet = cs.agent_pool("pool1").unwrap().kubelet_config();
        assert_eq!(kubelet.get("--max-pods").map(String::as_str), Some("50"));
        // static flags always win
        assert_eq!(kubelet.get("--v").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_scheduler_defaults() {
        let mut k = KubernetesConfig::default();
        k.scheduler_config.insert("--v".to_string(), "4".to_string());
        k.scheduler_config.insert("--leader-elect".to_string(), "false".to_string());
        let cs = apply(cluster("1.18.14", k), DefaultsParams::create());
        let scheduler = &k8s(&cs).scheduler_config;
        assert_eq!(scheduler.get("--v").map(String::as_str), Some("4"));
        assert_eq!(scheduler.get("--leader-elect").map(String::as_str), Some("true"));
        assert_eq!(scheduler.get("--profiling").map(String::as_str), Some("false"));
    }

    #[test]
    fn test_master_static_ip() {
        assert_eq!(first_consecutive_static_ip("10.239.0.0/16", false), "10.239.255.5");
        assert_eq!(first_consecutive_static_ip("10.239.0.0/16", true), "10.239.0.4");
        assert_eq!(first_consecutive_static_ip("10.100.8.0/22", false), "10.100.11.5");
        assert_eq!(first_consecutive_static_ip("not-a-cidr", false), "10.240.255.5");

        let cs = apply(cluster("1.18.14", KubernetesConfig::default()), DefaultsParams::create());
        let master = cs.properties.master_profile.unwrap();
        assert_eq!(master.subnet, "10.240.0.0/16");
        assert_eq!(master.first_consecutive_static_ip, "10.240.255.5");
        assert_eq!(master.availability_profile, "AvailabilitySet");
    }

    #[test]
    fn test_german_cloud_uses_ubuntu() {
        let mut cs = cluster("1.18.14", KubernetesConfig::default());
        cs.location = "germanycentral".to_string();
        let cs = apply(cs, DefaultsParams::create());
        assert_eq!(cs.properties.agent_pool_profiles[0].distro, Some(Distro::Ubuntu));
        assert_eq!(cs.properties.master_profile.unwrap().distro, Some(Distro::Ubuntu));
    }

    #[test]
    fn test_telemetry_and_hosted_master_defaults() {
        let mut cs = cluster("1.18.14", KubernetesConfig::default());
        cs.properties.hosted_master_profile = Some(HostedMasterProfile::default());
        let cs = apply(cs, DefaultsParams::create());
        assert_eq!(
            cs.properties.telemetry_profile.unwrap().application_insights_key,
            "c92d8284-b550-4b06-b7ba-e80fd7178faa"
        );
        assert_eq!(cs.properties.hosted_master_profile.unwrap().subnet, "10.240.0.0/16");
    }

    #[test]
    fn test_combine_values() {
        assert_eq!(combine_values(&["b=2,a=1", "a=3"]), "a=3,b=2");
        assert_eq!(combine_values(&["", ""]), "");
        assert_eq!(combine_values(&["x", "y=1=2"]), "");
    }

    struct StaticFetcher {
        response: AzureStackMetadataEndpoints,
        urls: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl EndpointsFetcher for StaticFetcher {
        async fn fetch(&self, url: &str) -> crate::error::Result<AzureStackMetadataEndpoints> {
            self.urls.lock().unwrap().push(url.to_string());
            Ok(self.response.clone())
        }
    }

    fn stack_endpoints() -> AzureStackMetadataEndpoints {
        AzureStackMetadataEndpoints {
            gallery_endpoint: "https://galleryartifacts.hosting.local.azurestack.external/".to_string(),
            graph_endpoint: "https://graph.windows.net/".to_string(),
            portal_endpoint: "https://portal.local.azurestack.external/".to_string(),
            authentication: MetadataAuthentication {
                login_endpoint: "https://adfs.local.azurestack.external/adfs/".to_string(),
                audiences: vec!["https://management.adfs.azurestack.local/abc".to_string()],
            },
        }
    }

    fn stack_cluster(identity_system: &str) -> ContainerService {
        let mut cs = cluster("1.18.14", KubernetesConfig::default());
        cs.location = "local".to_string();
        cs.properties.custom_cloud_profile = Some(CustomCloudProfile {
            portal_url: "https://portal.local.azurestack.external/".to_string(),
            identity_system: identity_system.to_string(),
            ..CustomCloudProfile::default()
        });
        cs
    }

    #[tokio::test]
    async fn test_azure_stack_environment_from_metadata() {
        let clouds = CloudSpecRegistry::new();
        let urls = Arc::new(Mutex::new(Vec::new()));
        let fetcher = StaticFetcher {
            response: stack_endpoints(),
            urls: urls.clone(),
        };
        let defaulter = Defaulter::with_fetcher(&clouds, Box::new(fetcher));

        let cs = defaulter
            .set_properties_defaults(stack_cluster("adfs"), DefaultsParams::create())
            .await
            .unwrap();
        assert_eq!(
            urls.lock().unwrap().as_slice(),
            ["https://management.local.azurestack.external/metadata/endpoints?api-version=1.0"]
        );

        let profile = cs.properties.custom_cloud_profile.as_ref().unwrap();
        assert_eq!(profile.authentication_method, "client_secret");
        assert_eq!(profile.dependencies_location, "public");
        let env = profile.environment.as_ref().unwrap();
        assert_eq!(env.name, "AzureStackCloud");
        assert_eq!(env.resource_manager_endpoint, "https://management.local.azurestack.external/");
        assert_eq!(env.active_directory_endpoint, "https://adfs.local.azurestack.external/");
        assert_eq!(env.service_management_endpoint, "https://management.adfs.azurestack.local/abc");
        assert_eq!(env.resource_manager_vm_dns_suffix, "cloudapp.azurestack.external");
        assert_eq!(env.storage_endpoint_suffix, "local.azurestack.external");
        assert_eq!(env.key_vault_dns_suffix, "vault.local.azurestack.external");
        assert!(env.is_complete());

        // a complete environment is not fetched again
        defaulter
            .set_properties_defaults(cs, DefaultsParams::create())
            .await
            .unwrap();
        assert_eq!(urls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_azure_stack_malformed_metadata() {
        let clouds = CloudSpecRegistry::new();
        let mut response = stack_endpoints();
        response.authentication.audiences.clear();
        let fetcher = StaticFetcher {
            response,
            urls: Arc::new(Mutex::new(Vec::new())),
        };
        let defaulter = Defaulter::with_fetcher(&clouds, Box::new(fetcher));
        let err = defaulter
            .set_properties_defaults(stack_cluster(""), DefaultsParams::create())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CustomCloudMalformedResponse { .. }), "{}", err);
    }

    #[tokio::test]
    async fn test_azure_stack_rejects_foreign_portal() {
        let clouds = CloudSpecRegistry::new();
        let urls = Arc::new(Mutex::new(Vec::new()));
        let fetcher = StaticFetcher {
            response: stack_endpoints(),
            urls: urls.clone(),
        };
        let defaulter = Defaulter::with_fetcher(&clouds, Box::new(fetcher));
        let mut cs = stack_cluster("");
        cs.location = "redmond".to_string();
        let err = defaulter
            .set_properties_defaults(cs, DefaultsParams::create())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)), "{}", err);
        assert!(urls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_metadata_url() {
        assert_eq!(
            metadata_url("local", "azurestack.external"),
            "https://management.local.azurestack.external/metadata/endpoints?api-version=1.0"
        );
    }
}
