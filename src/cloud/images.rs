use super::{Cloud, CloudSpec, DockerSpecConfig, EndpointConfig, KubernetesSpecConfig, OsImage};
use crate::distro::Distro;
use std::collections::BTreeMap;

const CNI_PLUGIN_VERSION: &str = "v0.7.6";
const AZURE_CNI_VERSION_LINUX: &str = "v1.1.3";
const AZURE_CNI_VERSION_WINDOWS: &str = "v1.1.3";
const WINDOWS_PAUSE_IMAGE_VERSION: &str = "1.4.0";
const WINDOWS_PROVISIONING_SCRIPTS_VERSION: &str = "v0.0.13";
const WINDOWS_TELEMETRY_GUID: &str = "fb801154-36b9-41bc-89c2-f4d4f05472b0";

const AZURE_STACK_DEPLOY_TELEMETRY_PID: &str = "pid-1bda96ec-adf4-4eea-bb9a-8462de5475c0";

pub const AKS_WINDOWS_SERVER_2019_IMAGE: (&str, &str, &str, &str) = (
    "microsoft-aks",
    "aks-windows",
    "2019-datacenter-core-smalldisk-2007",
    "17763.1339.200717",
);

pub const WINDOWS_SERVER_2019_IMAGE: (&str, &str, &str, &str) = (
    "MicrosoftWindowsServer",
    "WindowsServer",
    "2019-Datacenter-Core-with-Containers-smalldisk",
    "17763.1339.2007101755",
);

fn default_kubernetes_spec() -> KubernetesSpecConfig {
    KubernetesSpecConfig {
        azure_telemetry_pid: String::new(),
        kubernetes_image_base: "k8s.gcr.io/".to_string(),
        tiller_image_base: "gcr.io/kubernetes-helm/".to_string(),
        aci_connector_image_base: "microsoft/".to_string(),
        mcr_kubernetes_image_base: "mcr.microsoft.com/".to_string(),
        nvidia_image_base: "nvidia/".to_string(),
        azure_cni_image_base: "mcr.microsoft.com/containernetworking/".to_string(),
        calico_image_base: "calico/".to_string(),
        etcd_download_url_base: "mcr.microsoft.com/oss/etcd-io/".to_string(),
        kube_binaries_sas_url_base: "https://acs-mirror.azureedge.net/kubernetes/".to_string(),
        windows_telemetry_guid: WINDOWS_TELEMETRY_GUID.to_string(),
        cni_plugins_download_url: format!(
            "https://acs-mirror.azureedge.net/cni/cni-plugins-amd64-{}.tgz",
            CNI_PLUGIN_VERSION
        ),
        vnet_cni_linux_plugins_download_url: format!(
            "https://acs-mirror.azureedge.net/azure-cni/{v}/binaries/azure-vnet-cni-linux-amd64-{v}.tgz",
            v = AZURE_CNI_VERSION_LINUX
        ),
        vnet_cni_windows_plugins_download_url: format!(
            "https://acs-mirror.azureedge.net/azure-cni/{v}/binaries/azure-vnet-cni-singletenancy-windows-amd64-{v}.zip",
            v = AZURE_CNI_VERSION_WINDOWS
        ),
        containerd_download_url_base: "https://storage.googleapis.com/cri-containerd-release/"
            .to_string(),
        csi_proxy_download_url:
            "https://acs-mirror.azureedge.net/csi-proxy/v0.1.0/binaries/csi-proxy.tar.gz"
                .to_string(),
        windows_provisioning_scripts_package_url: format!(
            "https://acs-mirror.azureedge.net/aks-engine/windows/provisioning/signedscripts-{}.zip",
            WINDOWS_PROVISIONING_SCRIPTS_VERSION
        ),
        windows_pause_image_url: format!(
            "mcr.microsoft.com/oss/kubernetes/pause:{}",
            WINDOWS_PAUSE_IMAGE_VERSION
        ),
        always_pull_windows_pause_image: false,
    }
}

/// Mooncake mirrors every upstream registry.
fn china_kubernetes_spec() -> KubernetesSpecConfig {
    KubernetesSpecConfig {
        kubernetes_image_base: "gcr.azk8s.cn/google_containers/".to_string(),
        tiller_image_base: "mirror.azk8s.cn/kubernetes-helm/".to_string(),
        aci_connector_image_base: "dockerhub.azk8s.cn/microsoft/".to_string(),
        mcr_kubernetes_image_base: "mcr.azk8s.cn/".to_string(),
        nvidia_image_base: "dockerhub.azk8s.cn/nvidia/".to_string(),
        azure_cni_image_base: "mcr.azk8s.cn/containernetworking/".to_string(),
        calico_image_base: "dockerhub.azk8s.cn/calico/".to_string(),
        etcd_download_url_base: "mcr.azk8s.cn/oss/etcd-io/".to_string(),
        kube_binaries_sas_url_base: "https://mirror.azk8s.cn/kubernetes/".to_string(),
        cni_plugins_download_url: format!(
            "https://mirror.azk8s.cn/kubernetes/containernetworking-plugins/cni-plugins-amd64-{}.tgz",
            CNI_PLUGIN_VERSION
        ),
        vnet_cni_linux_plugins_download_url: format!(
            "https://mirror.azk8s.cn/azure-cni/{v}/binaries/azure-vnet-cni-linux-amd64-{v}.tgz",
            v = AZURE_CNI_VERSION_LINUX
        ),
        vnet_cni_windows_plugins_download_url: format!(
            "https://mirror.azk8s.cn/azure-cni/{v}/binaries/azure-vnet-cni-singletenancy-windows-amd64-{v}.zip",
            v = AZURE_CNI_VERSION_WINDOWS
        ),
        containerd_download_url_base: "https://mirror.azk8s.cn/kubernetes/containerd/".to_string(),
        csi_proxy_download_url:
            "https://mirror.azk8s.cn/csi-proxy/v0.1.0/binaries/csi-proxy.tar.gz".to_string(),
        windows_provisioning_scripts_package_url: format!(
            "https://mirror.azk8s.cn/aks-engine/windows/provisioning/signedscripts-{}.zip",
            WINDOWS_PROVISIONING_SCRIPTS_VERSION
        ),
        windows_pause_image_url: format!(
            "mcr.azk8s.cn/oss/kubernetes/pause:{}",
            WINDOWS_PAUSE_IMAGE_VERSION
        ),
        ..default_kubernetes_spec()
    }
}

fn default_docker_spec() -> DockerSpecConfig {
    DockerSpecConfig {
        docker_engine_repo: "https://aptdocker.azureedge.net/repo".to_string(),
        docker_compose_download_url: "https://github.com/docker/compose/releases/download"
            .to_string(),
    }
}

fn endpoints(vm_dns: &str, storage: &str, key_vault: &str) -> EndpointConfig {
    EndpointConfig {
        resource_manager_vm_dns_suffix: vm_dns.to_string(),
        storage_endpoint_suffix: storage.to_string(),
        key_vault_dns_suffix: key_vault.to_string(),
    }
}

fn pir((publisher, offer, sku, version): (&str, &str, &str, &str)) -> OsImage {
    OsImage::new(publisher, offer, sku, version)
}

fn os_images(cloud: Cloud) -> BTreeMap<Distro, OsImage> {
    let ubuntu_2204_gen2 = OsImage::new(
        "microsoft-aks",
        "aks",
        "aks-ubuntu-containerd-22.04-gen2",
        "2025.06.02",
    );
    let mut images = BTreeMap::from([
        (
            Distro::Ubuntu,
            OsImage::new("Canonical", "UbuntuServer", "16.04-LTS", "latest"),
        ),
        (
            Distro::Ubuntu1804,
            OsImage::new("Canonical", "UbuntuServer", "18.04-LTS", "latest"),
        ),
        (
            Distro::Ubuntu1804Gen2,
            OsImage::new("Canonical", "UbuntuServer", "18_04-lts-gen2", "latest"),
        ),
        (
            Distro::AKSUbuntu1604,
            OsImage::new("microsoft-aks", "aks", "aks-ubuntu-1604-202004", "2020.04.28"),
        ),
        (
            Distro::AKSUbuntu1804,
            OsImage::new("microsoft-aks", "aks", "aks-ubuntu-1804-202004", "2020.04.28"),
        ),
        (Distro::AKSUbuntuContainerd2204Gen2, ubuntu_2204_gen2.clone()),
        (Distro::AKSWindows2019PIR, pir(AKS_WINDOWS_SERVER_2019_IMAGE)),
    ]);
    if cloud == Cloud::German {
        // the legacy German cloud has no 16.04 marketplace image
        images.insert(Distro::Ubuntu, ubuntu_2204_gen2);
    }
    images
}

pub(super) fn build_spec(cloud: Cloud) -> CloudSpec {
    let mut kubernetes_spec_config = match cloud {
        Cloud::China => china_kubernetes_spec(),
        _ => default_kubernetes_spec(),
    };
    let docker_spec_config = match cloud {
        Cloud::China => DockerSpecConfig {
            docker_engine_repo: "https://mirror.azk8s.cn/docker-engine/apt/repo/".to_string(),
            docker_compose_download_url: "https://mirror.azk8s.cn/docker-toolbox/linux/compose"
                .to_string(),
        },
        _ => default_docker_spec(),
    };
    let endpoint_config = match cloud {
        Cloud::Public => endpoints("cloudapp.azure.com", "core.windows.net", "vault.azure.net"),
        Cloud::China => endpoints(
            "cloudapp.chinacloudapi.cn",
            "core.chinacloudapi.cn",
            "vault.azure.cn",
        ),
        Cloud::USGov => endpoints(
            "cloudapp.usgovcloudapi.net",
            "core.usgovcloudapi.net",
            "vault.usgovcloudapi.net",
        ),
        Cloud::German => endpoints(
            "cloudapp.microsoftazure.de",
            "core.cloudapi.de",
            "vault.microsoftazure.de",
        ),
        Cloud::USNat => endpoints(
            "cloudapp.eaglex.ic.gov",
            "core.eaglex.ic.gov",
            "vault.cloudapi.eaglex.ic.gov",
        ),
        Cloud::USSec => endpoints(
            "cloudapp.microsoft.scloud",
            "core.microsoft.scloud",
            "vault.cloudapi.microsoft.scloud",
        ),
        Cloud::Bleu => endpoints(
            "cloudapp.sovcloud-api.fr",
            "core.sovcloud-api.fr",
            "vault.sovcloud-api.fr",
        ),
        // filled from the stack's metadata endpoint during defaulting
        Cloud::Stack => endpoints("", "", ""),
    };
    if cloud == Cloud::Stack {
        kubernetes_spec_config.azure_telemetry_pid = AZURE_STACK_DEPLOY_TELEMETRY_PID.to_string();
    }
    CloudSpec {
        cloud_name: cloud.name().to_string(),
        docker_spec_config,
        kubernetes_spec_config,
        endpoint_config,
        os_image_config: os_images(cloud),
    }
}
