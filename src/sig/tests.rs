#[cfg(test)]
mod tests {
    use super::super::*;

    fn custom_config() -> SigConfig {
        let galleries = [
            ("AKSUbuntu", "aksubuntu", "resourcegroup"),
            ("AKSCBLMariner", "akscblmariner", "resourcegroup"),
            ("AKSAzureLinux", "aksazurelinux", "resourcegroup"),
            ("AKSWindows", "AKSWindows", "AKS-Windows"),
        ]
        .into_iter()
        .map(|(key, gallery, rg)| {
            (
                key.to_string(),
                SigGalleryConfig {
                    gallery_name: gallery.to_string(),
                    resource_group: rg.to_string(),
                },
            )
        })
        .collect();
        SigConfig {
            tenant_id: "sometenantid".to_string(),
            subscription_id: "somesubid".to_string(),
            galleries: Some(galleries),
        }
    }

    #[test]
    fn test_embedded_versions() {
        let versions = SigVersions::embedded().unwrap();
        assert!(!versions.linux.is_empty());
        assert!(!versions.edge_zone.is_empty());
        assert_eq!(versions.frozen_docker, FROZEN_LINUX_SIG_IMAGE_VERSION_FOR_DOCKER);
    }

    #[test]
    fn test_resolve_rewrites_gallery_from_config() {
        let env = SigEnvironment::new(&custom_config(), "southcentralus", SigVersions::embedded().unwrap())
            .unwrap();
        assert_eq!(env.cloud_name, "AzurePublicCloud");
        let image = env.resolve(Distro::AKSUbuntuContainerd2204Gen2).unwrap();
        assert_eq!(image.gallery, "aksubuntu");
        assert_eq!(image.resource_group, "resourcegroup");
        assert_eq!(image.subscription_id, "somesubid");
        assert_eq!(image.definition, "2204gen2containerd");
        assert_eq!(image.version, env.versions().linux);
    }

    #[test]
    fn test_mariner_and_windows_definitions() {
        let env = SigEnvironment::new(&custom_config(), "westus", SigVersions::embedded().unwrap())
            .unwrap();
        let mariner = env.resolve(Distro::AKSCBLMarinerV2Gen2FIPS).unwrap();
        assert_eq!(mariner.gallery, "akscblmariner");
        assert_eq!(mariner.definition, "V2gen2fips");

        let windows = env.resolve(Distro::AKSWindows2019Containerd).unwrap();
        assert_eq!(windows.definition, "windows-2019-containerd");
        assert_eq!(windows.version, WINDOWS_SIG_IMAGE_VERSION);
    }

    #[test]
    fn test_legacy_docker_distros_use_frozen_version() {
        let env = SigEnvironment::new(&custom_config(), "westus", SigVersions::embedded().unwrap())
            .unwrap();
        let docker = env.resolve(Distro::AKSUbuntu1804).unwrap();
        assert_eq!(docker.version, FROZEN_LINUX_SIG_IMAGE_VERSION_FOR_DOCKER);
        let containerd = env.resolve(Distro::AKSUbuntuContainerd1804).unwrap();
        assert_eq!(containerd.version, env.versions().linux);
    }

    #[test]
    fn test_edge_zone_ignores_galleries() {
        let env = SigEnvironment::new(&custom_config(), "westus", SigVersions::embedded().unwrap())
            .unwrap();
        let image = env.resolve(Distro::AKSUbuntuEdgeZoneContainerd2204Gen2).unwrap();
        assert_eq!(image.gallery, AKS_UBUNTU_EDGE_ZONE_GALLERY);
        assert_eq!(image.resource_group, AKS_UBUNTU_EDGE_ZONE_RESOURCE_GROUP);
        assert_eq!(image.subscription_id, "somesubid");
        assert_eq!(image.version, env.versions().edge_zone);
    }

    #[test]
    fn test_missing_tenant_is_invalid() {
        let mut config = custom_config();
        config.tenant_id = String::new();
        let err = SigEnvironment::new(&config, "westus", SigVersions::embedded().unwrap()).unwrap_err();
        assert!(matches!(err, Error::InvalidSigConfig(_)));

        let mut config = custom_config();
        config.galleries = None;
        let err = SigEnvironment::new(&config, "westus", SigVersions::embedded().unwrap()).unwrap_err();
        assert!(matches!(err, Error::InvalidSigConfig(_)));
    }

    #[test]
    fn test_missing_gallery_for_sku() {
        let mut config = custom_config();
        config.galleries.as_mut().unwrap().remove("AKSWindows");
        let err = SigEnvironment::new(&config, "westus", SigVersions::embedded().unwrap()).unwrap_err();
        assert!(matches!(err, Error::MissingGalleryForSku(ref sku) if sku == "AKSWindows"));
        assert_eq!(err.to_string(), "sig gallery configuration for AKSWindows not found");
    }

    #[test]
    fn test_optional_gallery_checked_at_resolve() {
        let mut config = custom_config();
        config.galleries.as_mut().unwrap().remove("AKSAzureLinux");
        let env = SigEnvironment::new(&config, "westus", SigVersions::embedded().unwrap()).unwrap();
        assert!(env.resolve(Distro::AKSUbuntuContainerd2204).is_ok());
        assert!(matches!(
            env.resolve(Distro::AKSAzureLinuxV3Gen2),
            Err(Error::MissingGalleryForSku(_))
        ));
    }

    #[test]
    fn test_pir_distro_is_unsupported() {
        let err = resolve(Distro::AKSWindows2019PIR, &SigConfig::azure_public(), "eastus").unwrap_err();
        assert!(matches!(err, Error::UnsupportedSigDistro(_)));
    }

    #[test]
    fn test_azure_public_config() {
        let image = resolve(Distro::AKSCBLMarinerV2, &SigConfig::azure_public(), "eastus").unwrap();
        assert_eq!(image.subscription_id, AZURE_PUBLIC_CLOUD_SIG_SUBSCRIPTION);
        assert_eq!(image.gallery, AKS_CBL_MARINER_GALLERY);
        assert_eq!(image.resource_group, AKS_CBL_MARINER_RESOURCE_GROUP);
    }

    #[test]
    fn test_every_distro_with_template_resolves() {
        let env = SigEnvironment::new(&SigConfig::azure_public(), "eastus", SigVersions::embedded().unwrap())
            .unwrap();
        let versions = SigVersions::embedded().unwrap();
        for distro in Distro::all() {
            if template_for(*distro, &versions).is_some() {
                assert!(env.resolve(*distro).is_ok(), "{}", distro);
            }
        }
    }
}
