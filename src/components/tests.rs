#[cfg(test)]
mod tests {
    use super::super::*;
    use std::fs;
    use tempfile::tempdir;

    const MANIFEST: &str = r#"{
        "containerImages": [
            {
                "downloadURL": "mcr.microsoft.com/oss/kubernetes/pause:*",
                "amd64OnlyVersions": ["3.2"],
                "multiArchVersions": ["3.6", "3.8"],
                "prefetchOptimizations": [{"version": "3.6", "binaries": ["pause"]}]
            }
        ],
        "packages": [
            {
                "name": "cni-plugins",
                "downloadLocation": "/opt/cni/downloads",
                "downloadURIs": {
                    "default": {"current": {"versions": ["1.4.0"], "downloadURL": "https://acs-mirror.azureedge.net/cni-plugins/v${version}/binaries/cni-plugins-linux-${CPU_ARCH}-v${version}.tgz"}},
                    "mariner": {"current": {"versions": ["1.4.1"], "downloadURL": "https://example.net/${version}.tgz"}}
                }
            }
        ]
    }"#;

    #[test]
    fn test_parse_manifest() {
        let components = Components::parse(MANIFEST).unwrap();
        assert_eq!(components.container_images.len(), 1);
        let image = &components.container_images[0];
        assert_eq!(image.prefetch_optimizations[0].binaries, vec!["pause"]);

        let package = &components.packages[0];
        assert_eq!(package.download_location, "/opt/cni/downloads");
        assert!(package.download_uris.ubuntu.is_none());
        assert_eq!(
            package.default_release().unwrap().url_for("1.4.0", "amd64"),
            "https://acs-mirror.azureedge.net/cni-plugins/v1.4.0/binaries/cni-plugins-linux-amd64-v1.4.0.tgz"
        );
    }

    #[test]
    fn test_image_reference_substitutes_tag() {
        let image = ContainerImage {
            repo: "mcr.example.io/foo:*".to_string(),
            ..ContainerImage::default()
        };
        assert_eq!(image.reference("1.2").unwrap(), "mcr.example.io/foo:1.2");

        let bad = ContainerImage {
            repo: "mcr.example.io/foo:latest".to_string(),
            ..ContainerImage::default()
        };
        assert!(matches!(bad.reference("1.2"), Err(Error::MalformedRepo(_))));
    }

    #[test]
    fn test_tags_by_arch() {
        let components = Components::parse(MANIFEST).unwrap();
        let image = &components.container_images[0];
        assert_eq!(image.tags_for(true).collect::<Vec<_>>(), vec!["3.6", "3.8", "3.2"]);
        assert_eq!(image.tags_for(false).collect::<Vec<_>>(), vec!["3.6", "3.8"]);
    }

    #[test]
    fn test_rejects_repo_without_placeholder() {
        let raw = r#"{"containerImages": [{"downloadURL": "foo:1", "multiArchVersions": ["1"]}]}"#;
        let err = Components::parse(raw).unwrap_err();
        match err {
            Error::MalformedManifest { location, .. } => {
                assert_eq!(location, "containerImages[0].downloadURL")
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_rejects_package_without_default() {
        let raw = r#"{"packages": [{"name": "runc", "downloadURIs": {"ubuntu": {"current": {"versions": ["1.1"]}}}}]}"#;
        let err = Components::parse(raw).unwrap_err();
        assert!(err.to_string().contains("packages[0].downloadURIs.default.current"));
    }

    #[test]
    fn test_rejects_duplicate_package() {
        let package = r#"{"name": "oras", "downloadURIs": {"default": {"current": {"versions": ["1.0"], "downloadURL": "x"}}}}"#;
        let raw = format!(r#"{{"packages": [{}, {}]}}"#, package, package);
        let err = Components::parse(&raw).unwrap_err();
        assert!(err.to_string().contains("duplicate package \"oras\""));
    }

    #[test]
    fn test_syntax_error_reports_position() {
        let err = Components::parse("{\n  \"packages\": [,]\n}").unwrap_err();
        match err {
            Error::MalformedManifest { location, .. } => assert!(location.starts_with("line 2")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("components.json");
        fs::write(&path, MANIFEST).unwrap();
        let components = Components::load(&path).unwrap();
        assert_eq!(components.packages[0].name, "cni-plugins");

        let missing = Components::load(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(Error::MalformedManifest { .. })));
    }
}
