#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::components::{ContainerImage, Package};
    use crate::exec::{Command, DryRunBackend, Output};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    fn amd64() -> Host {
        Host::new(OsType::Ubuntu, "amd64")
    }

    fn arm64() -> Host {
        Host::new(OsType::Ubuntu, "arm64")
    }

    fn foo_image() -> ContainerImage {
        ContainerImage {
            repo: "mcr.example.io/foo:*".to_string(),
            multi_arch_tags: vec!["1".to_string(), "2".to_string()],
            amd64_only_tags: vec!["3".to_string()],
            ..ContainerImage::default()
        }
    }

    fn package(json: &str) -> Package {
        serde_json::from_str(json).unwrap()
    }

    fn cni_plugins() -> Package {
        package(
            r#"{
                "name": "cni-plugins",
                "downloadLocation": "/opt/cni/downloads",
                "downloadURIs": {
                    "default": {"current": {
                        "versions": ["v1.4.0"],
                        "downloadURL": "https://acs-mirror.example.net/cni-plugins/${version}/binaries/cni-plugins-linux-${CPU_ARCH}-${version}.tgz"
                    }}
                }
            }"#,
        )
    }

    fn runc(versions: &str) -> Package {
        package(&format!(
            r#"{{
                "name": "runc",
                "downloadLocation": "/opt/runc/downloads",
                "downloadURIs": {{"default": {{"current": {{"versions": {}, "downloadURL": ""}}}}}}
            }}"#,
            versions
        ))
    }

    async fn dry_run_cacher(tool: CliTool, host: Host) -> (Cacher, Arc<DryRunBackend>) {
        let backend = Arc::new(DryRunBackend::new());
        let cacher = Cacher::new(tool, 2, backend.clone(), host).await.unwrap();
        (cacher, backend)
    }

    /// Fails every command whose argv mentions `needle`.
    struct FailingBackend {
        needle: &'static str,
        executed: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Backend for FailingBackend {
        async fn execute(&self, cmd: &Command) -> Result<Output> {
            let line = cmd.argv_line();
            self.executed.lock().unwrap().push(line.clone());
            let exit_code = if line.contains(self.needle) { 1 } else { 0 };
            Ok(Output {
                exit_code,
                ..Output::default()
            })
        }
    }

    /// Fires the token from inside the first command it runs.
    struct CancellingBackend {
        cancel: CancellationToken,
        executed: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Backend for CancellingBackend {
        async fn execute(&self, cmd: &Command) -> Result<Output> {
            self.executed.lock().unwrap().push(cmd.argv_line());
            self.cancel.cancel();
            Ok(Output::default())
        }
    }

    /// Fires the token from inside the first command it runs, then fails
    /// every attempt.
    struct CancelThenFailBackend {
        cancel: CancellationToken,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Backend for CancelThenFailBackend {
        async fn execute(&self, _cmd: &Command) -> Result<Output> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.cancel.cancel();
            Ok(Output {
                exit_code: 1,
                ..Output::default()
            })
        }
    }

    /// Tracks how many commands run at the same time.
    #[derive(Default)]
    struct CountingBackend {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Backend for CountingBackend {
        async fn execute(&self, _cmd: &Command) -> Result<Output> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(Output::default())
        }
    }

    fn many_tags(count: usize) -> ContainerImage {
        ContainerImage {
            repo: "mcr.example.io/bar:*".to_string(),
            multi_arch_tags: (0..count).map(|i| i.to_string()).collect(),
            ..ContainerImage::default()
        }
    }

    #[test]
    fn test_os_type_from_env_value() {
        assert_eq!(OsType::from_env_value(Some("mariner")), OsType::Mariner);
        assert_eq!(OsType::from_env_value(Some("MARINER")), OsType::Mariner);
        assert_eq!(OsType::from_env_value(Some("ubuntu")), OsType::Ubuntu);
        assert_eq!(OsType::from_env_value(Some("flatcar")), OsType::Ubuntu);
        assert_eq!(OsType::from_env_value(None), OsType::Ubuntu);
    }

    #[test]
    fn test_download_arch() {
        assert_eq!(host::download_arch("x86_64"), "amd64");
        assert_eq!(host::download_arch("aarch64"), "arm64");
        assert!(arm64().is_arm());
        assert!(!arm64().is_amd64());
        assert!(amd64().is_amd64());
    }

    #[test]
    fn test_cli_tool_from_str() {
        assert_eq!("ctr".parse::<CliTool>().unwrap(), CliTool::Ctr);
        assert_eq!("Docker".parse::<CliTool>().unwrap(), CliTool::Docker);
        assert_eq!("crictl".parse::<CliTool>().unwrap(), CliTool::Crictl);
        assert!(matches!("podman".parse::<CliTool>(), Err(Error::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_dry_run_pulls_every_tag() {
        let (cacher, backend) = dry_run_cacher(CliTool::Crictl, amd64()).await;
        let components = Components {
            container_images: vec![foo_image()],
            packages: vec![],
        };
        cacher
            .cache(&components, &CancellationToken::new())
            .await
            .unwrap();

        let mut executed = backend.executed();
        executed.sort();
        assert_eq!(
            executed,
            vec![
                "timeout 1200 crictl pull mcr.example.io/foo:1",
                "timeout 1200 crictl pull mcr.example.io/foo:2",
                "timeout 1200 crictl pull mcr.example.io/foo:3",
            ]
        );
    }

    #[tokio::test]
    async fn test_arm_skips_amd64_only_tags() {
        let (cacher, backend) = dry_run_cacher(CliTool::Docker, arm64()).await;
        let components = Components {
            container_images: vec![foo_image()],
            packages: vec![],
        };
        cacher
            .cache(&components, &CancellationToken::new())
            .await
            .unwrap();

        let executed = backend.executed();
        assert_eq!(executed.len(), 2);
        assert!(executed.iter().all(|line| !line.ends_with("foo:3")));
    }

    #[tokio::test]
    async fn test_ctr_creates_namespace_first() {
        let (cacher, backend) = dry_run_cacher(CliTool::Ctr, amd64()).await;
        assert_eq!(backend.executed(), vec!["ctr namespace create k8s.io"]);

        let components = Components {
            container_images: vec![foo_image()],
            packages: vec![],
        };
        cacher
            .cache(&components, &CancellationToken::new())
            .await
            .unwrap();
        let executed = backend.executed();
        assert_eq!(executed.len(), 4);
        assert!(executed[1..]
            .iter()
            .all(|line| line.starts_with("timeout 1200 ctr --namespace k8s.io image pull mcr.example.io/foo:")));
    }

    #[tokio::test]
    async fn test_ctr_init_failure_aborts_construction() {
        let backend = Arc::new(FailingBackend {
            needle: "namespace create",
            executed: Mutex::new(Vec::new()),
        });
        let result = Cacher::new(CliTool::Ctr, 2, backend, amd64()).await;
        assert!(matches!(result, Err(Error::CommandFailed { .. })));
    }

    #[tokio::test]
    async fn test_malformed_repo_is_rejected() {
        let (cacher, _) = dry_run_cacher(CliTool::Docker, amd64()).await;
        let components = Components {
            container_images: vec![ContainerImage {
                repo: "mcr.example.io/foo".to_string(),
                multi_arch_tags: vec!["1".to_string()],
                ..ContainerImage::default()
            }],
            packages: vec![],
        };
        let err = cacher
            .cache(&components, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err
            .constituents()
            .iter()
            .any(|e| matches!(e, Error::MalformedRepo(_))));
    }

    #[tokio::test]
    async fn test_generic_tarball_download() {
        let (cacher, backend) = dry_run_cacher(CliTool::Docker, amd64()).await;
        let components = Components {
            container_images: vec![],
            packages: vec![cni_plugins()],
        };
        cacher
            .cache(&components, &CancellationToken::new())
            .await
            .unwrap();

        let tarball = "/opt/cni/downloads/cni-plugins-linux-amd64-v1.4.0.tgz";
        assert_eq!(
            backend.executed(),
            vec![
                "mkdir -p /opt/cni/downloads".to_string(),
                format!(
                    "timeout 60 curl -fsSLv https://acs-mirror.example.net/cni-plugins/v1.4.0/binaries/cni-plugins-linux-amd64-v1.4.0.tgz -o {}",
                    tarball
                ),
                format!("tar -tzf {}", tarball),
            ]
        );
    }

    #[tokio::test]
    async fn test_os_specific_uri_preferred() {
        let pkg = package(
            r#"{
                "name": "containerd-wasm-shims",
                "downloadLocation": "/usr/local/bin",
                "downloadURIs": {
                    "default": {"current": {"versions": ["0.3.0"], "downloadURL": "https://example.net/default/${version}/shim"}},
                    "mariner": {"current": {"versions": ["0.3.1"], "downloadURL": "https://example.net/mariner/${version}/shim"}}
                }
            }"#,
        );
        let mariner = PackageInstaller::new(
            Arc::new(DryRunBackend::new()),
            Host::new(OsType::Mariner, "amd64"),
        );
        assert_eq!(mariner.release(&pkg).unwrap().versions, vec!["0.3.1"]);

        let backend = Arc::new(DryRunBackend::new());
        let ubuntu = PackageInstaller::new(backend.clone(), amd64());
        assert_eq!(ubuntu.release(&pkg).unwrap().versions, vec!["0.3.0"]);
        ubuntu.install(&pkg).await.unwrap();
        assert_eq!(
            backend.executed()[1],
            "timeout 60 curl -fsSLv https://example.net/default/0.3.0/shim -o /usr/local/bin/shim"
        );
    }

    #[tokio::test]
    async fn test_runc_installs_through_apt_pipeline() {
        let backend = Arc::new(DryRunBackend::new());
        let installer = PackageInstaller::new(backend.clone(), amd64());
        installer.install(&runc(r#"["1.1.12"]"#)).await.unwrap();

        let executed = backend.executed();
        assert_eq!(executed.len(), 1);
        assert!(executed[0].starts_with("timeout 300 bash -c dpkg --configure -a --force-confdef | apt-get install"));
        assert!(executed[0].ends_with("-y moby-runc=1.1.12"));
    }

    #[tokio::test]
    async fn test_runc_no_ops() {
        let backend = Arc::new(DryRunBackend::new());
        PackageInstaller::new(backend.clone(), Host::new(OsType::Mariner, "amd64"))
            .install(&runc(r#"["1.1.12"]"#))
            .await
            .unwrap();
        PackageInstaller::new(backend.clone(), arm64())
            .install(&runc(r#"["1.0.0-rc95"]"#))
            .await
            .unwrap();
        assert!(backend.executed().is_empty());

        let err = PackageInstaller::new(backend, amd64())
            .install(&runc(r#"["1.1.12", "1.1.13"]"#))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_apt_install_repairs_between_attempts() {
        let pipeline = packages::apt_get_install("moby-runc=1.1.12").unwrap();
        let cmd = pipeline.as_command().unwrap();
        let repair = cmd.config().on_retryable_failure.as_ref().unwrap();
        assert!(repair.raw().contains("apt-get -o DPkg::Lock::Timeout=-1 update"));
        assert_eq!(cmd.config().max_retries, 10);
    }

    #[tokio::test]
    async fn test_kubernetes_binaries_versioned_names() {
        let pkg = package(
            r#"{
                "name": "kubernetes-binaries",
                "downloadLocation": "/usr/local/bin",
                "downloadURIs": {"default": {"current": {
                    "versions": ["1.29.2"],
                    "downloadURL": "https://example.net/kubernetes/v${version}/binaries/kubernetes-node-linux-${CPU_ARCH}.tar.gz"
                }}}
            }"#,
        );
        let backend = Arc::new(DryRunBackend::new());
        PackageInstaller::new(backend.clone(), arm64())
            .install(&pkg)
            .await
            .unwrap();

        let executed = backend.executed();
        let tarball = "/usr/local/bin/kubernetes-node-linux-arm64.tar.gz";
        assert!(executed[1].contains("kubernetes/v1.29.2/binaries/kubernetes-node-linux-arm64.tar.gz"));
        assert_eq!(
            executed[3],
            format!(
                "tar --transform=s|.*|&-1.29.2| --show-transformed-names -xzvf {} --strip-components=3 -C /usr/local/bin kubernetes/node/bin/kubelet kubernetes/node/bin/kubectl",
                tarball
            )
        );
        assert_eq!(executed[4], format!("rm -rf {}", tarball));
    }

    #[tokio::test]
    async fn test_azure_cni_extracts_per_version() {
        let pkg = package(
            r#"{
                "name": "azure-cni",
                "downloadLocation": "/opt/cni/downloads",
                "downloadURIs": {"default": {"current": {
                    "versions": ["1.5.28"],
                    "downloadURL": "https://example.net/azure-cni/v${version}/binaries/azure-vnet-cni-linux-${CPU_ARCH}-v${version}.tgz"
                }}}
            }"#,
        );
        let backend = Arc::new(DryRunBackend::new());
        PackageInstaller::new(backend.clone(), amd64())
            .install(&pkg)
            .await
            .unwrap();

        let executed = backend.executed();
        let tarball = "/opt/cni/downloads/azure-vnet-cni-linux-amd64-v1.5.28.tgz";
        assert!(executed.contains(&"mkdir -p /opt/cni/downloads/1.5.28".to_string()));
        assert!(executed.contains(&format!("tar -xzf {} -C /opt/cni/downloads/1.5.28", tarball)));
        assert_eq!(executed.last().unwrap(), &format!("rm -rf {}", tarball));
    }

    #[tokio::test]
    async fn test_oras_uses_staging_directory() {
        let pkg = package(
            r#"{
                "name": "oras",
                "downloadLocation": "/usr/local/bin",
                "downloadURIs": {"default": {"current": {
                    "versions": ["1.2.0"],
                    "downloadURL": "https://example.net/oras/v${version}/oras_${version}_linux_${CPU_ARCH}.tar.gz"
                }}}
            }"#,
        );
        let backend = Arc::new(DryRunBackend::new());
        PackageInstaller::new(backend.clone(), amd64())
            .install(&pkg)
            .await
            .unwrap();

        let executed = backend.executed();
        assert_eq!(executed[0], "mkdir -p /opt/oras/downloads");
        assert!(executed.contains(
            &"tar -xzf /opt/oras/downloads/oras_1.2.0_linux_amd64.tar.gz -C /usr/local/bin".to_string()
        ));
        assert_eq!(executed.last().unwrap(), "rm -rf /opt/oras/downloads");
    }

    #[tokio::test]
    async fn test_package_failures_are_aggregated() {
        let mut broken = cni_plugins();
        broken.name = "cri-tools".to_string();
        broken.download_location = "/broken".to_string();

        let backend = Arc::new(FailingBackend {
            needle: "/broken",
            executed: Mutex::new(Vec::new()),
        });
        let cacher = Cacher::new(CliTool::Docker, 1, backend.clone(), amd64())
            .await
            .unwrap();
        let components = Components {
            container_images: vec![],
            packages: vec![broken, cni_plugins()],
        };
        let err = cacher
            .cache(&components, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.constituents().len(), 1);
        let executed = backend.executed.lock().unwrap().clone();
        // the healthy package still ran after the broken one
        assert!(executed.iter().any(|line| line.contains("/opt/cni/downloads")));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let (cacher, backend) = dry_run_cacher(CliTool::Docker, amd64()).await;
        let cancel = CancellationToken::new();
        cancel.cancel();
        let components = Components {
            container_images: vec![foo_image()],
            packages: vec![cni_plugins()],
        };
        let err = cacher.cache(&components, &cancel).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));
        assert!(backend.executed().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_stops_dispatch_after_in_flight_pull() {
        let cancel = CancellationToken::new();
        let backend = Arc::new(CancellingBackend {
            cancel: cancel.clone(),
            executed: Mutex::new(Vec::new()),
        });
        let cacher = Cacher::new(CliTool::Docker, 1, backend.clone(), amd64())
            .await
            .unwrap();
        let components = Components {
            container_images: vec![foo_image()],
            packages: vec![cni_plugins()],
        };
        let err = cacher.cache(&components, &cancel).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));
        assert_eq!(backend.executed.lock().unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallelism_bounds_concurrent_pulls() {
        let backend = Arc::new(CountingBackend::default());
        let installer = ImageInstaller::new(CliTool::Docker, backend.clone(), 3)
            .await
            .unwrap();
        installer
            .install(&[many_tags(12)], &amd64(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(backend.calls.load(Ordering::SeqCst), 12);
        let max = backend.max_in_flight.load(Ordering::SeqCst);
        assert!(max <= 3, "{} pulls ran at once", max);
        assert!(max > 1, "pulls never overlapped");
    }

    #[tokio::test]
    async fn test_parallelism_does_not_change_schedule() {
        let components = Components {
            container_images: vec![foo_image(), many_tags(5)],
            packages: vec![cni_plugins()],
        };
        let mut schedules = Vec::new();
        for parallelism in [1, 4] {
            let backend = Arc::new(DryRunBackend::new());
            let cacher = Cacher::new(CliTool::Crictl, parallelism, backend.clone(), amd64())
                .await
                .unwrap();
            cacher
                .cache(&components, &CancellationToken::new())
                .await
                .unwrap();
            let mut executed = backend.executed();
            executed.sort();
            schedules.push(executed);
        }
        assert_eq!(schedules[0].len(), 11);
        assert_eq!(schedules[0], schedules[1]);
    }

    #[tokio::test]
    async fn test_cancel_stops_retrying_in_flight_pull() {
        let cancel = CancellationToken::new();
        let backend = Arc::new(CancelThenFailBackend {
            cancel: cancel.clone(),
            calls: AtomicUsize::new(0),
        });
        let cacher = Cacher::new(CliTool::Docker, 1, backend.clone(), amd64())
            .await
            .unwrap();
        let components = Components {
            container_images: vec![foo_image()],
            packages: vec![],
        };
        let err = cacher.cache(&components, &cancel).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }
}
