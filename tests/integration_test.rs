use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const COMPONENTS: &str = r#"{
  "containerImages": [
    {
      "downloadURL": "mcr.example.io/foo:*",
      "amd64OnlyVersions": ["3"],
      "multiArchVersions": ["1", "2"]
    }
  ],
  "packages": [
    {
      "name": "cni-plugins",
      "downloadLocation": "/opt/cni/downloads",
      "downloadURIs": {
        "default": {
          "current": {
            "versions": ["v1.4.0"],
            "downloadURL": "https://acs-mirror.example.net/cni-plugins/${version}/binaries/cni-plugins-linux-${CPU_ARCH}-${version}.tgz"
          }
        }
      }
    }
  ]
}"#;

const CLUSTER: &str = r#"{
  "location": "westus2",
  "properties": {
    "orchestratorProfile": {
      "orchestratorType": "Kubernetes",
      "orchestratorVersion": "1.14.0"
    },
    "masterProfile": {"count": 1, "dnsPrefix": "c1", "vmSize": "Standard_D2_v3"},
    "agentPoolProfiles": [
      {"name": "nodes", "count": 2, "vmSize": "Standard_NC6s_v3", "distro": "aks-ubuntu-containerd-22.04-gen2"}
    ]
  }
}"#;

fn nodebaker() -> Result<Command> {
    let mut cmd = Command::cargo_bin("nodebaker")?;
    cmd.env("OS_TYPE", "ubuntu");
    Ok(cmd)
}

fn write(dir: &TempDir, name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.path().join(name);
    fs::write(&path, content)?;
    Ok(path)
}

#[test]
fn test_version_command() -> Result<()> {
    let mut cmd = nodebaker()?;
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("nodebaker 0.1.0"));
    Ok(())
}

#[test]
fn test_version_subcommand() -> Result<()> {
    let mut cmd = nodebaker()?;
    cmd.arg("version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("nodebaker 0.1.0"));
    Ok(())
}

#[test]
fn test_help_command() -> Result<()> {
    let mut cmd = nodebaker()?;
    cmd.arg("--help");
    cmd.assert().success().stdout(predicate::str::contains(
        "Node bootstrapping config resolver and VHD component cacher",
    ));
    Ok(())
}

#[test]
fn test_cache_help() -> Result<()> {
    let mut cmd = nodebaker()?;
    cmd.arg("cache").arg("--help");
    cmd.assert().success().stdout(predicate::str::contains(
        "Pre-pull container images and download packages",
    ));
    Ok(())
}

#[test]
fn test_cache_requires_components_path() -> Result<()> {
    let mut cmd = nodebaker()?;
    cmd.env_remove("COMPONENTS_PATH").arg("cache").arg("--dry-run");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--components-path must be specified"));
    Ok(())
}

#[test]
fn test_cache_rejects_zero_parallelism() -> Result<()> {
    let dir = TempDir::new()?;
    let manifest = write(&dir, "components.json", COMPONENTS)?;
    let mut cmd = nodebaker()?;
    cmd.arg("cache")
        .arg("--components-path")
        .arg(&manifest)
        .arg("--parallelism")
        .arg("0")
        .arg("--dry-run");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--parallelism must be at least 1"));
    Ok(())
}

#[test]
fn test_cache_dry_run() -> Result<()> {
    let dir = TempDir::new()?;
    let manifest = write(&dir, "components.json", COMPONENTS)?;
    let mut cmd = nodebaker()?;
    cmd.arg("cache")
        .arg("--components-path")
        .arg(&manifest)
        .arg("--cli-tool")
        .arg("docker")
        .arg("--parallelism")
        .arg("2")
        .arg("--dry-run");
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("docker pull mcr.example.io/foo:1"))
        .stderr(predicate::str::contains("docker pull mcr.example.io/foo:2"))
        .stderr(predicate::str::contains("mkdir -p /opt/cni/downloads"));
    Ok(())
}

#[test]
fn test_cache_malformed_manifest() -> Result<()> {
    let dir = TempDir::new()?;
    let manifest = write(
        &dir,
        "components.json",
        r#"{"containerImages": [{"downloadURL": "mcr.example.io/foo"}]}"#,
    )?;
    let mut cmd = nodebaker()?;
    cmd.arg("cache")
        .arg("--components-path")
        .arg(&manifest)
        .arg("--cli-tool")
        .arg("docker")
        .arg("--dry-run");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("containerImages[0].downloadURL"));
    Ok(())
}

#[test]
fn test_cache_unknown_cli_tool() -> Result<()> {
    let dir = TempDir::new()?;
    let manifest = write(&dir, "components.json", COMPONENTS)?;
    let mut cmd = nodebaker()?;
    cmd.arg("cache")
        .arg("--components-path")
        .arg(&manifest)
        .arg("--cli-tool")
        .arg("podman")
        .arg("--dry-run");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized cli tool"));
    Ok(())
}

#[test]
fn test_gpu_command() -> Result<()> {
    let mut cmd = nodebaker()?;
    cmd.arg("gpu").arg("Standard_NC6s_v3");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"nvidiaEnabled\": true"))
        .stdout(predicate::str::contains("\"driverType\": \"cuda\""));
    Ok(())
}

#[test]
fn test_defaults_command() -> Result<()> {
    let dir = TempDir::new()?;
    let input = write(&dir, "cluster.json", CLUSTER)?;
    let mut cmd = nodebaker()?;
    cmd.arg("defaults").arg("--input").arg(&input);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"networkPlugin\": \"kubenet\""))
        .stdout(predicate::str::contains("\"dnsServiceIP\": \"10.0.0.10\""));
    Ok(())
}

#[test]
fn test_bootstrap_command() -> Result<()> {
    let dir = TempDir::new()?;
    let request = format!(
        r#"{{"containerService": {}, "agentPoolName": "nodes", "subscriptionID": "sub1", "tenantID": "t1"}}"#,
        CLUSTER
    );
    let input = write(&dir, "request.json", &request)?;
    let mut cmd = nodebaker()?;
    cmd.arg("bootstrap").arg("--input").arg(&input);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"cloudTargetEnv\": \"AzurePublicCloud\""))
        .stdout(predicate::str::contains("\"configGPUDriverIfNeeded\": true"))
        .stdout(predicate::str::contains("2204gen2containerd"));
    Ok(())
}

#[test]
fn test_bootstrap_unknown_pool() -> Result<()> {
    let dir = TempDir::new()?;
    let request = format!(
        r#"{{"containerService": {}, "agentPoolName": "missing"}}"#,
        CLUSTER
    );
    let input = write(&dir, "request.json", &request)?;
    let mut cmd = nodebaker()?;
    cmd.arg("bootstrap").arg("--input").arg(&input);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("agent pool \"missing\" not found"));
    Ok(())
}

#[test]
fn test_sig_unknown_distro() -> Result<()> {
    let mut cmd = nodebaker()?;
    cmd.arg("sig")
        .arg("--location")
        .arg("westus2")
        .arg("--distro")
        .arg("not-a-distro");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown distro"));
    Ok(())
}
