use crate::cacher::{CliTool, DEFAULT_PARALLELISM};
use crate::error::{Error, Result};
use crate::sig::{SigConfig, SigGalleryConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};


#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// VHD cacher defaults
    #[serde(default)]
    pub cacher: CacherSettings,

    /// Bootstrap resolver settings
    #[serde(default)]
    pub bootstrap: BootstrapSettings,

    /// Shared image gallery placement
    #[serde(default)]
    pub sig: SigSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacherSettings {
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,

    /// `ctr`, `crictl`, `docker` or `auto`
    #[serde(default = "default_cli_tool")]
    pub cli_tool: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BootstrapSettings {
    /// Directory of `<name>.yaml` override files
    pub overrides_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SigSettings {
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub subscription_id: String,
    /// Keyed by OS SKU, e.g. `AKSUbuntu`
    #[serde(default)]
    pub galleries: HashMap<String, GallerySettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GallerySettings {
    pub gallery_name: String,
    pub resource_group: String,
}

fn default_parallelism() -> usize {
    DEFAULT_PARALLELISM
}

fn default_cli_tool() -> String {
    "ctr".to_string()
}

impl Default for CacherSettings {
    fn default() -> Self {
        Self {
            parallelism: default_parallelism(),
            cli_tool: default_cli_tool(),
        }
    }
}

impl SigSettings {
    /// The configured galleries, or the public cloud ones when the section
    /// is left empty.
    pub fn sig_config(&self) -> SigConfig {
        if self.tenant_id.is_empty() && self.subscription_id.is_empty() && self.galleries.is_empty() {
            return SigConfig::azure_public();
        }
        let galleries = self
            .galleries
            .iter()
            .map(|(os_sku, g)| {
                (
                    os_sku.clone(),
                    SigGalleryConfig {
                        gallery_name: g.gallery_name.clone(),
                        resource_group: g.resource_group.clone(),
                    },
                )
            })
            .collect::<HashMap<_, _>>();
        SigConfig {
            tenant_id: self.tenant_id.clone(),
            subscription_id: self.subscription_id.clone(),
            galleries: (!galleries.is_empty()).then_some(galleries),
        }
    }
}

impl Config {
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("nodebaker").join("config.toml"))
    }

    pub fn load() -> anyhow::Result<Self> {
        if let Some(config_path) = Self::path() {
            if config_path.exists() {
                return Self::load_from(&config_path);
            }
        }
        Ok(Config::default())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Settings of one cacher run, after flags and the config file are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacherConfig {
    pub components_path: PathBuf,
    pub parallelism: usize,
    pub cli_tool: String,
    pub dry_run: bool,
}

impl CacherConfig {
    pub fn validate(&self) -> Result<()> {
        if self.components_path.as_os_str().is_empty() {
            return Err(Error::InvalidConfig(
                "--components-path must be specified".to_string(),
            ));
        }
        if self.parallelism < 1 {
            return Err(Error::InvalidConfig(
                "--parallelism must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// `auto` picks the first tool on `PATH`.
    pub fn resolve_cli_tool(&self) -> Result<CliTool> {
        if self.cli_tool.eq_ignore_ascii_case("auto") {
            return CliTool::detect().ok_or_else(|| {
                Error::InvalidConfig("no container cli tool (ctr, crictl, docker) found on PATH".to_string())
            });
        }
        self.cli_tool.parse()
    }
}
