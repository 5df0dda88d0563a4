//! VM SKU capability tables.
//!
//! Every lookup normalizes the SKU first (lowercase, trailing `_promo`
//! stripped) and then tests membership in a fixed table. A SKU may sit
//! in more than one table; memberships are independent.

use serde::Serialize;

mod network;

pub use network::accelerated_networking_supported;


const NVIDIA_470_CUDA_DRIVER_VERSION: &str = "cuda-470.82.01";
const NVIDIA_550_CUDA_DRIVER_VERSION: &str = "cuda-550.90.07";
const NVIDIA_535_GRID_DRIVER_VERSION: &str = "grid-535.161.08";

const AKS_GPU_CUDA_SHA: &str = "sha-b40b85";
const AKS_GPU_GRID_SHA: &str = "sha-7b2b12";

/// SKUs covered by the NVIDIA driver agreement.
const NVIDIA_ENABLED_SKUS: &[&str] = &[
    "standard_nc6",
    "standard_nc12",
    "standard_nc24",
    "standard_nc24r",
    "standard_nv6",
    "standard_nv12",
    "standard_nv12s_v3",
    "standard_nv24",
    "standard_nv24s_v3",
    "standard_nv24r",
    "standard_nv48s_v3",
    "standard_nd6s",
    "standard_nd12s",
    "standard_nd24s",
    "standard_nd24rs",
    "standard_nc6s_v2",
    "standard_nc12s_v2",
    "standard_nc24s_v2",
    "standard_nc24rs_v2",
    "standard_nc6s_v3",
    "standard_nc12s_v3",
    "standard_nc24s_v3",
    "standard_nc24rs_v3",
    "standard_nd40s_v3",
    "standard_nd40rs_v2",
    "standard_nc4as_t4_v3",
    "standard_nc8as_t4_v3",
    "standard_nc16as_t4_v3",
    "standard_nc64as_t4_v3",
    "standard_nd96asr_v4",
    "standard_nd112asr_a100_v4",
    "standard_nd120asr_a100_v4",
    "standard_nd96amsr_a100_v4",
    "standard_nd112amsr_a100_v4",
    "standard_nd120amsr_a100_v4",
    "standard_nc24ads_a100_v4",
    "standard_nc48ads_a100_v4",
    "standard_nc96ads_a100_v4",
    "standard_nc8ads_a10_v4",
    "standard_nc16ads_a10_v4",
    "standard_nc32ads_a10_v4",
    "standard_nv6ads_a10_v5",
    "standard_nv12ads_a10_v5",
    "standard_nv18ads_a10_v5",
    "standard_nv36ads_a10_v5",
    "standard_nv36adms_a10_v5",
    "standard_nv72ads_a10_v5",
    "standard_nd96ams_v4",
    "standard_nd96ams_a100_v4",
    "standard_nd96amsrf_a100_v4",
    "standard_nd96amsf_a100_v4",
    "standard_nd96isr_h100_v5",
    "standard_nd96is_h100_v5",
    "standard_nd96isrf_h100_v5",
    "standard_nd96isf_h100_v5",
    "standard_nc40ads_h100_v5",
    "standard_nc80adis_h100_v5",
];

/// GPU SKUs validated on CBL-Mariner / Azure Linux.
const MARINER_NVIDIA_ENABLED_SKUS: &[&str] = &[
    "standard_nc6s_v3",
    "standard_nc12s_v3",
    "standard_nc24s_v3",
    "standard_nc24rs_v3",
    "standard_nd40s_v3",
    "standard_nd40rs_v2",
    "standard_nc4as_t4_v3",
    "standard_nc8as_t4_v3",
    "standard_nc16as_t4_v3",
    "standard_nc64as_t4_v3",
];

/// Cards that only accept the converged (CUDA + GRID) driver.
const CONVERGED_GPU_DRIVER_SKUS: &[&str] = &[
    "standard_nv6ads_a10_v5",
    "standard_nv12ads_a10_v5",
    "standard_nv18ads_a10_v5",
    "standard_nv36ads_a10_v5",
    "standard_nv72ads_a10_v5",
    "standard_nv36adms_a10_v5",
    "standard_nc8ads_a10_v4",
    "standard_nc16ads_a10_v4",
    "standard_nc32ads_a10_v4",
];

/// 8-board sizes that need fabric manager for NVLink training.
const FABRIC_MANAGER_GPU_SKUS: &[&str] = &[
    "standard_nd96asr_v4",
    "standard_nd112asr_a100_v4",
    "standard_nd120asr_a100_v4",
    "standard_nd96amsr_a100_v4",
    "standard_nd112amsr_a100_v4",
    "standard_nd120amsr_a100_v4",
    "standard_nd96ams_a100_v4",
    "standard_nd96ams_v4",
    "standard_nd46s_h100_v5",
    "standard_nd48s_h100_v5",
    "standard_nd50s_h100_v5",
    "standard_nd92is_h100_v5",
    "standard_nd96is_h100_v5",
    "standard_nd100is_h100_v5",
    "standard_nd92isr_h100_v5",
    "standard_nd96isr_h100_v5",
    "standard_nd100isr_h100_v5",
];

/// NVIDIA driver family and version installed on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DriverVersion {
    Nvidia470Cuda,
    Nvidia550Cuda,
    Nvidia535Grid,
}

impl DriverVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverVersion::Nvidia470Cuda => NVIDIA_470_CUDA_DRIVER_VERSION,
            DriverVersion::Nvidia550Cuda => NVIDIA_550_CUDA_DRIVER_VERSION,
            DriverVersion::Nvidia535Grid => NVIDIA_535_GRID_DRIVER_VERSION,
        }
    }

    /// `cuda` or `grid`.
    pub fn driver_type(&self) -> &'static str {
        match self {
            DriverVersion::Nvidia535Grid => "grid",
            _ => "cuda",
        }
    }
}

impl std::fmt::Display for DriverVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercase and strip a trailing `_promo`.
pub fn normalize(sku: &str) -> String {
    let lower = sku.trim().to_lowercase();
    match lower.strip_suffix("_promo") {
        Some(stripped) => stripped.to_string(),
        None => lower,
    }
}

fn in_table(table: &[&str], sku: &str) -> bool {
    let sku = normalize(sku);
    table.contains(&sku.as_str())
}

pub fn is_nvidia_enabled(sku: &str) -> bool {
    in_table(NVIDIA_ENABLED_SKUS, sku)
}

pub fn is_mariner_nvidia_enabled(sku: &str) -> bool {
    in_table(MARINER_NVIDIA_ENABLED_SKUS, sku)
}

pub fn uses_converged_driver(sku: &str) -> bool {
    in_table(CONVERGED_GPU_DRIVER_SKUS, sku)
}

pub fn needs_fabric_manager(sku: &str) -> bool {
    in_table(FABRIC_MANAGER_GPU_SKUS, sku)
}

/// The original K80 NC series: `standard_nc*` without a `_v` generation.
pub fn is_standard_nc_v1(sku: &str) -> bool {
    let sku = normalize(sku);
    sku.starts_with("standard_nc") && !sku.contains("_v")
}

/// Converged SKUs take precedence over the NCv1 check.
pub fn driver_version(sku: &str) -> DriverVersion {
    if uses_converged_driver(sku) {
        DriverVersion::Nvidia535Grid
    } else if is_standard_nc_v1(sku) {
        DriverVersion::Nvidia470Cuda
    } else {
        DriverVersion::Nvidia550Cuda
    }
}

/// Tag of the AKS GPU driver image for this SKU.
pub fn gpu_image_sha(sku: &str) -> &'static str {
    if uses_converged_driver(sku) {
        AKS_GPU_GRID_SHA
    } else {
        AKS_GPU_CUDA_SHA
    }
}

pub fn use_windows_cuda_driver(sku: &str) -> bool {
    let sku = sku.to_lowercase();
    sku.contains("_nc") || sku.contains("_nd")
}

pub fn use_windows_grid_driver(sku: &str) -> bool {
    sku.to_lowercase().contains("_nv")
}

/// A node is MIG-partitioned when it carries a GPU instance profile.
pub fn is_mig_node(gpu_instance_profile: &str) -> bool {
    !gpu_instance_profile.is_empty()
}

/// Comma separated list of every NVIDIA enabled SKU, sorted.
pub fn comma_separated_gpu_skus() -> String {
    let mut skus = NVIDIA_ENABLED_SKUS.to_vec();
    skus.sort_unstable();
    skus.join(",")
}

/// Full classification of a SKU, as printed by `nodebaker gpu`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GpuProfile {
    pub sku: String,
    pub nvidia_enabled: bool,
    pub mariner_nvidia_enabled: bool,
    pub converged_driver: bool,
    pub fabric_manager: bool,
    pub standard_nc_v1: bool,
    pub driver_version: String,
    pub driver_type: String,
    pub image_sha: String,
}

impl GpuProfile {
    pub fn for_sku(sku: &str) -> Self {
        let driver = driver_version(sku);
        Self {
            sku: normalize(sku),
            nvidia_enabled: is_nvidia_enabled(sku),
            mariner_nvidia_enabled: is_mariner_nvidia_enabled(sku),
            converged_driver: uses_converged_driver(sku),
            fabric_manager: needs_fabric_manager(sku),
            standard_nc_v1: is_standard_nc_v1(sku),
            driver_version: driver.as_str().to_string(),
            driver_type: driver.driver_type().to_string(),
            image_sha: gpu_image_sha(sku).to_string(),
        }
    }
}
