use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;


/// OS image family, generation and role of a node image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Distro {
    Ubuntu,
    Ubuntu1804,
    Ubuntu1804Gen2,
    AKSUbuntu1604,
    AKSUbuntu1804,
    AKSUbuntuGPU1804,
    AKSUbuntuGPU1804Gen2,
    AKSUbuntuContainerd1804,
    AKSUbuntuContainerd1804Gen2,
    AKSUbuntuGPUContainerd1804,
    AKSUbuntuGPUContainerd1804Gen2,
    AKSUbuntuFipsContainerd1804,
    AKSUbuntuFipsContainerd1804Gen2,
    AKSUbuntuFipsContainerd2004,
    AKSUbuntuFipsContainerd2004Gen2,
    AKSUbuntuFipsContainerd2204,
    AKSUbuntuFipsContainerd2204Gen2,
    AKSUbuntuContainerd2204,
    AKSUbuntuContainerd2204Gen2,
    AKSUbuntuContainerd2004CVMGen2,
    AKSUbuntuContainerd2204TLGen2,
    AKSUbuntuMinimalContainerd2204,
    AKSUbuntuMinimalContainerd2204Gen2,
    AKSUbuntuContainerd2404,
    AKSUbuntuContainerd2404Gen2,
    AKSUbuntuArm64Containerd2204Gen2,
    AKSUbuntuArm64Containerd2404Gen2,
    AKSUbuntuEdgeZoneContainerd1804,
    AKSUbuntuEdgeZoneContainerd1804Gen2,
    AKSUbuntuEdgeZoneContainerd2204,
    AKSUbuntuEdgeZoneContainerd2204Gen2,
    AKSCBLMarinerV1,
    AKSCBLMarinerV2,
    AKSCBLMarinerV2Gen2,
    AKSCBLMarinerV2FIPS,
    AKSCBLMarinerV2Gen2FIPS,
    AKSCBLMarinerV2Arm64Gen2,
    AKSAzureLinuxV2,
    AKSAzureLinuxV2Gen2,
    AKSAzureLinuxV3,
    AKSAzureLinuxV3Gen2,
    AKSAzureLinuxV3Gen2FIPS,
    AKSAzureLinuxV3Arm64Gen2,
    AKSWindows2019,
    AKSWindows2019Containerd,
    AKSWindows2022Containerd,
    AKSWindows2022ContainerdGen2,
    AKSWindows23H2,
    AKSWindows23H2Gen2,
    AKSWindows2019PIR,
    CustomizedImage,
    CustomizedWindowsOSImage,
    /// Deprecated alias of `aks-ubuntu-16.04`
    AKS1604Deprecated,
    /// Deprecated alias of `aks-ubuntu-18.04`
    AKS1804Deprecated,
}

use Distro::*;

const ALL_DISTROS: &[Distro] = &[
    Ubuntu,
    Ubuntu1804,
    Ubuntu1804Gen2,
    AKSUbuntu1604,
    AKSUbuntu1804,
    AKSUbuntuGPU1804,
    AKSUbuntuGPU1804Gen2,
    AKSUbuntuContainerd1804,
    AKSUbuntuContainerd1804Gen2,
    AKSUbuntuGPUContainerd1804,
    AKSUbuntuGPUContainerd1804Gen2,
    AKSUbuntuFipsContainerd1804,
    AKSUbuntuFipsContainerd1804Gen2,
    AKSUbuntuFipsContainerd2004,
    AKSUbuntuFipsContainerd2004Gen2,
    AKSUbuntuFipsContainerd2204,
    AKSUbuntuFipsContainerd2204Gen2,
    AKSUbuntuContainerd2204,
    AKSUbuntuContainerd2204Gen2,
    AKSUbuntuContainerd2004CVMGen2,
    AKSUbuntuContainerd2204TLGen2,
    AKSUbuntuMinimalContainerd2204,
    AKSUbuntuMinimalContainerd2204Gen2,
    AKSUbuntuContainerd2404,
    AKSUbuntuContainerd2404Gen2,
    AKSUbuntuArm64Containerd2204Gen2,
    AKSUbuntuArm64Containerd2404Gen2,
    AKSUbuntuEdgeZoneContainerd1804,
    AKSUbuntuEdgeZoneContainerd1804Gen2,
    AKSUbuntuEdgeZoneContainerd2204,
    AKSUbuntuEdgeZoneContainerd2204Gen2,
    AKSCBLMarinerV1,
    AKSCBLMarinerV2,
    AKSCBLMarinerV2Gen2,
    AKSCBLMarinerV2FIPS,
    AKSCBLMarinerV2Gen2FIPS,
    AKSCBLMarinerV2Arm64Gen2,
    AKSAzureLinuxV2,
    AKSAzureLinuxV2Gen2,
    AKSAzureLinuxV3,
    AKSAzureLinuxV3Gen2,
    AKSAzureLinuxV3Gen2FIPS,
    AKSAzureLinuxV3Arm64Gen2,
    AKSWindows2019,
    AKSWindows2019Containerd,
    AKSWindows2022Containerd,
    AKSWindows2022ContainerdGen2,
    AKSWindows23H2,
    AKSWindows23H2Gen2,
    AKSWindows2019PIR,
    CustomizedImage,
    CustomizedWindowsOSImage,
    AKS1604Deprecated,
    AKS1804Deprecated,
];

const CONTAINERD_DISTROS: &[Distro] = &[
    AKSUbuntuContainerd1804,
    AKSUbuntuContainerd1804Gen2,
    AKSUbuntuGPUContainerd1804,
    AKSUbuntuGPUContainerd1804Gen2,
    AKSUbuntuFipsContainerd1804,
    AKSUbuntuFipsContainerd1804Gen2,
    AKSUbuntuFipsContainerd2004,
    AKSUbuntuFipsContainerd2004Gen2,
    AKSUbuntuFipsContainerd2204,
    AKSUbuntuFipsContainerd2204Gen2,
    AKSUbuntuContainerd2204,
    AKSUbuntuContainerd2204Gen2,
    AKSUbuntuContainerd2004CVMGen2,
    AKSUbuntuContainerd2204TLGen2,
    AKSUbuntuMinimalContainerd2204,
    AKSUbuntuMinimalContainerd2204Gen2,
    AKSUbuntuContainerd2404,
    AKSUbuntuContainerd2404Gen2,
    AKSUbuntuArm64Containerd2204Gen2,
    AKSUbuntuArm64Containerd2404Gen2,
    AKSUbuntuEdgeZoneContainerd1804,
    AKSUbuntuEdgeZoneContainerd1804Gen2,
    AKSUbuntuEdgeZoneContainerd2204,
    AKSUbuntuEdgeZoneContainerd2204Gen2,
    AKSCBLMarinerV1,
    AKSCBLMarinerV2,
    AKSCBLMarinerV2Gen2,
    AKSCBLMarinerV2FIPS,
    AKSCBLMarinerV2Gen2FIPS,
    AKSCBLMarinerV2Arm64Gen2,
    AKSAzureLinuxV2,
    AKSAzureLinuxV2Gen2,
    AKSAzureLinuxV3,
    AKSAzureLinuxV3Gen2,
    AKSAzureLinuxV3Gen2FIPS,
    AKSAzureLinuxV3Arm64Gen2,
];

const GPU_DISTROS: &[Distro] = &[
    AKSUbuntuGPU1804,
    AKSUbuntuGPU1804Gen2,
    AKSUbuntuGPUContainerd1804,
    AKSUbuntuGPUContainerd1804Gen2,
];

const GEN2_DISTROS: &[Distro] = &[
    Ubuntu1804Gen2,
    AKSUbuntuGPU1804Gen2,
    AKSUbuntuContainerd1804Gen2,
    AKSUbuntuGPUContainerd1804Gen2,
    AKSUbuntuFipsContainerd1804Gen2,
    AKSUbuntuFipsContainerd2004Gen2,
    AKSUbuntuFipsContainerd2204Gen2,
    AKSUbuntuContainerd2204Gen2,
    AKSUbuntuContainerd2004CVMGen2,
    AKSUbuntuContainerd2204TLGen2,
    AKSUbuntuMinimalContainerd2204Gen2,
    AKSUbuntuContainerd2404Gen2,
    AKSUbuntuArm64Containerd2204Gen2,
    AKSUbuntuArm64Containerd2404Gen2,
    AKSUbuntuEdgeZoneContainerd1804Gen2,
    AKSUbuntuEdgeZoneContainerd2204Gen2,
    AKSCBLMarinerV2Gen2,
    AKSCBLMarinerV2Gen2FIPS,
    AKSCBLMarinerV2Arm64Gen2,
    AKSAzureLinuxV2Gen2,
    AKSAzureLinuxV3Gen2,
    AKSAzureLinuxV3Gen2FIPS,
    AKSAzureLinuxV3Arm64Gen2,
    AKSWindows2022ContainerdGen2,
    AKSWindows23H2Gen2,
];

const CBL_MARINER_DISTROS: &[Distro] = &[
    AKSCBLMarinerV1,
    AKSCBLMarinerV2,
    AKSCBLMarinerV2Gen2,
    AKSCBLMarinerV2FIPS,
    AKSCBLMarinerV2Gen2FIPS,
    AKSCBLMarinerV2Arm64Gen2,
    AKSAzureLinuxV2,
    AKSAzureLinuxV2Gen2,
    AKSAzureLinuxV3,
    AKSAzureLinuxV3Gen2,
    AKSAzureLinuxV3Gen2FIPS,
    AKSAzureLinuxV3Arm64Gen2,
];

const WINDOWS_SIG_DISTROS: &[Distro] = &[
    AKSWindows2019,
    AKSWindows2019Containerd,
    AKSWindows2022Containerd,
    AKSWindows2022ContainerdGen2,
    AKSWindows23H2,
    AKSWindows23H2Gen2,
    CustomizedWindowsOSImage,
];

const WINDOWS_PIR_DISTROS: &[Distro] = &[AKSWindows2019PIR];

const EDGE_ZONE_DISTROS: &[Distro] = &[
    AKSUbuntuEdgeZoneContainerd1804,
    AKSUbuntuEdgeZoneContainerd1804Gen2,
    AKSUbuntuEdgeZoneContainerd2204,
    AKSUbuntuEdgeZoneContainerd2204Gen2,
];

/// Docker based Linux images whose SIG version is frozen.
const LEGACY_DOCKER_DISTROS: &[Distro] = &[
    AKSUbuntu1604,
    AKSUbuntu1804,
    Ubuntu1804Gen2,
    AKSUbuntuGPU1804,
    AKSUbuntuGPU1804Gen2,
];

const ARM64_DISTROS: &[Distro] = &[
    AKSUbuntuArm64Containerd2204Gen2,
    AKSUbuntuArm64Containerd2404Gen2,
    AKSCBLMarinerV2Arm64Gen2,
    AKSAzureLinuxV3Arm64Gen2,
];

impl Distro {
    pub fn all() -> &'static [Distro] {
        ALL_DISTROS
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Ubuntu => "ubuntu",
            Ubuntu1804 => "ubuntu-18.04",
            Ubuntu1804Gen2 => "ubuntu-18.04-gen2",
            AKSUbuntu1604 => "aks-ubuntu-16.04",
            AKSUbuntu1804 => "aks-ubuntu-18.04",
            AKSUbuntuGPU1804 => "aks-ubuntu-gpu-18.04",
            AKSUbuntuGPU1804Gen2 => "aks-ubuntu-gpu-18.04-gen2",
            AKSUbuntuContainerd1804 => "aks-ubuntu-containerd-18.04",
            AKSUbuntuContainerd1804Gen2 => "aks-ubuntu-containerd-18.04-gen2",
            AKSUbuntuGPUContainerd1804 => "aks-ubuntu-gpu-containerd-18.04",
            AKSUbuntuGPUContainerd1804Gen2 => "aks-ubuntu-gpu-containerd-18.04-gen2",
            AKSUbuntuFipsContainerd1804 => "aks-ubuntu-fips-containerd-18.04",
            AKSUbuntuFipsContainerd1804Gen2 => "aks-ubuntu-fips-containerd-18.04-gen2",
            AKSUbuntuFipsContainerd2004 => "aks-ubuntu-fips-containerd-20.04",
            AKSUbuntuFipsContainerd2004Gen2 => "aks-ubuntu-fips-containerd-20.04-gen2",
            AKSUbuntuFipsContainerd2204 => "aks-ubuntu-fips-containerd-22.04",
            AKSUbuntuFipsContainerd2204Gen2 => "aks-ubuntu-fips-containerd-22.04-gen2",
            AKSUbuntuContainerd2204 => "aks-ubuntu-containerd-22.04",
            AKSUbuntuContainerd2204Gen2 => "aks-ubuntu-containerd-22.04-gen2",
            AKSUbuntuContainerd2004CVMGen2 => "aks-ubuntu-containerd-20.04-cvm-gen2",
            AKSUbuntuContainerd2204TLGen2 => "aks-ubuntu-containerd-22.04-tl-gen2",
            AKSUbuntuMinimalContainerd2204 => "aks-ubuntu-minimal-containerd-22.04",
            AKSUbuntuMinimalContainerd2204Gen2 => "aks-ubuntu-minimal-containerd-22.04-gen2",
            AKSUbuntuContainerd2404 => "aks-ubuntu-containerd-24.04",
            AKSUbuntuContainerd2404Gen2 => "aks-ubuntu-containerd-24.04-gen2",
            AKSUbuntuArm64Containerd2204Gen2 => "aks-ubuntu-arm64-containerd-22.04-gen2",
            AKSUbuntuArm64Containerd2404Gen2 => "aks-ubuntu-arm64-containerd-24.04-gen2",
            AKSUbuntuEdgeZoneContainerd1804 => "aks-ubuntu-edgezone-containerd-18.04",
            AKSUbuntuEdgeZoneContainerd1804Gen2 => "aks-ubuntu-edgezone-containerd-18.04-gen2",
            AKSUbuntuEdgeZoneContainerd2204 => "aks-ubuntu-edgezone-containerd-22.04",
            AKSUbuntuEdgeZoneContainerd2204Gen2 => "aks-ubuntu-edgezone-containerd-22.04-gen2",
            AKSCBLMarinerV1 => "aks-cblmariner-v1",
            AKSCBLMarinerV2 => "aks-cblmariner-v2",
            AKSCBLMarinerV2Gen2 => "aks-cblmariner-v2-gen2",
            AKSCBLMarinerV2FIPS => "aks-cblmariner-v2-fips",
            AKSCBLMarinerV2Gen2FIPS => "aks-cblmariner-v2-gen2-fips",
            AKSCBLMarinerV2Arm64Gen2 => "aks-cblmariner-v2-arm64-gen2",
            AKSAzureLinuxV2 => "aks-azurelinux-v2",
            AKSAzureLinuxV2Gen2 => "aks-azurelinux-v2-gen2",
            AKSAzureLinuxV3 => "aks-azurelinux-v3",
            AKSAzureLinuxV3Gen2 => "aks-azurelinux-v3-gen2",
            AKSAzureLinuxV3Gen2FIPS => "aks-azurelinux-v3-gen2-fips",
            AKSAzureLinuxV3Arm64Gen2 => "aks-azurelinux-v3-arm64-gen2",
            AKSWindows2019 => "aks-windows-2019",
            AKSWindows2019Containerd => "aks-windows-2019-containerd",
            AKSWindows2022Containerd => "aks-windows-2022-containerd",
            AKSWindows2022ContainerdGen2 => "aks-windows-2022-containerd-gen2",
            AKSWindows23H2 => "aks-windows-23H2",
            AKSWindows23H2Gen2 => "aks-windows-23H2-gen2",
            AKSWindows2019PIR => "aks-windows-2019-pir",
            CustomizedImage => "CustomizedImage",
            CustomizedWindowsOSImage => "CustomizedWindowsOSImage",
            AKS1604Deprecated => "aks",
            AKS1804Deprecated => "aks-1804",
        }
    }

    pub fn is_containerd(&self) -> bool {
        CONTAINERD_DISTROS.contains(self)
    }

    pub fn is_gpu(&self) -> bool {
        GPU_DISTROS.contains(self)
    }

    pub fn is_gen2(&self) -> bool {
        GEN2_DISTROS.contains(self)
    }

    /// CBL-Mariner and its Azure Linux successors.
    pub fn is_cbl_mariner(&self) -> bool {
        CBL_MARINER_DISTROS.contains(self)
    }

    pub fn is_windows_sig(&self) -> bool {
        WINDOWS_SIG_DISTROS.contains(self)
    }

    pub fn is_windows_pir(&self) -> bool {
        WINDOWS_PIR_DISTROS.contains(self)
    }

    pub fn is_edge_zone(&self) -> bool {
        EDGE_ZONE_DISTROS.contains(self)
    }

    pub fn is_legacy_docker(&self) -> bool {
        LEGACY_DOCKER_DISTROS.contains(self)
    }

    pub fn is_arm64(&self) -> bool {
        ARM64_DISTROS.contains(self)
    }

    /// Maps deprecated aliases onto the distro they stand for.
    pub fn canonical(self) -> Distro {
        match self {
            AKS1604Deprecated => AKSUbuntu1604,
            AKS1804Deprecated => AKSUbuntu1804,
            other => other,
        }
    }
}

impl fmt::Display for Distro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Distro {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_DISTROS
            .iter()
            .copied()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| format!("unknown distro {:?}", s))
    }
}

impl Serialize for Distro {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Distro {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
