use std::env;
use std::fmt;

/// Environment variable naming the OS family of the VHD being built.
pub const OS_TYPE_ENV: &str = "OS_TYPE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsType {
    Ubuntu,
    Mariner,
}

impl OsType {
    /// `mariner` in any case selects Mariner; anything else is Ubuntu.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("mariner") => OsType::Mariner,
            _ => OsType::Ubuntu,
        }
    }
}

impl fmt::Display for OsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OsType::Ubuntu => "ubuntu",
            OsType::Mariner => "mariner",
        })
    }
}

/// The build machine: its OS family and CPU architecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    pub os: OsType,
    /// Architecture as it appears in download URLs (`amd64`, `arm64`).
    pub arch: String,
}

impl Host {
    pub fn new(os: OsType, arch: impl Into<String>) -> Self {
        Self {
            os,
            arch: arch.into(),
        }
    }

    /// Reads `OS_TYPE` and the architecture this process was built for.
    pub fn detect() -> Self {
        let os = OsType::from_env_value(env::var(OS_TYPE_ENV).ok().as_deref());
        Self::new(os, download_arch(env::consts::ARCH))
    }

    pub fn is_amd64(&self) -> bool {
        self.arch == "amd64"
    }

    pub fn is_arm(&self) -> bool {
        self.arch.starts_with("arm")
    }

    pub fn is_mariner(&self) -> bool {
        self.os == OsType::Mariner
    }
}

/// Maps a Rust target arch onto the name used by release artifacts.
pub fn download_arch(arch: &str) -> &str {
    match arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        "powerpc64" => "ppc64le",
        other => other,
    }
}
