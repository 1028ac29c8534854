//! Host platform detection for asset selection

use std::fmt;

use log::{debug, warn};
use once_cell::sync::OnceCell;

use crate::error::{Result, SetupError};

/// Sentinel architecture request meaning "use the host CPU"
pub const AUTO_ARCH: &str = "auto";

/// Operating system family a release asset is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsFamily {
    Windows,
    MacOs,
    Linux,
}

impl OsFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            OsFamily::Windows => "windows",
            OsFamily::MacOs => "macos",
            OsFamily::Linux => "linux",
        }
    }

    /// Map a `std::env::consts::OS` style name to a family
    pub fn from_os_name(name: &str) -> Option<Self> {
        match name {
            "windows" => Some(OsFamily::Windows),
            "macos" => Some(OsFamily::MacOs),
            "linux" => Some(OsFamily::Linux),
            _ => None,
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, OsFamily::Windows)
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architectures with published assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    X64,
    X86,
    Arm64,
    Arm32,
}

impl Architecture {
    pub const ALL: [Architecture; 4] = [
        Architecture::X64,
        Architecture::X86,
        Architecture::Arm64,
        Architecture::Arm32,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::X64 => "x64",
            Architecture::X86 => "x86",
            Architecture::Arm64 => "arm64",
            Architecture::Arm32 => "arm32",
        }
    }

    /// Parse a user-facing architecture name (case-insensitive)
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(name))
    }

    /// Map a raw CPU name (`std::env::consts::ARCH` style) onto the four-way enum.
    ///
    /// Unknown CPUs map to `X64` instead of failing. Most hosted runners are
    /// x64, and a wrong guess still fails later with a clear asset error.
    pub fn from_cpu_name(raw: &str) -> Self {
        match raw {
            "x86_64" | "amd64" => Architecture::X64,
            "x86" | "i386" | "i586" | "i686" => Architecture::X86,
            "aarch64" | "arm64" => Architecture::Arm64,
            "arm" | "armv7" | "armv7l" => Architecture::Arm32,
            other => {
                warn!("Unrecognised CPU architecture '{}', assuming x64", other);
                Architecture::X64
            }
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target an asset is selected for.
///
/// `arch` is kept as the requested string: explicit requests are not validated
/// here, the asset table rejects combinations it does not publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformTarget {
    pub os: OsFamily,
    pub arch: String,
}

impl PlatformTarget {
    pub fn new(os: OsFamily, arch: impl Into<String>) -> Self {
        Self {
            os,
            arch: arch.into(),
        }
    }
}

impl fmt::Display for PlatformTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

/// Host OS family, detected once
static HOST_OS: OnceCell<OsFamily> = OnceCell::new();

fn host_os() -> Result<OsFamily> {
    HOST_OS
        .get_or_try_init(|| {
            OsFamily::from_os_name(std::env::consts::OS).ok_or_else(|| {
                SetupError::UnsupportedPlatform {
                    os: std::env::consts::OS.to_string(),
                }
            })
        })
        .copied()
}

/// Detect the target for the running host
pub fn detect(requested_arch: &str) -> Result<PlatformTarget> {
    let os = host_os()?;
    let target = detect_with(requested_arch, os, std::env::consts::ARCH);
    debug!("Detected platform target {}", target);
    Ok(target)
}

/// Detection against an explicit host, used by `detect` and tests
pub fn detect_with(requested_arch: &str, os: OsFamily, host_cpu: &str) -> PlatformTarget {
    if requested_arch.eq_ignore_ascii_case(AUTO_ARCH) {
        PlatformTarget::new(os, Architecture::from_cpu_name(host_cpu).as_str())
    } else {
        PlatformTarget::new(os, requested_arch)
    }
}
