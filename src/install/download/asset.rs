//! Asset selection by platform filename pattern

use log::debug;
use regex::{Regex, RegexBuilder};

use super::github::{AssetRecord, ReleaseRecord};
use super::platform::{Architecture, OsFamily, PlatformTarget};
use crate::error::{Result, SetupError};

/// Published asset names. Each pattern has a single `*` standing in for the
/// version token. There is no x86 build outside Windows and no arm32 build
/// outside Linux.
const ASSET_PATTERNS: &[(OsFamily, Architecture, &str)] = &[
    (OsFamily::Windows, Architecture::X64, "PowerShell-*-win-x64.zip"),
    (OsFamily::Windows, Architecture::X86, "PowerShell-*-win-x86.zip"),
    (OsFamily::Windows, Architecture::Arm64, "PowerShell-*-win-arm64.zip"),
    (OsFamily::MacOs, Architecture::X64, "powershell-*-osx-x64.tar.gz"),
    (OsFamily::MacOs, Architecture::Arm64, "powershell-*-osx-arm64.tar.gz"),
    (OsFamily::Linux, Architecture::X64, "powershell-*-linux-x64.tar.gz"),
    (OsFamily::Linux, Architecture::Arm64, "powershell-*-linux-arm64.tar.gz"),
    (OsFamily::Linux, Architecture::Arm32, "powershell-*-linux-arm32.tar.gz"),
];

/// Architectures with an asset for `os`, in table order
pub fn supported_architectures(os: OsFamily) -> Vec<Architecture> {
    ASSET_PATTERNS
        .iter()
        .filter(|(o, _, _)| *o == os)
        .map(|(_, a, _)| *a)
        .collect()
}

/// Filename pattern for a target
pub fn pattern_for(target: &PlatformTarget) -> Result<&'static str> {
    let supported = supported_architectures(target.os);
    if supported.is_empty() {
        return Err(SetupError::UnsupportedOs {
            os: target.os.to_string(),
        });
    }

    let unsupported = || SetupError::UnsupportedArchitecture {
        os: target.os.to_string(),
        arch: target.arch.clone(),
        supported: supported.iter().map(|a| a.to_string()).collect(),
    };

    let arch = Architecture::parse(&target.arch).ok_or_else(unsupported)?;
    ASSET_PATTERNS
        .iter()
        .find(|(o, a, _)| *o == target.os && *a == arch)
        .map(|(_, _, pattern)| *pattern)
        .ok_or_else(unsupported)
}

/// Compile a `*` glob into an anchored, case-insensitive regex
fn glob_regex(pattern: &str) -> Result<Regex> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".+");
    RegexBuilder::new(&format!("^{body}$"))
        .case_insensitive(true)
        .build()
        .map_err(|source| SetupError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// First asset in release order whose name matches `pattern`
pub fn select_asset<'a>(release: &'a ReleaseRecord, pattern: &str) -> Result<&'a AssetRecord> {
    let matcher = glob_regex(pattern)?;
    release
        .assets
        .iter()
        .find(|asset| matcher.is_match(&asset.name))
        .inspect(|asset| debug!("Pattern {} selected {}", pattern, asset.name))
        .ok_or_else(|| SetupError::AssetNotFound {
            pattern: pattern.to_string(),
            tag: release.tag.clone(),
            available: release.assets.iter().map(|a| a.name.clone()).collect(),
        })
}
