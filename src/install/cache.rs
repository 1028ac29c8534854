//! Install cache: deterministic per-version install directories
//!
//! A version lives in `<base>/<version>`. By default the presence of the
//! `pwsh` executable directly in that directory is the only signal that it is
//! installed; nothing is hashed or version-checked, so an interrupted earlier
//! run that got as far as writing the executable reads as a cache hit.
//! `VerifyMode::Strict` also requires the completion marker written after a
//! verified install.

use std::fs;
use std::path::PathBuf;

use log::debug;

use super::download::OsFamily;
use crate::config::{Environment, VerifyMode};
use crate::error::{Result, SetupError};

/// Directory name under the shared tool cache / user-local fallback
const TOOL_DIR: &str = "pwsh";

/// Written last by a successful install; holds the installed version
pub const MARKER_FILE: &str = ".setup-pwsh";

pub fn executable_name(os: OsFamily) -> &'static str {
    if os.is_windows() { "pwsh.exe" } else { "pwsh" }
}

/// Resolved install directory for one version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLocation {
    pub dir: PathBuf,
    pub version: String,
    pub os: OsFamily,
}

impl InstallLocation {
    pub fn executable(&self) -> PathBuf {
        self.dir.join(executable_name(self.os))
    }

    pub fn marker(&self) -> PathBuf {
        self.dir.join(MARKER_FILE)
    }
}

/// Base directory holding every installed version.
///
/// A shared tool cache wins; otherwise `%LOCALAPPDATA%\pwsh` on Windows and
/// `~/.pwsh` elsewhere.
pub fn base_path(os: OsFamily, env: &Environment) -> Result<PathBuf> {
    if let Some(tool_cache) = &env.tool_cache {
        return Ok(tool_cache.join(TOOL_DIR));
    }

    let fallback = if os.is_windows() {
        env.local_app_data.as_ref().map(|d| d.join(TOOL_DIR))
    } else {
        env.home.as_ref().map(|d| d.join(format!(".{TOOL_DIR}")))
    };
    fallback.ok_or_else(|| SetupError::NoInstallBase { os: os.to_string() })
}

/// Compute the install location for `version` without touching the filesystem
pub fn locate(os: OsFamily, version: &str, env: &Environment) -> Result<InstallLocation> {
    let dir = base_path(os, env)?.join(version);
    debug!("Install location for {} is {}", version, dir.display());
    Ok(InstallLocation {
        dir,
        version: version.to_string(),
        os,
    })
}

/// Check whether `location` already holds an installation
pub fn is_installed(location: &InstallLocation, mode: VerifyMode) -> bool {
    if !location.executable().is_file() {
        return false;
    }

    match mode {
        VerifyMode::Presence => true,
        VerifyMode::Strict => match fs::read_to_string(location.marker()) {
            Ok(recorded) => recorded.trim() == location.version,
            Err(e) => {
                debug!("No usable install marker in {}: {}", location.dir.display(), e);
                false
            }
        },
    }
}

/// Record a completed installation
pub fn write_marker(location: &InstallLocation) -> Result<()> {
    let marker = location.marker();
    fs::write(&marker, &location.version).map_err(|e| SetupError::io(&marker, e))
}
