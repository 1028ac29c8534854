//! Setup pipeline: catalog → resolve → cache check → asset → download → install
//!
//! Stages run one after another on the calling task and the first failure
//! aborts the run. Concurrent runs targeting the same install directory are
//! not coordinated.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use log::info;

use super::cache::{self, InstallLocation};
use super::download::{
    self, PlatformTarget, ReleaseRecord, Transport, VersionRequest, normalize_version,
};
use crate::config::{Environment, SetupConfig};
use crate::error::{Result, SetupError};

/// Outcome handed to the reporting layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResult {
    /// Version without the leading `v`
    pub version: String,
    pub path: PathBuf,
    /// Install was skipped because the version was already present
    pub cache_hit: bool,
}

/// What a run would do, without downloading anything
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupPlan {
    pub tag: String,
    pub version: String,
    pub asset_name: String,
    pub download_url: String,
    pub install_dir: PathBuf,
    pub installed: bool,
}

/// Everything a run needs besides the transport
#[derive(Debug, Clone)]
pub struct SetupRequest<'a> {
    pub version: VersionRequest,
    pub target: PlatformTarget,
    pub token: Option<&'a str>,
    pub config: &'a SetupConfig,
    pub env: &'a Environment,
}

struct Resolved {
    release: ReleaseRecord,
    location: InstallLocation,
}

async fn resolve_release(req: &SetupRequest<'_>) -> Result<Resolved> {
    let releases =
        download::fetch_releases(&req.config.catalog_url, &req.config.user_agent, req.token)
            .await?;
    let release = download::resolve(&req.version, &releases, &req.config.lts_prefix)?.clone();
    let version = normalize_version(&release.tag);
    info!("Resolved '{}' to release {}", req.version, release.tag);

    let location = cache::locate(req.target.os, version, req.env)?;
    Ok(Resolved { release, location })
}

/// Resolve version and asset and report what would happen
pub async fn plan(req: &SetupRequest<'_>) -> Result<SetupPlan> {
    let Resolved { release, location } = resolve_release(req).await?;
    let pattern = download::pattern_for(&req.target)?;
    let asset = download::select_asset(&release, pattern)?;

    Ok(SetupPlan {
        tag: release.tag.clone(),
        version: location.version.clone(),
        asset_name: asset.name.clone(),
        download_url: asset.download_url.clone(),
        installed: cache::is_installed(&location, req.config.verify),
        install_dir: location.dir,
    })
}

/// Run the full pipeline
pub async fn run_setup<T: Transport>(req: &SetupRequest<'_>, transport: &T) -> Result<ResolvedResult> {
    let Resolved { release, location } = resolve_release(req).await?;

    if cache::is_installed(&location, req.config.verify) {
        info!(
            "PowerShell {} already installed at {}",
            location.version,
            location.dir.display()
        );
        return Ok(ResolvedResult {
            version: location.version,
            path: location.dir,
            cache_hit: true,
        });
    }

    let pattern = download::pattern_for(&req.target)?;
    let asset = download::select_asset(&release, pattern)?;
    info!(
        "Installing {} for {} from {}",
        asset.name, req.target, asset.download_url
    );

    // Removed on drop, including when a later stage fails
    let temp_dir = tempfile::tempdir().map_err(|e| SetupError::io(std::env::temp_dir(), e))?;
    let file_name = Path::new(&asset.name)
        .file_name()
        .unwrap_or_else(|| OsStr::new("asset"));
    let archive = temp_dir.path().join(file_name);

    download::download_with_retry(transport, &asset.download_url, &archive, req.config.retry)
        .await?;
    let path = download::install_archive(&archive, &location).await?;

    let executable = location.executable();
    if !executable.is_file() {
        return Err(SetupError::InstallVerificationFailed { executable });
    }
    cache::write_marker(&location)?;

    info!("PowerShell {} installed at {}", location.version, path.display());
    Ok(ResolvedResult {
        version: location.version,
        path,
        cache_hit: false,
    })
}
