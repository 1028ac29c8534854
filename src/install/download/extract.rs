//! Archive installation
//!
//! Windows assets are ZIP files, macOS and Linux assets are gzip-compressed
//! tarballs. Both are unpacked in-process. The install directory is always
//! replaced wholesale, never merged into.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use log::{debug, info};
use tar::Archive;
use zip::ZipArchive;

use super::platform::OsFamily;
use crate::error::{Result, SetupError};
use crate::install::cache::InstallLocation;

/// Archive container used for an OS family's assets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
}

impl ArchiveFormat {
    pub fn for_os(os: OsFamily) -> Self {
        if os.is_windows() {
            ArchiveFormat::Zip
        } else {
            ArchiveFormat::TarGz
        }
    }
}

/// Unpack `archive` into a fresh `location.dir` and return that directory
pub async fn install_archive(archive: &Path, location: &InstallLocation) -> Result<PathBuf> {
    let archive = archive.to_path_buf();
    let location = location.clone();

    // Extraction is blocking file I/O
    let archive_for_err = archive.clone();
    tokio::task::spawn_blocking(move || install_blocking(&archive, &location))
        .await
        .map_err(|e| SetupError::ExtractionFailed {
            archive: archive_for_err,
            source: Box::new(e),
        })?
}

fn install_blocking(archive: &Path, location: &InstallLocation) -> Result<PathBuf> {
    let dir = &location.dir;

    if dir.exists() {
        info!("Removing previous installation at {}", dir.display());
        fs::remove_dir_all(dir).map_err(|e| SetupError::io(dir, e))?;
    }
    fs::create_dir_all(dir).map_err(|e| SetupError::io(dir, e))?;

    let format = ArchiveFormat::for_os(location.os);
    info!("Extracting {} into {}", archive.display(), dir.display());
    let extracted = match format {
        ArchiveFormat::Zip => extract_zip(archive, dir),
        ArchiveFormat::TarGz => extract_tar_gz(archive, dir),
    };
    extracted.map_err(|source| SetupError::ExtractionFailed {
        archive: archive.to_path_buf(),
        source,
    })?;

    if !location.os.is_windows() {
        mark_executable(&location.executable())?;
    }

    Ok(dir.clone())
}

fn extract_zip(archive: &Path, dir: &Path) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(file)?;
    debug!("ZIP archive has {} entries", zip.len());
    zip.extract(dir)?;
    Ok(())
}

fn extract_tar_gz(
    archive: &Path,
    dir: &Path,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let file = File::open(archive)?;
    let mut tar = Archive::new(GzDecoder::new(file));
    tar.set_preserve_permissions(true);
    tar.unpack(dir)?;
    Ok(())
}

/// Tarballs do not reliably carry the execute bit through release uploads,
/// so set it explicitly. A missing executable is left for verification to
/// report.
#[cfg(unix)]
fn mark_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    if !path.is_file() {
        return Ok(());
    }
    let mut perms = fs::metadata(path)
        .map_err(|e| SetupError::io(path, e))?
        .permissions();
    perms.set_mode(perms.mode() | 0o755);
    fs::set_permissions(path, perms).map_err(|e| SetupError::io(path, e))
}

#[cfg(not(unix))]
fn mark_executable(path: &Path) -> Result<()> {
    debug!("Skipping execute bit for {} on this host", path.display());
    Ok(())
}
