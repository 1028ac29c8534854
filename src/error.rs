//! Error types for release resolution and installation.
//!
//! Every stage fails fast: the only recovery in the pipeline is the
//! downloader's bounded backoff loop, everything else surfaces here verbatim.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = SetupError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum SetupError {
    /// Host OS is none of windows, macos or linux
    #[error("Unsupported platform: {os}")]
    UnsupportedPlatform { os: String },

    #[error("Failed to fetch release catalog from {url}: {source}")]
    CatalogFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A release track (latest/stable/preview) matched nothing in the catalog
    #[error("No release found for track '{track}'")]
    NoReleaseFound { track: String },

    /// An explicit version matched no tag
    #[error("Release not found: {0}")]
    ReleaseNotFound(String),

    #[error("Unsupported OS: {os}")]
    UnsupportedOs { os: String },

    #[error("Unsupported architecture '{arch}' for {os}. Supported: {}", .supported.join(", "))]
    UnsupportedArchitecture {
        os: String,
        arch: String,
        supported: Vec<String>,
    },

    #[error("Invalid asset pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(
        "No asset matching '{pattern}' in release {tag}. Available assets: {}",
        .available.join(", ")
    )]
    AssetNotFound {
        pattern: String,
        tag: String,
        available: Vec<String>,
    },

    #[error("Download of {url} failed after {attempts} attempts: {source}")]
    DownloadFailed {
        url: String,
        attempts: u32,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to extract {}: {source}", .archive.display())]
    ExtractionFailed {
        archive: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Installation verification failed: {} not found", .executable.display())]
    InstallVerificationFailed { executable: PathBuf },

    /// Neither a tool cache nor a user-local fallback directory is known
    #[error("Cannot determine install directory for {os}")]
    NoInstallBase { os: String },

    #[error("Invalid configuration at {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SetupError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
