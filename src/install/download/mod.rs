//! GitHub release resolution, download and extraction
//!
//! ## Module Organization
//!
//! - `platform` - Host OS / CPU detection
//! - `github` - Release catalog client
//! - `resolve` - Release track resolution (latest, stable, preview, explicit)
//! - `asset` - Platform asset patterns and selection
//! - `core` - Retrying artifact download
//! - `extract` - ZIP / tar.gz installation into the install directory

mod asset;
mod core;
mod extract;
mod github;
mod platform;
mod resolve;

// Re-export public API
pub use asset::{pattern_for, select_asset, supported_architectures};
pub use core::{HttpTransport, Transport, TransportError, backoff_delay, download_with_retry};
pub use extract::{ArchiveFormat, install_archive};
pub use github::{AssetRecord, ReleaseRecord, fetch_releases};
pub use platform::{AUTO_ARCH, Architecture, OsFamily, PlatformTarget, detect, detect_with};
pub use resolve::{VersionRequest, normalize_version, resolve};
