//! PowerShell release acquisition
//!
//! Resolves a version request against the GitHub release catalog, picks the
//! asset for the target platform, downloads it with retry and unpacks it into
//! a per-version install directory.

pub mod cache;
pub mod download;
mod orchestration;

pub use cache::{InstallLocation, executable_name, is_installed, locate};
pub use download::{OsFamily, PlatformTarget, VersionRequest};
pub use orchestration::{ResolvedResult, SetupPlan, SetupRequest, plan, run_setup};
