//! setup-pwsh: install PowerShell from GitHub releases for CI workflows.
//!
//! ```ignore
//! use setup_pwsh::config::{Environment, SetupConfig};
//! use setup_pwsh::install::{self, SetupRequest, VersionRequest};
//! use setup_pwsh::install::download::{self, HttpTransport};
//!
//! let config = SetupConfig::default();
//! let env = Environment::from_env();
//! let request = SetupRequest {
//!     version: VersionRequest::parse("lts"),
//!     target: download::detect("auto")?,
//!     token: None,
//!     config: &config,
//!     env: &env,
//! };
//! let transport = HttpTransport::new(&config.user_agent)?;
//! let result = install::run_setup(&request, &transport).await?;
//! println!("{} at {}", result.version, result.path.display());
//! ```

pub mod config;
pub mod error;
pub mod install;
pub mod report;

pub use error::{Result, SetupError};
