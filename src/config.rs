use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SetupError};

pub const DEFAULT_CATALOG_URL: &str =
    "https://api.github.com/repos/PowerShell/PowerShell/releases?per_page=100";

/// Tag prefix of the current LTS line. Bump when a new LTS ships.
pub const DEFAULT_LTS_PREFIX: &str = "v7.4.";

/// Top‑level installer configuration. Every field has a default so a partial
/// TOML file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupConfig {
    /// Release list endpoint (newest first)
    pub catalog_url: String,
    pub user_agent: String,
    /// Tags starting with this prefix form the `stable`/`lts` track
    pub lts_prefix: String,
    pub retry: RetryPolicy,
    pub verify: VerifyMode,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            user_agent: concat!("setup-pwsh/", env!("CARGO_PKG_VERSION")).to_string(),
            lts_prefix: DEFAULT_LTS_PREFIX.to_string(),
            retry: RetryPolicy::default(),
            verify: VerifyMode::default(),
        }
    }
}

impl SetupConfig {
    /// Load a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| SetupError::io(path, e))?;
        Self::from_toml(&text).map_err(|reason| SetupError::Config {
            path: path.to_path_buf(),
            reason,
        })
    }

    fn from_toml(text: &str) -> std::result::Result<Self, String> {
        let cfg: SetupConfig = toml::from_str(text).map_err(|e| e.to_string())?;
        if cfg.retry.max_attempts == 0 {
            return Err("retry.max_attempts must be at least 1".to_string());
        }
        Ok(cfg)
    }
}

/// Download retry policy.
///
/// The delay before retry `n` (1-based) is `initial_delay_secs * 2^(n-1)`,
/// without jitter or cap. The defaults allow roughly 85 minutes of waiting in
/// total when every attempt fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_delay_secs: 10,
        }
    }
}

impl RetryPolicy {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }
}

/// How the install cache decides a version is already present
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyMode {
    /// Executable present in the install directory
    #[default]
    Presence,
    /// Executable present and completion marker names the same version
    Strict,
}

/// Snapshot of the ambient inputs the pipeline needs.
///
/// Captured once in `main`; nothing below reads the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    /// Shared tool cache (`RUNNER_TOOL_CACHE`)
    pub tool_cache: Option<PathBuf>,
    /// Windows fallback base (`LOCALAPPDATA`)
    pub local_app_data: Option<PathBuf>,
    /// Unix fallback base (`HOME`)
    pub home: Option<PathBuf>,
    /// Workflow output file (`GITHUB_OUTPUT`)
    pub output_file: Option<PathBuf>,
    /// Workflow search-path file (`GITHUB_PATH`)
    pub path_file: Option<PathBuf>,
}

impl Environment {
    pub fn from_env() -> Self {
        Self {
            tool_cache: env_path("RUNNER_TOOL_CACHE"),
            local_app_data: env_path("LOCALAPPDATA").or_else(dirs::data_local_dir),
            home: env_path("HOME").or_else(dirs::home_dir),
            output_file: env_path("GITHUB_OUTPUT"),
            path_file: env_path("GITHUB_PATH"),
        }
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = SetupConfig::default();
        assert_eq!(cfg.lts_prefix, "v7.4.");
        assert_eq!(cfg.retry.max_attempts, 10);
        assert_eq!(cfg.retry.initial_delay(), Duration::from_secs(10));
        assert_eq!(cfg.verify, VerifyMode::Presence);
        assert!(cfg.user_agent.starts_with("setup-pwsh/"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = SetupConfig::from_toml(
            r#"
            lts_prefix = "v7.6."
            verify = "strict"

            [retry]
            initial_delay_secs = 2
            "#,
        )
        .unwrap();
        assert_eq!(cfg.lts_prefix, "v7.6.");
        assert_eq!(cfg.verify, VerifyMode::Strict);
        assert_eq!(cfg.retry.initial_delay_secs, 2);
        assert_eq!(cfg.retry.max_attempts, 10);
        assert_eq!(cfg.catalog_url, DEFAULT_CATALOG_URL);
    }

    #[test]
    fn zero_attempts_rejected() {
        let err = SetupConfig::from_toml("[retry]\nmax_attempts = 0\n").unwrap_err();
        assert!(err.contains("max_attempts"));
    }

    #[test]
    fn load_reports_path_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("setup-pwsh.toml");
        std::fs::write(&path, "verify = \"sometimes\"").unwrap();
        let err = SetupConfig::load(&path).unwrap_err();
        assert!(matches!(err, SetupError::Config { .. }));

        let missing = SetupConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, SetupError::Io { .. }));
    }

    #[test]
    fn round_trips_through_toml() {
        let cfg = SetupConfig::default();
        let text = toml::to_string_pretty(&cfg).unwrap();
        assert_eq!(SetupConfig::from_toml(&text).unwrap(), cfg);
    }
}
