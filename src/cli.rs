use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about = "Install PowerShell from GitHub releases")]
pub struct Args {
    /// Version to install: latest, stable (or lts), preview, or an explicit version like 7.4.6
    #[arg(long, short = 'v', env = "INPUT_VERSION", default_value = "stable")]
    pub version_request: String,

    /// Target architecture (x64, x86, arm64, arm32) or auto for the host CPU
    #[arg(long, short = 'a', env = "INPUT_ARCHITECTURE", default_value = "auto")]
    pub architecture: String,

    /// Token for the release API (anonymous access has lower rate limits)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Path to a TOML configuration file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Treat a version as installed only if its completion marker matches
    #[arg(long)]
    pub strict: bool,

    /// Resolve version and asset without downloading or installing
    #[arg(long)]
    pub dry_run: bool,

    /// Print the default configuration as TOML and exit
    #[arg(long, conflicts_with_all = ["config", "dry_run"])]
    pub print_config: bool,
}
