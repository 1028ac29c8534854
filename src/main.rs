mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use setup_pwsh::config::{Environment, SetupConfig, VerifyMode};
use setup_pwsh::install::download::{self, HttpTransport};
use setup_pwsh::install::{self, SetupRequest, VersionRequest};
use setup_pwsh::report;

fn main() {
    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("FATAL: Failed to create Tokio runtime: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(real_main()) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

async fn real_main() -> Result<()> {
    let args = cli::Args::parse();

    if args.print_config {
        let text = toml::to_string_pretty(&SetupConfig::default())
            .context("Failed to serialize default config")?;
        print!("{text}");
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => {
            info!("Using config from: {}", path.display());
            SetupConfig::load(path)?
        }
        None => SetupConfig::default(),
    };
    if args.strict {
        config.verify = VerifyMode::Strict;
    }

    let env = Environment::from_env();
    let target = download::detect(&args.architecture)?;
    let request = SetupRequest {
        version: VersionRequest::parse(&args.version_request),
        target,
        token: args.token.as_deref(),
        config: &config,
        env: &env,
    };
    info!("Requested PowerShell '{}' for {}", request.version, request.target);

    if args.dry_run {
        let plan = install::plan(&request).await?;
        println!("tag={}", plan.tag);
        println!("version={}", plan.version);
        println!("asset={}", plan.asset_name);
        println!("url={}", plan.download_url);
        println!("path={}", plan.install_dir.display());
        println!("installed={}", plan.installed);
        return Ok(());
    }

    let transport =
        HttpTransport::new(&config.user_agent).context("Failed to build HTTP client")?;
    let result = install::run_setup(&request, &transport).await?;

    report::publish(&result, &env).context("Failed to publish workflow outputs")?;
    report::print_summary(&result).context("Failed to write summary")?;
    Ok(())
}
