//! Workflow outputs
//!
//! Publishes the resolved version and install path the way GitHub Actions
//! expects: `key=value` lines appended to `$GITHUB_OUTPUT`, and the install
//! directory appended to `$GITHUB_PATH` so later steps find `pwsh` first.
//! Without those files the values are printed instead.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use log::{debug, info};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::config::Environment;
use crate::error::{Result, SetupError};
use crate::install::ResolvedResult;

/// Publish outputs and the search-path addition
pub fn publish(result: &ResolvedResult, env: &Environment) -> Result<()> {
    let path = result.path.display().to_string();
    let outputs = format!("version={}\npath={}\n", result.version, path);

    match &env.output_file {
        Some(file) => {
            append(file, &outputs)?;
            debug!("Wrote outputs to {}", file.display());
        }
        None => print!("{outputs}"),
    }

    match &env.path_file {
        Some(file) => {
            append(file, &format!("{path}\n"))?;
            info!("Added {} to PATH for subsequent steps", path);
        }
        None => info!("No workflow path file; add {} to PATH manually", path),
    }

    Ok(())
}

fn append(file: &Path, text: &str) -> Result<()> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(file)
        .and_then(|mut f| f.write_all(text.as_bytes()))
        .map_err(|e| SetupError::io(file, e))
}

/// Coloured human summary on stdout
pub fn print_summary(result: &ResolvedResult) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
    if result.cache_hit {
        writeln!(stdout, "✓ PowerShell {} already installed", result.version)?;
    } else {
        writeln!(stdout, "✅ PowerShell {} installed", result.version)?;
    }
    stdout.reset()?;
    writeln!(stdout, "   Path: {}", result.path.display())
}
