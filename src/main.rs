//! Main entry point for the pypeek CLI application.
//!
//! Looks a package up on the index, downloads one distribution file and
//! prints the dependencies declared inside it.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use pypeek::cli::normalize_name;
use pypeek::report::{self, PackageSummary};
use pypeek::{Cli, PypiClient, extract_dependencies};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_filter = EnvFilter::builder()
        .with_default_directive(cli.log_level().into())
        .from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .without_time()
        .init();

    let package = match cli.package_name() {
        Some(name) => name,
        None => prompt_package_name()?,
    };
    if package.is_empty() {
        anyhow::bail!("no package name given");
    }

    run(&cli, &package).await
}

/// Ask for a package name on stdin.
fn prompt_package_name() -> Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "Enter package name: ")?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(normalize_name(&line))
}

async fn run(cli: &Cli, package: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr();

    let client = PypiClient::new(cli.index_url.as_str(), Duration::from_secs(cli.timeout))?;
    let data = client
        .fetch_package(package)
        .await
        .context("Failed to fetch package data")?;

    let version = data.info.version.clone();
    if !cli.json {
        report::write_metadata(&mut stdout, package, &data.info)?;
    }

    let Some(file) = data.find_download(&version) else {
        writeln!(stderr, "No valid distribution file found.")?;
        return Ok(());
    };

    let path = client
        .download(file, &cli.download_dir)
        .await
        .context("Download failed")?;

    let extraction = extract_dependencies(&path)
        .await
        .with_context(|| format!("Failed to extract dependencies from '{}'", path.display()))?;

    report::write_advisories(&mut stderr, &extraction.advisories)?;

    let summary = PackageSummary {
        package: package.to_string(),
        version,
        warnings: extraction.advisories.iter().map(ToString::to_string).collect(),
        dependencies: extraction.dependencies,
    };

    if !cli.json {
        report::write_dependencies(&mut stdout, &summary.dependencies)?;
        writeln!(stdout, "\nStructured List:")?;
    }
    report::write_summary(&mut stdout, &summary)?;

    Ok(())
}
