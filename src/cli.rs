use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

use crate::pypi::DEFAULT_INDEX_URL;

#[derive(Parser, Debug)]
#[command(name = "pypeek")]
#[command(version)]
#[command(about = "Show the latest version and declared dependencies of a PyPI package", long_about = None)]
#[command(after_help = "Examples:\n  \
  pypeek requests                 look up requests on pypi.org\n  \
  pypeek --json flask             print only the structured summary\n  \
  pypeek -d /tmp/dl numpy         keep the downloaded file in /tmp/dl")]
pub struct Cli {
    /// Package name (prompted for when omitted)
    #[arg(value_name = "PACKAGE")]
    pub package: Option<String>,

    /// JSON API root of the package index
    #[arg(long, value_name = "URL", env = "PYPEEK_INDEX_URL", default_value = DEFAULT_INDEX_URL)]
    pub index_url: String,

    /// Directory the distribution file is downloaded into
    #[arg(short = 'd', long, value_name = "DIR", env = "PYPEEK_DOWNLOAD_DIR", default_value = "downloads")]
    pub download_dir: PathBuf,

    /// Timeout for the metadata request, in seconds
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    pub timeout: u64,

    /// Print only the structured summary as JSON
    #[arg(long)]
    pub json: bool,

    /// More log output (-vv for debug)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Less log output (-qq => silent)
    #[arg(short = 'q', action = clap::ArgAction::Count, conflicts_with = "verbose")]
    pub quiet: u8,
}

impl Cli {
    /// Normalized package name from the command line, if one was given
    pub fn package_name(&self) -> Option<String> {
        self.package
            .as_deref()
            .map(normalize_name)
            .filter(|name| !name.is_empty())
    }

    /// Log level selected by `-v` / `-q`, `warn` when neither is given
    pub fn log_level(&self) -> LevelFilter {
        match (self.quiet, self.verbose) {
            (q, _) if q > 1 => LevelFilter::OFF,
            (1, _) => LevelFilter::ERROR,
            (_, 0) => LevelFilter::WARN,
            (_, 1) => LevelFilter::INFO,
            (_, 2) => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

/// Index lookups use the trimmed, lower-cased name.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["pypeek", "Requests "]).unwrap();
        assert_eq!(cli.package_name().as_deref(), Some("requests"));
        assert_eq!(cli.index_url, DEFAULT_INDEX_URL);
        assert_eq!(cli.download_dir, PathBuf::from("downloads"));
        assert_eq!(cli.timeout, 10);
        assert_eq!(cli.log_level(), LevelFilter::WARN);
    }

    #[test]
    fn blank_package_counts_as_missing() {
        let cli = Cli::try_parse_from(["pypeek", "   "]).unwrap();
        assert_eq!(cli.package_name(), None);
    }

    #[test]
    fn verbosity_flags() {
        let cli = Cli::try_parse_from(["pypeek", "-vv", "x"]).unwrap();
        assert_eq!(cli.log_level(), LevelFilter::DEBUG);

        let cli = Cli::try_parse_from(["pypeek", "-qq", "x"]).unwrap();
        assert_eq!(cli.log_level(), LevelFilter::OFF);

        assert!(Cli::try_parse_from(["pypeek", "-v", "-q", "x"]).is_err());
    }
}
