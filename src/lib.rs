//! # pypeek
//!
//! Look up a package on a PyPI-style index, download one of its
//! distribution files and list the dependencies it declares.
//!
//! ## Features
//!
//! - Wheels and `.zip` archives: `Requires-Dist` lines of the first `METADATA` member
//! - `.tar.gz` source distributions: every `requirements.txt` member
//! - ZIP reading with ZIP64, STORED and DEFLATE support
//! - Non-fatal findings reported as [`Advisory`] values instead of console output
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let extraction =
//!         pypeek::extract_dependencies(Path::new("downloads/pkg-1.0-py3-none-any.whl")).await?;
//!
//!     for dep in &extraction.dependencies {
//!         println!("{dep}");
//!     }
//!     for advisory in &extraction.advisories {
//!         eprintln!("Warning: {advisory}");
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod extract;
pub mod io;
pub mod metadata;
pub mod pypi;
pub mod report;
pub mod requirements;
pub mod zip;

pub use cli::Cli;
pub use extract::{
    Advisory, ArchiveKind, ExtractError, Extraction, extract_dependencies, extract_from_tar,
    extract_from_zip,
};
pub use io::{LocalFileReader, ReadAt};
pub use pypi::{PackageData, PypiClient, ReleaseFile, RetrievalError};
pub use crate::zip::{ZipEntry, ZipError, ZipReader};
