//! Dependency extraction from downloaded distribution archives.
//!
//! The archive kind is decided by the file name alone:
//!
//! | suffix            | kind                         | source of dependencies      |
//! |-------------------|------------------------------|-----------------------------|
//! | `.whl`, `.zip`    | [`ArchiveKind::ZipLike`]     | first `*METADATA` member    |
//! | `.tar.gz`         | [`ArchiveKind::GzippedTar`]  | every `*requirements.txt`   |
//!
//! Any other suffix yields an empty [`Extraction`].
//!
//! The two paths treat a damaged container differently. A ZIP that cannot be
//! parsed is an [`ExtractError::ArchiveCorrupt`]. A tarball that cannot be
//! read still produces an [`Extraction`], with no dependencies and an
//! [`Advisory::ArchiveUnreadable`] attached, so the caller sees the problem
//! without having to treat it as fatal.

use flate2::read::GzDecoder;
use serde::Serialize;
use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::Utf8Error;
use std::sync::Arc;
use tracing::debug;

use crate::io::LocalFileReader;
use crate::metadata::parse_requires_dist;
use crate::requirements::parse_requirements;
use crate::zip::{ZipError, ZipReader};

const METADATA_SUFFIX: &str = "METADATA";
const REQUIREMENTS_SUFFIX: &str = "requirements.txt";
const SETUP_PY_SUFFIX: &str = "setup.py";

/// Container format of a distribution file, derived from its name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveKind {
    /// A wheel (`.whl`) or a `.zip` source distribution.
    ZipLike,
    /// A gzip-compressed tarball (`.tar.gz`).
    GzippedTar,
}

impl ArchiveKind {
    /// Determine the archive kind from a file name, `None` when unsupported.
    pub fn try_from(path: impl AsRef<Path>) -> Option<ArchiveKind> {
        let name = path.as_ref().to_string_lossy();
        if name.ends_with(".whl") || name.ends_with(".zip") {
            Some(ArchiveKind::ZipLike)
        } else if name.ends_with(".tar.gz") {
            Some(ArchiveKind::GzippedTar)
        } else {
            None
        }
    }
}

/// Non-fatal finding produced while extracting dependencies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// The tarball has no `setup.py`, so it may be a build-backend-only
    /// source distribution whose dependencies live elsewhere.
    MissingSetupPy,
    /// The tarball could not be read; no dependencies were collected.
    ArchiveUnreadable { reason: String },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::MissingSetupPy => write!(f, "setup.py not found in the archive."),
            Advisory::ArchiveUnreadable { reason } => {
                write!(f, "Error reading tar.gz file: {reason}")
            }
        }
    }
}

/// Dependencies found in an archive, plus any advisories raised on the way.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Extraction {
    /// Declarations in encounter order, trimmed but otherwise verbatim.
    pub dependencies: Vec<String>,
    pub advisories: Vec<Advisory>,
}

impl Extraction {
    fn unreadable(err: &io::Error) -> Self {
        Self {
            dependencies: Vec::new(),
            advisories: vec![Advisory::ArchiveUnreadable {
                reason: err.to_string(),
            }],
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("'{}' is not a readable zip archive", path.display())]
    ArchiveCorrupt {
        path: PathBuf,
        #[source]
        source: ZipError,
    },

    #[error("'{member}' is not valid UTF-8 text")]
    Decode {
        member: String,
        #[source]
        source: Utf8Error,
    },

    #[error("failed to read '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("extraction task failed")]
    Join(#[from] tokio::task::JoinError),
}

/// Extract the declared dependencies of the distribution at `path`.
///
/// Routes on the file-name suffix. Unsupported suffixes are not an error and
/// produce an empty result.
pub async fn extract_dependencies(path: &Path) -> Result<Extraction, ExtractError> {
    match ArchiveKind::try_from(path) {
        Some(ArchiveKind::ZipLike) => extract_from_zip(path).await,
        Some(ArchiveKind::GzippedTar) => extract_from_tar(path).await,
        None => {
            debug!(path = %path.display(), "unsupported archive format, skipping");
            Ok(Extraction::default())
        }
    }
}

/// Read `Requires-Dist` declarations from the first `*METADATA` member of a ZIP.
pub async fn extract_from_zip(path: &Path) -> Result<Extraction, ExtractError> {
    let reader = LocalFileReader::new(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let corrupt = |source| ExtractError::ArchiveCorrupt {
        path: path.to_path_buf(),
        source,
    };

    let archive = ZipReader::open(Arc::new(reader)).await.map_err(corrupt)?;

    let Some(entry) = archive.find_by_suffix(METADATA_SUFFIX) else {
        debug!(path = %path.display(), "no METADATA member");
        return Ok(Extraction::default());
    };
    debug!(member = %entry.name, "reading metadata");

    let bytes = archive.read_entry(entry).await.map_err(corrupt)?;
    let text = std::str::from_utf8(&bytes).map_err(|source| ExtractError::Decode {
        member: entry.name.clone(),
        source,
    })?;

    Ok(Extraction {
        dependencies: parse_requires_dist(text),
        advisories: Vec::new(),
    })
}

/// Read requirement lines from every `*requirements.txt` member of a tarball.
///
/// Container-level read failures are reported as
/// [`Advisory::ArchiveUnreadable`] rather than as an error.
pub async fn extract_from_tar(path: &Path) -> Result<Extraction, ExtractError> {
    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || scan_sdist(&owned)).await?
}

struct SdistScan {
    dependencies: Vec<String>,
    found_setup_py: bool,
}

fn scan_sdist(path: &Path) -> Result<Extraction, ExtractError> {
    let scan = match read_sdist(path) {
        Ok(scan) => scan,
        Err(ExtractError::Io { source, .. }) => {
            debug!(path = %path.display(), "tarball unreadable: {source}");
            return Ok(Extraction::unreadable(&source));
        }
        Err(err) => return Err(err),
    };

    let mut advisories = Vec::new();
    if !scan.found_setup_py {
        debug!(path = %path.display(), "no setup.py member");
        advisories.push(Advisory::MissingSetupPy);
    }

    Ok(Extraction {
        dependencies: scan.dependencies,
        advisories,
    })
}

fn read_sdist(path: &Path) -> Result<SdistScan, ExtractError> {
    let io_err = |source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = std::fs::File::open(path).map_err(io_err)?;
    let mut archive = tar::Archive::new(GzDecoder::new(io::BufReader::new(file)));

    let mut scan = SdistScan {
        dependencies: Vec::new(),
        found_setup_py: false,
    };

    for entry in archive.entries().map_err(io_err)? {
        let mut entry = entry.map_err(io_err)?;
        let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();

        if name.ends_with(SETUP_PY_SUFFIX) {
            scan.found_setup_py = true;
        }

        if name.ends_with(REQUIREMENTS_SUFFIX) && entry.header().entry_type().is_file() {
            debug!(member = %name, "reading requirements");
            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes).map_err(io_err)?;
            let lines = parse_requirements(&bytes).map_err(|source| ExtractError::Decode {
                member: name.clone(),
                source,
            })?;
            scan.dependencies.extend(lines);
        }
    }

    Ok(scan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("pkg-1.0-py3-none-any.whl", Some(ArchiveKind::ZipLike))]
    #[case("downloads/pkg-1.0.zip", Some(ArchiveKind::ZipLike))]
    #[case("pkg-1.0.tar.gz", Some(ArchiveKind::GzippedTar))]
    #[case("pkg-1.0.tar.bz2", None)]
    #[case("pkg-1.0.egg", None)]
    #[case("pkg-1.0.tgz", None)]
    fn archive_kind_from_suffix(#[case] name: &str, #[case] expected: Option<ArchiveKind>) {
        assert_eq!(ArchiveKind::try_from(name), expected);
    }

    #[tokio::test]
    async fn unsupported_suffix_is_empty_without_touching_the_file() {
        let result = extract_dependencies(Path::new("does/not/exist.egg"))
            .await
            .unwrap();
        assert_eq!(result, Extraction::default());
    }

    #[tokio::test]
    async fn missing_wheel_is_an_io_error() {
        let err = extract_dependencies(Path::new("does/not/exist.whl"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Io { .. }));
    }

    #[tokio::test]
    async fn missing_tarball_is_reported_as_unreadable() {
        let result = extract_dependencies(Path::new("does/not/exist.tar.gz"))
            .await
            .unwrap();
        assert!(result.dependencies.is_empty());
        assert!(matches!(
            result.advisories.as_slice(),
            [Advisory::ArchiveUnreadable { .. }]
        ));
    }

    #[test]
    fn advisory_messages() {
        assert_eq!(
            Advisory::MissingSetupPy.to_string(),
            "setup.py not found in the archive."
        );
        let unreadable = Advisory::ArchiveUnreadable {
            reason: "invalid gzip header".into(),
        };
        assert_eq!(
            unreadable.to_string(),
            "Error reading tar.gz file: invalid gzip header"
        );
    }
}
