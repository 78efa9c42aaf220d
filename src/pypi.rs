//! Package lookup and download against a PyPI-style JSON index.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Default JSON API root of the public index.
pub const DEFAULT_INDEX_URL: &str = "https://pypi.org/pypi";

/// Distribution suffixes in order of preference.
pub const PREFERRED_SUFFIXES: [&str; 3] = [".whl", ".tar.gz", ".zip"];

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },

    #[error("refusing to save download as '{0}'")]
    InvalidFilename(String),

    #[error("failed to write '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The subset of the index's `/{name}/json` document this tool reads.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageData {
    pub info: PackageInfo,
    #[serde(default)]
    pub releases: HashMap<String, Vec<ReleaseFile>>,
    /// Files of the version named in `info`.
    #[serde(default)]
    pub urls: Vec<ReleaseFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PackageInfo {
    pub version: String,
    pub summary: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseFile {
    pub filename: String,
    pub url: String,
}

impl PackageData {
    /// Files published for `version`.
    ///
    /// Falls back to `urls` when `releases` has no entry for the current
    /// version, since some indexes omit the full release history.
    pub fn files(&self, version: &str) -> &[ReleaseFile] {
        match self.releases.get(version) {
            Some(files) => files.as_slice(),
            None if version == self.info.version => self.urls.as_slice(),
            None => &[],
        }
    }

    /// Pick the file to download for `version`.
    ///
    /// Suffixes are tried in [`PREFERRED_SUFFIXES`] order; within a suffix the
    /// first file in listing order wins.
    pub fn find_download(&self, version: &str) -> Option<&ReleaseFile> {
        let files = self.files(version);
        PREFERRED_SUFFIXES
            .iter()
            .find_map(|suffix| files.iter().find(|f| f.filename.ends_with(suffix)))
    }
}

/// Index client
pub struct PypiClient {
    client: Client,
    index_url: String,
    timeout: Duration,
}

impl PypiClient {
    /// Create a client for `index_url`.
    ///
    /// `timeout` bounds the metadata request only; downloads are streamed
    /// without an overall deadline.
    pub fn new(index_url: impl Into<String>, timeout: Duration) -> Result<Self, RetrievalError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            index_url: index_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn package_url(&self, name: &str) -> String {
        format!("{}/{}/json", self.index_url, name)
    }

    /// Fetch the metadata document for `name`.
    pub async fn fetch_package(&self, name: &str) -> Result<PackageData, RetrievalError> {
        let url = self.package_url(name);
        debug!(%url, "fetching package metadata");

        let resp = self.client.get(&url).timeout(self.timeout).send().await?;
        if !resp.status().is_success() {
            return Err(RetrievalError::Status {
                url,
                status: resp.status(),
            });
        }

        Ok(resp.json().await?)
    }

    /// Download `file` into `dir`, streaming the body to disk.
    ///
    /// Returns the path of the written file. A partially written file is
    /// removed if the transfer fails.
    pub async fn download(&self, file: &ReleaseFile, dir: &Path) -> Result<PathBuf, RetrievalError> {
        if !is_plain_file_name(&file.filename) {
            return Err(RetrievalError::InvalidFilename(file.filename.clone()));
        }

        fs::create_dir_all(dir)
            .await
            .map_err(|source| RetrievalError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        let path = dir.join(&file.filename);

        info!(url = %file.url, path = %path.display(), "downloading");
        match self.stream_to(&file.url, &path).await {
            Ok(written) => {
                info!(bytes = written, "download complete");
                Ok(path)
            }
            Err(err) => {
                let _ = fs::remove_file(&path).await;
                Err(err)
            }
        }
    }

    async fn stream_to(&self, url: &str, path: &Path) -> Result<u64, RetrievalError> {
        let mut resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(RetrievalError::Status {
                url: url.to_string(),
                status: resp.status(),
            });
        }

        let io_err = |source| RetrievalError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut out = fs::File::create(path).await.map_err(io_err)?;
        let mut written = 0u64;
        while let Some(chunk) = resp.chunk().await? {
            out.write_all(&chunk).await.map_err(io_err)?;
            written += chunk.len() as u64;
        }
        out.flush().await.map_err(io_err)?;

        Ok(written)
    }
}

/// A distribution file name must not be able to escape the download directory.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "info": {
            "version": "2.0",
            "summary": "An example package",
            "author": null
        },
        "releases": {
            "1.0": [
                {"filename": "example-1.0.tar.gz", "url": "https://files.example/example-1.0.tar.gz"}
            ],
            "2.0": [
                {"filename": "example-2.0.zip", "url": "https://files.example/example-2.0.zip"},
                {"filename": "example-2.0.tar.gz", "url": "https://files.example/example-2.0.tar.gz"},
                {"filename": "example-2.0-py3-none-any.whl", "url": "https://files.example/a.whl"},
                {"filename": "example-2.0-cp312-cp312-win_amd64.whl", "url": "https://files.example/b.whl"}
            ]
        },
        "urls": []
    }"#;

    fn document() -> PackageData {
        serde_json::from_str(DOCUMENT).unwrap()
    }

    #[test]
    fn deserializes_index_document() {
        let data = document();
        assert_eq!(data.info.version, "2.0");
        assert_eq!(data.info.summary.as_deref(), Some("An example package"));
        assert_eq!(data.info.author, None);
        assert_eq!(data.releases.len(), 2);
    }

    #[test]
    fn prefers_first_wheel() {
        let data = document();
        let file = data.find_download("2.0").unwrap();
        assert_eq!(file.filename, "example-2.0-py3-none-any.whl");
    }

    #[test]
    fn falls_back_to_sdist() {
        let data = document();
        let file = data.find_download("1.0").unwrap();
        assert_eq!(file.filename, "example-1.0.tar.gz");
    }

    #[test]
    fn no_file_for_unknown_version() {
        assert!(document().find_download("3.0").is_none());
    }

    #[test]
    fn uses_urls_when_release_history_is_missing() {
        let data: PackageData = serde_json::from_str(
            r#"{
                "info": {"version": "0.3"},
                "urls": [
                    {"filename": "tiny-0.3.tar.gz", "url": "https://files.example/tiny-0.3.tar.gz"},
                    {"filename": "tiny-0.3.exe", "url": "https://files.example/tiny-0.3.exe"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(
            data.find_download("0.3").map(|f| f.filename.as_str()),
            Some("tiny-0.3.tar.gz")
        );
    }

    #[test]
    fn ignores_unsupported_files() {
        let data: PackageData = serde_json::from_str(
            r#"{
                "info": {"version": "1.0"},
                "releases": {"1.0": [{"filename": "x-1.0.egg", "url": "https://files.example/x.egg"}]}
            }"#,
        )
        .unwrap();
        assert!(data.find_download("1.0").is_none());
    }

    #[test]
    fn builds_package_url_without_double_slash() {
        let client = PypiClient::new("https://pypi.example/pypi/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.package_url("requests"), "https://pypi.example/pypi/requests/json");
    }

    #[test]
    fn rejects_path_like_file_names() {
        assert!(is_plain_file_name("pkg-1.0.tar.gz"));
        assert!(!is_plain_file_name("../pkg-1.0.tar.gz"));
        assert!(!is_plain_file_name("dir\\pkg.whl"));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name(""));
    }
}
