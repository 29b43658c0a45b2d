//! Dataset manifest: archive-record download targets
//!
//! The manifest lists datasets; those carrying a `zenodo` record list are
//! fetched as a whole-record archive. Only the (url, destination) pairs are
//! built here, nothing is downloaded.
//!
//! ```yaml
//! graphs:
//!   - dataset: enpkg_lotus
//!     zenodo: [10827917]
//!   - dataset: wikidata
//!     url: https://example.org/wikidata.ttl
//! ```

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Archive endpoint for one record.
pub const ARCHIVE_URL: &str = "https://zenodo.org/api/records/{record}/files-archive";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("cannot read manifest {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid manifest {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Record ids appear both as numbers and as strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RecordId {
    Number(u64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s.trim()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    graphs: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    dataset: Option<String>,
    zenodo: Option<Vec<RecordId>>,
}

/// One archive to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub url: String,
    /// `<output_dir>/<dataset>.zip`
    pub path: PathBuf,
}

/// Read the manifest at `path` and build its archive targets.
pub fn archive_targets(
    path: &Path,
    output_dir: &Path,
) -> Result<Vec<DownloadTarget>, ManifestError> {
    let text = fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_targets(&text, output_dir).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Build archive targets from manifest text. Entries without a `zenodo`
/// list are ignored; only the first record of a list is used.
pub fn parse_targets(
    text: &str,
    output_dir: &Path,
) -> Result<Vec<DownloadTarget>, serde_yaml::Error> {
    let manifest: Manifest = serde_yaml::from_str(text)?;
    let mut targets = Vec::new();

    for entry in manifest.graphs {
        let Some(records) = entry.zenodo else {
            continue;
        };
        let Some(dataset) = entry.dataset.filter(|d| !d.trim().is_empty()) else {
            warn!("manifest entry with zenodo records has no dataset name, skipping");
            continue;
        };
        let Some(record) = records.first().map(|r| r.to_string()).filter(|r| !r.is_empty()) else {
            warn!(dataset = %dataset, "empty zenodo record list, skipping");
            continue;
        };
        targets.push(DownloadTarget {
            url: ARCHIVE_URL.replace("{record}", &record),
            path: output_dir.join(format!("{}.zip", dataset)),
        });
    }
    Ok(targets)
}
