//! Snapshot File Codec
//!
//! The snapshot is the on-disk copy of the store: a UTF-8 JSON object mapping
//! string keys to string values, indented by four spaces and followed by a
//! newline.
//!
//! ```text
//! {
//!     "foo": "bar",
//!     "name": "Ariz"
//! }
//! ```
//!
//! A missing file is an empty snapshot. A file that exists but does not parse
//! is reported as [`SnapshotError::Corrupt`]; callers treat that as fatal
//! instead of overwriting it.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading or writing a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The file exists but could not be read
    #[error("failed to read snapshot {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file exists but is not a JSON object of strings
    #[error("snapshot {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The file could not be written
    #[error("failed to write snapshot {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The mapping could not be serialized
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

impl SnapshotError {
    /// Returns true if the file on disk cannot be trusted.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, SnapshotError::Corrupt { .. })
    }
}

/// Reads the snapshot at `path`.
///
/// A missing file yields an empty mapping.
pub async fn load(path: &Path) -> Result<HashMap<String, String>, SnapshotError> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => decode(path, &text),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(HashMap::new()),
        Err(source) => Err(SnapshotError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Parses snapshot text read from `path`.
pub fn decode(path: &Path, text: &str) -> Result<HashMap<String, String>, SnapshotError> {
    serde_json::from_str(text).map_err(|source| SnapshotError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Serializes a mapping to the snapshot format.
///
/// Keys are written in sorted order so that unchanged data produces an
/// identical file.
pub fn encode(data: &HashMap<String, String>) -> Result<String, SnapshotError> {
    let sorted: BTreeMap<&String, &String> = data.iter().collect();

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    sorted.serialize(&mut serializer)?;
    buf.push(b'\n');

    // serde_json only ever emits UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Overwrites the snapshot at `path` with `data`.
pub async fn write(path: &Path, data: &HashMap<String, String>) -> Result<(), SnapshotError> {
    let text = encode(data)?;
    tokio::fs::write(path, text)
        .await
        .map_err(|source| SnapshotError::Write {
            path: path.to_path_buf(),
            source,
        })
}
