//! Document sources: files, directories, stdin and HTTP.
//!
//! These only load and parse JSON. Whether a payload is a usable metadata
//! object is decided later by the normalizer.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde_json::Value;
use thiserror::Error;

use crate::batch::SourceDocument;

/// Timeout for remote fetches.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const STDIN_SOURCE: &str = "stdin";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Input not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to fetch {url}: {status}")]
    Status { url: String, status: reqwest::StatusCode },
}

/// Load one file, or every `*.json` file directly inside a directory.
pub fn load_path(path: &Path) -> Result<Vec<SourceDocument>, SourceError> {
    let resolved = absolute(path)?;
    let metadata = fs::metadata(&resolved).map_err(|_| SourceError::InputNotFound(path.to_path_buf()))?;

    if metadata.is_dir() {
        let files = enumerate_json_files(&resolved)?;
        tracing::debug!(dir = %resolved.display(), files = files.len(), "Enumerated directory");
        files.iter().map(|file| read_json_file(file)).collect()
    } else {
        Ok(vec![read_json_file(&resolved)?])
    }
}

/// Non-recursive, sorted list of `*.json` files (extension matched case-insensitively).
pub fn enumerate_json_files(dir: &Path) -> Result<Vec<PathBuf>, SourceError> {
    let io_err = |source| SourceError::Io {
        path: dir.display().to_string(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json && entry.file_type().map_err(io_err)?.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub fn read_json_file(path: &Path) -> Result<SourceDocument, SourceError> {
    let label = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: label.clone(),
        source,
    })?;
    let payload = serde_json::from_str(&content).map_err(|source| SourceError::Parse {
        path: label.clone(),
        source,
    })?;
    Ok(SourceDocument::new(label.clone(), label, payload))
}

/// Read a single JSON document from any reader.
pub fn read_reader<R: Read>(mut reader: R, source: &str) -> Result<SourceDocument, SourceError> {
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .map_err(|e| SourceError::Io {
            path: source.to_string(),
            source: e,
        })?;
    let payload = serde_json::from_str(&content).map_err(|e| SourceError::Parse {
        path: source.to_string(),
        source: e,
    })?;
    Ok(SourceDocument::new(source, source, payload))
}

pub fn read_stdin() -> Result<SourceDocument, SourceError> {
    read_reader(io::stdin().lock(), STDIN_SOURCE)
}

/// Fetch one JSON document over HTTP(S).
pub fn fetch_remote(url: &str) -> Result<SourceDocument, SourceError> {
    let http_err = |source| SourceError::Http {
        url: url.to_string(),
        source,
    };
    let client = Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(http_err)?;

    tracing::debug!(%url, "Fetching metadata");
    let response = client
        .get(url)
        .header(ACCEPT, "application/json")
        .send()
        .map_err(http_err)?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status {
            url: url.to_string(),
            status,
        });
    }

    let payload: Value = response.json().map_err(http_err)?;
    Ok(SourceDocument::new(url, url, payload))
}

fn absolute(path: &Path) -> Result<PathBuf, SourceError> {
    std::path::absolute(path).map_err(|source| SourceError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_reader_labels_source() {
        let doc = read_reader(r#"{"name": "x"}"#.as_bytes(), STDIN_SOURCE).unwrap();
        assert_eq!(doc.id, "stdin");
        assert_eq!(doc.source, "stdin");
        assert_eq!(doc.payload, json!({"name": "x"}));
    }

    #[test]
    fn test_read_reader_rejects_bad_json() {
        let err = read_reader("{nope".as_bytes(), STDIN_SOURCE).unwrap_err();
        assert!(matches!(err, SourceError::Parse { .. }));
    }
}
