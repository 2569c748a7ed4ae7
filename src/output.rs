//! Output serialization and writing.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;

use crate::batch::BatchSuccess;

const FALLBACK_STEM: &str = "normalized";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yml",
        }
    }
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Serialize one document; the result always ends in a single newline.
pub fn serialize<T: Serialize>(payload: &T, format: OutputFormat) -> Result<String, OutputError> {
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(payload)?,
        OutputFormat::Yaml => serde_yaml::to_string(payload)?.trim().to_string(),
    };
    Ok(format!("{text}\n"))
}

/// Write normalized documents.
///
/// - no destination: every document to `stdout`, separated by a blank line
/// - one document: the destination is the output file
/// - several documents: the destination is a directory, one file per source
pub fn write_outputs<W: Write>(
    outputs: &[BatchSuccess],
    destination: Option<&Path>,
    format: OutputFormat,
    stdout: &mut W,
) -> Result<(), OutputError> {
    let Some(destination) = destination else {
        for (index, output) in outputs.iter().enumerate() {
            if index > 0 {
                stdout.write_all(b"\n").map_err(stdout_err)?;
            }
            stdout
                .write_all(serialize(&output.normalized, format)?.as_bytes())
                .map_err(stdout_err)?;
        }
        return Ok(());
    };

    match outputs {
        [] => Ok(()),
        [single] => {
            if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
                create_dir(parent)?;
            }
            write_file(destination, &serialize(&single.normalized, format)?)
        }
        many => {
            create_dir(destination)?;
            for output in many {
                let target = destination.join(format!(
                    "{}.{}",
                    file_stem(&output.source),
                    format.extension()
                ));
                write_file(&target, &serialize(&output.normalized, format)?)?;
            }
            Ok(())
        }
    }
}

/// File stem of a source label, or `normalized` when it has none.
pub fn file_stem(source: &str) -> String {
    Path::new(source)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or(FALLBACK_STEM)
        .to_string()
}

fn write_file(path: &Path, content: &str) -> Result<(), OutputError> {
    tracing::debug!(path = %path.display(), "Writing output");
    fs::write(path, content).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn create_dir(path: &Path) -> Result<(), OutputError> {
    fs::create_dir_all(path).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn stdout_err(source: io::Error) -> OutputError {
    OutputError::Io {
        path: PathBuf::from("<stdout>"),
        source,
    }
}
