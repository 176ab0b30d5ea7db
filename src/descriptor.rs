//! Metadata descriptors: the keyed data that sits next to every Markdown file.
//!
//! A content item is a pair of files sharing a stem:
//!
//! ```text
//! posts/
//! ├── hello.md      # body
//! └── hello.yaml    # descriptor: title, date, categories, url, anything else
//! ```
//!
//! Descriptors may be YAML (`.yaml`, `.yml`) or TOML (`.toml`). When more than
//! one exists, the first in [`DESCRIPTOR_EXTENSIONS`] order wins. Whatever the
//! source format, the result is a JSON-shaped [`Metadata`] map so the rest of
//! the pipeline (and the templates) see one value model.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Keyed attributes loaded from a descriptor. Keys iterate in sorted order.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Sidecar extensions, in lookup priority order.
pub const DESCRIPTOR_EXTENSIONS: &[&str] = &["yaml", "yml", "toml"];

#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("descriptor not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("YAML parse error in {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml_ng::Error,
    },
    #[error("TOML parse error in {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("descriptor must be a mapping at the top level: {0}")]
    NotAMapping(PathBuf),
    #[error("unsupported descriptor format: {0}")]
    UnsupportedFormat(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Toml,
}

fn format_of(path: &Path) -> Option<Format> {
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    match ext.as_str() {
        "yaml" | "yml" => Some(Format::Yaml),
        "toml" => Some(Format::Toml),
        _ => None,
    }
}

/// Load a descriptor file into a keyed map.
///
/// An empty file yields an empty map; any other non-mapping document is an
/// error.
pub fn load(path: &Path) -> Result<Metadata, DescriptorError> {
    let format =
        format_of(path).ok_or_else(|| DescriptorError::UnsupportedFormat(path.to_path_buf()))?;

    let text = fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            DescriptorError::NotFound(path.to_path_buf())
        } else {
            DescriptorError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    if text.trim().is_empty() {
        return Ok(Metadata::new());
    }

    let value = match format {
        Format::Yaml => serde_yaml_ng::from_str::<serde_json::Value>(&text).map_err(|source| {
            DescriptorError::Yaml {
                path: path.to_path_buf(),
                source,
            }
        })?,
        Format::Toml => {
            let table = toml::from_str::<toml::Value>(&text).map_err(|source| {
                DescriptorError::Toml {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            toml_to_json(table)
        }
    };

    match value {
        serde_json::Value::Object(map) => Ok(map),
        serde_json::Value::Null => Ok(Metadata::new()),
        _ => Err(DescriptorError::NotAMapping(path.to_path_buf())),
    }
}

/// Find the descriptor paired with a Markdown file.
///
/// `posts/hello.md` → the first existing of `posts/hello.yaml`,
/// `posts/hello.yml`, `posts/hello.toml`.
pub fn find_sidecar(md_path: &Path) -> Option<PathBuf> {
    DESCRIPTOR_EXTENSIONS
        .iter()
        .map(|ext| md_path.with_extension(ext))
        .find(|candidate| candidate.is_file())
}

/// Convert a TOML value into the shared JSON value model.
///
/// TOML datetimes have no JSON counterpart; they become their TOML string
/// form, which is also what the date parser expects.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    use serde_json::Value as J;
    match value {
        toml::Value::String(s) => J::String(s),
        toml::Value::Integer(i) => J::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(J::Number)
            .unwrap_or(J::Null),
        toml::Value::Boolean(b) => J::Bool(b),
        toml::Value::Datetime(dt) => J::String(dt.to_string()),
        toml::Value::Array(items) => J::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => J::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}
