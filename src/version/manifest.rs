//! Manifest file access
//!
//! The manifest is kept as an ordered JSON object so that every field other
//! than `version` is written back exactly as it was read.

use crate::core::error::ReleaseError;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;

/// A loaded manifest (e.g. `package.json`)
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    path: PathBuf,
    data: Map<String, Value>,
}

impl Manifest {
    /// Read and parse the manifest at `path`
    pub async fn load(path: &Path) -> Result<Self, ReleaseError> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| ReleaseError::ManifestRead {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        Self::parse(path, &content)
    }

    pub fn parse(path: &Path, content: &str) -> Result<Self, ReleaseError> {
        let value: Value =
            serde_json::from_str(content).map_err(|e| ReleaseError::ManifestParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        match value {
            Value::Object(data) => Ok(Self {
                path: path.to_path_buf(),
                data,
            }),
            _ => Err(ReleaseError::ManifestParse {
                path: path.to_path_buf(),
                message: "top-level value is not an object".to_string(),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The `version` field
    pub fn version(&self) -> Result<&str, ReleaseError> {
        self.data
            .get("version")
            .and_then(Value::as_str)
            .ok_or_else(|| ReleaseError::MissingVersion {
                path: self.path.clone(),
            })
    }

    /// Replace the `version` field in memory, keeping its position
    pub fn set_version(&mut self, version: &str) {
        self.data
            .insert("version".to_string(), Value::String(version.to_string()));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Two-space indented JSON with a trailing newline
    pub fn to_json_string(&self) -> Result<String, ReleaseError> {
        let mut text =
            serde_json::to_string_pretty(&self.data).map_err(|e| ReleaseError::ManifestWrite {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        text.push('\n');
        Ok(text)
    }

    /// Write the manifest back to its path
    pub async fn write(&self) -> Result<(), ReleaseError> {
        let text = self.to_json_string()?;
        fs::write(&self.path, text)
            .await
            .map_err(|e| ReleaseError::ManifestWrite {
                path: self.path.clone(),
                message: e.to_string(),
            })
    }
}
