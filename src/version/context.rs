//! Per-run release context

use super::bump::BumpKind;
use super::manifest::Manifest;
use crate::core::error::ReleaseError;
use std::path::Path;
use tracing::{debug, warn};

/// Manifest plus the version this run releases.
///
/// `new_version` is computed once, before any step runs, whether or not the
/// bump step is enabled.
#[derive(Debug, Clone)]
pub struct ReleaseContext {
    pub file: String,
    pub manifest: Manifest,
    pub new_version: String,
}

impl ReleaseContext {
    /// Load `file` (relative to `project_path`) and compute the new version.
    ///
    /// With `bump` disabled the new version is the current one (empty when
    /// the manifest has none) and the release type is not interpreted as a
    /// bump kind.
    pub async fn resolve(
        project_path: &Path,
        file: &str,
        bump: bool,
        release_type: Option<&str>,
    ) -> Result<Self, ReleaseError> {
        let manifest = Manifest::load(&project_path.join(file)).await?;

        let new_version = if bump {
            BumpKind::from_release_type(release_type)?.apply(manifest.version()?)?
        } else {
            match manifest.version() {
                Ok(current) => current.to_string(),
                Err(e) => {
                    warn!("{}; releasing without a version", e);
                    String::new()
                }
            }
        };

        debug!(new_version = %new_version, "resolved release version");

        Ok(Self {
            file: file.to_string(),
            manifest,
            new_version,
        })
    }

    pub fn current_version(&self) -> Result<&str, ReleaseError> {
        self.manifest.version()
    }
}
