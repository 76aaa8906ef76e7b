//! Configuration loading and option resolution
//!
//! Options are layered in increasing priority:
//! 1. Built-in defaults
//! 2. Host-level task options (`release.options`)
//! 3. Release-type options (`release.<type>.options`)
//!
//! Template defaults for `tagName`, `commitMessage` and `tagMessage` are
//! applied last, once the new version is known.

use super::config::*;
use super::template;
use crate::core::error::ReleaseError;
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Configuration file name
pub const CONFIG_FILENAME: &str = ".release.yaml";

const DEFAULT_TAG_NAME: &str = "<%= version %>";
const DEFAULT_COMMIT_MESSAGE: &str = "release <%= version %>";
const DEFAULT_TAG_MESSAGE: &str = "version <%= version %>";

/// Host configuration file loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load the host configuration.
    ///
    /// An explicit `config_path` must exist. Without one,
    /// `<project>/.release.yaml` is used when present and defaults otherwise.
    pub async fn load(
        project_path: &Path,
        config_path: Option<&Path>,
    ) -> Result<HostConfig, ReleaseError> {
        match config_path {
            Some(path) => Self::load_config_file(path).await?.ok_or_else(|| {
                ReleaseError::Config(format!("config file not found: {}", path.display()))
            }),
            None => {
                let path = project_path.join(CONFIG_FILENAME);
                Ok(Self::load_config_file(&path).await?.unwrap_or_default())
            }
        }
    }

    async fn load_config_file(file_path: &Path) -> Result<Option<HostConfig>, ReleaseError> {
        if !file_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(file_path).await.map_err(|e| {
            ReleaseError::Config(format!("Failed to read config file: {}", e))
        })?;

        let config: HostConfig = serde_yaml::from_str(&content).map_err(|e| {
            ReleaseError::Config(format!("Failed to parse YAML config: {}", e))
        })?;

        debug!(path = %file_path.display(), "loaded release configuration");
        Ok(Some(config))
    }
}

/// Merges option layers and resolves the effective options of a run
#[derive(Debug, Clone)]
pub struct OptionResolver {
    merged: OptionsLayer,
}

impl OptionResolver {
    /// Merge defaults, host options and the options of `release_type`
    pub fn new(host: &HostConfig, release_type: Option<&str>) -> Self {
        let mut layers = vec![OptionsLayer::defaults(host.pkg_file.as_deref())];

        if let Some(options) = &host.release.options {
            layers.push(options.clone());
        }

        if let Some(target) = release_type.and_then(|t| host.release.targets.get(t))
            && let Some(options) = &target.options
        {
            layers.push(options.clone());
        }

        Self::from_layers(layers)
    }

    /// Fold layers in order; later layers win
    pub fn from_layers(layers: Vec<OptionsLayer>) -> Self {
        let mut merged = OptionsLayer::default();
        for layer in layers {
            merged.overlay(layer);
        }
        Self { merged }
    }

    pub fn merged(&self) -> &OptionsLayer {
        &self.merged
    }

    /// The bump gate, needed before the new version can be computed
    pub fn bump_enabled(&self) -> bool {
        self.merged.bump.unwrap_or(false)
    }

    /// Manifest path from the merged options
    pub fn manifest_file(&self) -> &str {
        self.merged.file.as_deref().unwrap_or(DEFAULT_MANIFEST_FILE)
    }

    /// Resolve the effective options for `new_version`.
    ///
    /// `npmtag_override` is the command-line registry tag and takes
    /// precedence over the configured one unless it resolves to no tag.
    pub fn resolve(
        self,
        new_version: &str,
        npmtag_override: Option<NpmTag>,
    ) -> Result<ReleaseOptions, ReleaseError> {
        let file = self.manifest_file().to_string();
        let merged = self.merged;
        let data = HashMap::from([("version", new_version)]);

        let github = match merged.github {
            None | Some(GithubSetting::Toggle(false)) => None,
            Some(GithubSetting::Release(github)) => Some(github),
            Some(GithubSetting::Toggle(true)) => {
                return Err(ReleaseError::Config(
                    "github requires repo, usernameVar and passwordVar".to_string(),
                ));
            }
        };

        // a false or empty override falls back to the configured tag
        let npm_tag = npmtag_override
            .and_then(|tag| tag.resolve(new_version))
            .or_else(|| merged.npmtag.and_then(|tag| tag.resolve(new_version)));

        if !merged.extra.is_empty() {
            debug!(keys = ?merged.extra.keys().collect::<Vec<_>>(), "passing through extra options");
        }

        Ok(ReleaseOptions {
            bump: merged.bump.unwrap_or(false),
            file,
            add: merged.add.unwrap_or(false),
            commit: merged.commit.unwrap_or(false),
            tag: merged.tag.unwrap_or(false),
            push: merged.push.unwrap_or(false),
            push_tags: merged.push_tags.unwrap_or(false),
            npm: merged.npm.unwrap_or(false),
            github,
            tag_name: with_default(merged.tag_name, DEFAULT_TAG_NAME, &data)?,
            commit_message: with_default(merged.commit_message, DEFAULT_COMMIT_MESSAGE, &data)?,
            tag_message: with_default(merged.tag_message, DEFAULT_TAG_MESSAGE, &data)?,
            npm_tag,
            folder: merged.folder.filter(|f| !f.is_empty()),
            extra: merged.extra,
        })
    }
}

/// Keep a configured value verbatim; expand the template only when unset
fn with_default(
    value: Option<String>,
    template: &str,
    data: &HashMap<&str, &str>,
) -> Result<String, ReleaseError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => template::render(template, data),
    }
}
