//! Configuration structures for release runs
//!
//! The host configuration file is YAML. Option layers use the camelCase key
//! names of the release task (`pushTags`, `tagName`, ...). Every recognized
//! option is a typed field; anything else lands in `extra` and is carried
//! through the layers untouched.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default manifest path when neither the host nor the task names one
pub const DEFAULT_MANIFEST_FILE: &str = "package.json";

/// Root of the host configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HostConfig {
    /// Host-wide manifest path, used as the default for the `file` option
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pkg_file: Option<String>,

    /// Configuration of the release task
    #[serde(default)]
    pub release: TaskConfig,
}

/// Configuration of the release task
///
/// `options` is the host-level layer. Every other key names a release type
/// (`minor`, `prerelease`, ...) whose own `options` form the
/// release-type-specific layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TaskConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<OptionsLayer>,

    #[serde(flatten)]
    pub targets: HashMap<String, TargetConfig>,
}

/// Release-type-specific section
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TargetConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<OptionsLayer>,
}

/// One layer of release options. `None` means "not set in this layer".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OptionsLayer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bump: Option<bool>,

    /// Manifest path, relative to the project directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub add: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub push: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_tags: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub npm: Option<bool>,

    /// Release-host settings; present means the github step is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<GithubSetting>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_message: Option<String>,

    /// npm dist-tag, or `true` for "use the new version"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub npmtag: Option<NpmTag>,

    /// Sub-folder passed to `npm publish`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,

    /// Unrecognized keys, passed through verbatim
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl OptionsLayer {
    /// Built-in defaults. `github` stays unset, so the github step is off.
    pub fn defaults(pkg_file: Option<&str>) -> Self {
        Self {
            bump: Some(true),
            file: Some(pkg_file.unwrap_or(DEFAULT_MANIFEST_FILE).to_string()),
            add: Some(true),
            commit: Some(true),
            tag: Some(true),
            push: Some(true),
            push_tags: Some(true),
            npm: Some(true),
            ..Default::default()
        }
    }

    /// Shallow overlay: every property set in `source` replaces the one in
    /// `self`; properties `source` leaves unset are untouched.
    pub fn overlay(&mut self, source: OptionsLayer) {
        fn take<T>(target: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *target = value;
            }
        }

        take(&mut self.bump, source.bump);
        take(&mut self.file, source.file);
        take(&mut self.add, source.add);
        take(&mut self.commit, source.commit);
        take(&mut self.tag, source.tag);
        take(&mut self.push, source.push);
        take(&mut self.push_tags, source.push_tags);
        take(&mut self.npm, source.npm);
        take(&mut self.github, source.github);
        take(&mut self.tag_name, source.tag_name);
        take(&mut self.commit_message, source.commit_message);
        take(&mut self.tag_message, source.tag_message);
        take(&mut self.npmtag, source.npmtag);
        take(&mut self.folder, source.folder);
        self.extra.extend(source.extra);
    }
}

/// The `github` option: either the release-host record or `false`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum GithubSetting {
    Toggle(bool),
    Release(GithubOptions),
}

/// Release-host settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GithubOptions {
    /// Repository identifier, `owner/name`
    pub repo: String,

    /// Name of the environment variable holding the username
    pub username_var: String,

    /// Name of the environment variable holding the password or token
    pub password_var: String,
}

/// Registry tag option: a tag name, or a flag
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum NpmTag {
    Flag(bool),
    Name(String),
}

impl NpmTag {
    /// Resolve to a concrete tag name. `true` means the new version;
    /// `false` and the empty string mean no tag.
    pub fn resolve(&self, new_version: &str) -> Option<String> {
        match self {
            Self::Flag(true) => Some(new_version.to_string()),
            Self::Flag(false) => None,
            Self::Name(name) if name.is_empty() => None,
            Self::Name(name) => Some(name.clone()),
        }
    }
}

/// Effective options of one release run. Built once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseOptions {
    pub bump: bool,
    pub file: String,
    pub add: bool,
    pub commit: bool,
    pub tag: bool,
    pub push: bool,
    pub push_tags: bool,
    pub npm: bool,
    pub github: Option<GithubOptions>,
    pub tag_name: String,
    pub commit_message: String,
    pub tag_message: String,
    pub npm_tag: Option<String>,
    pub folder: Option<String>,
    pub extra: HashMap<String, serde_json::Value>,
}
