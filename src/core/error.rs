//! Error handling for release runs
//!
//! Every failure that can stop a release is a variant of [`ReleaseError`].
//! Errors are terminal: the pipeline stops at the first one and reports it
//! verbatim.

use crate::security::CommandError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    // Manifest errors
    #[error("could not read manifest {}: {message}", path.display())]
    ManifestRead { path: PathBuf, message: String },

    #[error("could not parse manifest {}: {message}", path.display())]
    ManifestParse { path: PathBuf, message: String },

    #[error("could not write manifest {}: {message}", path.display())]
    ManifestWrite { path: PathBuf, message: String },

    #[error("manifest {} has no version field", path.display())]
    MissingVersion { path: PathBuf },

    #[error("invalid version \"{version}\": {message}")]
    InvalidVersion { version: String, message: String },

    #[error("unsupported release type \"{release_type}\"")]
    UnsupportedReleaseType { release_type: String },

    // Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    // Command execution errors
    #[error(transparent)]
    Command(#[from] CommandError),

    // Release-host errors
    #[error("environment variable {var} is not set")]
    MissingCredential { var: String },

    #[error("Error creating github release. Response: {body}")]
    NotifierRejected { status: u16, body: String },

    #[error("network error: {message}")]
    Network { message: String },
}

impl ReleaseError {
    /// True for failures caused by the manifest file or its version field
    pub fn is_manifest_error(&self) -> bool {
        matches!(
            self,
            Self::ManifestRead { .. }
                | Self::ManifestParse { .. }
                | Self::ManifestWrite { .. }
                | Self::MissingVersion { .. }
                | Self::InvalidVersion { .. }
                | Self::UnsupportedReleaseType { .. }
        )
    }

    /// True for failures reported by the release host
    pub fn is_notifier_error(&self) -> bool {
        matches!(
            self,
            Self::NotifierRejected { .. } | Self::Network { .. } | Self::MissingCredential { .. }
        )
    }

    /// Get suggested actions for this error
    pub fn suggested_actions(&self) -> Vec<&'static str> {
        match self {
            Self::ManifestRead { .. } => vec![
                "Check the `file` option or the pkgFile setting",
                "Run the release from the project directory or pass --project",
            ],
            Self::ManifestParse { .. } => vec!["Fix the JSON syntax of the manifest"],
            Self::ManifestWrite { .. } => vec!["Check file permissions of the manifest"],
            Self::MissingVersion { .. } | Self::InvalidVersion { .. } => {
                vec!["Set a SemVer version (e.g. 1.0.0) in the manifest"]
            }
            Self::UnsupportedReleaseType { .. } => vec![
                "Use one of: major, minor, patch, premajor, preminor, prepatch, prerelease",
                "Or disable the bump step for this release type",
            ],
            Self::Config(_) => vec!["Check the release configuration file"],
            Self::Command(_) => vec![
                "Check the command output above",
                "Make sure git and npm are installed and on PATH",
            ],
            Self::MissingCredential { .. } => {
                vec!["Export the variables named by github.usernameVar and github.passwordVar"]
            }
            Self::NotifierRejected { .. } => vec![
                "Check the github.repo option",
                "Check that the credentials are valid and allowed to create releases",
            ],
            Self::Network { .. } => vec!["Check your internet connection"],
        }
    }

    /// Get error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::ManifestRead { .. } => "MANIFEST_READ",
            Self::ManifestParse { .. } => "MANIFEST_PARSE",
            Self::ManifestWrite { .. } => "MANIFEST_WRITE",
            Self::MissingVersion { .. } => "MISSING_VERSION",
            Self::InvalidVersion { .. } => "INVALID_VERSION",
            Self::UnsupportedReleaseType { .. } => "UNSUPPORTED_RELEASE_TYPE",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Command(_) => "COMMAND_ERROR",
            Self::MissingCredential { .. } => "MISSING_CREDENTIAL",
            Self::NotifierRejected { .. } => "NOTIFIER_REJECTED",
            Self::Network { .. } => "NETWORK_ERROR",
        }
    }
}

impl From<reqwest::Error> for ReleaseError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}
