//! Semantic version increments
//!
//! # Example
//!
//! ```
//! use package_release::version::BumpKind;
//!
//! let kind: BumpKind = "minor".parse().unwrap();
//! assert_eq!(kind.apply("1.2.3").unwrap(), "1.3.0");
//! ```

use crate::core::error::ReleaseError;
use semver::{BuildMetadata, Prerelease, Version};
use std::fmt;
use std::str::FromStr;

/// Kind of version bump selected by the release-type token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BumpKind {
    Major,
    Minor,
    #[default]
    Patch,
    Premajor,
    Preminor,
    Prepatch,
    Prerelease,
}

impl BumpKind {
    pub const ALL: [BumpKind; 7] = [
        BumpKind::Major,
        BumpKind::Minor,
        BumpKind::Patch,
        BumpKind::Premajor,
        BumpKind::Preminor,
        BumpKind::Prepatch,
        BumpKind::Prerelease,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
            Self::Premajor => "premajor",
            Self::Preminor => "preminor",
            Self::Prepatch => "prepatch",
            Self::Prerelease => "prerelease",
        }
    }

    /// Parse the release-type token; `None` means the default bump
    pub fn from_release_type(release_type: Option<&str>) -> Result<Self, ReleaseError> {
        release_type.map_or(Ok(Self::default()), |t| t.parse())
    }

    /// Parse `current` and return the incremented version string
    pub fn apply(&self, current: &str) -> Result<String, ReleaseError> {
        let version = Version::parse(current).map_err(|e| ReleaseError::InvalidVersion {
            version: current.to_string(),
            message: e.to_string(),
        })?;
        Ok(self.increment(&version)?.to_string())
    }

    /// Increment following node-semver rules. Build metadata is dropped.
    pub fn increment(&self, current: &Version) -> Result<Version, ReleaseError> {
        let mut next = current.clone();
        next.build = BuildMetadata::EMPTY;
        let is_pre = !current.pre.is_empty();

        match self {
            Self::Major => {
                // 2.0.0-1 -> 2.0.0
                if !(is_pre && current.minor == 0 && current.patch == 0) {
                    next.major = bumped(current.major, current)?;
                }
                next.minor = 0;
                next.patch = 0;
                next.pre = Prerelease::EMPTY;
            }
            Self::Minor => {
                if !(is_pre && current.patch == 0) {
                    next.minor = bumped(current.minor, current)?;
                }
                next.patch = 0;
                next.pre = Prerelease::EMPTY;
            }
            Self::Patch => {
                if !is_pre {
                    next.patch = bumped(current.patch, current)?;
                }
                next.pre = Prerelease::EMPTY;
            }
            Self::Premajor => {
                next.major = bumped(current.major, current)?;
                next.minor = 0;
                next.patch = 0;
                next.pre = prerelease("0")?;
            }
            Self::Preminor => {
                next.minor = bumped(current.minor, current)?;
                next.patch = 0;
                next.pre = prerelease("0")?;
            }
            Self::Prepatch => {
                next.patch = bumped(current.patch, current)?;
                next.pre = prerelease("0")?;
            }
            Self::Prerelease => {
                if is_pre {
                    next.pre = prerelease(&next_prerelease(current)?)?;
                } else {
                    next.patch = bumped(current.patch, current)?;
                    next.pre = prerelease("0")?;
                }
            }
        }

        Ok(next)
    }
}

impl FromStr for BumpKind {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ReleaseError::UnsupportedReleaseType {
                release_type: s.to_string(),
            })
    }
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn prerelease(text: &str) -> Result<Prerelease, ReleaseError> {
    Prerelease::new(text).map_err(|e| ReleaseError::InvalidVersion {
        version: text.to_string(),
        message: e.to_string(),
    })
}

fn overflow(current: &Version, message: &str) -> ReleaseError {
    ReleaseError::InvalidVersion {
        version: current.to_string(),
        message: message.to_string(),
    }
}

fn bumped(component: u64, current: &Version) -> Result<u64, ReleaseError> {
    component
        .checked_add(1)
        .ok_or_else(|| overflow(current, "version component overflows on increment"))
}

/// Increment the last numeric identifier, or append `.0` when there is none
fn next_prerelease(current: &Version) -> Result<String, ReleaseError> {
    let mut parts: Vec<String> = current.pre.as_str().split('.').map(str::to_string).collect();

    let last_numeric = parts
        .iter()
        .rposition(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()));

    match last_numeric {
        Some(i) => {
            let n: u64 = parts[i]
                .parse()
                .map_err(|_| overflow(current, "numeric prerelease identifier is too large"))?;
            let n = n
                .checked_add(1)
                .ok_or_else(|| overflow(current, "prerelease identifier overflows on increment"))?;
            parts[i] = n.to_string();
        }
        None => parts.push("0".to_string()),
    }

    Ok(parts.join("."))
}
