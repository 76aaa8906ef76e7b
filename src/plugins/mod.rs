//! External collaborators of the release steps: `git`, `npm` and the
//! GitHub releases API.

pub mod git;
pub mod github;
pub mod npm;

use crate::core::traits::StepCommand;

pub use github::{GITHUB_API_BASE, GithubReleaseNotifier};

/// A command plus the message logged when it succeeds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandStep {
    pub command: StepCommand,
    pub message: String,
}
