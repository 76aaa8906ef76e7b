//! Automated package release workflow.
//!
//! A release run resolves layered options, computes the next semantic
//! version from the manifest, then runs a fixed sequence of gated steps:
//!
//! bump → add → commit → tag → push → pushTags → npm → github
//!
//! Commands go through a whitelisting executor:
//!
//! ```no_run
//! use package_release::SafeCommandExecutor;
//! use package_release::core::{CommandRunner, StepCommand};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let executor = SafeCommandExecutor::new(".")?;
//! let output = executor.run(&StepCommand::new("git", ["status"])).await?;
//! assert!(output.success());
//! # Ok(())
//! # }
//! ```
//!
//! Versions follow semantic-version increment rules:
//!
//! ```
//! use package_release::version::BumpKind;
//!
//! let next = BumpKind::Preminor.apply("1.2.3").unwrap();
//! assert_eq!(next, "1.3.0-0");
//! ```

pub mod core;
pub mod orchestration;
pub mod plugins;
pub mod security;
pub mod version;

pub use self::core::*;
pub use orchestration::{
    ReleaseFailure, ReleasePipeline, ReleaseReport, ReleaseStep, ReleaseTask, StepExecutor,
    TaskInvocation,
};
pub use plugins::GithubReleaseNotifier;
pub use security::{CommandError, SafeCommandExecutor, SecureTokenManager};
pub use version::{BumpKind, Manifest, ReleaseContext};
