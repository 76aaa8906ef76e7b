//! Core traits and types for release steps
//!
//! The pipeline talks to the outside world through two seams: a
//! [`CommandRunner`] for `git`/`npm` and a [`ReleaseNotifier`] for the
//! release host. Real implementations live in `security` and `plugins`.

use crate::core::error::ReleaseError;
use crate::security::CommandError;
use async_trait::async_trait;
use secrecy::SecretString;
use serde::Serialize;
use std::fmt;

// ============================================================================
// Commands
// ============================================================================

/// An external command: program plus argument vector, never a shell string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl StepCommand {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// Renders as a copy-pasteable command line
impl fmt::Display for StepCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(|c: char| c.is_whitespace() || c == '"') {
                write!(f, " \"{}\"", arg.replace('"', "\\\""))?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Exit status and captured output of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
    /// stdout followed by stderr
    pub output: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Output split by line, for logging
    pub fn lines(&self) -> Vec<&str> {
        self.output.lines().filter(|l| !l.trim().is_empty()).collect()
    }
}

/// Runs external commands to completion
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` and capture its output.
    ///
    /// A non-zero exit is not an error at this level; callers inspect
    /// [`CommandOutput::code`]. Errors mean the command could not run at all.
    async fn run(&self, command: &StepCommand) -> Result<CommandOutput, CommandError>;
}

// ============================================================================
// Release host
// ============================================================================

/// Request body of a release creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleasePayload {
    pub tag_name: String,
    pub name: String,
}

/// Everything needed to create one release record
#[derive(Debug, Clone)]
pub struct ReleaseRequest {
    /// Repository identifier, `owner/name`
    pub repo: String,
    pub username: String,
    pub password: SecretString,
    pub payload: ReleasePayload,
}

/// Creates release records on a hosting platform
#[async_trait]
pub trait ReleaseNotifier: Send + Sync {
    /// Create the release. Exactly one attempt; no retries.
    async fn create_release(&self, request: &ReleaseRequest) -> Result<(), ReleaseError>;
}
