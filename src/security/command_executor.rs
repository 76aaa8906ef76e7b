//! SafeCommandExecutor: whitelisted execution of release commands
//!
//! # Security Features
//!
//! - **Whitelist-based validation**: Only `git` and `npm` can execute
//! - **Injection prevention**: Uses `tokio::process::Command`, never a shell
//! - **Argument safety**: Arguments are passed as a vector, never interpolated
//! - **Working directory validation**: Validated once at construction
//!
//! # Example
//!
//! ```rust,no_run
//! use package_release::core::{CommandRunner, StepCommand};
//! use package_release::SafeCommandExecutor;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let executor = SafeCommandExecutor::new(".")?;
//! let output = executor.run(&StepCommand::new("git", ["status"])).await?;
//! println!("{}", output.output);
//! # Ok(())
//! # }
//! ```

use crate::core::traits::{CommandOutput, CommandRunner, StepCommand};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

/// Allowed commands whitelist.
const ALLOWED_COMMANDS: &[&str] = &["git", "npm"];

/// Errors that can occur during command execution
#[derive(Error, Debug)]
pub enum CommandError {
    /// Command is not in the allowed whitelist
    #[error("Command '{0}' is not in the allowed whitelist")]
    CommandNotAllowed(String),

    /// Working directory does not exist or is not accessible
    #[error("Working directory does not exist: {0}")]
    InvalidWorkingDirectory(PathBuf),

    /// Command could not be started (e.g., binary not found, permission denied)
    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),

    /// Command ran and exited with a non-zero status
    #[error("Failed when executing: `{command}` (exit code {})", exit_code_label(.code))]
    NonZeroExit {
        command: String,
        code: Option<i32>,
        output: String,
    },
}

fn exit_code_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "signal".to_string(), |c| c.to_string())
}

/// Command executor rooted in the project directory
#[derive(Debug, Clone)]
pub struct SafeCommandExecutor {
    working_dir: PathBuf,
    allowed: &'static [&'static str],
}

impl SafeCommandExecutor {
    /// Create a new executor with working directory validation.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::InvalidWorkingDirectory` if the directory does not exist.
    pub fn new<P: AsRef<Path>>(working_dir: P) -> Result<Self, CommandError> {
        let working_dir = working_dir.as_ref().to_path_buf();

        if !working_dir.is_dir() {
            return Err(CommandError::InvalidWorkingDirectory(working_dir));
        }

        Ok(Self {
            working_dir,
            allowed: ALLOWED_COMMANDS,
        })
    }

    #[cfg(test)]
    fn with_allowed(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = allowed;
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Execute a whitelisted command and capture stdout followed by stderr.
    pub async fn execute(&self, command: &str, args: &[String]) -> Result<CommandOutput, CommandError> {
        if !self.allowed.contains(&command) {
            return Err(CommandError::CommandNotAllowed(command.to_string()));
        }

        // npm is a .cmd shim on Windows
        #[cfg(target_os = "windows")]
        let command_name = if command == "npm" {
            format!("{}.cmd", command)
        } else {
            command.to_string()
        };

        #[cfg(not(target_os = "windows"))]
        let command_name = command.to_string();

        let output = Command::new(&command_name)
            .args(args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| CommandError::ExecutionFailed(format!("{}: {}", command, e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr);

        Ok(CommandOutput {
            code: output.status.code(),
            output: stdout + &stderr,
        })
    }
}

#[async_trait]
impl CommandRunner for SafeCommandExecutor {
    async fn run(&self, command: &StepCommand) -> Result<CommandOutput, CommandError> {
        self.execute(&command.program, &command.args).await
    }
}
