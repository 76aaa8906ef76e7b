//! Runs one release command, or only announces it in dry-run mode

use crate::core::error::ReleaseError;
use crate::core::traits::CommandRunner;
use crate::plugins::CommandStep;
use crate::security::CommandError;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Executes command steps through a [`CommandRunner`]
#[derive(Clone)]
pub struct StepExecutor {
    runner: Arc<dyn CommandRunner>,
    dry_run: bool,
}

impl StepExecutor {
    pub fn new(runner: Arc<dyn CommandRunner>, dry_run: bool) -> Self {
        Self { runner, dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Run `step` to completion.
    ///
    /// In dry-run mode nothing is executed and the step always succeeds.
    pub async fn run(&self, step: &CommandStep) -> Result<(), ReleaseError> {
        debug!("Running: {}", step.command);

        if self.dry_run {
            info!("{}", step.message);
            return Ok(());
        }

        let output = self.runner.run(&step.command).await?;

        if output.success() {
            info!("{}", step.message);
            for line in output.lines() {
                info!("  {}", line);
            }
            return Ok(());
        }

        debug!(command = %step.command, code = ?output.code, "command failed");
        for line in output.lines() {
            error!("  {}", line);
        }

        Err(CommandError::NonZeroExit {
            command: step.command.to_string(),
            code: output.code,
            output: output.output,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestration::testing::FakeRunner;
    use crate::plugins::git;
    use crate::security::SafeCommandExecutor;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_success_runs_command() {
        let runner = Arc::new(FakeRunner::new());
        let executor = StepExecutor::new(runner.clone(), false);

        executor.run(&git::push()).await.unwrap();

        assert_eq!(runner.commands(), vec!["git push"]);
    }

    #[tokio::test]
    async fn test_dry_run_runs_nothing() {
        let runner = Arc::new(FakeRunner::new());
        let executor = StepExecutor::new(runner.clone(), true);

        executor.run(&git::tag("1.0.0", "version 1.0.0")).await.unwrap();

        assert!(executor.is_dry_run());
        assert!(runner.commands().is_empty());
    }

    #[tokio::test]
    async fn test_non_zero_exit_fails_with_details() {
        let runner = Arc::new(FakeRunner::failing_on("git push"));
        let executor = StepExecutor::new(runner, false);

        let error = executor.run(&git::push_tags("1.0.0")).await.unwrap_err();

        match error {
            ReleaseError::Command(CommandError::NonZeroExit {
                command,
                code,
                output,
            }) => {
                assert_eq!(command, "git push --tags");
                assert_eq!(code, Some(1));
                assert!(output.contains("simulated failure"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_real_git_failure_outside_repository() {
        let temp_dir = TempDir::new().unwrap();
        let runner = Arc::new(SafeCommandExecutor::new(temp_dir.path()).unwrap());
        let executor = StepExecutor::new(runner, false);

        let error = executor.run(&git::push()).await.unwrap_err();

        match error {
            ReleaseError::Command(CommandError::NonZeroExit {
                command,
                code,
                output,
            }) => {
                assert_eq!(command, "git push");
                assert!(matches!(code, Some(c) if c != 0));
                assert!(output.to_lowercase().contains("not a git repository"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
