//! Release Task - entry point for one release run
//!
//! Wires the pieces together:
//! - Host configuration loading and option merging
//! - Manifest loading and version resolution
//! - Command runner and release notifier selection
//! - Pipeline execution (or dry run)

use super::release_pipeline::{ReleaseFailure, ReleasePipeline, ReleaseReport};
use super::step_executor::StepExecutor;
use crate::core::config::NpmTag;
use crate::core::config_loader::{ConfigLoader, OptionResolver};
use crate::core::error::ReleaseError;
use crate::core::traits::{CommandRunner, ReleaseNotifier};
use crate::security::{SafeCommandExecutor, SecureTokenManager};
use crate::version::ReleaseContext;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Invocation parameters passed from the CLI
#[derive(Debug, Clone, Default)]
pub struct TaskInvocation {
    /// Project directory; commands run here and the manifest path is relative to it
    pub project_path: PathBuf,

    /// Explicit host configuration file
    pub config_path: Option<PathBuf>,

    /// Release type / bump kind (`major`, `minor`, ...)
    pub release_type: Option<String>,

    /// Announce every step without executing anything
    pub dry_run: bool,

    /// Registry tag from the command line, overriding configuration
    pub npmtag: Option<NpmTag>,
}

impl TaskInvocation {
    pub fn new<P: AsRef<Path>>(project_path: P) -> Self {
        Self {
            project_path: project_path.as_ref().to_path_buf(),
            ..Default::default()
        }
    }
}

/// One release run
pub struct ReleaseTask {
    invocation: TaskInvocation,
    runner: Option<Arc<dyn CommandRunner>>,
    notifier: Option<Arc<dyn ReleaseNotifier>>,
    tokens: Option<SecureTokenManager>,
}

impl ReleaseTask {
    pub fn new(invocation: TaskInvocation) -> Self {
        Self {
            invocation,
            runner: None,
            notifier: None,
            tokens: None,
        }
    }

    /// Replace the `git`/`npm` runner
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    /// Replace the GitHub release notifier
    pub fn with_notifier(mut self, notifier: Arc<dyn ReleaseNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_tokens(mut self, tokens: SecureTokenManager) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Build the pipeline without running it
    pub async fn prepare(&mut self) -> Result<ReleasePipeline, ReleaseFailure> {
        let invocation = &self.invocation;
        let release_type = invocation.release_type.as_deref();

        let host = ConfigLoader::load(
            &invocation.project_path,
            invocation.config_path.as_deref(),
        )
        .await?;

        let resolver = OptionResolver::new(&host, release_type);
        let context = ReleaseContext::resolve(
            &invocation.project_path,
            resolver.manifest_file(),
            resolver.bump_enabled(),
            release_type,
        )
        .await?;

        let options = resolver.resolve(&context.new_version, invocation.npmtag.clone())?;
        debug!(?options, "resolved release options");

        let runner: Arc<dyn CommandRunner> = match &self.runner {
            Some(runner) => runner.clone(),
            None => Arc::new(
                SafeCommandExecutor::new(&invocation.project_path).map_err(ReleaseError::from)?,
            ),
        };

        let mut pipeline =
            ReleasePipeline::new(options, context, StepExecutor::new(runner, invocation.dry_run));
        if let Some(notifier) = self.notifier.take() {
            pipeline = pipeline.with_notifier(notifier);
        }
        if let Some(tokens) = self.tokens.take() {
            pipeline = pipeline.with_tokens(tokens);
        }

        Ok(pipeline)
    }

    /// Run the release
    pub async fn run(mut self) -> Result<ReleaseReport, ReleaseFailure> {
        let pipeline = self.prepare().await?;

        info!(
            file = %pipeline.context().file,
            version = %pipeline.context().new_version,
            "starting release"
        );

        pipeline.run().await
    }
}
