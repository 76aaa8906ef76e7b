//! Release pipeline: the fixed, gated sequence of release steps
//!
//! bump → add → commit → tag → push → pushTags → npm → github
//!
//! Each step runs only when its gate is enabled. Steps run one after
//! another and the first failure stops the run.

use super::step_executor::StepExecutor;
use crate::core::config::ReleaseOptions;
use crate::core::error::ReleaseError;
use crate::core::traits::{ReleaseNotifier, ReleasePayload, ReleaseRequest};
use crate::plugins::{CommandStep, GithubReleaseNotifier, git, npm};
use crate::security::SecureTokenManager;
use crate::version::ReleaseContext;
use secrecy::ExposeSecret;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Fallback failure reason when an error carries no message
const GENERIC_FAILURE: &str = "release failed";

/// A pipeline step, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseStep {
    Bump,
    Add,
    Commit,
    Tag,
    Push,
    PushTags,
    Npm,
    Github,
}

impl ReleaseStep {
    pub const ORDER: [ReleaseStep; 8] = [
        ReleaseStep::Bump,
        ReleaseStep::Add,
        ReleaseStep::Commit,
        ReleaseStep::Tag,
        ReleaseStep::Push,
        ReleaseStep::PushTags,
        ReleaseStep::Npm,
        ReleaseStep::Github,
    ];

    /// Name of the gating option
    pub fn option_name(&self) -> &'static str {
        match self {
            Self::Bump => "bump",
            Self::Add => "add",
            Self::Commit => "commit",
            Self::Tag => "tag",
            Self::Push => "push",
            Self::PushTags => "pushTags",
            Self::Npm => "npm",
            Self::Github => "github",
        }
    }

    pub fn is_enabled(&self, options: &ReleaseOptions) -> bool {
        match self {
            Self::Bump => options.bump,
            Self::Add => options.add,
            Self::Commit => options.commit,
            Self::Tag => options.tag,
            Self::Push => options.push,
            Self::PushTags => options.push_tags,
            Self::Npm => options.npm,
            Self::Github => options.github.is_some(),
        }
    }
}

impl fmt::Display for ReleaseStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.option_name())
    }
}

/// A completed step and the message it logged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub step: ReleaseStep,
    pub message: String,
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct ReleaseReport {
    pub version: String,
    pub dry_run: bool,
    pub steps: Vec<StepRecord>,
}

impl ReleaseReport {
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|r| r.step.option_name()).collect()
    }
}

/// Outcome of a failed run
#[derive(Debug)]
pub struct ReleaseFailure {
    /// The failing step; `None` when the run failed before any step started
    pub step: Option<ReleaseStep>,
    /// Steps that finished before the failure
    pub completed: Vec<StepRecord>,
    pub error: ReleaseError,
}

impl ReleaseFailure {
    /// The error message, or a generic reason when it is empty
    pub fn reason(&self) -> String {
        let message = self.error.to_string();
        if message.trim().is_empty() {
            GENERIC_FAILURE.to_string()
        } else {
            message
        }
    }
}

impl From<ReleaseError> for ReleaseFailure {
    fn from(error: ReleaseError) -> Self {
        Self {
            step: None,
            completed: Vec::new(),
            error,
        }
    }
}

impl fmt::Display for ReleaseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.step {
            Some(step) => write!(f, "{} step failed: {}", step, self.reason()),
            None => f.write_str(&self.reason()),
        }
    }
}

impl std::error::Error for ReleaseFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Sequential executor of the enabled release steps
pub struct ReleasePipeline {
    options: ReleaseOptions,
    context: ReleaseContext,
    executor: StepExecutor,
    notifier: Arc<dyn ReleaseNotifier>,
    tokens: SecureTokenManager,
}

impl ReleasePipeline {
    pub fn new(options: ReleaseOptions, context: ReleaseContext, executor: StepExecutor) -> Self {
        Self {
            options,
            context,
            executor,
            notifier: Arc::new(GithubReleaseNotifier::new()),
            tokens: SecureTokenManager::new(),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn ReleaseNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_tokens(mut self, tokens: SecureTokenManager) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn options(&self) -> &ReleaseOptions {
        &self.options
    }

    pub fn context(&self) -> &ReleaseContext {
        &self.context
    }

    /// Enabled steps in execution order
    pub fn plan(&self) -> Vec<ReleaseStep> {
        ReleaseStep::ORDER
            .into_iter()
            .filter(|step| step.is_enabled(&self.options))
            .collect()
    }

    /// Run every enabled step, stopping at the first failure
    pub async fn run(mut self) -> Result<ReleaseReport, ReleaseFailure> {
        let dry_run = self.executor.is_dry_run();
        if dry_run {
            info!("-------RELEASE DRY RUN-------");
        }

        let plan = self.plan();
        debug!(steps = ?plan, version = %self.context.new_version, "release plan");

        let mut completed = Vec::with_capacity(plan.len());
        for step in plan {
            match self.run_step(step).await {
                Ok(message) => completed.push(StepRecord { step, message }),
                Err(error) => {
                    debug!(%step, code = error.code(), "step failed");
                    return Err(ReleaseFailure {
                        step: Some(step),
                        completed,
                        error,
                    });
                }
            }
        }

        Ok(ReleaseReport {
            version: self.context.new_version,
            dry_run,
            steps: completed,
        })
    }

    async fn run_step(&mut self, step: ReleaseStep) -> Result<String, ReleaseError> {
        let file = self.context.file.as_str();
        let version = self.context.new_version.as_str();

        match step {
            ReleaseStep::Bump => self.bump().await,
            ReleaseStep::Add => self.execute(git::add(file)).await,
            ReleaseStep::Commit => {
                self.execute(git::commit(file, &self.options.commit_message))
                    .await
            }
            ReleaseStep::Tag => {
                self.execute(git::tag(&self.options.tag_name, &self.options.tag_message))
                    .await
            }
            ReleaseStep::Push => self.execute(git::push()).await,
            ReleaseStep::PushTags => self.execute(git::push_tags(version)).await,
            ReleaseStep::Npm => {
                let publish = npm::publish(
                    version,
                    self.options.npm_tag.as_deref(),
                    self.options.folder.as_deref(),
                );
                self.execute(publish).await
            }
            ReleaseStep::Github => self.github_release().await,
        }
    }

    async fn execute(&self, step: CommandStep) -> Result<String, ReleaseError> {
        self.executor.run(&step).await?;
        Ok(step.message)
    }

    async fn bump(&mut self) -> Result<String, ReleaseError> {
        let version = self.context.new_version.clone();
        self.context.manifest.set_version(&version);

        if !self.executor.is_dry_run() {
            self.context.manifest.write().await?;
        }

        let message = format!("bumped version to {}", version);
        info!("{}", message);
        Ok(message)
    }

    async fn github_release(&self) -> Result<String, ReleaseError> {
        let github = self
            .options
            .github
            .as_ref()
            .ok_or_else(|| ReleaseError::Config("github options are not set".to_string()))?;
        let message = format!("created {} release on github.", self.options.tag_name);

        if self.executor.is_dry_run() {
            info!("{}", message);
            return Ok(message);
        }

        let credentials = self
            .tokens
            .credentials(&github.username_var, &github.password_var)?;
        debug!(
            repo = %github.repo,
            username = %credentials.username,
            token = %SecureTokenManager::mask_token(credentials.password.expose_secret()),
            "resolved github credentials"
        );

        let request = ReleaseRequest {
            repo: github.repo.clone(),
            username: credentials.username,
            password: credentials.password,
            payload: ReleasePayload {
                tag_name: self.options.tag_name.clone(),
                name: self.options.tag_message.clone(),
            },
        };
        self.notifier.create_release(&request).await?;

        info!("{}", message);
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{GithubOptions, HostConfig};
    use crate::core::config_loader::OptionResolver;
    use crate::orchestration::testing::{FakeNotifier, FakeRunner, LogBuffer};
    use std::collections::HashMap;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"{"name":"widget","version":"1.0.0"}"#;

    struct Fixture {
        dir: TempDir,
        runner: Arc<FakeRunner>,
        notifier: Arc<FakeNotifier>,
    }

    impl Fixture {
        fn new(runner: FakeRunner, notifier: FakeNotifier) -> Self {
            let dir = TempDir::new().unwrap();
            std::fs::write(dir.path().join("package.json"), MANIFEST).unwrap();
            Self {
                dir,
                runner: Arc::new(runner),
                notifier: Arc::new(notifier),
            }
        }

        fn manifest_on_disk(&self) -> String {
            std::fs::read_to_string(self.dir.path().join("package.json")).unwrap()
        }

        async fn pipeline(
            &self,
            tweak: impl FnOnce(&mut ReleaseOptions),
            release_type: Option<&str>,
            dry_run: bool,
        ) -> ReleasePipeline {
            let context =
                ReleaseContext::resolve(self.dir.path(), "package.json", true, release_type)
                    .await
                    .unwrap();
            let mut options = OptionResolver::new(&HostConfig::default(), release_type)
                .resolve(&context.new_version, None)
                .unwrap();
            tweak(&mut options);

            let tokens = SecureTokenManager::with_vars(HashMap::from([
                ("GH_USER".to_string(), "octocat".to_string()),
                ("GH_TOKEN".to_string(), "token-1234567890".to_string()),
            ]));

            ReleasePipeline::new(
                options,
                context,
                StepExecutor::new(self.runner.clone(), dry_run),
            )
            .with_notifier(self.notifier.clone())
            .with_tokens(tokens)
        }
    }

    fn enable_github(options: &mut ReleaseOptions) {
        options.github = Some(GithubOptions {
            repo: "acme/widget".to_string(),
            username_var: "GH_USER".to_string(),
            password_var: "GH_TOKEN".to_string(),
        });
    }

    #[tokio::test]
    async fn test_dry_run_end_to_end() {
        let fixture = Fixture::new(FakeRunner::new(), FakeNotifier::new());
        let pipeline = fixture.pipeline(|_| {}, Some("minor"), true).await;

        let report = pipeline.run().await.unwrap();

        assert_eq!(report.version, "1.1.0");
        assert!(report.dry_run);
        assert_eq!(
            report.step_names(),
            vec!["bump", "add", "commit", "tag", "push", "pushTags", "npm"]
        );
        assert_eq!(
            report
                .steps
                .iter()
                .map(|r| r.message.as_str())
                .collect::<Vec<_>>(),
            vec![
                "bumped version to 1.1.0",
                "staged package.json",
                "committed package.json",
                "created new git tag: 1.1.0",
                "pushed to remote git repo",
                "pushed new tag 1.1.0 to remote git repo",
                "published version 1.1.0 to npm",
            ]
        );
        assert!(fixture.runner.commands().is_empty());
        assert!(fixture.notifier.requests().is_empty());
        assert_eq!(fixture.manifest_on_disk(), MANIFEST);
    }

    #[tokio::test]
    async fn test_real_run_executes_commands_in_order() {
        let fixture = Fixture::new(FakeRunner::new(), FakeNotifier::new());
        let pipeline = fixture.pipeline(|_| {}, None, false).await;

        let report = pipeline.run().await.unwrap();

        assert_eq!(report.version, "1.0.1");
        assert_eq!(
            fixture.runner.commands(),
            vec![
                "git add package.json",
                r#"git commit package.json -m "release 1.0.1""#,
                r#"git tag 1.0.1 -m "version 1.0.1""#,
                "git push",
                "git push --tags",
                "npm publish",
            ]
        );
        assert_eq!(
            fixture.manifest_on_disk(),
            "{\n  \"name\": \"widget\",\n  \"version\": \"1.0.1\"\n}\n"
        );
    }

    #[tokio::test]
    async fn test_failure_short_circuits() {
        let fixture = Fixture::new(FakeRunner::failing_on("git commit"), FakeNotifier::new());
        let pipeline = fixture.pipeline(enable_github, None, false).await;

        let failure = pipeline.run().await.unwrap_err();

        assert_eq!(failure.step, Some(ReleaseStep::Commit));
        assert_eq!(
            failure
                .completed
                .iter()
                .map(|r| r.step)
                .collect::<Vec<_>>(),
            vec![ReleaseStep::Bump, ReleaseStep::Add]
        );
        assert!(failure.reason().contains("`git commit package.json"));
        assert_eq!(
            fixture.runner.commands(),
            vec![
                "git add package.json",
                r#"git commit package.json -m "release 1.0.1""#,
            ]
        );
        assert!(fixture.notifier.requests().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_steps_are_skipped_in_dry_run() {
        let fixture = Fixture::new(FakeRunner::new(), FakeNotifier::new());
        let pipeline = fixture
            .pipeline(
                |o| {
                    o.push = false;
                    o.npm = false;
                },
                None,
                true,
            )
            .await;

        let report = pipeline.run().await.unwrap();

        assert_eq!(
            report.step_names(),
            vec!["bump", "add", "commit", "tag", "pushTags"]
        );
    }

    #[tokio::test]
    async fn test_bump_disabled_keeps_manifest() {
        let fixture = Fixture::new(FakeRunner::new(), FakeNotifier::new());
        let context = ReleaseContext::resolve(fixture.dir.path(), "package.json", false, None)
            .await
            .unwrap();
        let mut options = OptionResolver::new(&HostConfig::default(), None)
            .resolve(&context.new_version, None)
            .unwrap();
        options.bump = false;

        let pipeline = ReleasePipeline::new(
            options,
            context,
            StepExecutor::new(fixture.runner.clone(), false),
        )
        .with_notifier(fixture.notifier.clone());

        let report = pipeline.run().await.unwrap();

        assert_eq!(report.version, "1.0.0");
        assert_eq!(report.steps[0].step, ReleaseStep::Add);
        assert_eq!(fixture.manifest_on_disk(), MANIFEST);
        assert!(fixture.runner.commands().contains(&"npm publish".to_string()));
    }

    #[tokio::test]
    async fn test_github_release_sends_request() {
        let fixture = Fixture::new(FakeRunner::new(), FakeNotifier::new());
        let pipeline = fixture
            .pipeline(
                |o| {
                    enable_github(o);
                    o.npm_tag = Some("next".to_string());
                },
                Some("major"),
                false,
            )
            .await;

        let report = pipeline.run().await.unwrap();

        let last = report.steps.last().unwrap();
        assert_eq!(last.step, ReleaseStep::Github);
        assert_eq!(last.message, "created 2.0.0 release on github.");
        assert!(
            fixture
                .runner
                .commands()
                .contains(&"npm publish --tag next".to_string())
        );
        assert_eq!(
            fixture.notifier.requests(),
            vec![(
                "acme/widget".to_string(),
                "2.0.0".to_string(),
                "version 2.0.0".to_string(),
                "octocat".to_string(),
                "token-1234567890".to_string(),
            )]
        );
    }

    #[tokio::test]
    async fn test_github_release_dry_run_sends_nothing() {
        let fixture = Fixture::new(FakeRunner::new(), FakeNotifier::new());
        let pipeline = fixture.pipeline(enable_github, None, true).await;

        let report = pipeline.run().await.unwrap();

        assert_eq!(report.steps.len(), 8);
        assert!(fixture.notifier.requests().is_empty());
    }

    #[tokio::test]
    async fn test_github_rejection_fails_run() {
        let fixture = Fixture::new(
            FakeRunner::new(),
            FakeNotifier::rejecting(403, r#"{"message":"Bad credentials"}"#),
        );
        let pipeline = fixture.pipeline(enable_github, None, false).await;

        let failure = pipeline.run().await.unwrap_err();

        assert_eq!(failure.step, Some(ReleaseStep::Github));
        assert_eq!(failure.completed.len(), 7);
        assert!(failure.reason().contains("Bad credentials"));
    }

    #[tokio::test]
    async fn test_github_missing_credentials() {
        let fixture = Fixture::new(FakeRunner::new(), FakeNotifier::new());
        let pipeline = fixture
            .pipeline(
                |o| {
                    enable_github(o);
                    if let Some(github) = o.github.as_mut() {
                        github.password_var = "UNSET_VAR".to_string();
                    }
                },
                None,
                false,
            )
            .await;

        let failure = pipeline.run().await.unwrap_err();

        assert!(matches!(
            failure.error,
            ReleaseError::MissingCredential { ref var } if var == "UNSET_VAR"
        ));
        assert!(fixture.notifier.requests().is_empty());
    }

    #[test]
    fn test_failure_reason_is_error_message() {
        let failure = ReleaseFailure::from(ReleaseError::Config(String::new()));
        assert_eq!(failure.reason(), "configuration error: ");

        let failure = ReleaseFailure::from(ReleaseError::NotifierRejected {
            status: 500,
            body: String::new(),
        });
        assert_eq!(failure.reason(), "Error creating github release. Response: ");
        assert_eq!(failure.step, None);
    }

    #[tokio::test]
    async fn test_plan_follows_gates() {
        let fixture = Fixture::new(FakeRunner::new(), FakeNotifier::new());
        let pipeline = fixture
            .pipeline(
                |o| {
                    o.add = false;
                    o.commit = false;
                    enable_github(o);
                },
                None,
                true,
            )
            .await;

        assert_eq!(
            pipeline.plan(),
            vec![
                ReleaseStep::Bump,
                ReleaseStep::Tag,
                ReleaseStep::Push,
                ReleaseStep::PushTags,
                ReleaseStep::Npm,
                ReleaseStep::Github,
            ]
        );
    }

    #[tokio::test]
    async fn test_failure_is_left_to_the_caller_to_report() {
        let logs = LogBuffer::default();
        let _guard = logs.capture();

        let fixture = Fixture::new(FakeRunner::failing_on("git tag"), FakeNotifier::new());
        let pipeline = fixture.pipeline(|_| {}, None, false).await;
        let failure = pipeline.run().await.unwrap_err();

        let contents = logs.contents();
        let reason = failure.reason();
        assert!(contents.contains("step failed"));
        assert!(
            !contents
                .lines()
                .any(|line| line.contains("ERROR") && line.contains(&reason)),
            "failure logged by the pipeline:\n{}",
            contents
        );
    }
}
