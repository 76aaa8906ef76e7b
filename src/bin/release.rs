//! Release CLI
//!
//! Bump, tag, push and publish a package in one run

use anyhow::{Context, Result};
use clap::Parser;
use package_release::core::NpmTag;
use package_release::{ReleaseFailure, ReleaseTask, TaskInvocation};
use std::path::PathBuf;
use std::process;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive
const LOG_ENV: &str = "RELEASE_LOG";

/// Bump the version, commit, tag, push and publish a package
#[derive(Parser, Debug)]
#[command(name = "release")]
#[command(version)]
#[command(about = "Bump, tag, push and publish a package", long_about = None)]
struct Cli {
    /// Release type: major, minor, patch, premajor, preminor, prepatch or prerelease
    #[arg(value_name = "TYPE")]
    release_type: Option<String>,

    /// Dry run: announce every step without changing anything
    #[arg(long = "no-write")]
    no_write: bool,

    /// Publish under a registry tag; without a value the new version is the tag
    #[arg(long, value_name = "TAG", num_args = 0..=1)]
    npmtag: Option<Option<String>>,

    /// Project directory (defaults to current directory)
    #[arg(short = 'C', long = "project", value_name = "DIR", default_value = ".")]
    project: PathBuf,

    /// Release configuration file (defaults to <DIR>/.release.yaml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn invocation(self) -> Result<TaskInvocation> {
        let project_path = self.project.canonicalize().with_context(|| {
            format!("project directory {} does not exist", self.project.display())
        })?;
        let npmtag = self.npmtag.map(|tag| match tag {
            Some(name) => NpmTag::Name(name),
            None => NpmTag::Flag(true),
        });

        Ok(TaskInvocation {
            project_path,
            config_path: self.config,
            release_type: self.release_type,
            dry_run: self.no_write,
            npmtag,
        })
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let invocation = match cli.invocation() {
        Ok(invocation) => invocation,
        Err(e) => {
            error!("{:#}", e);
            process::exit(1);
        }
    };

    match ReleaseTask::new(invocation).run().await {
        Ok(report) => {
            if report.dry_run {
                info!("dry run of {} finished, nothing was changed", report.version);
            } else {
                info!("released {}", report.version);
            }
        }
        Err(failure) => {
            report_failure(&failure);
            process::exit(1);
        }
    }
}

fn report_failure(failure: &ReleaseFailure) {
    error!("{}", failure);

    if !failure.completed.is_empty() {
        let done: Vec<_> = failure
            .completed
            .iter()
            .map(|record| record.step.option_name())
            .collect();
        warn!("completed before failure: {}", done.join(", "));
    }

    let actions = failure.error.suggested_actions();
    if !actions.is_empty() {
        warn!("suggested actions:");
        for action in actions {
            warn!("  - {}", action);
        }
    }
}
