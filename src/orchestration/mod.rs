//! Orchestration layer for release runs
//!
//! This module provides the high-level components that turn resolved
//! options into an ordered, gated run of release steps.

pub mod release_pipeline;
pub mod release_task;
pub mod step_executor;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types for convenience
pub use release_pipeline::{
    ReleaseFailure, ReleasePipeline, ReleaseReport, ReleaseStep, StepRecord,
};
pub use release_task::{ReleaseTask, TaskInvocation};
pub use step_executor::StepExecutor;
