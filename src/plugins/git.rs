//! Version-control commands of the release steps

use super::CommandStep;
use crate::core::traits::StepCommand;

/// `git add <file>`
pub fn add(file: &str) -> CommandStep {
    CommandStep {
        command: StepCommand::new("git", ["add", file]),
        message: format!("staged {}", file),
    }
}

/// `git commit <file> -m <message>`, committing only the manifest
pub fn commit(file: &str, commit_message: &str) -> CommandStep {
    CommandStep {
        command: StepCommand::new("git", ["commit", file, "-m", commit_message]),
        message: format!("committed {}", file),
    }
}

/// Annotated tag: `git tag <name> -m <message>`
pub fn tag(tag_name: &str, tag_message: &str) -> CommandStep {
    CommandStep {
        command: StepCommand::new("git", ["tag", tag_name, "-m", tag_message]),
        message: format!("created new git tag: {}", tag_name),
    }
}

pub fn push() -> CommandStep {
    CommandStep {
        command: StepCommand::new("git", ["push"]),
        message: "pushed to remote git repo".to_string(),
    }
}

pub fn push_tags(new_version: &str) -> CommandStep {
    CommandStep {
        command: StepCommand::new("git", ["push", "--tags"]),
        message: format!("pushed new tag {} to remote git repo", new_version),
    }
}
