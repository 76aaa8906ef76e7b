//! npm registry publish command

use super::CommandStep;
use crate::core::traits::StepCommand;

/// `npm publish [--tag <tag>] [<folder>]`
pub fn publish(new_version: &str, npm_tag: Option<&str>, folder: Option<&str>) -> CommandStep {
    let mut args = vec!["publish".to_string()];
    let mut message = format!("published version {} to npm", new_version);

    if let Some(tag) = npm_tag {
        args.push("--tag".to_string());
        args.push(tag.to_string());
        message.push_str(&format!(" with a tag of \"{}\"", tag));
    }

    if let Some(folder) = folder {
        args.push(folder.to_string());
    }

    CommandStep {
        command: StepCommand::new("npm", args),
        message,
    }
}
