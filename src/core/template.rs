//! `<%= name %>` placeholder expansion for option defaults

use crate::core::error::ReleaseError;
use regex::{Captures, Regex};
use std::collections::HashMap;

/// Placeholder pattern (<%= name %>)
const PLACEHOLDER_PATTERN: &str = r"<%=\s*([A-Za-z_][A-Za-z0-9_]*)\s*%>";

/// Expand every placeholder in `template` from `data`.
///
/// Unknown names expand to the empty string.
pub fn render(template: &str, data: &HashMap<&str, &str>) -> Result<String, ReleaseError> {
    let placeholder = Regex::new(PLACEHOLDER_PATTERN)
        .map_err(|e| ReleaseError::Config(format!("invalid placeholder pattern: {}", e)))?;

    let rendered = placeholder.replace_all(template, |caps: &Captures| {
        data.get(&caps[1]).copied().unwrap_or_default().to_string()
    });

    Ok(rendered.into_owned())
}
