//! Pulls named values out of line-oriented command output.
//!
//! Every pattern is scanned over the whole text and the **last** match wins.
//! For `chectl workspace:list` that means the bottom-most workspace is the
//! one picked, which is what the stop step relies on.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// The requested group was not captured anywhere in `text`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No '{group}' found in output:\n{text}")]
pub struct ExtractionFailed {
    pub group: String,
    pub text: String,
}

/// Returns the `group` capture of the last match of `regex` in `text`.
///
/// Fails if nothing matches or the last match did not set the group. An
/// empty capture counts as a value, an absent one does not.
pub fn extract_last(
    text: &str,
    regex: &Regex,
    group: &str,
) -> std::result::Result<String, ExtractionFailed> {
    regex
        .captures_iter(text)
        .last()
        .and_then(|caps| caps.name(group).map(|m| m.as_str().to_string()))
        .ok_or_else(|| ExtractionFailed {
            group: group.to_string(),
            text: text.to_string(),
        })
}

/// Returns every `group` capture in order of appearance.
pub fn extract_all(text: &str, regex: &Regex, group: &str) -> Vec<String> {
    regex
        .captures_iter(text)
        .filter_map(|caps| caps.name(group).map(|m| m.as_str().to_string()))
        .collect()
}

/// A compiled pattern paired with the group it is used for.
#[derive(Debug, Clone)]
pub struct FieldPattern {
    regex: Regex,
    group: &'static str,
}

impl FieldPattern {
    /// Compiles `pattern`, rejecting it if `group` is not one of its named groups.
    pub fn new(pattern: &str, group: &'static str) -> std::result::Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        if !regex.capture_names().flatten().any(|name| name == group) {
            return Err(regex::Error::Syntax(format!(
                "pattern {pattern:?} has no group named '{group}'"
            )));
        }
        Ok(Self { regex, group })
    }

    pub fn group(&self) -> &'static str {
        self.group
    }

    pub fn extract_last(&self, text: &str) -> std::result::Result<String, ExtractionFailed> {
        extract_last(text, &self.regex, self.group)
    }

    pub fn extract_all(&self, text: &str) -> Vec<String> {
        extract_all(text, &self.regex, self.group)
    }
}

/// HTTPS URL following arbitrary text on a line; runs to end of line.
pub static WORKSPACE_URL: Lazy<FieldPattern> = Lazy::new(|| {
    FieldPattern::new(r"(?m)^.*(?P<url>https://.*)", "url").expect("workspace URL pattern")
});

/// `workspace…` token on a listing line, ended by whitespace. The greedy
/// prefix means the right-most such token on a line is taken.
pub static WORKSPACE_ID: Lazy<FieldPattern> = Lazy::new(|| {
    FieldPattern::new(r"(?m)^.*(?P<workspaceId>workspace.*?)\s", "workspaceId")
        .expect("workspace id pattern")
});
