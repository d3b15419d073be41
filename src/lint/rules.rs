//! Conventional commit lint rules.

use serde::{Deserialize, Serialize};

use super::IssueSeverity;
use crate::commit::{self, CommitParseError};
use crate::config::LintConfig;

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintIssue {
    /// Severity level of the issue.
    pub severity: IssueSeverity,
    /// Rule identifier, e.g. `type-enum`.
    pub rule: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl LintIssue {
    fn error(rule: &str, message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Error,
            rule: rule.to_string(),
            message: message.into(),
        }
    }

    fn warning(rule: &str, message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Warning,
            rule: rule.to_string(),
            message: message.into(),
        }
    }
}

/// Whether the message is exempt from linting.
///
/// Merge commits and release commits are never linted.
pub fn is_exempt(message: &str) -> bool {
    let header = message.trim_start().lines().next().unwrap_or_default();
    if header.starts_with("Merge ") {
        return true;
    }
    commit::parse("", message).is_ok_and(|c| c.is_release_commit())
}

/// Lints a commit message and returns every rule it violates.
pub fn lint_message(message: &str, config: &LintConfig) -> Vec<LintIssue> {
    if is_exempt(message) {
        return Vec::new();
    }

    let mut issues = Vec::new();

    let header = message.trim().lines().next().unwrap_or_default().trim_end();
    let header_len = header.chars().count();
    if header_len > config.header_max_length {
        issues.push(LintIssue::error(
            "header-max-length",
            format!(
                "header must not be longer than {} characters, current length is {header_len}",
                config.header_max_length
            ),
        ));
    }

    let parsed = match commit::parse("", message) {
        Ok(parsed) => parsed,
        Err(CommitParseError::EmptyMessage) => {
            issues.push(LintIssue::error("header-format", "message may not be empty"));
            return issues;
        }
        Err(CommitParseError::InvalidHeader(_)) => {
            issues.push(LintIssue::error(
                "header-format",
                "header must match `type(scope): subject`",
            ));
            return issues;
        }
    };

    if parsed.kind != parsed.kind.to_lowercase() {
        issues.push(LintIssue::error(
            "type-case",
            format!("type must be lower-case, found `{}`", parsed.kind),
        ));
    }

    let kind = parsed.normalized_kind();
    if !config.types.iter().any(|t| t == &kind) {
        issues.push(LintIssue::error(
            "type-enum",
            format!(
                "type `{}` must be one of [{}]",
                parsed.kind,
                config.types.join(", ")
            ),
        ));
    }

    match parsed.subject.chars().next() {
        None => issues.push(LintIssue::error("subject-empty", "subject may not be empty")),
        Some(first) if first.is_uppercase() => issues.push(LintIssue::error(
            "subject-case",
            "subject must not start with an upper-case letter",
        )),
        Some(_) => {}
    }

    if parsed.subject.ends_with('.') {
        issues.push(LintIssue::error(
            "subject-full-stop",
            "subject may not end with a full stop",
        ));
    }

    let second_line = message.trim().lines().nth(1);
    if second_line.is_some_and(|line| !line.trim().is_empty()) {
        issues.push(LintIssue::warning(
            "body-leading-blank",
            "body must have a leading blank line",
        ));
    }

    if let Some(body) = parsed.body.as_deref() {
        for line in body.lines() {
            let len = line.chars().count();
            if len > config.body_max_line_length && !contains_url(line) {
                issues.push(LintIssue::warning(
                    "body-max-line-length",
                    format!(
                        "body lines must not be longer than {} characters, found one with {len}",
                        config.body_max_line_length
                    ),
                ));
            }
        }
    }

    issues
}

fn contains_url(line: &str) -> bool {
    line.contains("http://") || line.contains("https://")
}
