//! Release type analysis over conventional commits.
//!
//! Each commit is matched against the configured release rules first and
//! the built-in rules second. The highest release type across all commits
//! decides the next version.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::commit::ConventionalCommit;

/// Kind of version bump a set of commits warrants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    /// Backwards-compatible bug fixes.
    Patch,
    /// Backwards-compatible features.
    Minor,
    /// Incompatible changes.
    Major,
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Patch => write!(f, "patch"),
            Self::Minor => write!(f, "minor"),
            Self::Major => write!(f, "major"),
        }
    }
}

/// Outcome of a matching release rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleRelease {
    /// No release for matching commits.
    None,
    /// Patch release.
    Patch,
    /// Minor release.
    Minor,
    /// Major release.
    Major,
}

impl RuleRelease {
    fn as_release_type(self) -> Option<ReleaseType> {
        match self {
            Self::None => None,
            Self::Patch => Some(ReleaseType::Patch),
            Self::Minor => Some(ReleaseType::Minor),
            Self::Major => Some(ReleaseType::Major),
        }
    }
}

/// A rule mapping commits to a release type.
///
/// Unset fields match anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRule {
    /// Commit type to match, case-insensitive.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Scope to match, exact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Breaking flag to match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breaking: Option<bool>,
    /// Release produced by a match.
    pub release: RuleRelease,
}

impl ReleaseRule {
    /// Whether the rule applies to the commit.
    pub fn matches(&self, commit: &ConventionalCommit) -> bool {
        self.kind
            .as_ref()
            .is_none_or(|k| k.eq_ignore_ascii_case(&commit.kind))
            && self
                .scope
                .as_ref()
                .is_none_or(|s| commit.scope.as_deref() == Some(s.as_str()))
            && self.breaking.is_none_or(|b| b == commit.breaking)
    }
}

/// Built-in release rules, applied after custom rules.
pub fn default_rules() -> Vec<ReleaseRule> {
    let rule = |kind: Option<&str>, breaking: Option<bool>, release| ReleaseRule {
        kind: kind.map(str::to_string),
        scope: None,
        breaking,
        release,
    };
    vec![
        rule(None, Some(true), RuleRelease::Major),
        rule(Some("revert"), None, RuleRelease::Patch),
        rule(Some("feat"), None, RuleRelease::Minor),
        rule(Some("fix"), None, RuleRelease::Patch),
        rule(Some("perf"), None, RuleRelease::Patch),
    ]
}

/// Determines the release type of a single commit.
///
/// The first matching custom rule wins; otherwise the first matching
/// default rule. A custom `none` rule suppresses the defaults.
pub fn commit_release_type(
    commit: &ConventionalCommit,
    custom_rules: &[ReleaseRule],
) -> Option<ReleaseType> {
    if let Some(rule) = custom_rules.iter().find(|r| r.matches(commit)) {
        return rule.release.as_release_type();
    }
    default_rules()
        .iter()
        .find(|r| r.matches(commit))
        .and_then(|r| r.release.as_release_type())
}

/// Determines the highest release type across commits.
pub fn analyze(commits: &[ConventionalCommit], custom_rules: &[ReleaseRule]) -> Option<ReleaseType> {
    commits
        .iter()
        .filter_map(|commit| {
            let release = commit_release_type(commit, custom_rules);
            debug!(
                hash = %commit.short_hash(),
                header = %commit.header,
                release = ?release,
                "Analyzed commit"
            );
            release
        })
        .max()
}
