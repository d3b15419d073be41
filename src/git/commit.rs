//! Commit information read from git history.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use git2::Commit;
use serde::{Deserialize, Serialize};

use crate::commit::{self, CommitParseError, ConventionalCommit};

/// Commit information structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Full SHA-1 hash of the commit.
    pub hash: String,
    /// Commit author name and email address.
    pub author: String,
    /// Commit date with the author's timezone.
    pub date: DateTime<FixedOffset>,
    /// The commit message as written by the author.
    pub message: String,
    /// Number of parents; more than one means a merge commit.
    pub parent_count: usize,
}

impl CommitInfo {
    /// Creates CommitInfo from a git2::Commit.
    pub fn from_git_commit(commit: &Commit) -> Result<Self> {
        let hash = commit.id().to_string();

        let author = format!(
            "{} <{}>",
            commit.author().name().unwrap_or("Unknown"),
            commit.author().email().unwrap_or("unknown@example.com")
        );

        let timestamp = commit.author().when();
        let offset = FixedOffset::east_opt(timestamp.offset_minutes() * 60)
            .or_else(|| FixedOffset::east_opt(0))
            .context("Invalid commit timezone offset")?;
        let date = DateTime::from_timestamp(timestamp.seconds(), 0)
            .context("Invalid commit timestamp")?
            .with_timezone(&offset);

        let message = commit.message().unwrap_or("").to_string();

        Ok(Self {
            hash,
            author,
            date,
            message,
            parent_count: commit.parent_count(),
        })
    }

    /// Returns the first line of the message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    /// Whether this is a merge commit.
    pub fn is_merge(&self) -> bool {
        self.parent_count > 1 || self.summary().starts_with("Merge ")
    }

    /// Parses the message as a conventional commit.
    pub fn conventional(&self) -> Result<ConventionalCommit, CommitParseError> {
        commit::parse(&self.hash, &self.message)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn info(message: &str, parent_count: usize) -> CommitInfo {
        CommitInfo {
            hash: "a".repeat(40),
            author: "Test User <test@example.com>".to_string(),
            date: Utc::now().fixed_offset(),
            message: message.to_string(),
            parent_count,
        }
    }

    #[test]
    fn summary_is_first_line() {
        assert_eq!(info("fix: a\n\nbody", 1).summary(), "fix: a");
        assert_eq!(info("", 1).summary(), "");
    }

    #[test]
    fn merges_detected_by_parents_or_message() {
        assert!(info("fix: a", 2).is_merge());
        assert!(info("Merge branch 'main' into feature", 1).is_merge());
        assert!(!info("fix: a", 1).is_merge());
    }

    #[test]
    fn conventional_parse_keeps_hash() {
        let parsed = info("feat(cli): add flag", 1).conventional().unwrap();
        assert_eq!(parsed.hash, "a".repeat(40));
        assert_eq!(parsed.scope.as_deref(), Some("cli"));
    }
}
