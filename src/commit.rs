//! Conventional commit model and parsing.

pub mod parser;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use parser::{is_release_skipped, parse};

/// Number of hex characters shown for abbreviated commit hashes.
pub const SHORT_HASH_LEN: usize = 7;

/// Footer tokens that carry breaking-change notes.
pub const BREAKING_TOKENS: &[&str] = &["BREAKING CHANGE", "BREAKING-CHANGE"];

/// Footer tokens that close an issue when followed by a reference.
pub const CLOSING_TOKENS: &[&str] = &[
    "close", "closes", "closed", "fix", "fixes", "fixed", "resolve", "resolves", "resolved",
];

/// A commit message decomposed into its conventional-commit parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConventionalCommit {
    /// Full SHA-1 hash of the commit.
    pub hash: String,
    /// Commit type as written in the header (`feat`, `fix`, ...).
    pub kind: String,
    /// Optional scope between parentheses.
    pub scope: Option<String>,
    /// Header text after the colon.
    pub subject: String,
    /// Free-form body between header and footers.
    pub body: Option<String>,
    /// Trailing `token: value` lines.
    pub footers: Vec<Footer>,
    /// Whether the commit introduces a breaking change.
    pub breaking: bool,
    /// Breaking-change descriptions, one per note.
    pub breaking_notes: Vec<String>,
    /// Issue references found in the message.
    pub references: Vec<IssueRef>,
    /// Set when the commit reverts an earlier one.
    pub revert: Option<RevertInfo>,
    /// The first line of the message.
    pub header: String,
    /// The full original message.
    pub raw: String,
}

/// A single `token: value` trailer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footer {
    /// Footer token (`BREAKING CHANGE`, `Refs`, `Closes`, ...).
    pub token: String,
    /// Footer value, continuation lines included.
    pub value: String,
}

/// Reference to an issue or pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRef {
    /// Reference prefix, always `#` for now.
    pub prefix: String,
    /// Issue number as text.
    pub issue: String,
    /// Closing keyword when the reference came from a footer like `Closes #12`.
    pub action: Option<String>,
}

/// Details of a reverted commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevertInfo {
    /// Header of the reverted commit.
    pub header: String,
    /// Hash of the reverted commit, when the body names it.
    pub hash: Option<String>,
}

/// Errors produced while parsing a commit message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommitParseError {
    /// The message is empty or only whitespace.
    #[error("commit message is empty")]
    EmptyMessage,

    /// The header is not of the form `type(scope)!: subject`.
    #[error("header is not a conventional commit: {0:?}")]
    InvalidHeader(String),
}

impl ConventionalCommit {
    /// Returns the abbreviated commit hash.
    pub fn short_hash(&self) -> &str {
        self.hash.get(..SHORT_HASH_LEN).unwrap_or(&self.hash)
    }

    /// Returns the commit type in lower case, for rule matching.
    pub fn normalized_kind(&self) -> String {
        self.kind.to_ascii_lowercase()
    }

    /// Whether this commit is a release commit created by the pipeline.
    pub fn is_release_commit(&self) -> bool {
        self.normalized_kind() == "chore" && self.scope.as_deref() == Some("release")
    }
}
