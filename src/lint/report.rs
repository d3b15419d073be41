//! Lint report types and output formatting.

use std::fmt;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use termcolor::{Color, ColorSpec, WriteColor};

use super::{lint_message, LintIssue};
use crate::commit::SHORT_HASH_LEN;
use crate::config::LintConfig;
use crate::git::CommitInfo;

/// Complete lint report for a range of commits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintReport {
    /// Individual commit results.
    pub commits: Vec<CommitLintResult>,
    /// Summary statistics.
    pub summary: LintSummary,
}

/// Result of linting a single commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitLintResult {
    /// Commit hash (short form).
    pub hash: String,
    /// First line of the commit message.
    pub header: String,
    /// Issues found.
    pub issues: Vec<LintIssue>,
    /// Whether the commit has no errors.
    pub passes: bool,
}

/// Severity level for issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    /// Errors fail the lint (exit code 1).
    Error,
    /// Advisory issues (exit code 0, or 2 with --strict).
    Warning,
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueSeverity::Error => write!(f, "ERROR"),
            IssueSeverity::Warning => write!(f, "WARNING"),
        }
    }
}

/// Summary statistics for a lint report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintSummary {
    /// Total number of commits linted.
    pub total_commits: usize,
    /// Number of commits without errors.
    pub passing_commits: usize,
    /// Number of commits with errors.
    pub failing_commits: usize,
    /// Total number of errors found.
    pub error_count: usize,
    /// Total number of warnings found.
    pub warning_count: usize,
}

impl LintSummary {
    /// Creates a summary from a list of commit results.
    pub fn from_results(results: &[CommitLintResult]) -> Self {
        let total_commits = results.len();
        let passing_commits = results.iter().filter(|r| r.passes).count();

        let (error_count, warning_count) = results
            .iter()
            .flat_map(|r| &r.issues)
            .fold((0, 0), |(e, w), issue| match issue.severity {
                IssueSeverity::Error => (e + 1, w),
                IssueSeverity::Warning => (e, w + 1),
            });

        Self {
            total_commits,
            passing_commits,
            failing_commits: total_commits - passing_commits,
            error_count,
            warning_count,
        }
    }
}

impl CommitLintResult {
    /// Lints one commit.
    pub fn from_commit(commit: &CommitInfo, config: &LintConfig) -> Self {
        let issues = if commit.is_merge() {
            Vec::new()
        } else {
            lint_message(&commit.message, config)
        };
        let passes = !issues.iter().any(|i| i.severity == IssueSeverity::Error);
        Self {
            hash: commit.hash.chars().take(SHORT_HASH_LEN).collect(),
            header: commit.summary().to_string(),
            issues,
            passes,
        }
    }
}

impl LintReport {
    /// Creates a report from commit results.
    pub fn new(commits: Vec<CommitLintResult>) -> Self {
        let summary = LintSummary::from_results(&commits);
        Self { commits, summary }
    }

    /// Lints every commit.
    pub fn from_commits(commits: &[CommitInfo], config: &LintConfig) -> Self {
        Self::new(
            commits
                .iter()
                .map(|c| CommitLintResult::from_commit(c, config))
                .collect(),
        )
    }

    /// Checks if the report has any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.summary.error_count > 0
    }

    /// Checks if the report has any warnings.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.summary.warning_count > 0
    }

    /// Determines the process exit code.
    pub fn exit_code(&self, strict: bool) -> i32 {
        if self.has_errors() {
            1
        } else if strict && self.has_warnings() {
            2
        } else {
            0
        }
    }

    /// Serializes the report in a machine-readable format.
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => {
                let mut buffer = termcolor::Buffer::no_color();
                self.write_text(&mut buffer)?;
                String::from_utf8(buffer.into_inner()).context("Report is not valid UTF-8")
            }
            OutputFormat::Json => {
                serde_json::to_string_pretty(self).context("Failed to serialize report to JSON")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(self).context("Failed to serialize report to YAML")
            }
        }
    }

    /// Writes the human-readable report, coloring severities when supported.
    pub fn write_text(&self, out: &mut dyn WriteColor) -> Result<()> {
        for result in &self.commits {
            let (marker, color) = if result.issues.is_empty() {
                ("ok  ", Color::Green)
            } else if result.passes {
                ("warn", Color::Yellow)
            } else {
                ("fail", Color::Red)
            };
            out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
            write!(out, "{marker}")?;
            out.reset()?;
            writeln!(out, " {} {}", result.hash, result.header)?;

            for issue in &result.issues {
                let color = match issue.severity {
                    IssueSeverity::Error => Color::Red,
                    IssueSeverity::Warning => Color::Yellow,
                };
                write!(out, "     ")?;
                out.set_color(ColorSpec::new().set_fg(Some(color)))?;
                write!(out, "{:<7}", issue.severity.to_string())?;
                out.reset()?;
                writeln!(out, " [{}] {}", issue.rule, issue.message)?;
            }
        }

        let s = &self.summary;
        writeln!(
            out,
            "\n{} commits linted: {} passed, {} failed ({} errors, {} warnings)",
            s.total_commits, s.passing_commits, s.failing_commits, s.error_count, s.warning_count
        )?;
        Ok(())
    }
}

/// Output format for lint results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text format.
    #[default]
    Text,
    /// JSON format.
    Json,
    /// YAML format.
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            other => anyhow::bail!("Unknown output format: {other} (expected text, json or yaml)"),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}
