//! Decides whether the lint workflow should run for a CI event.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::commit;
use crate::config::LintConfig;

/// CI event that triggered the lint gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GateEvent {
    /// A push to a branch.
    Push,
    /// Completion of a release.
    Release,
}

/// Outcome of the lint gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateDecision {
    /// Whether linting should run.
    pub should_lint: bool,
    /// Why the decision was made.
    pub reason: String,
}

impl GateDecision {
    fn lint(reason: impl Into<String>) -> Self {
        Self {
            should_lint: true,
            reason: reason.into(),
        }
    }

    fn skip(reason: impl Into<String>) -> Self {
        Self {
            should_lint: false,
            reason: reason.into(),
        }
    }

    /// Returns the `key=value` line written to `$GITHUB_OUTPUT`.
    pub fn output_line(&self) -> String {
        format!("should_lint={}", self.should_lint)
    }

    /// Appends the output line to a GitHub Actions output file.
    pub fn append_to(&self, path: &Path) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        writeln!(file, "{}", self.output_line())
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

impl fmt::Display for GateDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.output_line())
    }
}

/// Decides whether to lint for `event` given the head commit message.
///
/// Release events always lint. On push, release commits, messages with a
/// skip marker and commits whose type is in `skip_types` are skipped.
pub fn decide(event: GateEvent, message: &str, config: &LintConfig) -> GateDecision {
    let decision = match event {
        GateEvent::Release => GateDecision::lint("release event"),
        GateEvent::Push => decide_push(message, config),
    };
    debug!(?event, should_lint = decision.should_lint, reason = %decision.reason, "Lint gate decision");
    decision
}

fn decide_push(message: &str, config: &LintConfig) -> GateDecision {
    let parsed = commit::parse("", message).ok();

    if parsed.as_ref().is_some_and(|c| c.is_release_commit()) {
        return GateDecision::skip("release commit, linted on the release event");
    }

    if let Some(marker) = config.skip_markers.iter().find(|m| message.contains(m.as_str())) {
        return GateDecision::skip(format!("message contains {marker}"));
    }

    if let Some(parsed) = parsed {
        let kind = parsed.normalized_kind();
        if config.skip_types.iter().any(|t| t.eq_ignore_ascii_case(&kind)) {
            return GateDecision::skip(format!("commit type {kind} is skipped"));
        }
    }

    GateDecision::lint("push event")
}
