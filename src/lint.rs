//! Commit message linting and the lint gate.

pub mod gate;
pub mod report;
pub mod rules;

pub use gate::{decide, GateDecision, GateEvent};
pub use report::{CommitLintResult, IssueSeverity, LintReport, LintSummary, OutputFormat};
pub use rules::{is_exempt, lint_message, LintIssue};
