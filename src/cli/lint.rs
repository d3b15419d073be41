//! Lint and lint-gate commands.

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use termcolor::{ColorChoice, StandardStream};

use super::RepoArgs;
use crate::lint::{decide, GateEvent, LintReport, OutputFormat};

/// Lint command options.
#[derive(Parser)]
pub struct LintCommand {
    /// Commit range to lint (e.g., HEAD~3..HEAD, v1.0.0..HEAD, or a single commit).
    /// Defaults to commits since the last release.
    #[arg(value_name = "RANGE")]
    pub range: Option<String>,

    /// Output format: text (default), json, yaml.
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Exits with code 2 when only warnings are found.
    #[arg(long)]
    pub strict: bool,

    /// Repository selection.
    #[command(flatten)]
    pub repo: RepoArgs,
}

impl LintCommand {
    /// Executes the lint command; exits non-zero on failures.
    pub fn execute(self) -> Result<()> {
        let format: OutputFormat = self.format.parse()?;
        let (repo, config) = self.repo.open()?;

        let commits = match &self.range {
            Some(range) => repo.commits_in_range(range)?,
            None => {
                let last = repo.last_release(&config.tag_format()?)?;
                repo.commits_since(last.map(|l| l.commit))?
            }
        };

        let report = LintReport::from_commits(&commits, &config.lint);
        match format {
            OutputFormat::Text => {
                let mut stdout = StandardStream::stdout(ColorChoice::Auto);
                report.write_text(&mut stdout)?;
            }
            _ => println!("{}", report.render(format)?),
        }

        let code = report.exit_code(self.strict);
        if code != 0 {
            std::process::exit(code);
        }
        Ok(())
    }
}

/// Lint gate options.
#[derive(Parser)]
pub struct LintGateCommand {
    /// Event that triggered the workflow.
    #[arg(long, value_enum, default_value = "push")]
    pub event: GateEvent,

    /// Commit message to decide on. Defaults to the `HEAD` commit message.
    #[arg(long)]
    pub message: Option<String>,

    /// Repository selection.
    #[command(flatten)]
    pub repo: RepoArgs,
}

impl LintGateCommand {
    /// Prints `should_lint=<bool>` and appends it to `$GITHUB_OUTPUT` when set.
    pub fn execute(self) -> Result<()> {
        let (repo, config) = self.repo.open()?;
        let message = match self.message {
            Some(message) => message,
            None => repo.head_message()?,
        };

        let decision = decide(self.event, &message, &config.lint);
        println!("{}", decision.output_line());
        eprintln!("{}", decision.reason);

        if let Some(path) = std::env::var_os("GITHUB_OUTPUT") {
            decision.append_to(Path::new(&path))?;
        }
        Ok(())
    }
}
