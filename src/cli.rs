//! CLI interface for semrel.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::config::ReleaseConfig;
use crate::git::GitRepository;
use crate::utils::check_git_repository;

pub mod config;
pub mod lint;
pub mod preview;
pub mod release;

/// semrel: semantic release automation from conventional commits.
#[derive(Parser)]
#[command(name = "semrel")]
#[command(about = "Semantic release automation from conventional commits", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Computes the next version, updates the changelog, tags and publishes.
    Release(release::ReleaseCommand),
    /// Prints the next version without changing anything.
    Version(preview::VersionCommand),
    /// Prints the release notes for the next version.
    Notes(preview::NotesCommand),
    /// Lints commit messages against the conventional commit rules.
    Lint(lint::LintCommand),
    /// Decides whether the lint workflow should run for a CI event.
    #[command(name = "lint-gate")]
    LintGate(lint::LintGateCommand),
    /// Configuration inspection.
    Config(config::ConfigCommand),
}

/// Repository selection shared by all commands.
#[derive(Args, Debug, Clone)]
pub struct RepoArgs {
    /// Path inside the repository to operate on.
    #[arg(long, value_name = "PATH", default_value = ".")]
    pub repo: PathBuf,
}

impl RepoArgs {
    /// Opens the repository and loads its configuration.
    pub fn open(&self) -> Result<(GitRepository, ReleaseConfig)> {
        let repo = check_git_repository(&self.repo)?;
        let config = ReleaseConfig::load(&repo.workdir()?)?;
        Ok((repo, config))
    }
}

impl Cli {
    /// Executes the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Release(cmd) => cmd.execute().await,
            Commands::Version(cmd) => cmd.execute(),
            Commands::Notes(cmd) => cmd.execute(),
            Commands::Lint(cmd) => cmd.execute(),
            Commands::LintGate(cmd) => cmd.execute(),
            Commands::Config(cmd) => cmd.execute(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;
    use crate::lint::GateEvent;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_release_flags() {
        let cli = Cli::try_parse_from([
            "semrel",
            "release",
            "--dry-run",
            "--no-push",
            "--no-github",
            "--repo",
            "/tmp/x",
        ])
        .unwrap();
        let Commands::Release(cmd) = cli.command else {
            panic!("expected release command");
        };
        assert!(cmd.dry_run && cmd.no_push && cmd.no_github);
        assert_eq!(cmd.repo.repo, PathBuf::from("/tmp/x"));
    }

    #[test]
    fn parses_lint_gate() {
        let cli = Cli::try_parse_from([
            "semrel",
            "lint-gate",
            "--event",
            "release",
            "--message",
            "chore(release): 1.0.0",
        ])
        .unwrap();
        let Commands::LintGate(cmd) = cli.command else {
            panic!("expected lint-gate command");
        };
        assert_eq!(cmd.event, GateEvent::Release);
        assert_eq!(cmd.message.as_deref(), Some("chore(release): 1.0.0"));
    }

    #[test]
    fn lint_defaults() {
        let cli = Cli::try_parse_from(["semrel", "lint", "HEAD~3..HEAD"]).unwrap();
        let Commands::Lint(cmd) = cli.command else {
            panic!("expected lint command");
        };
        assert_eq!(cmd.range.as_deref(), Some("HEAD~3..HEAD"));
        assert_eq!(cmd.format, "text");
        assert!(!cmd.strict);
    }
}
