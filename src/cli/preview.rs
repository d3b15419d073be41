//! Read-only commands that preview the next release.

use anyhow::Result;
use chrono::Local;
use clap::Parser;

use super::RepoArgs;
use crate::release::{self, PlanOutcome};

/// Version command options.
#[derive(Parser)]
pub struct VersionCommand {
    /// Repository selection.
    #[command(flatten)]
    pub repo: RepoArgs,
}

impl VersionCommand {
    /// Prints the next version, or nothing when no release is due.
    pub fn execute(self) -> Result<()> {
        let (repo, config) = self.repo.open()?;
        if let PlanOutcome::Release(plan) =
            release::plan(&repo, &config, Local::now().date_naive())?
        {
            println!("{}", plan.next_version);
        }
        Ok(())
    }
}

/// Notes command options.
#[derive(Parser)]
pub struct NotesCommand {
    /// Repository selection.
    #[command(flatten)]
    pub repo: RepoArgs,
}

impl NotesCommand {
    /// Prints the Markdown notes of the next release.
    pub fn execute(self) -> Result<()> {
        let (repo, config) = self.repo.open()?;
        match release::plan(&repo, &config, Local::now().date_naive())? {
            PlanOutcome::Release(plan) => print!("{}", plan.notes.render()),
            PlanOutcome::NoRelease => eprintln!("No release-worthy commits since the last release"),
            PlanOutcome::NotReleaseBranch(branch) => {
                eprintln!("Branch {branch} is not a release branch");
            }
        }
        Ok(())
    }
}
