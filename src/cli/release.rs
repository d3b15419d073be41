//! Release command.

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use tracing::{debug, warn};

use super::RepoArgs;
use crate::commit::SHORT_HASH_LEN;
use crate::github::{GitHubClient, ReleasePublisher};
use crate::release::{self, PlanOutcome, ReleaseOptions};
use crate::utils::{check_working_directory_clean, has_github_token};

/// Release command options.
#[derive(Parser)]
pub struct ReleaseCommand {
    /// Plans the release and prints the notes without changing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Skips pushing the release commit and tag.
    #[arg(long)]
    pub no_push: bool,

    /// Skips publishing a GitHub release.
    #[arg(long)]
    pub no_github: bool,

    /// Repository selection.
    #[command(flatten)]
    pub repo: RepoArgs,
}

impl ReleaseCommand {
    /// Executes the release command.
    pub async fn execute(self) -> Result<()> {
        let (repo, config) = self.repo.open()?;
        if !self.dry_run {
            check_working_directory_clean(&repo)?;
        }

        let plan = match release::plan(&repo, &config, Local::now().date_naive())? {
            PlanOutcome::NotReleaseBranch(branch) => {
                println!("Branch {branch} is not a release branch, nothing to do");
                return Ok(());
            }
            PlanOutcome::NoRelease => {
                println!("No release-worthy commits since the last release");
                return Ok(());
            }
            PlanOutcome::Release(plan) => plan,
        };

        match &plan.last_release {
            Some(last) => println!(
                "Releasing {} ({} bump from {})",
                plan.next_version, plan.release_type, last.tag
            ),
            None => println!("Releasing {} (first release)", plan.next_version),
        }

        if self.dry_run {
            println!("Dry run: tag {} would be created\n", plan.tag);
            if plan.notes.is_empty() {
                println!("Release notes list nothing beyond the heading\n");
            }
            print!("{}", plan.notes.render());
            return Ok(());
        }

        let client = if self.no_github || !config.github.enabled || !has_github_token() {
            None
        } else {
            match GitHubClient::from_env(&config.github.api_url) {
                Ok(client) => Some(client),
                Err(e) => {
                    warn!("GitHub client unavailable: {e}");
                    None
                }
            }
        };
        let publisher = client.as_ref().map(|c| c as &dyn ReleasePublisher);

        let options = ReleaseOptions {
            dry_run: false,
            no_push: self.no_push,
            no_github: self.no_github,
        };
        let outcome = release::execute(&repo, &config, &plan, options, publisher).await?;
        debug!(?outcome, "Release finished");

        if outcome.changelog_updated {
            println!("Updated {}", config.changelog.file.display());
        }
        if let Some(commit) = &outcome.commit {
            println!("Created release commit {}", &commit[..commit.len().min(SHORT_HASH_LEN)]);
        }
        println!("Created tag {}", plan.tag);
        if outcome.pushed {
            println!("Pushed {} and {} to {}", plan.branch, plan.tag, config.git.remote);
        }
        if let Some(published) = &outcome.published {
            println!("Published {}", published.html_url);
        }
        Ok(())
    }
}
