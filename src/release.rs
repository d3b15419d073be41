//! Release pipeline: plan the next version, then commit, tag, push and publish.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use semver::Version;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analyzer::{analyze, ReleaseType};
use crate::changelog::{self, ReleaseInfo, ReleaseNotes};
use crate::commit::{is_release_skipped, ConventionalCommit};
use crate::config::ReleaseConfig;
use crate::git::{self, GitRepository, LastRelease, RepositoryUrl};
use crate::github::{PublishedRelease, ReleasePublisher, ReleaseRequest};
use crate::utils::check_working_directory_clean;
use crate::version::{next_version, VERSION_PLACEHOLDER};

/// Placeholder replaced by the release notes in the commit message template.
pub const NOTES_PLACEHOLDER: &str = "${notes}";

/// Everything needed to cut a release.
#[derive(Debug, Clone, Serialize)]
pub struct ReleasePlan {
    /// Branch the release is cut from.
    pub branch: String,
    /// Previous release, if any.
    #[serde(skip)]
    pub last_release: Option<LastRelease>,
    /// Conventional commits since the previous release, oldest first.
    pub commits: Vec<ConventionalCommit>,
    /// Bump derived from the commits.
    pub release_type: ReleaseType,
    /// Version being released.
    pub next_version: Version,
    /// Tag for the new version.
    pub tag: String,
    /// Release notes.
    pub notes: ReleaseNotes,
}

impl ReleasePlan {
    /// Returns the repository used for links and publication.
    pub fn repository(&self) -> Option<&RepositoryUrl> {
        self.notes.info.repository.as_ref()
    }
}

/// Result of planning.
#[derive(Debug, Clone)]
pub enum PlanOutcome {
    /// The current branch is not configured for releases.
    NotReleaseBranch(String),
    /// No commit since the last release warrants a new version.
    NoRelease,
    /// A release should be made.
    Release(Box<ReleasePlan>),
}

/// Switches that limit what a release does.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReleaseOptions {
    /// Plan only; change nothing.
    pub dry_run: bool,
    /// Skip pushing the branch and tag.
    pub no_push: bool,
    /// Skip publishing a GitHub release.
    pub no_github: bool,
}

/// What a release actually did.
#[derive(Debug, Clone, Default)]
pub struct ReleaseOutcome {
    /// Whether the changelog file was written.
    pub changelog_updated: bool,
    /// Hash of the release commit, if one was created.
    pub commit: Option<String>,
    /// Whether a tag was created.
    pub tagged: bool,
    /// Whether branch and tag were pushed.
    pub pushed: bool,
    /// The published GitHub release, if any.
    pub published: Option<PublishedRelease>,
}

/// Computes the next release from the repository state.
pub fn plan(repo: &GitRepository, config: &ReleaseConfig, today: NaiveDate) -> Result<PlanOutcome> {
    let branch = repo.current_branch()?;
    if !config.is_release_branch(&branch) {
        info!(%branch, "Not a release branch");
        return Ok(PlanOutcome::NotReleaseBranch(branch));
    }

    let format = config.tag_format()?;
    let last_release = repo.last_release(&format)?;
    match &last_release {
        Some(last) => info!(tag = %last.tag, version = %last.version, "Found last release"),
        None => info!("No previous release found"),
    }

    let commits: Vec<ConventionalCommit> = repo
        .commits_since(last_release.as_ref().map(|l| l.commit))?
        .into_iter()
        .filter(|c| !c.is_merge())
        .filter(|c| {
            let skipped = is_release_skipped(&c.message);
            if skipped {
                debug!(hash = %c.hash, "Commit opted out of release");
            }
            !skipped
        })
        .filter_map(|c| match c.conventional() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!(hash = %c.hash, error = %e, "Ignoring non-conventional commit");
                None
            }
        })
        .collect();
    info!(count = commits.len(), "Analyzing commits");

    let Some(release_type) = analyze(&commits, &config.release_rules) else {
        info!("No release warranted");
        return Ok(PlanOutcome::NoRelease);
    };

    let next = next_version(last_release.as_ref().map(|l| &l.version), release_type)?;
    let tag = format.render(&next);
    if repo.tag_exists(&tag) {
        bail!("Tag {tag} already exists");
    }

    let repository = resolve_repository(repo, config)?;
    let notes = ReleaseNotes::build(
        ReleaseInfo {
            version: next.clone(),
            release_type,
            previous_tag: last_release.as_ref().map(|l| l.tag.clone()),
            current_tag: tag.clone(),
            date: today,
            repository,
        },
        &commits,
    );

    info!(version = %next, %release_type, %tag, "Planned release");
    Ok(PlanOutcome::Release(Box::new(ReleasePlan {
        branch,
        last_release,
        commits,
        release_type,
        next_version: next,
        tag,
        notes,
    })))
}

/// Resolves the repository URL from configuration or the git remote.
pub fn resolve_repository(
    repo: &GitRepository,
    config: &ReleaseConfig,
) -> Result<Option<RepositoryUrl>> {
    if let Some(url) = &config.repository_url {
        return RepositoryUrl::parse(url)
            .map(Some)
            .context("Invalid repository_url in configuration");
    }

    let Some(remote) = repo.remote_url(&config.git.remote) else {
        debug!(remote = %config.git.remote, "Remote not configured, links disabled");
        return Ok(None);
    };
    match RepositoryUrl::parse(&remote) {
        Ok(url) => Ok(Some(url)),
        Err(e) => {
            debug!(%remote, error = %e, "Remote is not a hosted repository, links disabled");
            Ok(None)
        }
    }
}

/// Renders the release commit message template.
pub fn commit_message(template: &str, version: &Version, notes: &str) -> String {
    template
        .replace(VERSION_PLACEHOLDER, &version.to_string())
        .replace(NOTES_PLACEHOLDER, notes.trim_end())
}

/// Carries out a planned release.
pub async fn execute(
    repo: &GitRepository,
    config: &ReleaseConfig,
    plan: &ReleasePlan,
    options: ReleaseOptions,
    publisher: Option<&dyn ReleasePublisher>,
) -> Result<ReleaseOutcome> {
    let mut outcome = ReleaseOutcome::default();
    if options.dry_run {
        info!(version = %plan.next_version, "Dry run, nothing changed");
        return Ok(outcome);
    }

    check_working_directory_clean(repo)?;
    let workdir = repo.workdir()?;
    let notes = plan.notes.render();

    if config.changelog.enabled {
        let relative = changelog_path(&workdir, &config.changelog.file)?;
        outcome.changelog_updated = changelog::prepend(
            &workdir.join(&relative),
            &notes,
            &plan.next_version,
            config.changelog.title.as_deref(),
        )?;

        if config.git.commit && outcome.changelog_updated {
            let message = commit_message(&config.git.message, &plan.next_version, &notes);
            let signature = repo.signature(&config.git.author_name, &config.git.author_email)?;
            let oid = repo.commit_files(&[relative.as_path()], &message, &signature)?;
            outcome.commit = Some(oid.to_string());
        }
    }

    repo.create_tag(&plan.tag)?;
    outcome.tagged = true;

    if options.no_push {
        info!("Skipping push");
    } else {
        git::push(
            &workdir,
            &config.git.remote,
            &[plan.branch.clone(), plan.tag.clone()],
        )?;
        outcome.pushed = true;
    }

    outcome.published = publish(config, plan, options, outcome.pushed, &notes, publisher).await?;
    Ok(outcome)
}

async fn publish(
    config: &ReleaseConfig,
    plan: &ReleasePlan,
    options: ReleaseOptions,
    pushed: bool,
    notes: &str,
    publisher: Option<&dyn ReleasePublisher>,
) -> Result<Option<PublishedRelease>> {
    if options.no_github || !config.github.enabled {
        debug!("GitHub release disabled");
        return Ok(None);
    }
    if !pushed {
        info!("Tag was not pushed, skipping GitHub release");
        return Ok(None);
    }
    let Some(repository) = plan.repository().filter(|r| r.is_github()) else {
        warn!("Repository is not hosted on GitHub, skipping GitHub release");
        return Ok(None);
    };
    let Some(publisher) = publisher else {
        warn!("No GitHub token found (GITHUB_TOKEN or GH_TOKEN), skipping GitHub release");
        return Ok(None);
    };

    let request = ReleaseRequest {
        owner: repository.owner.clone(),
        repo: repository.name.clone(),
        tag_name: plan.tag.clone(),
        name: plan.tag.clone(),
        body: notes.to_string(),
        draft: false,
        prerelease: false,
    };
    let release = publisher
        .publish(&request)
        .await
        .with_context(|| format!("Failed to publish GitHub release {}", plan.tag))?;
    Ok(Some(release))
}

/// Returns the changelog path relative to the working directory.
fn changelog_path(workdir: &Path, file: &Path) -> Result<PathBuf> {
    if file.is_relative() {
        return Ok(file.to_path_buf());
    }
    file.strip_prefix(workdir)
        .map(Path::to_path_buf)
        .with_context(|| {
            format!(
                "Changelog {} is outside the repository {}",
                file.display(),
                workdir.display()
            )
        })
}
