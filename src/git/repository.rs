//! Git repository operations.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use git2::{Oid, Repository, Signature, StatusOptions};
use semver::Version;
use tracing::{debug, info};

use crate::git::CommitInfo;
use crate::version::TagFormat;

/// Git repository wrapper.
pub struct GitRepository {
    repo: Repository,
}

impl fmt::Debug for GitRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitRepository")
            .field("path", &self.repo.path())
            .finish_non_exhaustive()
    }
}

/// The most recent release tag reachable from `HEAD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastRelease {
    /// Tag name, e.g. `v1.2.3`.
    pub tag: String,
    /// Version parsed from the tag.
    pub version: Version,
    /// Commit the tag points at.
    pub commit: Oid,
}

impl GitRepository {
    /// Opens the repository containing the specified path.
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path.as_ref()).with_context(|| {
            format!("Not in a git repository: {}", path.as_ref().display())
        })?;

        Ok(Self { repo })
    }

    /// Returns the working directory root.
    pub fn workdir(&self) -> Result<PathBuf> {
        self.repo
            .workdir()
            .map(Path::to_path_buf)
            .context("Repository has no working directory")
    }

    /// Returns the current branch name.
    pub fn current_branch(&self) -> Result<String> {
        let head = self.repo.head().context("Failed to get HEAD reference")?;

        if let Some(name) = head.shorthand() {
            if name != "HEAD" {
                return Ok(name.to_string());
            }
        }

        bail!("Repository is in detached HEAD state")
    }

    /// Checks whether tracked files have uncommitted changes.
    pub fn is_working_directory_clean(&self) -> Result<bool> {
        let mut options = StatusOptions::new();
        options.include_untracked(false).include_ignored(false);
        let statuses = self
            .repo
            .statuses(Some(&mut options))
            .context("Failed to get repository status")?;
        Ok(statuses.is_empty())
    }

    /// Returns the `HEAD` commit.
    pub fn head_commit(&self) -> Result<CommitInfo> {
        let commit = self
            .repo
            .head()
            .context("Failed to get HEAD")?
            .peel_to_commit()
            .context("Failed to peel HEAD to commit")?;
        CommitInfo::from_git_commit(&commit)
    }

    /// Finds the highest release tag reachable from `HEAD`.
    pub fn last_release(&self, format: &TagFormat) -> Result<Option<LastRelease>> {
        let head = self
            .repo
            .head()
            .context("Failed to get HEAD")?
            .peel_to_commit()
            .context("Failed to peel HEAD to commit")?
            .id();

        let names = self.repo.tag_names(None).context("Failed to list tags")?;
        let mut best: Option<LastRelease> = None;

        for name in names.iter().flatten() {
            let Some(version) = format.parse(name) else {
                continue;
            };
            let commit = self
                .repo
                .revparse_single(&format!("refs/tags/{name}"))
                .and_then(|obj| obj.peel_to_commit())
                .with_context(|| format!("Failed to resolve tag: {name}"))?
                .id();

            let reachable = commit == head
                || self
                    .repo
                    .graph_descendant_of(head, commit)
                    .context("Failed to compare tag with HEAD")?;
            if !reachable {
                debug!(tag = name, "Skipping tag not reachable from HEAD");
                continue;
            }

            if best.as_ref().is_none_or(|b| version > b.version) {
                best = Some(LastRelease {
                    tag: name.to_string(),
                    version,
                    commit,
                });
            }
        }

        Ok(best)
    }

    /// Returns commits after `since` up to `HEAD`, oldest first, without merges.
    pub fn commits_since(&self, since: Option<Oid>) -> Result<Vec<CommitInfo>> {
        let mut walker = self.repo.revwalk().context("Failed to create revwalk")?;
        walker.push_head().context("Failed to push HEAD")?;
        if let Some(oid) = since {
            walker.hide(oid).context("Failed to hide release commit")?;
        }

        let mut commits = Vec::new();
        for oid in walker {
            let oid = oid.context("Failed to get commit OID from walker")?;
            let commit = self
                .repo
                .find_commit(oid)
                .context("Failed to find commit")?;

            // Skip merge commits
            if commit.parent_count() > 1 {
                continue;
            }

            commits.push(CommitInfo::from_git_commit(&commit)?);
        }

        // Reverse to get chronological order (oldest first)
        commits.reverse();
        Ok(commits)
    }

    /// Parses a commit range and returns its commits, oldest first.
    ///
    /// Accepts `HEAD`, a single revision, or `start..end`.
    pub fn commits_in_range(&self, range: &str) -> Result<Vec<CommitInfo>> {
        if let Some((start_spec, end_spec)) = range.split_once("..") {
            if end_spec.contains("..") {
                bail!("Invalid range format: {range}");
            }
            let end_spec = if end_spec.is_empty() { "HEAD" } else { end_spec };

            let start_commit = self
                .repo
                .revparse_single(start_spec)
                .with_context(|| format!("Failed to parse start commit: {start_spec}"))?
                .peel_to_commit()
                .context("Failed to peel start object to commit")?;
            let end_commit = self
                .repo
                .revparse_single(end_spec)
                .with_context(|| format!("Failed to parse end commit: {end_spec}"))?
                .peel_to_commit()
                .context("Failed to peel end object to commit")?;

            let mut walker = self.repo.revwalk().context("Failed to create revwalk")?;
            walker
                .push(end_commit.id())
                .context("Failed to push end commit")?;
            walker
                .hide(start_commit.id())
                .context("Failed to hide start commit")?;

            let mut commits = Vec::new();
            for oid in walker {
                let oid = oid.context("Failed to get commit OID from walker")?;
                let commit = self
                    .repo
                    .find_commit(oid)
                    .context("Failed to find commit")?;
                commits.push(CommitInfo::from_git_commit(&commit)?);
            }
            commits.reverse();
            Ok(commits)
        } else {
            let commit = self
                .repo
                .revparse_single(range)
                .with_context(|| format!("Failed to parse commit: {range}"))?
                .peel_to_commit()
                .context("Failed to peel object to commit")?;
            Ok(vec![CommitInfo::from_git_commit(&commit)?])
        }
    }

    /// Returns the signature for release commits.
    ///
    /// Uses the repository's configured identity and falls back to the
    /// given name and email.
    pub fn signature(&self, fallback_name: &str, fallback_email: &str) -> Result<Signature<'static>> {
        match self.repo.signature() {
            Ok(sig) => Ok(sig.to_owned()),
            Err(e) => {
                debug!("No git identity configured ({e}), using fallback signature");
                Signature::now(fallback_name, fallback_email)
                    .context("Failed to create fallback signature")
            }
        }
    }

    /// Returns the full message of the `HEAD` commit.
    pub fn head_message(&self) -> Result<String> {
        Ok(self.head_commit()?.message)
    }

    /// Stages the given workdir-relative paths and commits them on `HEAD`.
    pub fn commit_files(
        &self,
        paths: &[&Path],
        message: &str,
        signature: &Signature<'_>,
    ) -> Result<Oid> {
        let mut index = self.repo.index().context("Failed to open index")?;
        for path in paths {
            index
                .add_path(path)
                .with_context(|| format!("Failed to stage {}", path.display()))?;
        }
        index.write().context("Failed to write index")?;

        let tree_id = index.write_tree().context("Failed to write tree")?;
        let tree = self.repo.find_tree(tree_id).context("Failed to find tree")?;
        let parent = self
            .repo
            .head()
            .context("Failed to get HEAD")?
            .peel_to_commit()
            .context("Failed to peel HEAD to commit")?;

        let oid = self
            .repo
            .commit(
                Some("HEAD"),
                signature,
                signature,
                message,
                &tree,
                &[&parent],
            )
            .context("Failed to create release commit")?;

        info!(commit = %oid, "Created release commit");
        Ok(oid)
    }

    /// Creates a lightweight tag on `HEAD`; fails if the tag exists.
    pub fn create_tag(&self, name: &str) -> Result<Oid> {
        let head = self
            .repo
            .head()
            .context("Failed to get HEAD")?
            .peel_to_commit()
            .context("Failed to peel HEAD to commit")?;
        let oid = self
            .repo
            .tag_lightweight(name, head.as_object(), false)
            .with_context(|| format!("Failed to create tag {name}"))?;
        info!(tag = name, commit = %head.id(), "Created tag");
        Ok(oid)
    }

    /// Whether a tag with this name exists.
    pub fn tag_exists(&self, name: &str) -> bool {
        self.repo
            .find_reference(&format!("refs/tags/{name}"))
            .is_ok()
    }

    /// Returns the URL of a remote, if configured.
    pub fn remote_url(&self, name: &str) -> Option<String> {
        self.repo
            .find_remote(name)
            .ok()
            .and_then(|remote| remote.url().map(str::to_string))
    }
}
