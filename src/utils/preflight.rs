//! Preflight checks that fail fast before a release mutates anything.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::git::GitRepository;
use crate::github::client::TOKEN_ENV_VARS;
use crate::utils::settings::get_env_vars;

/// Opens the repository at `path`, with a friendly error outside one.
pub fn check_git_repository(path: &Path) -> Result<GitRepository> {
    GitRepository::open_at(path).with_context(|| {
        format!(
            "Not in a git repository: {}. Run semrel from within a git repository or pass --repo.",
            path.display()
        )
    })
}

/// Fails when tracked files have uncommitted changes.
pub fn check_working_directory_clean(repo: &GitRepository) -> Result<()> {
    if !repo.is_working_directory_clean()? {
        bail!(
            "Working directory has uncommitted changes.\n\
             Please commit or stash your changes before releasing."
        );
    }
    Ok(())
}

/// Returns whether a GitHub token is available.
pub fn has_github_token() -> bool {
    get_env_vars(TOKEN_ENV_VARS).is_ok()
}
