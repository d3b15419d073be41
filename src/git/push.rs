//! Pushing release refs through the `git` executable.
//!
//! Credentials come from whatever helpers the local `git` is configured with.

use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::info;

/// Pushes refs to a remote, e.g. `push(dir, "origin", &["main", "refs/tags/v1.0.0"])`.
pub fn push(workdir: &Path, remote: &str, refs: &[String]) -> Result<()> {
    if refs.is_empty() {
        return Ok(());
    }

    info!(remote, refs = ?refs, "Pushing release refs");
    let output = Command::new("git")
        .current_dir(workdir)
        .arg("push")
        .arg(remote)
        .args(refs)
        .output()
        .context("Failed to run git push")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("git push to {remote} failed: {}", stderr.trim());
    }

    Ok(())
}
