//! Git remote URL handling.

use std::fmt;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Web URL of a hosted repository, e.g. `https://github.com/owner/repo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryUrl {
    /// Host name, such as `github.com`.
    pub host: String,
    /// Owner or group path; may contain `/` for nested groups.
    pub owner: String,
    /// Repository name without `.git`.
    pub name: String,
}

impl RepositoryUrl {
    /// Parses a remote URI in SSH, scp-like or HTTPS form.
    ///
    /// Accepted forms:
    /// - `git@github.com:owner/repo.git`
    /// - `ssh://git@github.com/owner/repo.git`
    /// - `https://github.com/owner/repo(.git)`
    /// - `git+https://github.com/owner/repo.git`
    pub fn parse(uri: &str) -> Result<Self> {
        let uri = uri.trim();
        if uri.is_empty() {
            bail!("Remote URI is empty");
        }

        let (host, path) = if let Some((user_host, path)) = scp_like_parts(uri) {
            let host = user_host.rsplit('@').next().unwrap_or(user_host);
            (host.to_string(), path.to_string())
        } else {
            let normalized = uri.strip_prefix("git+").unwrap_or(uri);
            let url = Url::parse(normalized)
                .with_context(|| format!("Failed to parse remote URI: {uri}"))?;
            let host = url
                .host_str()
                .with_context(|| format!("Remote URI has no host: {uri}"))?
                .to_string();
            (host, url.path().to_string())
        };

        let path = path.trim_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        let Some((owner, name)) = path.rsplit_once('/') else {
            bail!("Remote URI has no owner/repository path: {uri}");
        };
        if owner.is_empty() || name.is_empty() {
            bail!("Remote URI has no owner/repository path: {uri}");
        }

        Ok(Self {
            host: host.to_lowercase(),
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// Whether the repository is hosted on github.com.
    pub fn is_github(&self) -> bool {
        self.host == "github.com"
    }

    /// Returns the web URL of the repository.
    pub fn web_url(&self) -> String {
        format!("https://{}/{}/{}", self.host, self.owner, self.name)
    }

    /// Returns the URL of a commit page.
    pub fn commit_url(&self, hash: &str) -> String {
        format!("{}/commit/{hash}", self.web_url())
    }

    /// Returns the URL comparing two tags.
    pub fn compare_url(&self, from: &str, to: &str) -> String {
        format!("{}/compare/{from}...{to}", self.web_url())
    }

    /// Returns the URL of an issue.
    pub fn issue_url(&self, issue: &str) -> String {
        format!("{}/issues/{issue}", self.web_url())
    }
}

impl fmt::Display for RepositoryUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.web_url())
    }
}

/// Splits `user@host:path` into `(user@host, path)`.
fn scp_like_parts(uri: &str) -> Option<(&str, &str)> {
    if uri.contains("://") {
        return None;
    }
    let (user_host, path) = uri.split_once(':')?;
    (!user_host.is_empty() && !path.is_empty()).then_some((user_host, path))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_scp_like_ssh() {
        let url = RepositoryUrl::parse("git@github.com:acme/widget.git").unwrap();
        assert_eq!(url.host, "github.com");
        assert_eq!(url.owner, "acme");
        assert_eq!(url.name, "widget");
        assert!(url.is_github());
    }

    #[test]
    fn parses_ssh_scheme() {
        let url = RepositoryUrl::parse("ssh://git@github.com/acme/widget.git").unwrap();
        assert_eq!(url.web_url(), "https://github.com/acme/widget");
    }

    #[test]
    fn parses_https_with_and_without_suffix() {
        let a = RepositoryUrl::parse("https://github.com/acme/widget.git").unwrap();
        let b = RepositoryUrl::parse("https://github.com/acme/widget/").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn parses_git_plus_https() {
        let url = RepositoryUrl::parse("git+https://gitlab.com/group/sub/widget.git").unwrap();
        assert_eq!(url.owner, "group/sub");
        assert_eq!(url.name, "widget");
        assert!(!url.is_github());
    }

    #[test]
    fn rejects_paths_without_owner() {
        assert!(RepositoryUrl::parse("https://github.com/widget").is_err());
        assert!(RepositoryUrl::parse("").is_err());
    }

    #[test]
    fn builds_links() {
        let url = RepositoryUrl::parse("git@github.com:acme/widget.git").unwrap();
        assert_eq!(
            url.commit_url("abc"),
            "https://github.com/acme/widget/commit/abc"
        );
        assert_eq!(
            url.compare_url("v1.0.0", "v1.0.1"),
            "https://github.com/acme/widget/compare/v1.0.0...v1.0.1"
        );
        assert_eq!(url.issue_url("12"), "https://github.com/acme/widget/issues/12");
    }
}
