//! Release configuration loaded from `.semrel.yaml`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analyzer::ReleaseRule;
use crate::version::TagFormat;

/// Configuration file names looked up at the repository root, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &[".semrel.yaml", ".semrel.yml"];

/// Top-level release configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReleaseConfig {
    /// Branches releases may be cut from.
    #[serde(default = "default_branches")]
    pub branches: Vec<String>,

    /// Tag template containing `${version}`.
    #[serde(default = "default_tag_format")]
    pub tag_format: String,

    /// Repository web URL; derived from the git remote when unset.
    #[serde(default)]
    pub repository_url: Option<String>,

    /// Custom release rules, evaluated before the built-in ones.
    #[serde(default)]
    pub release_rules: Vec<ReleaseRule>,

    /// Changelog file settings.
    #[serde(default)]
    pub changelog: ChangelogConfig,

    /// Release commit and push settings.
    #[serde(default)]
    pub git: GitConfig,

    /// GitHub release publication settings.
    #[serde(default)]
    pub github: GitHubConfig,

    /// Commit lint and lint gate settings.
    #[serde(default)]
    pub lint: LintConfig,
}

/// Changelog file settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChangelogConfig {
    /// Whether to update the changelog file.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Path relative to the repository root.
    #[serde(default = "default_changelog_file")]
    pub file: PathBuf,

    /// Optional title kept at the top of the file.
    #[serde(default)]
    pub title: Option<String>,
}

/// Release commit and push settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitConfig {
    /// Whether to commit release assets such as the changelog.
    #[serde(default = "default_true")]
    pub commit: bool,

    /// Release commit message; `${version}` and `${notes}` are substituted.
    #[serde(default = "default_commit_message")]
    pub message: String,

    /// Remote used for pushing and for repository URL detection.
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Author name when git has no identity configured.
    #[serde(default = "default_author_name")]
    pub author_name: String,

    /// Author email when git has no identity configured.
    #[serde(default = "default_author_email")]
    pub author_email: String,
}

/// GitHub release publication settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubConfig {
    /// Whether to publish a GitHub release.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// REST API base URL.
    #[serde(default = "default_github_api_url")]
    pub api_url: String,
}

/// Commit lint and lint gate settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LintConfig {
    /// Allowed commit types.
    #[serde(default = "default_lint_types")]
    pub types: Vec<String>,

    /// Commit types for which the lint gate skips linting on push.
    #[serde(default = "default_skip_types")]
    pub skip_types: Vec<String>,

    /// Message markers that skip linting.
    #[serde(default = "default_skip_markers")]
    pub skip_markers: Vec<String>,

    /// Maximum header length.
    #[serde(default = "default_header_max_length")]
    pub header_max_length: usize,

    /// Maximum body line length.
    #[serde(default = "default_body_max_line_length")]
    pub body_max_line_length: usize,
}

fn default_true() -> bool {
    true
}

fn default_branches() -> Vec<String> {
    vec!["main".to_string(), "master".to_string()]
}

fn default_tag_format() -> String {
    "v${version}".to_string()
}

fn default_changelog_file() -> PathBuf {
    PathBuf::from("CHANGELOG.md")
}

fn default_commit_message() -> String {
    "chore(release): ${version} [skip ci]\n\n${notes}".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_author_name() -> String {
    "semrel-bot".to_string()
}

fn default_author_email() -> String {
    "semrel-bot@users.noreply.github.com".to_string()
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_lint_types() -> Vec<String> {
    [
        "build", "chore", "ci", "docs", "feat", "fix", "perf", "refactor", "revert", "style",
        "test",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect()
}

fn default_skip_types() -> Vec<String> {
    vec!["chore".to_string(), "docs".to_string()]
}

fn default_skip_markers() -> Vec<String> {
    vec![
        "[skip ci]".to_string(),
        "[ci skip]".to_string(),
        "[skip lint]".to_string(),
    ]
}

fn default_header_max_length() -> usize {
    100
}

fn default_body_max_line_length() -> usize {
    100
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            branches: default_branches(),
            tag_format: default_tag_format(),
            repository_url: None,
            release_rules: Vec::new(),
            changelog: ChangelogConfig::default(),
            git: GitConfig::default(),
            github: GitHubConfig::default(),
            lint: LintConfig::default(),
        }
    }
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            file: default_changelog_file(),
            title: None,
        }
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            commit: true,
            message: default_commit_message(),
            remote: default_remote(),
            author_name: default_author_name(),
            author_email: default_author_email(),
        }
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: default_github_api_url(),
        }
    }
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            types: default_lint_types(),
            skip_types: default_skip_types(),
            skip_markers: default_skip_markers(),
            header_max_length: default_header_max_length(),
            body_max_line_length: default_body_max_line_length(),
        }
    }
}

impl ReleaseConfig {
    /// Loads configuration from the repository root, falling back to defaults.
    pub fn load(repo_root: &Path) -> Result<Self> {
        match Self::find_config_file(repo_root) {
            Some(path) => Self::load_from_path(&path),
            None => {
                debug!(root = %repo_root.display(), "No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Loads configuration from a specific file.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        };

        config
            .tag_format()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        debug!(path = %path.display(), "Loaded release configuration");
        Ok(config)
    }

    /// Returns the first existing config file under the repository root.
    pub fn find_config_file(repo_root: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| repo_root.join(name))
            .find(|path| path.is_file())
    }

    /// Returns the compiled tag format.
    pub fn tag_format(&self) -> Result<TagFormat> {
        TagFormat::new(&self.tag_format).map_err(Into::into)
    }

    /// Whether releases may be cut from this branch.
    pub fn is_release_branch(&self, branch: &str) -> bool {
        self.branches.iter().any(|b| b == branch)
    }

    /// Serializes the effective configuration as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;
    use crate::analyzer::RuleRelease;

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempdir().unwrap();
        let config = ReleaseConfig::load(dir.path()).unwrap();
        assert_eq!(config.branches, vec!["main", "master"]);
        assert_eq!(config.tag_format, "v${version}");
        assert!(config.changelog.enabled);
        assert_eq!(config.changelog.file, PathBuf::from("CHANGELOG.md"));
        assert_eq!(config.lint.header_max_length, 100);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(".semrel.yaml"),
            "branches: [trunk]\nchangelog:\n  title: '# Changelog'\nrelease_rules:\n  - type: refactor\n    release: patch\n",
        )
        .unwrap();

        let config = ReleaseConfig::load(dir.path()).unwrap();
        assert_eq!(config.branches, vec!["trunk"]);
        assert_eq!(config.changelog.title.as_deref(), Some("# Changelog"));
        assert!(config.changelog.enabled);
        assert_eq!(config.release_rules.len(), 1);
        assert_eq!(config.release_rules[0].release, RuleRelease::Patch);
        assert_eq!(config.git.remote, "origin");
    }

    #[test]
    fn yml_extension_is_found() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".semrel.yml"), "tag_format: 'release-${version}'\n").unwrap();
        let config = ReleaseConfig::load(dir.path()).unwrap();
        assert_eq!(config.tag_format, "release-${version}");
    }

    #[test]
    fn empty_file_means_defaults() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".semrel.yaml"), "\n").unwrap();
        let config = ReleaseConfig::load(dir.path()).unwrap();
        assert_eq!(config.branches, vec!["main", "master"]);
    }

    #[test]
    fn invalid_tag_format_is_rejected() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".semrel.yaml"), "tag_format: latest\n").unwrap();
        assert!(ReleaseConfig::load(dir.path()).is_err());
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".semrel.yaml"), "branches: [unclosed\n").unwrap();
        assert!(ReleaseConfig::load(dir.path()).is_err());
    }

    #[test]
    fn yaml_round_trip() {
        let config = ReleaseConfig::default();
        let yaml = config.to_yaml().unwrap();
        let back: ReleaseConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.branches, config.branches);
        assert_eq!(back.git.message, config.git.message);
    }

    #[test]
    fn release_branch_check() {
        let config = ReleaseConfig::default();
        assert!(config.is_release_branch("main"));
        assert!(!config.is_release_branch("feature/x"));
    }
}
