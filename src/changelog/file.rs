//! Changelog file updates.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use semver::Version;
use tracing::{info, warn};

/// Whether the changelog already has a heading for `version`.
///
/// Recognizes both linked (`## [1.2.3](...)`) and plain (`# 1.2.3 (...)`)
/// headings.
pub fn contains_version(content: &str, version: &Version) -> bool {
    let v = version.to_string();
    let linked = format!("[{v}]");
    let plain = format!("{v} ");

    content.lines().any(|line| {
        let line = line.trim_start();
        if !line.starts_with('#') {
            return false;
        }
        let rest = line.trim_start_matches('#').trim_start();
        rest.starts_with(&linked) || rest.starts_with(&plain) || rest == v
    })
}

/// Prepends release notes to the changelog file.
///
/// Returns `Ok(false)` without touching the file when it already contains
/// this version. The optional title stays at the top of the file.
pub fn prepend(path: &Path, notes: &str, version: &Version, title: Option<&str>) -> Result<bool> {
    let existing = if path.exists() {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read changelog: {}", path.display()))?
    } else {
        String::new()
    };

    if contains_version(&existing, version) {
        warn!(
            path = %path.display(),
            %version,
            "Changelog already contains this version, leaving it unchanged"
        );
        return Ok(false);
    }

    let rest = match title {
        Some(title) => strip_title(existing.trim(), title.trim()),
        None => existing.trim(),
    };

    let blocks: Vec<&str> = [title.map(str::trim), Some(notes.trim()), Some(rest)]
        .into_iter()
        .flatten()
        .filter(|b| !b.is_empty())
        .collect();
    let mut content = blocks.join("\n\n");
    content.push('\n');

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, content)
        .with_context(|| format!("Failed to write changelog: {}", path.display()))?;

    info!(path = %path.display(), %version, "Updated changelog");
    Ok(true)
}

/// Drops a leading `title` from `content` when it ends on a line boundary.
fn strip_title<'a>(content: &'a str, title: &str) -> &'a str {
    match content.strip_prefix(title) {
        Some(rest) if rest.is_empty() || rest.starts_with(['\n', '\r']) => rest.trim(),
        _ => content,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn detects_linked_and_plain_headings() {
        let content = "# Changelog\n\n## [1.0.1](https://x/compare/v1.0.0...v1.0.1) (2024-05-01)\n\n# 1.0.0 (2024-04-01)\n";
        assert!(contains_version(content, &v("1.0.1")));
        assert!(contains_version(content, &v("1.0.0")));
        assert!(!contains_version(content, &v("1.0.10")));
        assert!(!contains_version(content, &v("2.0.0")));
    }

    #[test]
    fn version_in_body_text_is_not_a_heading() {
        let content = "* bump to 1.0.1 ([abc](x))\n";
        assert!(!contains_version(content, &v("1.0.1")));
    }

    #[test]
    fn creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("CHANGELOG.md");

        let written = prepend(&path, "# 1.0.0 (2024-05-01)\n", &v("1.0.0"), None).unwrap();
        assert!(written);
        assert_eq!(fs::read_to_string(&path).unwrap(), "# 1.0.0 (2024-05-01)\n");
    }

    #[test]
    fn prepends_above_existing_entries_and_keeps_title() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("CHANGELOG.md");
        fs::write(&path, "# Changelog\n\n# 1.0.0 (2024-04-01)\n\n* old\n").unwrap();

        prepend(
            &path,
            "## 1.0.1 (2024-05-01)\n\n\n### Bug Fixes\n\n* new\n",
            &v("1.0.1"),
            Some("# Changelog"),
        )
        .unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "# Changelog\n\n## 1.0.1 (2024-05-01)\n\n\n### Bug Fixes\n\n* new\n\n# 1.0.0 (2024-04-01)\n\n* old\n"
        );
    }

    #[test]
    fn longer_first_heading_is_not_treated_as_title() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("CHANGELOG.md");
        fs::write(&path, "# Changelog of widget\n\n# 1.0.0 (2024-04-01)\n").unwrap();

        prepend(&path, "## 1.0.1 (2024-05-01)\n", &v("1.0.1"), Some("# Changelog")).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "# Changelog\n\n## 1.0.1 (2024-05-01)\n\n# Changelog of widget\n\n# 1.0.0 (2024-04-01)\n"
        );
    }

    #[test]
    fn title_only_file_is_replaced_cleanly() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("CHANGELOG.md");
        fs::write(&path, "# Changelog\n").unwrap();

        prepend(&path, "# 1.0.0 (2024-05-01)\n", &v("1.0.0"), Some("# Changelog")).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "# Changelog\n\n# 1.0.0 (2024-05-01)\n"
        );
    }

    #[test]
    fn existing_version_is_not_duplicated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("CHANGELOG.md");
        let original = "## 1.0.1 (2024-05-01)\n\n* fix\n";
        fs::write(&path, original).unwrap();

        let written = prepend(&path, "## 1.0.1 (2024-05-02)\n", &v("1.0.1"), None).unwrap();
        assert!(!written);
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs").join("CHANGELOG.md");
        assert!(prepend(&path, "# 1.0.0 (2024-05-01)", &v("1.0.0"), None).unwrap());
        assert!(path.exists());
    }
}
