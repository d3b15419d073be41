//! Release notes grouping and Markdown rendering.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::analyzer::ReleaseType;
use crate::commit::{ConventionalCommit, IssueRef};
use crate::git::RepositoryUrl;

/// Title of the breaking changes section.
pub const BREAKING_CHANGES_TITLE: &str = "BREAKING CHANGES";

#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static SUBJECT_ISSUE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?P<lead>^|[\s(,])#(?P<issue>\d+)\b").unwrap());

/// Maps a commit type to its changelog section title.
pub fn section_title(kind: &str) -> Option<&'static str> {
    match kind.to_ascii_lowercase().as_str() {
        "feat" => Some("Features"),
        "fix" => Some("Bug Fixes"),
        "perf" => Some("Performance Improvements"),
        "revert" => Some("Reverts"),
        _ => None,
    }
}

/// Release metadata shown in the notes heading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseInfo {
    /// Version being released.
    pub version: Version,
    /// Kind of bump that produced the version.
    pub release_type: ReleaseType,
    /// Tag of the previous release, if any.
    pub previous_tag: Option<String>,
    /// Tag of this release.
    pub current_tag: String,
    /// Release date.
    pub date: NaiveDate,
    /// Repository used to build links.
    pub repository: Option<RepositoryUrl>,
}

/// One changelog bullet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEntry {
    /// Commit scope.
    pub scope: Option<String>,
    /// Description text.
    pub subject: String,
    /// Full commit hash.
    pub hash: String,
    /// Issues closed by the commit.
    pub references: Vec<IssueRef>,
}

/// A titled group of entries, e.g. `Bug Fixes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSection {
    /// Section title.
    pub title: String,
    /// Entries sorted by scope, then subject.
    pub entries: Vec<NoteEntry>,
}

/// Release notes for one version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseNotes {
    /// Heading metadata.
    pub info: ReleaseInfo,
    /// Sections sorted by title.
    pub sections: Vec<NoteSection>,
    /// Breaking change notes.
    pub breaking_changes: Vec<NoteEntry>,
}

impl ReleaseNotes {
    /// Groups commits into sections.
    pub fn build(info: ReleaseInfo, commits: &[ConventionalCommit]) -> Self {
        let mut grouped: BTreeMap<&'static str, Vec<NoteEntry>> = BTreeMap::new();
        let mut breaking_changes = Vec::new();

        for commit in commits {
            if let Some(title) = section_title(&commit.kind) {
                grouped.entry(title).or_default().push(NoteEntry {
                    scope: commit.scope.clone(),
                    subject: commit.subject.clone(),
                    hash: commit.hash.clone(),
                    references: commit
                        .references
                        .iter()
                        .filter(|r| r.action.is_some())
                        .cloned()
                        .collect(),
                });
            }

            for note in &commit.breaking_notes {
                breaking_changes.push(NoteEntry {
                    scope: commit.scope.clone(),
                    subject: note.clone(),
                    hash: commit.hash.clone(),
                    references: Vec::new(),
                });
            }
        }

        let sections = grouped
            .into_iter()
            .map(|(title, mut entries)| {
                sort_entries(&mut entries);
                NoteSection {
                    title: title.to_string(),
                    entries,
                }
            })
            .collect();
        sort_entries(&mut breaking_changes);

        Self {
            info,
            sections,
            breaking_changes,
        }
    }

    /// Whether the notes list nothing beyond the heading.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.breaking_changes.is_empty()
    }

    /// Renders the heading line.
    ///
    /// Versions with a non-zero patch component use a level-two heading,
    /// others level one. The version links to a compare view when both a
    /// repository and a previous tag are known.
    pub fn heading(&self) -> String {
        let info = &self.info;
        let level = if info.version.patch != 0 {
            "##"
        } else {
            "#"
        };
        let date = info.date.format("%Y-%m-%d");

        match (&info.repository, &info.previous_tag) {
            (Some(repo), Some(previous)) => format!(
                "{level} [{}]({}) ({date})",
                info.version,
                repo.compare_url(previous, &info.current_tag)
            ),
            _ => format!("{level} {} ({date})", info.version),
        }
    }

    /// Renders the full Markdown notes.
    pub fn render(&self) -> String {
        let repo = self.info.repository.as_ref();
        let mut blocks = vec![self.heading()];

        for section in &self.sections {
            let lines: Vec<String> = section
                .entries
                .iter()
                .map(|e| render_entry(e, repo, true))
                .collect();
            blocks.push(format!("### {}\n\n{}", section.title, lines.join("\n")));
        }

        if !self.breaking_changes.is_empty() {
            let lines: Vec<String> = self
                .breaking_changes
                .iter()
                .map(|e| render_entry(e, repo, false))
                .collect();
            blocks.push(format!(
                "### {BREAKING_CHANGES_TITLE}\n\n{}",
                lines.join("\n")
            ));
        }

        let mut out = blocks.join("\n\n\n");
        out.push('\n');
        out
    }
}

/// Sorts entries by scope then subject, unscoped entries first.
fn sort_entries(entries: &mut [NoteEntry]) {
    entries.sort_by(|a, b| {
        a.scope
            .as_deref()
            .unwrap_or("")
            .cmp(b.scope.as_deref().unwrap_or(""))
            .then_with(|| a.subject.cmp(&b.subject))
    });
}

/// Renders a single bullet.
fn render_entry(entry: &NoteEntry, repo: Option<&RepositoryUrl>, with_hash: bool) -> String {
    let mut line = String::from("* ");
    if let Some(scope) = &entry.scope {
        line.push_str(&format!("**{scope}:** "));
    }
    line.push_str(&link_issues(&entry.subject, repo));

    if with_hash {
        let short = entry
            .hash
            .get(..crate::commit::SHORT_HASH_LEN)
            .unwrap_or(&entry.hash);
        match repo {
            Some(repo) => {
                line.push_str(&format!(" ([{short}]({}))", repo.commit_url(&entry.hash)));
            }
            None => line.push_str(&format!(" ({short})")),
        }
    }

    if !entry.references.is_empty() {
        let refs: Vec<String> = entry
            .references
            .iter()
            .map(|r| match repo {
                Some(repo) => format!("[{}{}]({})", r.prefix, r.issue, repo.issue_url(&r.issue)),
                None => format!("{}{}", r.prefix, r.issue),
            })
            .collect();
        line.push_str(&format!(", closes {}", refs.join(" ")));
    }

    line
}

/// Turns `#12` mentions into issue links when the repository is known.
fn link_issues(text: &str, repo: Option<&RepositoryUrl>) -> String {
    let Some(repo) = repo else {
        return text.to_string();
    };
    SUBJECT_ISSUE_PATTERN
        .replace_all(text, |caps: &Captures<'_>| {
            format!(
                "{}[#{}]({})",
                &caps["lead"],
                &caps["issue"],
                repo.issue_url(&caps["issue"])
            )
        })
        .into_owned()
}
