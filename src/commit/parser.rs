//! Conventional commit message parser.

use std::sync::LazyLock;

use regex::Regex;

use super::{
    CommitParseError, ConventionalCommit, Footer, IssueRef, RevertInfo, BREAKING_TOKENS,
    CLOSING_TOKENS,
};

#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static HEADER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<type>\w+)(?:\((?P<scope>[^()\r\n]*)\))?(?P<bang>!)?:(?: (?P<subject>.*))?$")
        .unwrap()
});

#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static REVERT_HEADER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^Revert "(?P<header>.*)"\s*$"#).unwrap());

#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static REVERT_HASH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"This reverts commit (?P<hash>[0-9a-fA-F]{7,40})").unwrap());

#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static FOOTER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<token>BREAKING CHANGE|BREAKING-CHANGE|[A-Za-z][\w-]*)(?:: | #)(?P<value>.*)$")
        .unwrap()
});

#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static ISSUE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[\s(,])#(?P<issue>\d+)\b").unwrap());

/// Markers that exclude a commit from release analysis.
const RELEASE_SKIP_MARKERS: &[&str] = &["[skip release]", "[release skip]"];

/// Parses a commit message into its conventional-commit parts.
///
/// The header must look like `type(scope)!: subject`. Messages of the form
/// `Revert "<header>"` produced by `git revert` are accepted as `revert`
/// commits.
pub fn parse(hash: &str, message: &str) -> Result<ConventionalCommit, CommitParseError> {
    let raw = message.trim();
    if raw.is_empty() {
        return Err(CommitParseError::EmptyMessage);
    }

    let normalized = raw.replace("\r\n", "\n");
    let mut lines = normalized.lines();
    let header = lines.next().unwrap_or_default().trim_end().to_string();
    let rest: Vec<&str> = lines.collect();

    let (kind, scope, subject, bang, mut revert) =
        if let Some(caps) = REVERT_HEADER_PATTERN.captures(&header) {
            let reverted = caps["header"].to_string();
            (
                "revert".to_string(),
                None,
                reverted.clone(),
                false,
                Some(RevertInfo {
                    header: reverted,
                    hash: None,
                }),
            )
        } else if let Some(caps) = HEADER_PATTERN.captures(&header) {
            let scope = caps
                .name("scope")
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty());
            let subject = caps
                .name("subject")
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();
            (
                caps["type"].to_string(),
                scope,
                subject,
                caps.name("bang").is_some(),
                None,
            )
        } else {
            return Err(CommitParseError::InvalidHeader(header));
        };

    let (body, footers) = split_body_and_footers(&rest);

    if let Some(info) = revert.as_mut() {
        info.hash = body
            .as_deref()
            .and_then(|b| REVERT_HASH_PATTERN.captures(b))
            .map(|c| c["hash"].to_string());
    } else if kind.eq_ignore_ascii_case("revert") {
        revert = Some(RevertInfo {
            header: subject.clone(),
            hash: body
                .as_deref()
                .and_then(|b| REVERT_HASH_PATTERN.captures(b))
                .map(|c| c["hash"].to_string()),
        });
    }

    let mut breaking_notes: Vec<String> = footers
        .iter()
        .filter(|f| BREAKING_TOKENS.contains(&f.token.as_str()))
        .map(|f| f.value.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    if bang && breaking_notes.is_empty() {
        breaking_notes.push(subject.clone());
    }
    let breaking = bang || !breaking_notes.is_empty();

    let references = collect_references(&subject, body.as_deref(), &footers);

    Ok(ConventionalCommit {
        hash: hash.to_string(),
        kind,
        scope,
        subject,
        body,
        footers,
        breaking,
        breaking_notes,
        references,
        revert,
        header,
        raw: normalized,
    })
}

/// Returns true when the message opts out of release analysis.
pub fn is_release_skipped(message: &str) -> bool {
    RELEASE_SKIP_MARKERS.iter().any(|m| message.contains(m))
}

/// Splits the lines after the header into body text and footers.
///
/// The footer block starts at the first paragraph whose first line is a
/// footer token. Lines in that block that are not tokens continue the
/// previous footer's value.
fn split_body_and_footers(lines: &[&str]) -> (Option<String>, Vec<Footer>) {
    let mut paragraphs: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }

    let footer_start = paragraphs
        .iter()
        .position(|p| p.first().is_some_and(|l| FOOTER_PATTERN.is_match(l)));

    let (body_paragraphs, footer_paragraphs) = match footer_start {
        Some(idx) => paragraphs.split_at(idx),
        None => (paragraphs.as_slice(), &[][..]),
    };

    let body = if body_paragraphs.is_empty() {
        None
    } else {
        Some(
            body_paragraphs
                .iter()
                .map(|p| p.join("\n"))
                .collect::<Vec<_>>()
                .join("\n\n"),
        )
    };

    let mut footers: Vec<Footer> = Vec::new();
    for (idx, paragraph) in footer_paragraphs.iter().enumerate() {
        for (line_idx, line) in paragraph.iter().enumerate() {
            if let Some(caps) = FOOTER_PATTERN.captures(line) {
                let token = caps["token"].to_string();
                let mut value = caps["value"].to_string();
                if line.contains(&format!("{token} #")) {
                    value = format!("#{value}");
                }
                footers.push(Footer { token, value });
            } else if let Some(last) = footers.last_mut() {
                let separator = if line_idx == 0 && idx > 0 { "\n\n" } else { "\n" };
                last.value.push_str(separator);
                last.value.push_str(line);
            }
        }
    }

    (body, footers)
}

/// Collects issue references, closing footers first, without duplicates.
fn collect_references(subject: &str, body: Option<&str>, footers: &[Footer]) -> Vec<IssueRef> {
    let mut references: Vec<IssueRef> = Vec::new();

    let mut push = |issue: &str, action: Option<String>| {
        if !references.iter().any(|r| r.issue == issue) {
            references.push(IssueRef {
                prefix: "#".to_string(),
                issue: issue.to_string(),
                action,
            });
        }
    };

    for footer in footers {
        let token = footer.token.to_ascii_lowercase();
        let action = CLOSING_TOKENS
            .contains(&token.as_str())
            .then(|| token.clone());
        for caps in ISSUE_PATTERN.captures_iter(&format!(" {}", footer.value)) {
            push(&caps["issue"], action.clone());
        }
    }

    for text in std::iter::once(subject).chain(body) {
        for caps in ISSUE_PATTERN.captures_iter(text) {
            push(&caps["issue"], None);
        }
    }

    references
}
