use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::NaiveDate;
use git2::{Oid, Repository, Signature};
use semrel::analyzer::ReleaseType;
use semrel::config::ReleaseConfig;
use semrel::git::GitRepository;
use semrel::lint::{decide, GateEvent, LintReport};
use semrel::release::{self, PlanOutcome, ReleaseOptions, ReleasePlan};
use semver::Version;
use tempfile::TempDir;

/// Test setup that creates a temporary git repository on `main`.
struct TestRepo {
    _temp_dir: TempDir,
    repo_path: PathBuf,
    repo: Repository,
}

impl TestRepo {
    fn new() -> Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let repo_path = temp_dir.path().to_path_buf();

        let repo = Repository::init(&repo_path)?;
        repo.set_head("refs/heads/main")?;

        let mut config = repo.config()?;
        config.set_str("user.name", "Test User")?;
        config.set_str("user.email", "test@example.com")?;

        Ok(Self {
            _temp_dir: temp_dir,
            repo_path,
            repo,
        })
    }

    /// Commits `.semrel.yaml` with the given content.
    fn commit_config(&self, yaml: &str, message: &str) -> Result<Oid> {
        self.commit_file(".semrel.yaml", yaml, message)
    }

    /// Writes `file` with the message as content and commits it on `HEAD`.
    fn add_commit(&self, file: &str, message: &str) -> Result<Oid> {
        self.commit_file(file, message, message)
    }

    fn commit_file(&self, file: &str, content: &str, message: &str) -> Result<Oid> {
        fs::write(self.repo_path.join(file), content)?;
        let mut index = self.repo.index()?;
        index.add_path(Path::new(file))?;
        index.write()?;

        let tree = self.repo.find_tree(index.write_tree()?)?;
        let signature = Signature::now("Test User", "test@example.com")?;
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        Ok(self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?)
    }

    /// Creates a commit with the given parents without moving `HEAD`.
    fn detached_commit(&self, message: &str, parents: &[Oid]) -> Result<Oid> {
        let parents: Vec<git2::Commit> = parents
            .iter()
            .map(|oid| self.repo.find_commit(*oid))
            .collect::<Result<_, _>>()?;
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
        let tree = parents[0].tree()?;
        let signature = Signature::now("Test User", "test@example.com")?;
        Ok(self
            .repo
            .commit(None, &signature, &signature, message, &tree, &parent_refs)?)
    }

    fn tag(&self, name: &str, target: Oid) -> Result<()> {
        let object = self.repo.find_object(target, None)?;
        self.repo.tag_lightweight(name, &object, false)?;
        Ok(())
    }

    fn open(&self) -> Result<(GitRepository, ReleaseConfig)> {
        let repo = GitRepository::open_at(&self.repo_path)?;
        let config = ReleaseConfig::load(&self.repo_path)?;
        Ok((repo, config))
    }

    fn changelog(&self) -> String {
        fs::read_to_string(self.repo_path.join("CHANGELOG.md")).unwrap_or_default()
    }
}

fn release_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

fn local_only() -> ReleaseOptions {
    ReleaseOptions {
        dry_run: false,
        no_push: true,
        no_github: true,
    }
}

fn expect_plan(outcome: PlanOutcome) -> ReleasePlan {
    match outcome {
        PlanOutcome::Release(plan) => *plan,
        other => panic!("expected a release, got {other:?}"),
    }
}

const GITHUB_CONFIG: &str = "\
repository_url: https://github.com/acme/widget
changelog:
  title: '# Changelog'
";

#[tokio::test]
async fn patch_release_updates_changelog_commits_and_tags() -> Result<()> {
    let test_repo = TestRepo::new()?;
    let first = test_repo.commit_config(GITHUB_CONFIG, "feat: initial release")?;
    test_repo.tag("v1.0.0", first)?;

    let scoped = test_repo.add_commit(
        "lint.txt",
        "fix(linting): skip lint for release commits\n\nCloses #12",
    )?;
    test_repo.add_commit("empty.txt", "fix: handle empty files")?;
    test_repo.add_commit("deps.txt", "chore: bump dependencies")?;

    let (repo, config) = test_repo.open()?;
    let plan = expect_plan(release::plan(&repo, &config, release_day())?);
    assert_eq!(plan.release_type, ReleaseType::Patch);
    assert_eq!(plan.next_version, Version::new(1, 0, 1));
    assert_eq!(plan.tag, "v1.0.1");

    let outcome = release::execute(&repo, &config, &plan, local_only(), None).await?;
    assert!(outcome.changelog_updated);
    assert!(outcome.commit.is_some());
    assert!(outcome.published.is_none());

    let scoped = scoped.to_string();
    let expected = "# Changelog\n\n\
                    ## [1.0.1](https://github.com/acme/widget/compare/v1.0.0...v1.0.1) (2024-05-01)\n\n\n\
                    ### Bug Fixes\n\n";
    let changelog = test_repo.changelog();
    assert!(changelog.starts_with(expected), "{changelog}");
    let unscoped_at = changelog.find("* handle empty files").unwrap();
    let scoped_at = changelog
        .find(&format!(
            "* **linting:** skip lint for release commits ([{}](https://github.com/acme/widget/commit/{scoped})), closes [#12](https://github.com/acme/widget/issues/12)",
            &scoped[..7]
        ))
        .unwrap();
    assert!(unscoped_at < scoped_at);
    assert!(!changelog.contains("bump dependencies"));

    assert!(repo.tag_exists("v1.0.1"));
    let head = repo.head_message()?;
    assert!(head.starts_with("chore(release): 1.0.1 [skip ci]\n\n## [1.0.1]"));

    // The release commit alone does not warrant another release.
    assert!(matches!(
        release::plan(&repo, &config, release_day())?,
        PlanOutcome::NoRelease
    ));
    Ok(())
}

#[tokio::test]
async fn rerelease_does_not_duplicate_changelog_entry() -> Result<()> {
    let test_repo = TestRepo::new()?;
    let first = test_repo.commit_config(GITHUB_CONFIG, "feat: initial release")?;
    test_repo.tag("v1.0.0", first)?;
    test_repo.add_commit("a.txt", "fix: first fix")?;

    let (repo, config) = test_repo.open()?;
    let plan = expect_plan(release::plan(&repo, &config, release_day())?);
    release::execute(&repo, &config, &plan, local_only(), None).await?;
    let after_first = test_repo.changelog();

    // Drop the tag so the same version is planned again.
    test_repo.repo.tag_delete("v1.0.1")?;
    let plan = expect_plan(release::plan(&repo, &config, release_day())?);
    assert_eq!(plan.next_version, Version::new(1, 0, 1));
    let outcome = release::execute(&repo, &config, &plan, local_only(), None).await?;

    assert!(!outcome.changelog_updated);
    assert!(outcome.commit.is_none());
    assert!(outcome.tagged);
    assert_eq!(test_repo.changelog(), after_first);
    assert_eq!(test_repo.changelog().matches("[1.0.1]").count(), 1);
    Ok(())
}

#[tokio::test]
async fn first_release_with_custom_tag_format() -> Result<()> {
    let test_repo = TestRepo::new()?;
    test_repo.commit_config("tag_format: 'release-${version}'\n", "feat: first feature")?;

    let (repo, config) = test_repo.open()?;
    let plan = expect_plan(release::plan(&repo, &config, release_day())?);
    assert_eq!(plan.next_version, Version::new(1, 0, 0));
    assert_eq!(plan.tag, "release-1.0.0");

    release::execute(&repo, &config, &plan, local_only(), None).await?;
    assert!(test_repo
        .changelog()
        .starts_with("# 1.0.0 (2024-05-01)\n\n\n### Features\n\n* first feature"));
    assert!(repo.tag_exists("release-1.0.0"));
    Ok(())
}

#[test]
fn last_release_ignores_unreachable_and_foreign_tags() -> Result<()> {
    let test_repo = TestRepo::new()?;
    let first = test_repo.add_commit("a.txt", "feat: one")?;
    test_repo.tag("v1.0.0", first)?;
    let side = test_repo.detached_commit("feat: side branch", &[first])?;
    test_repo.tag("v2.0.0", side)?;
    let second = test_repo.add_commit("b.txt", "feat: two")?;
    test_repo.tag("v1.1.0", second)?;
    test_repo.tag("other-9.0.0", second)?;
    test_repo.add_commit("c.txt", "fix: three")?;

    let (repo, config) = test_repo.open()?;
    let last = repo.last_release(&config.tag_format()?)?.unwrap();
    assert_eq!(last.tag, "v1.1.0");
    assert_eq!(last.version, Version::new(1, 1, 0));

    let plan = expect_plan(release::plan(&repo, &config, release_day())?);
    assert_eq!(plan.next_version, Version::new(1, 1, 1));
    assert_eq!(plan.commits.len(), 1);
    Ok(())
}

#[test]
fn merge_commits_are_not_analyzed() -> Result<()> {
    let test_repo = TestRepo::new()?;
    let first = test_repo.add_commit("a.txt", "feat: one")?;
    test_repo.tag("v1.0.0", first)?;
    let side = test_repo.detached_commit("fix: on feature branch", &[first])?;
    let main = test_repo.add_commit("b.txt", "docs: readme")?;
    let merge = test_repo.detached_commit("Merge branch 'feature'", &[main, side])?;
    test_repo
        .repo
        .reference("refs/heads/main", merge, true, "merge feature")?;

    let (repo, config) = test_repo.open()?;
    let commits = repo.commits_since(Some(first))?;
    let subjects: Vec<&str> = commits.iter().map(|c| c.summary()).collect();
    assert_eq!(subjects.len(), 2);
    assert!(!subjects.contains(&"Merge branch 'feature'"));

    let plan = expect_plan(release::plan(&repo, &config, release_day())?);
    assert_eq!(plan.release_type, ReleaseType::Patch);
    Ok(())
}

#[test]
fn lint_reports_bad_commits_in_range() -> Result<()> {
    let test_repo = TestRepo::new()?;
    test_repo.add_commit("a.txt", "feat: good start")?;
    test_repo.add_commit("b.txt", "Bad message")?;
    test_repo.add_commit("c.txt", "fix: Capitalized subject")?;
    test_repo.add_commit("d.txt", "fix: fine\nmissing blank line")?;

    let (repo, config) = test_repo.open()?;
    let commits = repo.commits_in_range("HEAD~3..HEAD")?;
    assert_eq!(commits.len(), 3);

    let report = LintReport::from_commits(&commits, &config.lint);
    assert_eq!(report.summary.error_count, 2);
    assert_eq!(report.summary.warning_count, 1);
    assert_eq!(report.summary.passing_commits, 1);
    assert_eq!(report.exit_code(false), 1);
    assert_eq!(report.commits[0].header, "Bad message");
    Ok(())
}

#[tokio::test]
async fn lint_gate_skips_release_commit_on_push() -> Result<()> {
    let test_repo = TestRepo::new()?;
    let first = test_repo.add_commit("a.txt", "feat: one")?;
    test_repo.tag("v1.0.0", first)?;
    test_repo.add_commit("b.txt", "fix: two")?;

    let (repo, config) = test_repo.open()?;
    assert!(decide(GateEvent::Push, &repo.head_message()?, &config.lint).should_lint);

    let plan = expect_plan(release::plan(&repo, &config, release_day())?);
    release::execute(&repo, &config, &plan, local_only(), None).await?;

    let head = repo.head_message()?;
    assert!(!decide(GateEvent::Push, &head, &config.lint).should_lint);
    assert!(decide(GateEvent::Release, &head, &config.lint).should_lint);
    Ok(())
}
