//! # semrel
//!
//! Semantic release automation driven by conventional commits.
//!
//! `semrel` reads the commits since the last release tag, derives the next
//! semantic version, prepends release notes to the changelog, creates the
//! release commit and tag, pushes them, and publishes a GitHub release. It
//! also lints commit messages and decides whether a CI lint job should run.
//!
//! ## Quick Start
//!
//! ```rust
//! use semrel::analyzer::{analyze, ReleaseType};
//! use semrel::commit::parse;
//!
//! let commit = parse("abc1234", "feat(api): add endpoint").unwrap();
//! assert_eq!(analyze(&[commit], &[]), Some(ReleaseType::Minor));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod analyzer;
pub mod changelog;
pub mod cli;
pub mod commit;
pub mod config;
pub mod git;
pub mod github;
pub mod lint;
pub mod release;
pub mod utils;
pub mod version;

pub use crate::cli::Cli;

/// The current version of semrel.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
