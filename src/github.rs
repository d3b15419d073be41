//! GitHub release publication.

pub mod client;
pub mod error;
#[cfg(test)]
pub(crate) mod test_utils;

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub use client::GitHubClient;
pub use error::GitHubError;

/// A release to create on the hosting service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseRequest {
    /// Repository owner.
    #[serde(skip)]
    pub owner: String,
    /// Repository name.
    #[serde(skip)]
    pub repo: String,
    /// Tag the release points at.
    pub tag_name: String,
    /// Release title.
    pub name: String,
    /// Markdown release notes.
    pub body: String,
    /// Whether to create a draft release.
    pub draft: bool,
    /// Whether to mark the release as a pre-release.
    pub prerelease: bool,
}

/// A release that was created.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PublishedRelease {
    /// Numeric release id.
    pub id: u64,
    /// Web URL of the release page.
    pub html_url: String,
}

/// Trait for services that publish releases.
pub trait ReleasePublisher: Send + Sync {
    /// Creates a release and returns its location.
    fn publish<'a>(
        &'a self,
        request: &'a ReleaseRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PublishedRelease>> + Send + 'a>>;
}
