//! GitHub-specific error handling.

use thiserror::Error;

/// GitHub API specific errors.
#[derive(Error, Debug)]
pub enum GitHubError {
    /// Token not found in environment variables or settings.
    #[error("GitHub token not found. Set GITHUB_TOKEN or GH_TOKEN environment variable")]
    TokenNotFound,

    /// The token was rejected.
    #[error("GitHub rejected the token (HTTP 401)")]
    Unauthorized,

    /// The token lacks permissions or the rate limit was hit.
    #[error("GitHub refused the request (HTTP {status}): {message}")]
    Forbidden {
        /// HTTP status, 403 or 429.
        status: u16,
        /// Response body.
        message: String,
    },

    /// A release for this tag already exists.
    #[error("A release for tag {0} already exists")]
    ReleaseExists(String),

    /// Any other non-success status.
    #[error("GitHub API request failed: HTTP {status}: {message}")]
    ApiRequestFailed {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Invalid response format from GitHub API: {0}")]
    InvalidResponseFormat(String),

    /// Network connectivity error.
    #[error("Network error: {0}")]
    NetworkError(String),
}

impl GitHubError {
    /// Whether the request may succeed when retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ApiRequestFailed { status, .. } if *status >= 500)
    }
}
