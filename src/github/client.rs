//! GitHub REST API client for creating releases.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::Result;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

use super::{GitHubError, PublishedRelease, ReleasePublisher, ReleaseRequest};
use crate::utils::settings::get_env_vars;

/// Environment variables checked for a GitHub token, in order.
pub const TOKEN_ENV_VARS: &[&str] = &["GITHUB_TOKEN", "GH_TOKEN"];

/// REST API version sent with every request.
const API_VERSION: &str = "2022-11-28";

/// Timeout for a single HTTP request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Retries after a server error.
const MAX_RETRIES: u32 = 3;

/// Initial delay before the first retry; doubles each attempt.
const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(500);

/// GitHub API client.
pub struct GitHubClient {
    /// HTTP client for API requests.
    client: Client,
    /// API base URL without trailing slash.
    api_url: String,
    /// Bearer token.
    token: String,
    /// Delay before the first retry.
    retry_delay: Duration,
}

impl GitHubClient {
    /// Creates a client for the given API base URL and token.
    pub fn new(api_url: &str, token: String) -> Result<Self, GitHubError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("semrel/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GitHubError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
            retry_delay: INITIAL_RETRY_DELAY,
        })
    }

    /// Creates a client using `GITHUB_TOKEN` or `GH_TOKEN`.
    pub fn from_env(api_url: &str) -> Result<Self, GitHubError> {
        let token = get_env_vars(TOKEN_ENV_VARS).map_err(|_| GitHubError::TokenNotFound)?;
        Self::new(api_url, token)
    }

    /// Overrides the initial retry delay.
    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Sends a single create-release request.
    async fn create_release(
        &self,
        request: &ReleaseRequest,
    ) -> Result<PublishedRelease, GitHubError> {
        let url = format!(
            "{}/repos/{}/{}/releases",
            self.api_url, request.owner, request.repo
        );
        debug!(url = %url, tag = %request.tag_name, "Sending create release request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .json(request)
            .send()
            .await
            .map_err(|e| GitHubError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|e| {
                debug!("Failed to read error response body: {e}");
                String::new()
            });
            return Err(match status {
                StatusCode::UNAUTHORIZED => GitHubError::Unauthorized,
                StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => GitHubError::Forbidden {
                    status: status.as_u16(),
                    message,
                },
                StatusCode::UNPROCESSABLE_ENTITY if message.contains("already_exists") => {
                    GitHubError::ReleaseExists(request.tag_name.clone())
                }
                _ => GitHubError::ApiRequestFailed {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        response
            .json::<PublishedRelease>()
            .await
            .map_err(|e| GitHubError::InvalidResponseFormat(e.to_string()))
    }
}

impl ReleasePublisher for GitHubClient {
    fn publish<'a>(
        &'a self,
        request: &'a ReleaseRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PublishedRelease>> + Send + 'a>> {
        Box::pin(async move {
            let mut delay = self.retry_delay;
            let mut attempt = 0;
            loop {
                match self.create_release(request).await {
                    Ok(release) => {
                        info!(url = %release.html_url, tag = %request.tag_name, "Published GitHub release");
                        return Ok(release);
                    }
                    Err(e) if e.is_retryable() && attempt < MAX_RETRIES => {
                        attempt += 1;
                        warn!(attempt, ?delay, error = %e, "GitHub API server error, retrying");
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        })
    }
}
