//! Shared test utilities for the `github` module.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use anyhow::Result;

use super::{PublishedRelease, ReleasePublisher, ReleaseRequest};

/// Mock publisher with a pre-programmed queue of responses.
///
/// Every request is recorded so tests can inspect what would have been
/// sent. When the queue is exhausted, calls return an error.
pub(crate) struct MockPublisher {
    responses: Arc<Mutex<VecDeque<Result<PublishedRelease>>>>,
    requests: Arc<Mutex<Vec<ReleaseRequest>>>,
}

impl MockPublisher {
    /// Creates a mock that returns the given responses in order.
    pub(crate) fn new(responses: Vec<Result<PublishedRelease>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Creates a mock whose single call succeeds.
    pub(crate) fn succeeding() -> Self {
        Self::new(vec![Ok(PublishedRelease {
            id: 1,
            html_url: "https://github.com/acme/widget/releases/tag/mock".to_string(),
        })])
    }

    /// Returns the requests received so far.
    pub(crate) fn requests(&self) -> Vec<ReleaseRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl ReleasePublisher for MockPublisher {
    fn publish<'a>(
        &'a self,
        request: &'a ReleaseRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PublishedRelease>> + Send + 'a>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        let response = self
            .responses
            .lock()
            .ok()
            .and_then(|mut r| r.pop_front())
            .unwrap_or_else(|| Err(anyhow::anyhow!("no more mock responses")));
        Box::pin(async move { response })
    }
}
