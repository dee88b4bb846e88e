//! GitHub API client wrapper
//!
//! Thin wrapper around Octocrab so the rest of the pipeline never
//! touches the underlying client type directly.

use crate::github::types::{FetchError, FetchResult};
use octocrab::Octocrab;
use std::sync::Arc;

/// GitHub API client handle. Cloning is cheap (Arc clone).
#[derive(Clone, Debug)]
pub struct GitHubClient {
    inner: Arc<Octocrab>,
}

impl GitHubClient {
    /// Create a new client builder
    #[must_use]
    pub fn builder() -> GitHubClientBuilder {
        GitHubClientBuilder::new()
    }

    /// Anonymous client. Works, but against a much lower request quota.
    pub fn anonymous() -> FetchResult<Self> {
        Self::builder().build()
    }

    /// Convenience: create client with personal access token
    pub fn with_token(token: impl Into<String>) -> FetchResult<Self> {
        Self::builder().personal_token(token).build()
    }

    /// Token-or-anonymous, for CLI plumbing.
    pub fn from_optional_token(token: Option<String>) -> FetchResult<Self> {
        match token {
            Some(t) => Self::with_token(t),
            None => Self::anonymous(),
        }
    }

    /// Get inner Octocrab client
    #[must_use]
    pub fn inner(&self) -> &Arc<Octocrab> {
        &self.inner
    }
}

/// Builder for creating `GitHubClient` with optional authentication
pub struct GitHubClientBuilder {
    token: Option<String>,
    base_uri: Option<String>,
}

impl GitHubClientBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            token: None,
            base_uri: None,
        }
    }

    /// Set personal access token for authentication
    pub fn personal_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set base URI (for GitHub Enterprise)
    pub fn base_uri(mut self, uri: impl Into<String>) -> Self {
        self.base_uri = Some(uri.into());
        self
    }

    /// Build the `GitHubClient`
    pub fn build(self) -> FetchResult<GitHubClient> {
        let mut builder = Octocrab::builder();

        if let Some(token) = self.token {
            builder = builder.personal_token(token);
        }

        if let Some(uri) = self.base_uri {
            builder = builder
                .base_uri(&uri)
                .map_err(|e| FetchError::ClientSetup(e.to_string()))?;
        }

        let octocrab = builder
            .build()
            .map_err(|e| FetchError::ClientSetup(e.to_string()))?;

        Ok(GitHubClient {
            inner: Arc::new(octocrab),
        })
    }
}

impl Default for GitHubClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
