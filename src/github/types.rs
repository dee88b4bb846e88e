//! Type definitions for the repository catalog

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Error handling for catalog fetch operations
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("GitHub API error: {0}")]
    Api(String),

    #[error("Rate limit exceeded. Remaining: {remaining}, reset time: {reset_time}")]
    RateLimitExceeded {
        remaining: u32,
        reset_time: DateTime<Utc>,
    },

    #[error("Operation timed out: {operation} after {duration:?}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    #[error("Malformed search response on page {page}: {details}")]
    MalformedPage { page: u32, details: String },

    #[error("Client setup failed: {0}")]
    ClientSetup(String),

    #[error("Catalog store error: {0}")]
    Store(#[from] csv::Error),

    #[error("Catalog I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FetchResult<T> = Result<T, FetchError>;

/// One catalog row, as persisted to the catalog CSV.
///
/// Column set mirrors what the search API returns for a repository;
/// records are immutable once fetched.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RepoRecord {
    pub full_name: String,
    pub html_url: String,
    pub clone_url: String,
    pub stargazers_count: u32,
    pub forks_count: u32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Repository size in KiB, as reported by the API.
    pub size: u32,
    pub language: String,
    pub open_issues_count: u32,
    pub default_branch: String,
}

impl RepoRecord {
    /// `owner/name` flattened for filesystem use.
    pub fn short_name(&self) -> String {
        self.full_name.replace('/', "_")
    }
}

/// Result of a catalog fetch, possibly partial.
#[derive(Debug)]
pub struct CatalogFetch {
    /// Deduplicated records, stars descending.
    pub records: Vec<RepoRecord>,
    /// Pages successfully fetched.
    pub pages_fetched: u32,
    /// True when at least one page was abandoned after retries.
    pub partial: bool,
    /// Search quota remaining after the last page.
    pub rate_limit_remaining: u32,
}
