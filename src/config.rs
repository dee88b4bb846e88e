//! Pipeline configuration

use std::time::Duration;

/// Configuration threaded through every pipeline stage.
///
/// All external-call bounds live here so no stage depends on ambient
/// process state.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Results per search page (GitHub caps this at 100).
    pub page_size: u8,
    /// Delay between catalog pages.
    pub page_delay: Duration,
    /// Retry attempts per catalog page before degrading to partial results.
    pub page_retries: u32,
    /// Base backoff for page retries, doubled per attempt.
    pub retry_backoff: Duration,
    /// Remaining-quota floor below which the fetcher waits for reset.
    pub rate_limit_buffer: u32,
    /// Bound on a single search API call.
    pub api_timeout: Duration,
    /// Clone depth for repository scratch copies.
    pub clone_depth: u32,
    /// Bound on a shallow clone.
    pub clone_timeout: Duration,
    /// Bound on one CK process invocation.
    pub ck_timeout: Duration,
    /// Polls for CK output files after the process exits.
    pub output_poll_attempts: u32,
    /// Interval between output polls.
    pub output_poll_interval: Duration,
    /// Delay between repositories in a batch.
    pub repo_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            page_delay: Duration::from_secs(2),
            page_retries: 3,
            retry_backoff: Duration::from_secs(2),
            rate_limit_buffer: 3,
            api_timeout: Duration::from_secs(10),
            clone_depth: 1,
            clone_timeout: Duration::from_secs(300),
            ck_timeout: Duration::from_secs(600),
            output_poll_attempts: 5,
            output_poll_interval: Duration::from_millis(500),
            repo_delay: Duration::from_secs(2),
        }
    }
}
