//! Client-side search-quota tracking

use crate::github::types::{FetchError, FetchResult};
use chrono::{DateTime, Utc};
use log::info;
use std::time::Duration;
use tokio::time::sleep;

/// Authenticated search-API quota per window.
const SEARCH_QUOTA: u32 = 30;
/// Search quota window length in seconds.
const QUOTA_WINDOW_SECS: i64 = 60;

/// Tracks the remaining search quota between API refreshes.
pub(crate) struct RateLimiter {
    pub(crate) remaining: u32,
    pub(crate) reset_time: DateTime<Utc>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            remaining: SEARCH_QUOTA,
            reset_time: Utc::now() + chrono::Duration::seconds(QUOTA_WINDOW_SECS),
        }
    }

    /// Overwrite with fresh numbers from the rate-limit API.
    pub fn update(&mut self, remaining: u32, reset_time: DateTime<Utc>) {
        self.remaining = remaining;
        self.reset_time = reset_time;
    }

    pub fn check_and_reset_if_expired(&mut self) {
        if Utc::now() > self.reset_time {
            self.remaining = SEARCH_QUOTA;
            self.reset_time = Utc::now() + chrono::Duration::seconds(QUOTA_WINDOW_SECS);
        }
    }

    /// Sleep through the reset when the remaining quota dips under the
    /// buffer. Search windows are short; anything longer than five
    /// minutes means the tracker is out of sync and the fetch should
    /// surface the limit instead of stalling.
    pub async fn wait_if_needed(&self, buffer: u32) -> FetchResult<()> {
        if self.remaining <= buffer && Utc::now() < self.reset_time {
            let wait_time = (self.reset_time - Utc::now())
                .to_std()
                .unwrap_or(Duration::from_secs(60));

            if wait_time > Duration::from_secs(300) {
                return Err(FetchError::RateLimitExceeded {
                    remaining: self.remaining,
                    reset_time: self.reset_time,
                });
            }

            info!("search quota low ({} left), waiting {wait_time:?}", self.remaining);
            sleep(wait_time).await;
        }
        Ok(())
    }
}
