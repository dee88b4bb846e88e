//! Paginated catalog fetching
//!
//! Walks the search API page by page, most-starred first, and collects
//! the result into a deduplicated catalog. Individual page failures are
//! retried with backoff and then abandoned, degrading to a partial
//! catalog instead of aborting the whole fetch.

use chrono::DateTime;
use log::{info, warn};
use octocrab::models::Repository;
use tokio::sync::RwLock;
use tokio::time::sleep;

use crate::config::PipelineConfig;
use crate::github::client::GitHubClient;
use crate::github::rate_limiter::RateLimiter;
use crate::github::types::{CatalogFetch, FetchError, FetchResult, RepoRecord};

/// Hard ceiling of the search API result window.
const SEARCH_RESULT_WINDOW: u32 = 1000;

/// Fetch the catalog of most-starred repositories for one language.
///
/// `pages` × the configured page size is clamped to the API's result
/// window; the clamp is logged rather than treated as an error.
pub async fn fetch_catalog(
    client: &GitHubClient,
    language: &str,
    pages: u32,
    config: &PipelineConfig,
) -> FetchResult<CatalogFetch> {
    let per_page = u32::from(config.page_size);
    let max_pages = SEARCH_RESULT_WINDOW / per_page.max(1);
    let pages = if pages > max_pages {
        warn!(
            "{pages} pages x {per_page} exceeds the {SEARCH_RESULT_WINDOW}-result search window, clamping to {max_pages} pages"
        );
        max_pages
    } else {
        pages
    };

    let rate_limiter = RwLock::new(RateLimiter::new());
    let mut records: Vec<RepoRecord> = Vec::new();
    let mut pages_fetched = 0u32;
    let mut partial = false;
    let mut rate_limit_remaining = 0u32;

    'pages: for page in 1..=pages {
        let mut attempt = 0u32;
        let page_result = loop {
            {
                let mut limiter = rate_limiter.write().await;
                limiter.check_and_reset_if_expired();
                if let Err(e) = limiter.wait_if_needed(config.rate_limit_buffer).await {
                    // Quota gone for longer than it is worth waiting;
                    // degrade to whatever was collected so far.
                    warn!("stopping catalog fetch at page {page}: {e}");
                    partial = true;
                    break 'pages;
                }
            }

            match fetch_page(client, language, page, config).await {
                Ok(result) => break Ok(result),
                Err(e @ FetchError::MalformedPage { .. }) => break Err(e),
                Err(e) => {
                    attempt += 1;
                    if attempt > config.page_retries {
                        break Err(e);
                    }
                    let backoff = config.retry_backoff * 2u32.saturating_pow(attempt - 1);
                    warn!("page {page} failed ({e}), retry {attempt}/{} in {backoff:?}", config.page_retries);
                    sleep(backoff).await;
                }
            }
        };

        match page_result {
            Ok(page_records) => {
                let got = page_records.len();
                records.extend(page_records);
                pages_fetched += 1;
                info!("fetched page {page}/{pages} ({got} repositories)");

                // A short page means the window is exhausted.
                if (got as u32) < per_page {
                    break 'pages;
                }
            }
            Err(FetchError::MalformedPage { page, details }) => {
                warn!("skipping malformed page {page}: {details}");
                continue;
            }
            Err(e) => {
                warn!("abandoning catalog fetch at page {page} after retries: {e}");
                partial = true;
                break 'pages;
            }
        }

        // Refresh the quota tracker from the server's own numbers.
        rate_limit_remaining = refresh_rate_limit(client, &rate_limiter).await;

        if page < pages {
            sleep(config.page_delay).await;
        }
    }

    dedup_by_name(&mut records);
    records.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count));

    Ok(CatalogFetch {
        records,
        pages_fetched,
        partial,
        rate_limit_remaining,
    })
}

/// Fetch a single search page, most-starred first.
async fn fetch_page(
    client: &GitHubClient,
    language: &str,
    page: u32,
    config: &PipelineConfig,
) -> FetchResult<Vec<RepoRecord>> {
    let query = format!("language:{language}");

    let search_future = client
        .inner()
        .search()
        .repositories(&query)
        .sort("stars")
        .order("desc")
        .per_page(config.page_size)
        .page(page)
        .send();

    let search_resp = tokio::time::timeout(config.api_timeout, search_future)
        .await
        .map_err(|_| FetchError::Timeout {
            operation: format!("repository_search_page_{page}"),
            duration: config.api_timeout,
        })?
        .map_err(|e| FetchError::Api(e.to_string()))?;

    let mut page_records = Vec::with_capacity(search_resp.items.len());
    for repo in search_resp.items {
        match to_record(&repo) {
            Some(record) => page_records.push(record),
            None => {
                return Err(FetchError::MalformedPage {
                    page,
                    details: format!("repository entry without full_name/clone_url: {}", repo.name),
                });
            }
        }
    }

    Ok(page_records)
}

/// Update the client-side tracker from the rate-limit API, returning the
/// remaining search quota. Falls back to the tracker's own numbers when
/// the rate-limit endpoint itself fails.
async fn refresh_rate_limit(client: &GitHubClient, rate_limiter: &RwLock<RateLimiter>) -> u32 {
    match client.inner().ratelimit().get().await {
        Ok(rate_limit) => {
            let remaining = rate_limit.resources.search.remaining as u32;
            let reset_timestamp = rate_limit.resources.search.reset;
            let reset_time = DateTime::from_timestamp(reset_timestamp as i64, 0)
                .unwrap_or_else(|| chrono::Utc::now() + chrono::Duration::minutes(1));

            let mut limiter = rate_limiter.write().await;
            limiter.update(remaining, reset_time);
            remaining
        }
        Err(e) => {
            warn!("rate-limit refresh failed: {e}");
            rate_limiter.read().await.remaining
        }
    }
}

/// Map an API repository entry to a catalog record. `None` when the
/// entry is missing the fields the pipeline cannot work without.
fn to_record(repo: &Repository) -> Option<RepoRecord> {
    let full_name = repo.full_name.clone()?;
    let clone_url = repo.clone_url.as_ref()?.to_string();

    Some(RepoRecord {
        full_name,
        html_url: repo
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        clone_url,
        stargazers_count: repo.stargazers_count.unwrap_or(0),
        forks_count: repo.forks_count.unwrap_or(0),
        created_at: repo.created_at,
        updated_at: repo.updated_at,
        size: repo.size.unwrap_or(0),
        language: repo
            .language
            .as_ref()
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        open_issues_count: repo.open_issues_count.unwrap_or(0),
        default_branch: repo.default_branch.clone().unwrap_or_else(|| "main".to_string()),
    })
}

/// Drop later duplicates of the same `full_name`, keeping first (and
/// therefore highest-starred) occurrence.
fn dedup_by_name(records: &mut Vec<RepoRecord>) {
    let mut seen = std::collections::HashSet::new();
    records.retain(|r| seen.insert(r.full_name.clone()));
}
