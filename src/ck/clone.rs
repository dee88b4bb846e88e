//! Shallow clone into a scratch directory

use log::warn;
use std::num::NonZeroU32;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use crate::ck::types::AnalyzeError;

/// Clone `url` at bounded depth into `dest`.
///
/// gix does blocking network I/O, so the clone runs on the blocking
/// pool with a timeout wrapped around the whole task.
pub(crate) async fn shallow_clone(
    repo: &str,
    url: &str,
    dest: &Path,
    depth: u32,
    timeout: Duration,
) -> Result<(), AnalyzeError> {
    let url_owned = url.to_string();
    let dest_owned = dest.to_path_buf();
    let depth = NonZeroU32::new(depth).unwrap_or(NonZeroU32::MIN);

    let clone_result = tokio::time::timeout(
        timeout,
        tokio::task::spawn_blocking(move || {
            let parsed_url = gix::url::parse(url_owned.as_str().into())
                .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;

            let mut prep = gix::prepare_clone(parsed_url, &dest_owned)
                .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?
                .with_shallow(gix::remote::fetch::Shallow::DepthAtRemote(depth));

            let (mut checkout, _outcome) = prep
                .fetch_then_checkout(gix::progress::Discard, &AtomicBool::new(false))
                .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;

            // Populate the worktree; CK reads source files, not the odb.
            let (_repo, _outcome) = checkout
                .main_worktree(gix::progress::Discard, &AtomicBool::new(false))
                .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;

            Ok::<_, Box<dyn std::error::Error + Send + Sync>>(())
        }),
    )
    .await;

    match clone_result {
        Err(_) => {
            warn!("clone timeout for {repo} after {timeout:?}");
            Err(AnalyzeError::CloneTimeout {
                repo: repo.to_string(),
                duration: timeout,
            })
        }
        Ok(Err(join_err)) => Err(AnalyzeError::Clone {
            repo: repo.to_string(),
            details: format!("clone task failed: {join_err}"),
        }),
        Ok(Ok(Err(e))) => Err(AnalyzeError::Clone {
            repo: repo.to_string(),
            details: e.to_string(),
        }),
        Ok(Ok(Ok(()))) => Ok(()),
    }
}
