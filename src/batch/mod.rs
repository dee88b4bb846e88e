//! Batch orchestration
//!
//! Walks the catalog sequentially, analyzing and aggregating one
//! repository at a time. Per-repository failures are recorded and the
//! loop keeps going; each success is flushed to the accumulated store
//! before the next repository starts, so a crash mid-batch loses only
//! the repository in flight. Resuming an interrupted batch is manual:
//! re-run with an adjusted `offset`.

mod accumulator;

pub use accumulator::SummaryAccumulator;

use log::{info, warn};
use std::path::Path;
use thiserror::Error;
use tokio::time::sleep;

use crate::ck::{self, AnalyzeError, AnalyzeRequest, CkArtifacts, CkOptions};
use crate::config::PipelineConfig;
use crate::github::RepoRecord;
use crate::metrics::{self, AggregateError};

/// Batch-level failures. Unlike per-repository errors these are fatal
/// to the run.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("accumulated results store error: {0}")]
    Store(#[from] csv::Error),

    #[error("batch I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-repository analysis seam. The production implementation drives
/// the CK tool; tests substitute scripted outcomes.
#[allow(async_fn_in_trait)]
pub trait Analyzer {
    async fn analyze(
        &self,
        record: &RepoRecord,
        raw_dir: &Path,
        config: &PipelineConfig,
    ) -> Result<CkArtifacts, AnalyzeError>;
}

/// CK-backed analyzer used by the CLI.
pub struct CkAnalyzer<'a> {
    pub ck_jar: &'a Path,
    pub options: CkOptions,
}

impl Analyzer for CkAnalyzer<'_> {
    async fn analyze(
        &self,
        record: &RepoRecord,
        raw_dir: &Path,
        config: &PipelineConfig,
    ) -> Result<CkArtifacts, AnalyzeError> {
        ck::analyze_repository(
            AnalyzeRequest {
                repo: &record.full_name,
                ck_jar: self.ck_jar,
                out_dir: raw_dir,
                options: self.options,
            },
            config,
        )
        .await
    }
}

/// Slice bounds and output locations for one batch run.
pub struct BatchRequest<'a> {
    pub records: &'a [RepoRecord],
    /// Root for per-repository raw artifacts (`<raw_root>/<short_name>/`).
    pub raw_root: &'a Path,
    /// Accumulated summary CSV, appended incrementally.
    pub summary_path: &'a Path,
    /// Skip this many catalog entries first (manual resume point).
    pub offset: usize,
    /// Stop after this many repositories, when set.
    pub max_repos: Option<usize>,
}

/// Outcome tally for a finished batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// (repository, failure reason) for every skipped repository.
    pub failures: Vec<(String, String)>,
}

/// Run the batch sequentially over the sliced catalog.
pub async fn run_batch<A: Analyzer>(
    request: BatchRequest<'_>,
    analyzer: &A,
    config: &PipelineConfig,
) -> Result<BatchReport, BatchError> {
    let slice: Vec<&RepoRecord> = request
        .records
        .iter()
        .skip(request.offset)
        .take(request.max_repos.unwrap_or(usize::MAX))
        .collect();

    let accumulator = SummaryAccumulator::new(request.summary_path);
    let mut report = BatchReport::default();
    let total = slice.len();

    for (index, record) in slice.iter().enumerate() {
        info!(
            "[{}/{total}] analyzing {} ({} stars)",
            index + 1,
            record.full_name,
            record.stargazers_count
        );
        report.processed += 1;

        match process_repo(record, &request, analyzer, config).await {
            Ok(summaries) => {
                // An unwritable store is batch-fatal, not a per-repo skip.
                accumulator.append(&summaries)?;
                let classes = summaries
                    .iter()
                    .map(|s| s.classes_analyzed)
                    .max()
                    .unwrap_or(0);
                report.succeeded += 1;
                info!("{} done ({classes} classes)", record.full_name);
            }
            Err(reason) => {
                report.failed += 1;
                warn!("{} skipped: {reason}", record.full_name);
                report.failures.push((record.full_name.clone(), reason));
            }
        }

        if index + 1 < total {
            sleep(config.repo_delay).await;
        }
    }

    info!(
        "batch finished: {} processed, {} succeeded, {} failed",
        report.processed, report.succeeded, report.failed
    );
    Ok(report)
}

/// Analyze and aggregate one repository. Failures come back as reason
/// strings so the orchestrator can record them and keep going.
async fn process_repo<A: Analyzer>(
    record: &RepoRecord,
    request: &BatchRequest<'_>,
    analyzer: &A,
    config: &PipelineConfig,
) -> Result<Vec<crate::metrics::MetricSummary>, String> {
    let raw_dir = request.raw_root.join(record.short_name());

    let artifacts = analyzer
        .analyze(record, &raw_dir, config)
        .await
        .map_err(|e| e.to_string())?;

    metrics::aggregate_class_metrics(&artifacts.class_csv, &record.full_name)
        .map_err(|e: AggregateError| e.to_string())
}
