//! `ck_harvest` - CK-metrics mining and correlation pipeline
//!
//! Fetches the most popular Java repositories from the GitHub search
//! API, shallow-clones each one, runs the external CK static-analysis
//! tool, aggregates its per-class CSV output into descriptive
//! statistics, and correlates those statistics against repository
//! process attributes (popularity, maturity, activity, size).
//!
//! The stages are independent: `github` builds the catalog, `ck` and
//! `metrics` handle one repository at a time, `batch` walks the
//! catalog sequentially with incremental persistence, and `stats`
//! recomputes correlations from files alone.

pub mod batch;
pub mod ck;
pub mod cli;
pub mod config;
pub mod github;
pub mod metrics;
pub mod stats;

// Re-export the pipeline surface
pub use batch::{Analyzer, BatchReport, BatchRequest, CkAnalyzer, SummaryAccumulator, run_batch};
pub use ck::{AnalyzeError, AnalyzeRequest, CkArtifacts, CkOptions, analyze_repository};
pub use config::PipelineConfig;
pub use github::{CatalogFetch, FetchError, GitHubClient, RepoRecord, fetch_catalog};
pub use metrics::{MetricSummary, aggregate_class_metrics};
pub use stats::{CorrelationEntry, CorrelationOutcome, correlate, run_stats};
