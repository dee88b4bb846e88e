//! Statistical analysis
//!
//! Joins the accumulated per-repository summaries with catalog process
//! attributes and answers the four research questions with correlation
//! coefficients, significance, and quartile-binned comparisons. Runs
//! entirely from files on disk; nothing here touches the network or
//! the CK tool.

pub mod correlation;
pub mod dataset;
pub mod normality;
pub mod report;
pub mod types;

pub use dataset::{Dataset, MIN_CLASSES_PER_REPO, PROCESS_ATTRIBUTES};
pub use report::QuartileBin;
pub use types::{CorrelationEntry, StatsError};

use chrono::{DateTime, Utc};
use log::{info, warn};
use std::path::Path;

use crate::github::RepoRecord;
use crate::metrics::{MetricSummary, TRACKED_METRICS};

/// Significance level for the normality classification.
const NORMALITY_ALPHA: f64 = 0.05;

/// Correlation table plus everything the report needs to explain what
/// was left out.
#[derive(Debug)]
pub struct CorrelationOutcome {
    pub entries: Vec<CorrelationEntry>,
    pub repositories: usize,
    pub orphaned_repositories: usize,
    pub small_sample_rows: usize,
    pub skipped_pairs: usize,
}

/// Correlate process attributes against metric means.
///
/// `as_of` anchors the age/staleness derivation so the same inputs
/// always produce the same table.
pub fn correlate(
    summaries: &[MetricSummary],
    catalog: &[RepoRecord],
    as_of: DateTime<Utc>,
) -> CorrelationOutcome {
    let dataset = Dataset::build(summaries, catalog, as_of);
    let mut entries = Vec::new();
    let mut skipped_pairs = 0;

    for metric_def in TRACKED_METRICS.iter() {
        let metric = metric_def.key.to_uppercase();

        // Normality of the metric's distribution decides the primary
        // coefficient for every pair involving it.
        let distribution = dataset.metric_distribution(&metric);
        let normal = normality::jarque_bera(&distribution, NORMALITY_ALPHA)
            .map(|verdict| verdict.normal)
            .unwrap_or(false);
        let primary = if normal { "pearson" } else { "spearman" };

        for attribute in PROCESS_ATTRIBUTES {
            let (xs, ys) = dataset.paired(attribute.key, &metric);
            let pair = correlation::pearson(&xs, &ys)
                .zip(correlation::spearman(&xs, &ys));

            match pair {
                Some((pearson, spearman)) => entries.push(CorrelationEntry {
                    research_question: attribute.research_question.to_string(),
                    attribute: attribute.key.to_string(),
                    metric: metric.clone(),
                    pearson_r: pearson.coefficient,
                    pearson_p: pearson.p_value,
                    spearman_rho: spearman.coefficient,
                    spearman_p: spearman.p_value,
                    n: pearson.n,
                    primary: primary.to_string(),
                }),
                None => {
                    skipped_pairs += 1;
                    warn!(
                        "skipping {} x {metric}: {} usable pairs (need 3, non-degenerate)",
                        attribute.key,
                        xs.len()
                    );
                }
            }
        }
    }

    info!(
        "correlation table: {} entries, {} pairs skipped",
        entries.len(),
        skipped_pairs
    );

    CorrelationOutcome {
        entries,
        repositories: dataset.observations.len(),
        orphaned_repositories: dataset.orphaned_repositories,
        small_sample_rows: dataset.small_sample_rows,
        skipped_pairs,
    }
}

/// File-level entry point for the `correlate` subcommand: load, join,
/// correlate, and write the three report artifacts into `out_dir`.
pub fn run_stats(
    summaries: &[MetricSummary],
    catalog: &[RepoRecord],
    out_dir: &Path,
    as_of: DateTime<Utc>,
) -> Result<CorrelationOutcome, StatsError> {
    std::fs::create_dir_all(out_dir)?;

    let outcome = correlate(summaries, catalog, as_of);

    let dataset = Dataset::build(summaries, catalog, as_of);
    let metrics: Vec<String> = TRACKED_METRICS
        .iter()
        .map(|m| m.key.to_uppercase())
        .collect();
    let bins = report::quartile_bins(&dataset, &metrics);

    report::write_correlations_csv(&out_dir.join("correlations.csv"), &outcome.entries)?;
    report::write_quartile_bins_csv(&out_dir.join("quartile_bins.csv"), &bins)?;

    let markdown = report::render_markdown(
        &outcome.entries,
        outcome.repositories,
        outcome.orphaned_repositories,
        outcome.small_sample_rows,
        outcome.skipped_pairs,
    );
    std::fs::write(out_dir.join("correlation_report.md"), markdown)?;

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(name: &str, stars: u32) -> RepoRecord {
        // Timestamps vary with stars so every process attribute has
        // variance in the fixtures.
        RepoRecord {
            full_name: name.to_string(),
            html_url: String::new(),
            clone_url: String::new(),
            stargazers_count: stars,
            forks_count: 0,
            created_at: Utc
                .with_ymd_and_hms(2012 + (stars % 8) as i32, 6, 1, 0, 0, 0)
                .single(),
            updated_at: Utc
                .with_ymd_and_hms(2024, 6, 1 + (stars % 27), 0, 0, 0)
                .single(),
            size: stars * 2,
            language: "Java".to_string(),
            open_issues_count: 0,
            default_branch: "main".to_string(),
        }
    }

    fn summary(repo: &str, metric: &str, mean: f64) -> MetricSummary {
        MetricSummary {
            repository: repo.to_string(),
            metric: metric.to_string(),
            label: String::new(),
            classes_analyzed: 10,
            invalid_values: 0,
            mean: Some(mean),
            median: Some(mean),
            std_dev: Some(1.0),
            min: Some(0.0),
            max: Some(mean * 2.0),
            q1: Some(mean / 2.0),
            q3: Some(mean * 1.5),
        }
    }

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().unwrap()
    }

    #[test]
    fn produces_entries_for_every_attribute_when_data_suffices() {
        let catalog: Vec<RepoRecord> = (0..6)
            .map(|i| record(&format!("o/r{i}"), 100 + i * 50))
            .collect();
        let summaries: Vec<MetricSummary> = (0..6)
            .map(|i| summary(&format!("o/r{i}"), "CBO", 2.0 + i as f64))
            .collect();

        let outcome = correlate(&summaries, &catalog, as_of());
        let cbo_entries: Vec<_> = outcome
            .entries
            .iter()
            .filter(|e| e.metric == "CBO")
            .collect();
        assert_eq!(cbo_entries.len(), PROCESS_ATTRIBUTES.len());
        // stars and means rise together in this fixture
        let rq01 = cbo_entries
            .iter()
            .find(|e| e.research_question == "RQ01")
            .unwrap();
        assert!(rq01.pearson_r > 0.9);
    }

    #[test]
    fn under_three_repositories_skips_pairs_with_count() {
        let catalog = vec![record("o/a", 100), record("o/b", 200)];
        let summaries = vec![summary("o/a", "CBO", 2.0), summary("o/b", "CBO", 3.0)];

        let outcome = correlate(&summaries, &catalog, as_of());
        assert!(outcome.entries.iter().all(|e| e.metric != "CBO"));
        assert!(outcome.skipped_pairs >= PROCESS_ATTRIBUTES.len());
    }

    #[test]
    fn correlation_is_deterministic() {
        let catalog: Vec<RepoRecord> = (0..5)
            .map(|i| record(&format!("o/r{i}"), 10 + i * 13))
            .collect();
        let summaries: Vec<MetricSummary> = (0..5)
            .map(|i| summary(&format!("o/r{i}"), "WMC", 7.0 - i as f64))
            .collect();

        let first = correlate(&summaries, &catalog, as_of());
        let second = correlate(&summaries, &catalog, as_of());
        assert_eq!(first.entries.len(), second.entries.len());
        for (a, b) in first.entries.iter().zip(second.entries.iter()) {
            assert_eq!(a.pearson_r.to_bits(), b.pearson_r.to_bits());
            assert_eq!(a.spearman_rho.to_bits(), b.spearman_rho.to_bits());
        }
    }

    #[test]
    fn run_stats_writes_all_artifacts() {
        let out = tempfile::tempdir().unwrap();
        let catalog: Vec<RepoRecord> = (0..6)
            .map(|i| record(&format!("o/r{i}"), 100 + i * 10))
            .collect();
        let summaries: Vec<MetricSummary> = (0..6)
            .map(|i| summary(&format!("o/r{i}"), "LOC", 100.0 + i as f64))
            .collect();

        run_stats(&summaries, &catalog, out.path(), as_of()).unwrap();
        assert!(out.path().join("correlations.csv").is_file());
        assert!(out.path().join("quartile_bins.csv").is_file());
        assert!(out.path().join("correlation_report.md").is_file());
    }
}
