//! Stats-only flow from files on disk, as the `correlate` subcommand
//! runs it.

use chrono::{TimeZone, Utc};

use ck_harvest::batch::SummaryAccumulator;
use ck_harvest::github::{RepoRecord, read_catalog, write_catalog};
use ck_harvest::metrics::MetricSummary;
use ck_harvest::stats::run_stats;

fn record(name: &str, stars: u32) -> RepoRecord {
    RepoRecord {
        full_name: name.to_string(),
        html_url: format!("https://github.com/{name}"),
        clone_url: format!("https://github.com/{name}.git"),
        stargazers_count: stars,
        forks_count: stars / 10,
        created_at: Utc.with_ymd_and_hms(2017, 3, 1, 0, 0, 0).single(),
        updated_at: Utc.with_ymd_and_hms(2024, 11, 15, 0, 0, 0).single(),
        size: stars * 3,
        language: "Java".to_string(),
        open_issues_count: 5,
        default_branch: "main".to_string(),
    }
}

fn summary(repo: &str, metric: &str, mean: f64) -> MetricSummary {
    MetricSummary {
        repository: repo.to_string(),
        metric: metric.to_string(),
        label: "label".to_string(),
        classes_analyzed: 25,
        invalid_values: 1,
        mean: Some(mean),
        median: Some(mean - 0.5),
        std_dev: Some(1.2),
        min: Some(0.0),
        max: Some(mean * 3.0),
        q1: Some(mean - 1.0),
        q3: Some(mean + 1.0),
    }
}

#[test]
fn correlates_from_persisted_catalog_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = dir.path().join("catalog.csv");
    let summary_path = dir.path().join("summary.csv");
    let out_dir = dir.path().join("stats");

    let records: Vec<RepoRecord> = (0..8)
        .map(|i| record(&format!("org/repo{i}"), 100 + i * 40))
        .collect();
    write_catalog(&catalog_path, &records).unwrap();

    let accumulator = SummaryAccumulator::new(&summary_path);
    for (i, repo) in records.iter().enumerate() {
        accumulator
            .append(&[
                summary(&repo.full_name, "CBO", 3.0 + i as f64 * 0.7),
                summary(&repo.full_name, "DIT", 2.0 + (i % 3) as f64),
            ])
            .unwrap();
    }

    let catalog = read_catalog(&catalog_path).unwrap();
    let summaries = accumulator.load().unwrap();
    let as_of = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().unwrap();

    let outcome = run_stats(&summaries, &catalog, &out_dir, as_of).unwrap();

    assert_eq!(outcome.repositories, 8);
    assert_eq!(outcome.orphaned_repositories, 0);
    assert!(!outcome.entries.is_empty());
    // stars and CBO means rise together in this fixture
    let rq01_cbo = outcome
        .entries
        .iter()
        .find(|e| e.research_question == "RQ01" && e.metric == "CBO")
        .unwrap();
    assert!(rq01_cbo.pearson_r > 0.95);
    assert!(rq01_cbo.pearson_p < 0.05);

    assert!(out_dir.join("correlations.csv").is_file());
    assert!(out_dir.join("quartile_bins.csv").is_file());
    let report = std::fs::read_to_string(out_dir.join("correlation_report.md")).unwrap();
    assert!(report.contains("RQ01"));
}
