//! Summary ⨝ catalog join
//!
//! Turns the long accumulated summary table into one observation per
//! repository (metric means wide), joined with the process attributes
//! derived from the catalog. Referential-integrity and small-sample
//! exclusions happen here, with counts kept for the report.

use chrono::{DateTime, Utc};
use log::warn;
use std::collections::HashMap;

use crate::github::RepoRecord;
use crate::metrics::MetricSummary;

/// Repositories must have at least this many analyzed classes for a
/// metric to enter correlation input.
pub const MIN_CLASSES_PER_REPO: u64 = 3;

/// One process attribute: catalog-derived value correlated against the
/// quality metrics for one research question.
#[derive(Debug, Clone, Copy)]
pub struct ProcessAttribute {
    pub research_question: &'static str,
    pub key: &'static str,
    pub label: &'static str,
}

/// The four fixed research questions. Activity is measured as staleness
/// (days since last update) because that is what the catalog carries;
/// a *negative* correlation with staleness means active repositories
/// score lower on the metric.
pub const PROCESS_ATTRIBUTES: [ProcessAttribute; 4] = [
    ProcessAttribute {
        research_question: "RQ01",
        key: "stars",
        label: "Popularity (stars)",
    },
    ProcessAttribute {
        research_question: "RQ02",
        key: "age_years",
        label: "Maturity (age in years)",
    },
    ProcessAttribute {
        research_question: "RQ03",
        key: "staleness_days",
        label: "Activity (days since last update)",
    },
    ProcessAttribute {
        research_question: "RQ04",
        key: "size_kb",
        label: "Size (KiB)",
    },
];

/// One joined observation: a repository's process attributes plus its
/// per-metric mean values.
#[derive(Debug)]
pub struct RepoObservation {
    pub repository: String,
    attributes: HashMap<&'static str, f64>,
    metric_means: HashMap<String, f64>,
}

impl RepoObservation {
    pub fn attribute(&self, key: &str) -> Option<f64> {
        self.attributes.get(key).copied()
    }

    pub fn metric_mean(&self, metric: &str) -> Option<f64> {
        self.metric_means.get(metric).copied()
    }
}

/// The joined dataset plus its exclusion tallies.
#[derive(Debug)]
pub struct Dataset {
    pub observations: Vec<RepoObservation>,
    /// Summary repositories absent from the catalog.
    pub orphaned_repositories: usize,
    /// Summary rows dropped for having too few analyzed classes.
    pub small_sample_rows: usize,
}

impl Dataset {
    /// Join accumulated summaries against catalog process attributes.
    /// `as_of` anchors age/staleness so runs are reproducible.
    pub fn build(
        summaries: &[MetricSummary],
        catalog: &[RepoRecord],
        as_of: DateTime<Utc>,
    ) -> Self {
        let by_name: HashMap<&str, &RepoRecord> = catalog
            .iter()
            .map(|record| (record.full_name.as_str(), record))
            .collect();

        let mut grouped: HashMap<&str, Vec<&MetricSummary>> = HashMap::new();
        for summary in summaries {
            grouped
                .entry(summary.repository.as_str())
                .or_default()
                .push(summary);
        }

        let mut observations = Vec::new();
        let mut orphaned_repositories = 0;
        let mut small_sample_rows = 0;

        let mut names: Vec<&str> = grouped.keys().copied().collect();
        names.sort_unstable();

        for name in names {
            let Some(record) = by_name.get(name) else {
                warn!("summary repository {name} has no catalog entry, excluding");
                orphaned_repositories += 1;
                continue;
            };

            let mut metric_means = HashMap::new();
            for summary in &grouped[name] {
                if summary.classes_analyzed < MIN_CLASSES_PER_REPO {
                    small_sample_rows += 1;
                    continue;
                }
                if let Some(mean) = summary.mean {
                    metric_means.insert(summary.metric.clone(), mean);
                }
            }

            observations.push(RepoObservation {
                repository: name.to_string(),
                attributes: attributes_for(record, as_of),
                metric_means,
            });
        }

        Self {
            observations,
            orphaned_repositories,
            small_sample_rows,
        }
    }

    /// Paired (attribute, metric-mean) vectors over observations that
    /// carry both values.
    pub fn paired(&self, attribute_key: &str, metric: &str) -> (Vec<f64>, Vec<f64>) {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for observation in &self.observations {
            if let (Some(x), Some(y)) = (
                observation.attribute(attribute_key),
                observation.metric_mean(metric),
            ) {
                xs.push(x);
                ys.push(y);
            }
        }
        (xs, ys)
    }

    /// All mean values for one metric, for normality classification.
    pub fn metric_distribution(&self, metric: &str) -> Vec<f64> {
        self.observations
            .iter()
            .filter_map(|observation| observation.metric_mean(metric))
            .collect()
    }
}

fn attributes_for(record: &RepoRecord, as_of: DateTime<Utc>) -> HashMap<&'static str, f64> {
    let mut attributes = HashMap::new();
    attributes.insert("stars", f64::from(record.stargazers_count));
    attributes.insert("size_kb", f64::from(record.size));

    if let Some(created) = record.created_at {
        let days = (as_of - created).num_days();
        attributes.insert("age_years", days as f64 / 365.25);
    }
    if let Some(updated) = record.updated_at {
        attributes.insert("staleness_days", (as_of - updated).num_days() as f64);
    }

    attributes
}
