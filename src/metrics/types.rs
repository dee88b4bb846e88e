//! Types for metric aggregation

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("raw metrics file unreadable: {0}")]
    Csv(#[from] csv::Error),

    #[error("raw metrics I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One tracked metric: CSV column key and human label.
#[derive(Debug, Clone, Copy)]
pub struct MetricDef {
    pub key: &'static str,
    pub label: &'static str,
}

lazy_static! {
    /// The seven class-level metrics the study tracks, in report order.
    pub static ref TRACKED_METRICS: Vec<MetricDef> = vec![
        MetricDef { key: "cbo", label: "Coupling Between Objects" },
        MetricDef { key: "dit", label: "Depth of Inheritance Tree" },
        MetricDef { key: "lcom", label: "Lack of Cohesion of Methods" },
        MetricDef { key: "wmc", label: "Weighted Methods per Class" },
        MetricDef { key: "loc", label: "Lines of Code" },
        MetricDef { key: "noc", label: "Number of Children" },
        MetricDef { key: "rfc", label: "Response for a Class" },
    ];
}

/// Descriptive statistics for one metric across one repository's
/// classes. Append-only once written to the accumulated table.
///
/// Statistics are `None` when no valid value was seen, which serializes
/// to empty CSV cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub repository: String,
    /// Upper-case metric key (CBO, DIT, ...).
    pub metric: String,
    pub label: String,
    /// Valid values consumed for this metric.
    pub classes_analyzed: u64,
    /// Cells excluded because they were missing or non-numeric.
    pub invalid_values: u64,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub q1: Option<f64>,
    pub q3: Option<f64>,
}
