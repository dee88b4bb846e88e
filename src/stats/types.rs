//! Types for the statistical analysis stage

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("statistics input unreadable: {0}")]
    Csv(#[from] csv::Error),

    #[error("statistics I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One (process attribute, quality metric) correlation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationEntry {
    pub research_question: String,
    pub attribute: String,
    pub metric: String,
    pub pearson_r: f64,
    pub pearson_p: f64,
    pub spearman_rho: f64,
    pub spearman_p: f64,
    pub n: usize,
    /// "pearson" when the metric distribution classified normal,
    /// otherwise "spearman".
    pub primary: String,
}
