//! Types for single-repository analysis

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Per-repository analysis failures. None of these abort a batch; the
/// orchestrator records the reason and moves on.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("CK jar not found: {0}")]
    CkJarMissing(PathBuf),

    #[error("java executable not found on PATH")]
    JavaMissing,

    #[error("clone failed for {repo}: {details}")]
    Clone { repo: String, details: String },

    #[error("clone timed out for {repo} after {duration:?}")]
    CloneTimeout { repo: String, duration: Duration },

    #[error("no Java source files in {repo}")]
    NoSourceFiles { repo: String },

    #[error("metrics tool timed out for {repo} after {duration:?}")]
    CkTimeout { repo: String, duration: Duration },

    #[error("metrics tool produced no output for {repo}")]
    NoMetricsProduced { repo: String },

    #[error("scratch I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Flags forwarded to the CK tool, in its positional-argument order.
#[derive(Debug, Clone, Copy, Default)]
pub struct CkOptions {
    /// Resolve types against jars found in the project.
    pub use_jars: bool,
    /// Max files per partition; 0 lets the tool decide.
    pub max_files_per_partition: u32,
    /// Also emit variable and field level metrics.
    pub variables_and_fields: bool,
}

/// Raw metric files left in the intended output directory on success.
#[derive(Debug, Clone)]
pub struct CkArtifacts {
    pub class_csv: PathBuf,
    pub method_csv: PathBuf,
    pub field_csv: PathBuf,
    /// How many `.java` files the clone contained.
    pub java_files: usize,
    /// Scratch directory used for the clone; removed before return.
    pub scratch_dir: PathBuf,
}
