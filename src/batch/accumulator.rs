//! Append-only accumulated results store
//!
//! One CSV file holding every summarized repository so far. Rows are
//! appended and flushed after each repository, so an interrupted batch
//! keeps everything already processed.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::batch::BatchError;
use crate::metrics::MetricSummary;

pub struct SummaryAccumulator {
    path: PathBuf,
}

impl SummaryAccumulator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one repository's summary rows, writing the header only
    /// when the file is new or empty.
    pub fn append(&self, rows: &[MetricSummary]) -> Result<(), BatchError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let needs_header = std::fs::metadata(&self.path).map_or(true, |m| m.len() == 0);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read every accumulated row back.
    pub fn load(&self) -> Result<Vec<MetricSummary>, BatchError> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut rows = Vec::new();
        for row in reader.deserialize() {
            rows.push(row?);
        }
        Ok(rows)
    }
}
