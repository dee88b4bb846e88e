//! Catalog CSV persistence

use log::info;
use std::path::Path;

use crate::github::types::{FetchError, FetchResult, RepoRecord};

/// Write the catalog to `path`, creating parent directories as needed.
pub fn write_catalog(path: &Path, records: &[RepoRecord]) -> FetchResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    info!("wrote {} repositories to {}", records.len(), path.display());
    Ok(())
}

/// Read a previously written catalog.
///
/// A missing or unreadable file is an error here; callers decide whether
/// that is fatal (it is for a batch run).
pub fn read_catalog(path: &Path) -> FetchResult<Vec<RepoRecord>> {
    if !path.exists() {
        return Err(FetchError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("catalog file not found: {}", path.display()),
        )));
    }

    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: RepoRecord = row?;
        records.push(record);
    }
    Ok(records)
}
