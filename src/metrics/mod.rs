//! Per-repository metric aggregation
//!
//! Reads one repository's raw class-level CSV and reduces each tracked
//! metric column to descriptive statistics. Bad cells never abort a
//! repository; they are excluded and tallied.

pub mod descriptive;
pub mod types;

pub use descriptive::Descriptive;
pub use types::{AggregateError, MetricDef, MetricSummary, TRACKED_METRICS};

use log::debug;
use std::path::Path;

/// Aggregate the raw class metrics at `class_csv` for `repository`.
///
/// Always returns exactly one summary per tracked metric. A metric
/// whose column is absent, or an input with zero rows, yields a
/// summary with `classes_analyzed` 0 and all statistics `None`.
pub fn aggregate_class_metrics(
    class_csv: &Path,
    repository: &str,
) -> Result<Vec<MetricSummary>, AggregateError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(class_csv)?;

    // Case-insensitive column lookup; CK's header casing varies.
    let headers = reader.headers()?.clone();
    let columns: Vec<Option<usize>> = TRACKED_METRICS
        .iter()
        .map(|metric| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(metric.key))
        })
        .collect();

    let mut values: Vec<Vec<f64>> = vec![Vec::new(); TRACKED_METRICS.len()];
    let mut invalid: Vec<u64> = vec![0; TRACKED_METRICS.len()];

    for record in reader.records() {
        let record = record?;
        for (slot, column) in columns.iter().enumerate() {
            let Some(index) = column else { continue };
            match record.get(*index).map(str::trim) {
                Some(cell) if !cell.is_empty() => match cell.parse::<f64>() {
                    Ok(value) if value.is_finite() => values[slot].push(value),
                    _ => invalid[slot] += 1,
                },
                _ => invalid[slot] += 1,
            }
        }
    }

    let summaries = TRACKED_METRICS
        .iter()
        .zip(values.iter().zip(invalid.iter()))
        .map(|(metric, (metric_values, &invalid_count))| {
            let stats = Descriptive::from_values(metric_values);
            debug!(
                "{repository} {}: {} valid, {} invalid",
                metric.key,
                metric_values.len(),
                invalid_count
            );
            summary_row(repository, metric, stats, invalid_count)
        })
        .collect();

    Ok(summaries)
}

/// Write one repository's summary rows to a standalone CSV (the
/// single-repository `analyze` flow; batches append to the accumulated
/// store instead).
pub fn write_summary(path: &Path, rows: &[MetricSummary]) -> Result<(), AggregateError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn summary_row(
    repository: &str,
    metric: &MetricDef,
    stats: Option<Descriptive>,
    invalid_values: u64,
) -> MetricSummary {
    MetricSummary {
        repository: repository.to_string(),
        metric: metric.key.to_uppercase(),
        label: metric.label.to_string(),
        classes_analyzed: stats.map_or(0, |s| s.count),
        invalid_values,
        mean: stats.map(|s| s.mean),
        median: stats.map(|s| s.median),
        std_dev: stats.map(|s| s.std_dev),
        min: stats.map(|s| s.min),
        max: stats.map(|s| s.max),
        q1: stats.map(|s| s.q1),
        q3: stats.map(|s| s.q3),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("class.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn aggregates_reference_cbo_column() {
        let (_dir, path) = write_csv(
            "file,class,cbo,dit\n\
             a.java,A,1,1\n\
             b.java,B,2,1\n\
             c.java,C,3,2\n\
             d.java,D,4,2\n\
             e.java,E,100,3\n",
        );
        let summaries = aggregate_class_metrics(&path, "t/t").unwrap();
        assert_eq!(summaries.len(), TRACKED_METRICS.len());

        let cbo = summaries.iter().find(|s| s.metric == "CBO").unwrap();
        assert_eq!(cbo.classes_analyzed, 5);
        assert_eq!(cbo.invalid_values, 0);
        assert_eq!(cbo.mean, Some(22.0));
        assert_eq!(cbo.median, Some(3.0));
        assert_eq!(cbo.min, Some(1.0));
        assert_eq!(cbo.max, Some(100.0));
    }

    #[test]
    fn bad_cells_are_excluded_and_tallied() {
        let (_dir, path) = write_csv(
            "class,cbo\n\
             A,1\n\
             B,oops\n\
             C,\n\
             D,3\n",
        );
        let summaries = aggregate_class_metrics(&path, "t/t").unwrap();
        let cbo = summaries.iter().find(|s| s.metric == "CBO").unwrap();
        assert_eq!(cbo.classes_analyzed, 2);
        assert_eq!(cbo.invalid_values, 2);
        assert_eq!(cbo.mean, Some(2.0));
    }

    #[test]
    fn empty_file_yields_null_statistics_not_an_error() {
        let (_dir, path) = write_csv("class,cbo,dit,lcom,wmc,loc,noc,rfc\n");
        let summaries = aggregate_class_metrics(&path, "t/t").unwrap();
        assert_eq!(summaries.len(), 7);
        for summary in summaries {
            assert_eq!(summary.classes_analyzed, 0);
            assert_eq!(summary.mean, None);
            assert_eq!(summary.std_dev, None);
        }
    }

    #[test]
    fn missing_column_still_produces_a_row() {
        let (_dir, path) = write_csv("class,cbo\nA,5\n");
        let summaries = aggregate_class_metrics(&path, "t/t").unwrap();
        let noc = summaries.iter().find(|s| s.metric == "NOC").unwrap();
        assert_eq!(noc.classes_analyzed, 0);
        assert_eq!(noc.invalid_values, 0);
        assert_eq!(noc.mean, None);
    }

    #[test]
    fn aggregation_is_deterministic() {
        let content = "class,cbo,wmc\nA,1,9\nB,2,8\nC,3,7\n";
        let (_dir1, path1) = write_csv(content);
        let (_dir2, path2) = write_csv(content);
        let first = aggregate_class_metrics(&path1, "t/t").unwrap();
        let second = aggregate_class_metrics(&path2, "t/t").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn quoted_generic_class_names_do_not_shift_columns() {
        let (_dir, path) = write_csv(
            "class,type,cbo\n\
             \"com.example.Pair<K,V>\",class,4\n\
             com.example.Single,class,6\n",
        );
        let summaries = aggregate_class_metrics(&path, "t/t").unwrap();
        let cbo = summaries.iter().find(|s| s.metric == "CBO").unwrap();
        assert_eq!(cbo.classes_analyzed, 2);
        assert_eq!(cbo.mean, Some(5.0));
    }
}
