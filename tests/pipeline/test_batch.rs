//! Batch orchestration fault tolerance.

use std::path::Path;
use std::time::Duration;

use ck_harvest::batch::{Analyzer, BatchRequest, SummaryAccumulator, run_batch};
use ck_harvest::ck::{AnalyzeError, CkArtifacts};
use ck_harvest::config::PipelineConfig;
use ck_harvest::github::RepoRecord;

fn record(name: &str, stars: u32) -> RepoRecord {
    RepoRecord {
        full_name: name.to_string(),
        html_url: format!("https://github.com/{name}"),
        clone_url: format!("https://github.com/{name}.git"),
        stargazers_count: stars,
        forks_count: 0,
        created_at: None,
        updated_at: None,
        size: 10,
        language: "Java".to_string(),
        open_issues_count: 0,
        default_branch: "main".to_string(),
    }
}

fn quick_config() -> PipelineConfig {
    PipelineConfig {
        repo_delay: Duration::ZERO,
        ..PipelineConfig::default()
    }
}

/// Writes a small class.csv per repository, failing one by name.
struct ScriptedAnalyzer {
    fail_repo: &'static str,
}

impl Analyzer for ScriptedAnalyzer {
    async fn analyze(
        &self,
        record: &RepoRecord,
        raw_dir: &Path,
        _config: &PipelineConfig,
    ) -> Result<CkArtifacts, AnalyzeError> {
        if record.full_name == self.fail_repo {
            return Err(AnalyzeError::Clone {
                repo: record.full_name.clone(),
                details: "simulated network failure".to_string(),
            });
        }

        std::fs::create_dir_all(raw_dir)?;
        let class_csv = raw_dir.join("class.csv");
        std::fs::write(
            &class_csv,
            "class,cbo,dit,lcom,wmc,loc,noc,rfc\n\
             A,1,1,0,4,50,0,6\n\
             B,2,2,1,5,60,1,7\n\
             C,3,1,2,6,70,0,8\n",
        )?;
        std::fs::write(raw_dir.join("method.csv"), "method,loc\n")?;
        std::fs::write(raw_dir.join("field.csv"), "field\n")?;

        Ok(CkArtifacts {
            method_csv: raw_dir.join("method.csv"),
            field_csv: raw_dir.join("field.csv"),
            java_files: 3,
            scratch_dir: raw_dir.to_path_buf(),
            class_csv,
        })
    }
}

#[tokio::test]
async fn one_failing_repository_does_not_abort_the_batch() {
    let out = tempfile::tempdir().unwrap();
    let records = vec![record("o/a", 30), record("o/b", 20), record("o/c", 10)];
    let summary_path = out.path().join("summary.csv");

    let report = run_batch(
        BatchRequest {
            records: &records,
            raw_root: &out.path().join("raw"),
            summary_path: &summary_path,
            offset: 0,
            max_repos: None,
        },
        &ScriptedAnalyzer { fail_repo: "o/b" },
        &quick_config(),
    )
    .await
    .unwrap();

    assert_eq!(report.processed, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, "o/b");

    // 7 tracked metrics per summarized repository, nothing for o/b.
    let rows = SummaryAccumulator::new(&summary_path).load().unwrap();
    assert_eq!(rows.len(), 14);
    assert!(rows.iter().all(|row| row.repository != "o/b"));
    assert!(rows.iter().any(|row| row.repository == "o/a"));
    assert!(rows.iter().any(|row| row.repository == "o/c"));
}

#[tokio::test]
async fn offset_and_cap_slice_the_catalog() {
    let out = tempfile::tempdir().unwrap();
    let records = vec![
        record("o/a", 40),
        record("o/b", 30),
        record("o/c", 20),
        record("o/d", 10),
    ];

    let report = run_batch(
        BatchRequest {
            records: &records,
            raw_root: &out.path().join("raw"),
            summary_path: &out.path().join("summary.csv"),
            offset: 1,
            max_repos: Some(2),
        },
        &ScriptedAnalyzer { fail_repo: "none" },
        &quick_config(),
    )
    .await
    .unwrap();

    assert_eq!(report.processed, 2);
    let rows = SummaryAccumulator::new(out.path().join("summary.csv"))
        .load()
        .unwrap();
    let repos: std::collections::HashSet<&str> =
        rows.iter().map(|row| row.repository.as_str()).collect();
    let expected: std::collections::HashSet<&str> = ["o/b", "o/c"].into_iter().collect();
    assert_eq!(repos, expected);
}

#[tokio::test]
async fn interrupted_batch_keeps_prior_results() {
    let out = tempfile::tempdir().unwrap();
    let summary_path = out.path().join("summary.csv");
    let records = vec![record("o/a", 2), record("o/b", 1)];

    // First slice persists immediately...
    run_batch(
        BatchRequest {
            records: &records,
            raw_root: &out.path().join("raw"),
            summary_path: &summary_path,
            offset: 0,
            max_repos: Some(1),
        },
        &ScriptedAnalyzer { fail_repo: "none" },
        &quick_config(),
    )
    .await
    .unwrap();
    assert_eq!(SummaryAccumulator::new(&summary_path).load().unwrap().len(), 7);

    // ...and the manual-resume slice appends to it.
    run_batch(
        BatchRequest {
            records: &records,
            raw_root: &out.path().join("raw"),
            summary_path: &summary_path,
            offset: 1,
            max_repos: None,
        },
        &ScriptedAnalyzer { fail_repo: "none" },
        &quick_config(),
    )
    .await
    .unwrap();

    let rows = SummaryAccumulator::new(&summary_path).load().unwrap();
    assert_eq!(rows.len(), 14);
}
