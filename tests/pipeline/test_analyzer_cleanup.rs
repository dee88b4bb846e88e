//! Scratch cleanup guarantees of the single-repository analyzer.

use std::collections::HashSet;
use std::path::Path;

use ck_harvest::ck::{AnalyzeError, AnalyzeRequest, CkOptions, analyze_repository};
use ck_harvest::config::PipelineConfig;

fn scratch_dirs() -> HashSet<String> {
    std::fs::read_dir(std::env::temp_dir())
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter_map(|entry| entry.file_name().into_string().ok())
                .filter(|name| name.starts_with("ck-harvest-"))
                .collect()
        })
        .unwrap_or_default()
}

// Both failure paths share one test: the scratch-dir snapshots must not
// race another analyzer run in a parallel test thread.
#[tokio::test]
async fn scratch_is_removed_on_every_failure_path() {
    let config = PipelineConfig::default();
    let out = tempfile::tempdir().unwrap();

    // Missing jar: rejected before any scratch or clone work.
    let before = scratch_dirs();
    let err = analyze_repository(
        AnalyzeRequest {
            repo: "o/r",
            ck_jar: Path::new("/nope/ck.jar"),
            out_dir: out.path(),
            options: CkOptions::default(),
        },
        &config,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AnalyzeError::CkJarMissing(_)));
    assert!(scratch_dirs().difference(&before).next().is_none());

    // Failing clone: a local URL that cannot exist, so the clone fails
    // without touching the network. The scratch directory must be gone
    // even though the analyzer got as far as creating it.
    let jar = out.path().join("ck.jar");
    std::fs::write(&jar, b"not a real jar").unwrap();

    let before = scratch_dirs();
    let err = analyze_repository(
        AnalyzeRequest {
            repo: "file:///nonexistent/ck-harvest-missing.git",
            ck_jar: &jar,
            out_dir: &out.path().join("raw"),
            options: CkOptions::default(),
        },
        &config,
    )
    .await
    .unwrap_err();
    assert!(
        matches!(err, AnalyzeError::Clone { .. } | AnalyzeError::CloneTimeout { .. }),
        "unexpected error: {err}"
    );

    let after = scratch_dirs();
    let leftover: Vec<_> = after.difference(&before).collect();
    assert!(leftover.is_empty(), "scratch dirs left behind: {leftover:?}");
}
