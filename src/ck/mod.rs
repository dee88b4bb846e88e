//! Single-repository analysis
//!
//! Clones one repository into a scratch directory, runs the external CK
//! tool against it, recovers the tool's output wherever it landed, and
//! removes the scratch copy on every exit path.

mod clone;
mod runner;
pub mod types;

pub use types::{AnalyzeError, CkArtifacts, CkOptions};

use log::{debug, info};
use std::path::Path;
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::config::PipelineConfig;

/// Everything needed to analyze one repository.
#[derive(Debug)]
pub struct AnalyzeRequest<'a> {
    /// `owner/name`, a full HTTPS URL, or anything ending in `.git`.
    pub repo: &'a str,
    /// Path to the CK jar.
    pub ck_jar: &'a Path,
    /// Intended output directory for the raw metric CSVs. Survives the
    /// scratch cleanup.
    pub out_dir: &'a Path,
    pub options: CkOptions,
}

/// Run the full per-repository sequence: clone, source check, CK,
/// output recovery.
///
/// The scratch directory (clone plus the tool's pinned cwd) is a
/// `TempDir` guard, so it is removed when this function returns on
/// success, on every error, and on unwind.
pub async fn analyze_repository(
    request: AnalyzeRequest<'_>,
    config: &PipelineConfig,
) -> Result<CkArtifacts, AnalyzeError> {
    if !request.ck_jar.is_file() {
        return Err(AnalyzeError::CkJarMissing(request.ck_jar.to_path_buf()));
    }

    let (clone_url, short_name) = normalize_repo(request.repo);
    let scratch = TempDir::with_prefix("ck-harvest-")?;
    let scratch_dir = scratch.path().to_path_buf();
    let project_dir = scratch.path().join("repo");
    let tool_cwd = scratch.path().join("ck-cwd");
    std::fs::create_dir_all(&tool_cwd)?;

    info!("cloning {clone_url} -> {}", project_dir.display());
    clone::shallow_clone(
        request.repo,
        &clone_url,
        &project_dir,
        config.clone_depth,
        config.clone_timeout,
    )
    .await?;

    let java_files = count_java_files(&project_dir);
    debug!("{short_name}: {java_files} Java files in clone");
    if java_files == 0 {
        return Err(AnalyzeError::NoSourceFiles {
            repo: request.repo.to_string(),
        });
    }

    std::fs::create_dir_all(request.out_dir)?;
    info!("running CK on {short_name} ({java_files} Java files)");
    runner::run_ck(
        request.repo,
        Path::new("java"),
        request.ck_jar,
        &project_dir,
        request.out_dir,
        &tool_cwd,
        request.options,
        config,
    )
    .await?;

    let (class_csv, method_csv, field_csv) =
        runner::recover_artifacts(request.repo, request.out_dir, &tool_cwd, config).await?;

    Ok(CkArtifacts {
        class_csv,
        method_csv,
        field_csv,
        java_files,
        scratch_dir,
    })
}

/// Accept `owner/name`, full HTTPS URLs and `.git` URLs; return the
/// clone URL and a filesystem-safe short name.
pub fn normalize_repo(repo: &str) -> (String, String) {
    let repo = repo.trim();
    if repo.starts_with("http://") || repo.starts_with("https://") || repo.ends_with(".git") {
        let base = repo.trim_end_matches(".git");
        let short = base.rsplit('/').next().unwrap_or(base).to_string();
        (repo.to_string(), short)
    } else {
        (
            format!("https://github.com/{repo}.git"),
            repo.replace('/', "_"),
        )
    }
}

/// Count `.java` files under `project_dir`, skipping hidden entries.
fn count_java_files(project_dir: &Path) -> usize {
    WalkDir::new(project_dir)
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !e
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.starts_with('.'))
        })
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().and_then(|ext| ext.to_str()) == Some("java"))
        .count()
}
