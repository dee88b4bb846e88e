//! CK tool invocation and output recovery
//!
//! The CK jar takes an output location as its last positional argument
//! but, depending on version, writes its CSVs into its own working
//! directory instead, sometimes under a `ck_output` prefix. The runner
//! pins the child's working directory to a scratch location it owns, so
//! after the process exits there are exactly two places to probe: the
//! requested output directory and that scratch cwd.

use log::{debug, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::time::sleep;

use crate::ck::types::{AnalyzeError, CkOptions};
use crate::config::PipelineConfig;

/// Artifact stems the tool emits, in the order they are reported.
pub(crate) const ARTIFACTS: [&str; 3] = ["class", "method", "field"];

/// Filename prefix some CK versions prepend when they mistake the
/// output directory argument for a filename prefix.
const STRAY_PREFIX: &str = "ck_output";

fn bool_arg(v: bool) -> &'static str {
    if v { "true" } else { "false" }
}

/// Invoke the CK jar against `project_dir`, with its working directory
/// pinned to `tool_cwd`. `program` is the JVM launcher; the analyzer
/// passes `java`, tests substitute a scripted stand-in.
pub(crate) async fn run_ck(
    repo: &str,
    program: &Path,
    jar: &Path,
    project_dir: &Path,
    out_dir: &Path,
    tool_cwd: &Path,
    options: CkOptions,
    config: &PipelineConfig,
) -> Result<(), AnalyzeError> {
    let mut command = tokio::process::Command::new(program);
    command
        .arg("-jar")
        .arg(jar)
        .arg(project_dir)
        .arg(bool_arg(options.use_jars))
        .arg(options.max_files_per_partition.to_string())
        .arg(bool_arg(options.variables_and_fields))
        .arg(out_dir)
        .current_dir(tool_cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match tokio::time::timeout(config.ck_timeout, command.output()).await {
        Err(_) => {
            return Err(AnalyzeError::CkTimeout {
                repo: repo.to_string(),
                duration: config.ck_timeout,
            });
        }
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AnalyzeError::JavaMissing);
        }
        Ok(Err(e)) => return Err(AnalyzeError::Io(e)),
        Ok(Ok(output)) => output,
    };

    if !output.status.success() {
        // Known to exit non-zero after writing usable output; probing
        // decides whether this run actually failed.
        warn!(
            "CK exited with {} for {repo}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    } else {
        debug!("CK stdout for {repo}: {}", String::from_utf8_lossy(&output.stdout).trim());
    }

    Ok(())
}

/// Probe candidate locations for the expected artifacts, waiting a
/// bounded number of polls for late writes, and normalize whatever is
/// found into `out_dir` under the plain `<stem>.csv` names.
///
/// All three artifacts must turn up somewhere; anything less is a
/// "produced no output" failure, never a silent success.
pub(crate) async fn recover_artifacts(
    repo: &str,
    out_dir: &Path,
    tool_cwd: &Path,
    config: &PipelineConfig,
) -> Result<(PathBuf, PathBuf, PathBuf), AnalyzeError> {
    let mut found: HashMap<&'static str, PathBuf> = HashMap::new();

    for attempt in 0..config.output_poll_attempts.max(1) {
        found = probe(out_dir, tool_cwd);
        if found.len() == ARTIFACTS.len() {
            break;
        }
        if attempt + 1 < config.output_poll_attempts {
            sleep(config.output_poll_interval).await;
        }
    }

    if found.len() < ARTIFACTS.len() {
        warn!(
            "CK artifacts missing for {repo}: found {:?}, wanted {:?}",
            found.keys().collect::<Vec<_>>(),
            ARTIFACTS
        );
        return Err(AnalyzeError::NoMetricsProduced {
            repo: repo.to_string(),
        });
    }

    std::fs::create_dir_all(out_dir)?;
    for stem in ARTIFACTS {
        let source = &found[stem];
        let target = out_dir.join(format!("{stem}.csv"));
        if source != &target {
            debug!("relocating {} -> {}", source.display(), target.display());
            move_file(source, &target)?;
        }
    }

    Ok((
        out_dir.join("class.csv"),
        out_dir.join("method.csv"),
        out_dir.join("field.csv"),
    ))
}

/// One probe pass over the ordered candidate directories. First match
/// per artifact wins; the requested output directory outranks the tool
/// cwd, and plain names outrank prefixed ones.
fn probe(out_dir: &Path, tool_cwd: &Path) -> HashMap<&'static str, PathBuf> {
    let mut found = HashMap::new();
    for stem in ARTIFACTS {
        'candidates: for dir in [out_dir, tool_cwd] {
            for name in [format!("{stem}.csv"), format!("{STRAY_PREFIX}{stem}.csv")] {
                let candidate = dir.join(name);
                if candidate.is_file() {
                    found.insert(stem, candidate);
                    break 'candidates;
                }
            }
        }
    }
    found
}

/// Rename, falling back to copy+remove when source and target are on
/// different filesystems.
fn move_file(source: &Path, target: &Path) -> std::io::Result<()> {
    match std::fs::rename(source, target) {
        Ok(()) => Ok(()),
        Err(_) => {
            std::fs::copy(source, target)?;
            std::fs::remove_file(source)
        }
    }
}
