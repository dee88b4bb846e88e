// ck-harvest binary: fetch -> batch (analyze + aggregate) -> correlate.
//
// Per-repository failures are logged and tallied; only batch-level
// problems (missing catalog, unwritable results) exit non-zero.

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::time::Duration;

use ck_harvest::batch::{self, BatchRequest, CkAnalyzer};
use ck_harvest::cli::{Cli, Commands};
use ck_harvest::config::PipelineConfig;
use ck_harvest::github::{self, GitHubClient};
use ck_harvest::{ck, metrics, stats};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = PipelineConfig::default();

    match cli.command {
        Commands::Fetch {
            language,
            pages,
            token,
            out,
        } => {
            if token.is_none() {
                warn!("no token provided; the anonymous search quota is much lower");
            }
            let client = GitHubClient::from_optional_token(token)
                .context("failed to build GitHub client")?;

            let fetch = github::fetch_catalog(&client, &language, pages, &config)
                .await
                .context("catalog fetch failed")?;
            if fetch.partial {
                warn!("catalog is partial: some pages were abandoned after retries");
            }
            github::write_catalog(&out, &fetch.records).context("failed to write catalog")?;
            info!(
                "catalog: {} repositories over {} pages -> {}",
                fetch.records.len(),
                fetch.pages_fetched,
                out.display()
            );
        }

        Commands::Analyze {
            repo,
            ck: ck_jar,
            outdir,
            use_jars,
            max_files,
            variables_and_fields,
        } => {
            let (_, short_name) = ck::normalize_repo(&repo);
            let raw_dir = outdir.join("raw").join(&short_name);
            let artifacts = ck::analyze_repository(
                ck::AnalyzeRequest {
                    repo: &repo,
                    ck_jar: &ck_jar,
                    out_dir: &raw_dir,
                    options: ck::CkOptions {
                        use_jars,
                        max_files_per_partition: max_files,
                        variables_and_fields,
                    },
                },
                &config,
            )
            .await
            .with_context(|| format!("analysis of {repo} failed"))?;

            let summaries = metrics::aggregate_class_metrics(&artifacts.class_csv, &repo)
                .context("failed to aggregate class metrics")?;
            let summary_path = outdir.join(format!("summary_{short_name}.csv"));
            metrics::write_summary(&summary_path, &summaries)
                .context("failed to write summary")?;

            for summary in &summaries {
                match summary.mean {
                    Some(mean) => info!(
                        "{}: n={} mean={mean:.2} median={:.2}",
                        summary.metric,
                        summary.classes_analyzed,
                        summary.median.unwrap_or(f64::NAN)
                    ),
                    None => info!("{}: no valid values", summary.metric),
                }
            }
            info!("raw metrics in {}, summary in {}", raw_dir.display(), summary_path.display());
        }

        Commands::Batch {
            catalog,
            ck: ck_jar,
            outdir,
            offset,
            max_repos,
            delay_secs,
        } => {
            let records = github::read_catalog(&catalog)
                .with_context(|| format!("cannot load catalog {}", catalog.display()))?;
            anyhow::ensure!(!records.is_empty(), "catalog {} is empty", catalog.display());

            let config = PipelineConfig {
                repo_delay: Duration::from_secs(delay_secs),
                ..config
            };
            let analyzer = CkAnalyzer {
                ck_jar: &ck_jar,
                options: ck::CkOptions::default(),
            };
            let report = batch::run_batch(
                BatchRequest {
                    records: &records,
                    raw_root: &outdir.join("raw"),
                    summary_path: &outdir.join("summary.csv"),
                    offset,
                    max_repos,
                },
                &analyzer,
                &config,
            )
            .await
            .context("batch run failed")?;

            for (repository, reason) in &report.failures {
                warn!("failed: {repository}: {reason}");
            }
            info!(
                "batch complete: {}/{} repositories summarized ({} failed); re-run with --offset to resume",
                report.succeeded, report.processed, report.failed
            );
        }

        Commands::Correlate {
            summary,
            catalog,
            outdir,
        } => {
            let accumulator = batch::SummaryAccumulator::new(&summary);
            let summaries = accumulator
                .load()
                .with_context(|| format!("cannot load summary {}", summary.display()))?;
            let records = github::read_catalog(&catalog)
                .with_context(|| format!("cannot load catalog {}", catalog.display()))?;

            let outcome = stats::run_stats(&summaries, &records, &outdir, chrono::Utc::now())
                .context("statistical analysis failed")?;
            info!(
                "correlations: {} entries over {} repositories ({} orphaned, {} small-sample rows, {} pairs skipped) -> {}",
                outcome.entries.len(),
                outcome.repositories,
                outcome.orphaned_repositories,
                outcome.small_sample_rows,
                outcome.skipped_pairs,
                outdir.display()
            );
        }
    }

    Ok(())
}
