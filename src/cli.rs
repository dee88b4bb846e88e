//! Command-line interface definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ck-harvest")]
#[command(about = "Mine popular Java repositories, run CK on each, and correlate quality metrics against process attributes", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the catalog of most-starred repositories for a language
    Fetch {
        /// Language filter for the search query
        #[arg(long, default_value = "Java")]
        language: String,

        /// Number of search pages (100 repositories per page)
        #[arg(long, default_value = "10")]
        pages: u32,

        /// Personal access token; falls back to the environment
        #[arg(long, env = "GITHUB_TOKEN")]
        token: Option<String>,

        /// Catalog CSV destination
        #[arg(short, long, default_value = "data/catalog.csv")]
        out: PathBuf,
    },

    /// Clone and analyze one repository with CK
    Analyze {
        /// owner/name or full HTTPS clone URL
        #[arg(long)]
        repo: String,

        /// Path to the CK jar
        #[arg(long)]
        ck: PathBuf,

        /// Results root (raw CSVs land under <outdir>/raw/<repo>)
        #[arg(long, default_value = "results")]
        outdir: PathBuf,

        /// Resolve types against jars found in the project
        #[arg(long)]
        use_jars: bool,

        /// Max files per CK partition (0 = automatic)
        #[arg(long, default_value = "0")]
        max_files: u32,

        /// Also emit variable and field level metrics
        #[arg(long)]
        variables_and_fields: bool,
    },

    /// Analyze every repository in a catalog, accumulating summaries
    Batch {
        /// Catalog CSV produced by `fetch`
        #[arg(long, default_value = "data/catalog.csv")]
        catalog: PathBuf,

        /// Path to the CK jar
        #[arg(long)]
        ck: PathBuf,

        /// Results root
        #[arg(long, default_value = "results")]
        outdir: PathBuf,

        /// Skip this many catalog entries (manual resume point)
        #[arg(long, default_value = "0")]
        offset: usize,

        /// Stop after this many repositories
        #[arg(long)]
        max_repos: Option<usize>,

        /// Seconds to pause between repositories
        #[arg(long, default_value = "2")]
        delay_secs: u64,
    },

    /// Recompute correlations from an existing accumulated summary
    /// without fetching or analyzing anything
    Correlate {
        /// Accumulated summary CSV from a batch run
        #[arg(long, default_value = "results/summary.csv")]
        summary: PathBuf,

        /// Catalog CSV supplying the process attributes
        #[arg(long, default_value = "data/catalog.csv")]
        catalog: PathBuf,

        /// Where the correlation artifacts are written
        #[arg(long, default_value = "results")]
        outdir: PathBuf,
    },
}
