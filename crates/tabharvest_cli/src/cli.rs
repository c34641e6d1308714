use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "tabharvest")]
#[command(about = "Fetch paginated HTML tables into CSV chunks, then check coverage and merge")]
#[command(version)]
pub struct Cli {
    /// RON file with fetch settings; command-line flags take precedence.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Also write the log to a file; without a value, `./tabharvest.log`.
    #[arg(
        long,
        global = true,
        num_args = 0..=1,
        default_missing_value = engine_logging::DEFAULT_LOG_FILE
    )]
    pub log_file: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch a page range and write chunk files.
    Fetch(FetchArgs),
    /// Report which pages have no chunk evidence.
    Coverage(CoverageArgs),
    /// Merge chunk files into one CSV, optionally removing duplicate lines.
    Merge(MergeArgs),
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    #[arg(long, default_value_t = 1)]
    pub from_page: u32,

    #[arg(long, default_value_t = 3945)]
    pub to_page: u32,

    /// Concurrent fetches [default: 10]
    #[arg(long)]
    pub workers: Option<usize>,

    #[arg(long, default_value = "ybio_html_data")]
    pub output_dir: PathBuf,

    /// JSON cookie export used to authenticate every request.
    #[arg(long, default_value = "cookies.json")]
    pub cookies: PathBuf,
}

#[derive(Debug, Args)]
pub struct CoverageArgs {
    #[arg(long, default_value = "ybio_html_data")]
    pub data_dir: PathBuf,

    #[arg(long, default_value_t = 3945)]
    pub total_pages: u32,
}

#[derive(Debug, Args)]
pub struct MergeArgs {
    /// Directory holding CSV files; repeat to merge several.
    #[arg(long = "data-dir", default_value = "ybio_html_data")]
    pub data_dirs: Vec<PathBuf>,

    /// Output file name, created in the first data directory.
    #[arg(long, default_value = "organizations_merged.csv")]
    pub output: String,

    #[arg(long)]
    pub dedupe: bool,
}
