use clap::Parser;
use std::path::PathBuf;

use crate::config::DEFAULT_WORKERS;
use crate::record::MalformedLinePolicy;
use crate::source::{DEFAULT_BLOCKLIST_URL, DEFAULT_DUMPS_URL};
use crate::topk::CAPACITY;

#[derive(Parser, Debug)]
#[command(
    name = "pageviews",
    about = "Compute the top viewed titles per domain for every hour of Wikimedia pageview dumps",
    version,
    long_about = None
)]
pub struct Args {
    /// First hour to process (YYYY-MM-DDTHH:00:00), defaults to the current UTC hour
    #[arg(short, long, visible_alias = "date-from")]
    pub from: Option<String>,

    /// Last hour to process, inclusive (YYYY-MM-DDTHH:00:00), defaults to the current UTC hour
    #[arg(short, long, visible_alias = "date-to")]
    pub to: Option<String>,

    /// Number of worker threads
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Hours buffered ahead of the workers (defaults to the worker count)
    #[arg(long)]
    pub queue_capacity: Option<usize>,

    /// Number of titles kept per domain
    #[arg(long, default_value_t = CAPACITY)]
    pub top: usize,

    /// Directory receiving one report file per hour
    #[arg(short, long, default_value = "dumps")]
    pub reports_dir: PathBuf,

    /// Base URL of the hourly pageview dumps
    #[arg(long, default_value = DEFAULT_DUMPS_URL)]
    pub dumps_url: String,

    /// Read dumps from this directory instead of downloading them
    #[arg(long)]
    pub dumps_dir: Option<PathBuf>,

    /// Blocklist URL or local file path
    #[arg(short, long, default_value = DEFAULT_BLOCKLIST_URL)]
    pub blocklist: String,

    /// What to do with dump lines that have fewer than three fields
    #[arg(long, value_enum, default_value_t = MalformedLinePolicy::Skip)]
    pub malformed_lines: MalformedLinePolicy,

    /// Custom parent directory for temporary download files
    #[arg(long)]
    pub temp_path: Option<PathBuf>,

    /// SQLite database remembering hours already processed
    #[arg(long)]
    pub cache: Option<PathBuf>,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 600)]
    pub http_timeout_secs: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
