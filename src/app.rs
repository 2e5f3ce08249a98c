use anyhow::{Context, Result};
use std::time::{Duration, Instant};
use tracing::info;

use crate::cache::ReportCache;
use crate::config::PipelineConfig;
use crate::hours::HourRange;
use crate::pipeline::Pipeline;
use crate::sink::FsReportSink;
use crate::source::{
    http_client, BlocklistSource, DumpSource, FileBlocklistSource, HttpBlocklistSource,
    HttpDumpSource, LocalDumpSource,
};
use crate::stats::RunSummary;
use crate::utils::format_number;
use crate::Args;

pub fn config_from_args(args: &Args) -> PipelineConfig {
    let mut builder = PipelineConfig::builder()
        .workers(args.workers)
        .top_k(args.top)
        .malformed_lines(args.malformed_lines);
    if let Some(capacity) = args.queue_capacity {
        builder = builder.queue_capacity(capacity);
    }
    if let Some(path) = &args.temp_path {
        builder = builder.scratch_dir(path);
    }
    builder.build()
}

pub fn process_hours(args: &Args) -> Result<RunSummary> {
    let total_start_time = Instant::now();
    info!(
        action = "start",
        component = "run",
        "Starting pageview processing"
    );

    let range = HourRange::parse(args.from.as_deref(), args.to.as_deref())
        .context("Invalid date range")?;
    info!(action = "configure", component = "run", from = %range.from(), to = %range.to(), hours = range.len(), "Hour range resolved");

    let client = http_client(Duration::from_secs(args.http_timeout_secs))
        .context("Failed to build HTTP client")?;

    let dumps: Box<dyn DumpSource> = match &args.dumps_dir {
        Some(dir) => Box::new(LocalDumpSource::new(dir)),
        None => Box::new(
            HttpDumpSource::new(client.clone(), &args.dumps_url)
                .context("Invalid dumps URL")?,
        ),
    };

    let blocklist: Box<dyn BlocklistSource> = if is_remote(&args.blocklist) {
        Box::new(HttpBlocklistSource::new(client, &args.blocklist).context("Invalid blocklist URL")?)
    } else {
        Box::new(FileBlocklistSource::new(&args.blocklist))
    };

    let sink = Box::new(FsReportSink::new(&args.reports_dir));
    let mut pipeline = Pipeline::new(config_from_args(args), dumps, blocklist, sink);

    if let Some(path) = &args.cache {
        let cache = ReportCache::open(path)
            .with_context(|| format!("Failed to open report cache {:?}", path))?;
        pipeline = pipeline.with_cache(cache);
    }

    let summary = pipeline.run(&range)?;

    info!(
        action = "complete",
        component = "run",
        duration_ms = total_start_time.elapsed().as_millis(),
        "Processing completed"
    );
    Ok(summary)
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

pub fn print_run_summary(summary: &RunSummary, args: &Args) {
    println!("\n--- Pageview Processing Summary ---");
    println!("Reports directory: {}", args.reports_dir.display());
    println!("Hours requested: {}", format_number(summary.requested));
    println!("Reports written: {}", format_number(summary.written.len()));

    if !summary.cached.is_empty() {
        println!("Served from cache: {}", format_number(summary.cached.len()));
    }

    println!(
        "Elapsed: {:.1}s",
        summary.elapsed.as_secs_f64()
    );

    if !summary.failed.is_empty() {
        println!("\nFailed hours ({}):", format_number(summary.failed.len()));
        for (key, reason) in &summary.failed {
            println!("- {}: {}", key, reason);
        }
    }
}
