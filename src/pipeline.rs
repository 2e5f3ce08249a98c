use std::fmt;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crossbeam::channel::{self, Receiver, Sender};
use tracing::{error, info, warn};

use crate::blocklist::BlockFilter;
use crate::bucket::{process_bucket, BucketOptions};
use crate::cache::ReportCache;
use crate::config::PipelineConfig;
use crate::error::{BucketError, PipelineError};
use crate::hours::{HourRange, TimeBucket};
use crate::report;
use crate::sink::ReportSink;
use crate::source::{BlocklistSource, DumpSource};
use crate::stats::{BucketStats, RunSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Dispatching,
    Draining,
    Done,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Dispatching => "dispatching",
            RunState::Draining => "draining",
            RunState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Drives every hour of a range through fetch, aggregate, render and write.
pub struct Pipeline {
    config: PipelineConfig,
    dumps: Box<dyn DumpSource>,
    blocklist: Box<dyn BlocklistSource>,
    sink: Box<dyn ReportSink>,
    cache: Option<ReportCache>,
}

/// What one worker did with one hour.
#[derive(Debug)]
struct BucketOutcome {
    key: String,
    result: Result<(PathBuf, BucketStats), BucketError>,
}

/// Everything a worker borrows. All of it is read-only for the run.
#[derive(Clone, Copy)]
struct WorkerContext<'a> {
    dumps: &'a dyn DumpSource,
    sink: &'a dyn ReportSink,
    filter: &'a BlockFilter,
    scratch: &'a Path,
    options: BucketOptions,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        dumps: Box<dyn DumpSource>,
        blocklist: Box<dyn BlocklistSource>,
        sink: Box<dyn ReportSink>,
    ) -> Self {
        Self {
            config,
            dumps,
            blocklist,
            sink,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: ReportCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Runs the whole range. Only shared setup can fail the run; a failing hour
    /// is logged, listed in the summary and has no report.
    pub fn run(&self, range: &HourRange) -> Result<RunSummary, PipelineError> {
        let start_time = Instant::now();
        log_state(RunState::Idle);
        self.config.validate()?;

        let filter = BlockFilter::parse(&self.blocklist.fetch_all().map_err(PipelineError::Blocklist)?)?;

        let mut summary = RunSummary {
            requested: range.len(),
            ..RunSummary::default()
        };
        let pending = self.partition_cached(range, &mut summary)?;

        let scratch = match &self.config.scratch_dir {
            Some(parent) => tempfile::Builder::new()
                .prefix("pageviews-")
                .tempdir_in(parent)?,
            None => tempfile::Builder::new().prefix("pageviews-").tempdir()?,
        };

        let workers = self.config.workers;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("bucket-worker-{i}"))
            .build()?;

        let (queue_tx, queue_rx) = channel::bounded::<TimeBucket>(self.config.queue_capacity());
        let (outcome_tx, outcome_rx) = channel::unbounded::<BucketOutcome>();
        let ctx = WorkerContext {
            dumps: self.dumps.as_ref(),
            sink: self.sink.as_ref(),
            filter: &filter,
            scratch: scratch.path(),
            options: self.config.bucket_options(),
        };

        info!(
            action = "configure",
            component = "pipeline",
            worker_count = workers,
            queue_capacity = self.config.queue_capacity(),
            pending = pending.len(),
            "Starting workers"
        );

        // Returns only once every spawned worker has exited
        pool.in_place_scope(|scope| {
            for id in 0..workers {
                let queue = queue_rx.clone();
                let outcomes = outcome_tx.clone();
                scope.spawn(move |_| run_worker(id, queue, outcomes, ctx));
            }
            drop(queue_rx);
            drop(outcome_tx);

            log_state(RunState::Dispatching);
            for bucket in pending {
                if queue_tx.send(bucket).is_err() {
                    warn!(action = "dispatch", component = "pipeline", hour = %bucket, "All workers exited early");
                    break;
                }
            }
            drop(queue_tx);
            log_state(RunState::Draining);
        });

        for outcome in outcome_rx.iter() {
            match outcome.result {
                Ok((path, _)) => {
                    self.remember(&outcome.key, &path);
                    summary.written.push((outcome.key, path));
                }
                Err(e) => summary.failed.push((outcome.key, e.to_string())),
            }
        }
        summary.written.sort();
        summary.failed.sort();

        if let Err(e) = scratch.close() {
            warn!(action = "cleanup", component = "pipeline", error = %e, "Failed to remove scratch directory");
        }

        summary.elapsed = start_time.elapsed();
        log_state(RunState::Done);
        info!(
            action = "complete",
            component = "pipeline",
            requested = summary.requested,
            cached = summary.cached.len(),
            written = summary.written.len(),
            failed = summary.failed.len(),
            duration_ms = summary.elapsed.as_millis(),
            "Run completed"
        );
        Ok(summary)
    }

    fn partition_cached(
        &self,
        range: &HourRange,
        summary: &mut RunSummary,
    ) -> Result<Vec<TimeBucket>, PipelineError> {
        let Some(cache) = &self.cache else {
            return Ok(range.buckets().collect());
        };

        let mut pending = Vec::with_capacity(range.len());
        for bucket in range.buckets() {
            let key = bucket.key();
            match cache.get(&key)? {
                Some(path) if path.exists() => {
                    info!(action = "skip", component = "report_cache", hour = %bucket, path = ?path, "Report found in cache");
                    summary.cached.push(key);
                }
                _ => pending.push(bucket),
            }
        }
        Ok(pending)
    }

    fn remember(&self, key: &str, path: &Path) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.insert(key, path) {
                warn!(action = "insert", component = "report_cache", hour_key = key, error = %e, "Failed to record report in cache");
            }
        }
    }
}

fn log_state(state: RunState) {
    info!(action = "transition", component = "pipeline", state = %state, "Run state changed");
}

fn run_worker(
    id: usize,
    queue: Receiver<TimeBucket>,
    outcomes: Sender<BucketOutcome>,
    ctx: WorkerContext<'_>,
) {
    info!(action = "start", component = "worker", worker_id = id, "Worker started");

    while let Ok(bucket) = queue.recv() {
        let key = bucket.key();
        let result = process_hour(&bucket, &key, &ctx);

        if let Err(e) = &result {
            error!(action = "fail", component = "bucket", worker_id = id, hour = %bucket, error = %e, "Bucket failed, no report written");
        }

        if outcomes.send(BucketOutcome { key, result }).is_err() {
            break;
        }
    }

    info!(action = "stop", component = "worker", worker_id = id, "Worker drained");
}

fn process_hour(
    bucket: &TimeBucket,
    key: &str,
    ctx: &WorkerContext<'_>,
) -> Result<(PathBuf, BucketStats), BucketError> {
    let start_time = Instant::now();
    info!(action = "start", component = "bucket", hour = %bucket, "Processing hour");

    let stream = ctx.dumps.fetch(bucket, ctx.scratch)?;
    let hour = process_bucket(BufReader::new(stream), ctx.filter, &ctx.options)?;
    let stats = hour.stats();
    let path = ctx.sink.write(key, report::render(hour).as_bytes())?;

    info!(
        action = "complete",
        component = "bucket",
        hour = %bucket,
        lines = stats.lines,
        records = stats.records,
        blocked = stats.blocked,
        malformed = stats.malformed,
        domains = stats.domains,
        duration_ms = start_time.elapsed().as_millis(),
        "Hour processed"
    );
    Ok((path, stats))
}
