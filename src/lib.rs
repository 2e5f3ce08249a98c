pub mod aggregate;
pub mod app;
pub mod args;
pub mod blocklist;
pub mod bucket;
pub mod cache;
pub mod config;
pub mod error;
pub mod hours;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod sink;
pub mod source;
pub mod stats;
pub mod topk;
pub mod utils;

pub use aggregate::HourlyTopK;
pub use app::process_hours;
pub use args::Args;
pub use blocklist::BlockFilter;
pub use bucket::{process_bucket, BucketOptions};
pub use config::PipelineConfig;
pub use error::{BucketError, PipelineError, SourceError};
pub use hours::{HourRange, TimeBucket};
pub use pipeline::Pipeline;
pub use stats::{BucketStats, RunSummary};
pub use topk::{BoundedTopK, TopKEntry, CAPACITY};
