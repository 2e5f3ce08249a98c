use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a run before any bucket is dispatched.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot parse date '{input}': {source}")]
    InvalidDate {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("invalid hour range: {0}")]
    InvalidRange(String),

    #[error("failed to fetch blocklist: {0}")]
    Blocklist(#[source] SourceError),

    #[error("malformed blocklist entry at line {line}: {content:?}")]
    MalformedBlockEntry { line: usize, content: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("report cache error: {0}")]
    Cache(#[from] rusqlite::Error),

    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised by dump and blocklist sources.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("unexpected status {status} from {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Errors confined to a single hour. The bucket produces no report, the run continues.
#[derive(Debug, Error)]
pub enum BucketError {
    #[error("dump source: {0}")]
    Source(#[from] SourceError),

    #[error("failed to read dump stream: {0}")]
    Read(#[source] io::Error),

    #[error("malformed dump line {line}: {content:?}")]
    MalformedLine { line: u64, content: String },

    #[error("failed to write report {path:?}: {source}")]
    Sink {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
