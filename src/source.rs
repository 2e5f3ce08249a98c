use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use flate2::read::MultiGzDecoder;
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use tracing::info;
use url::Url;

use crate::error::SourceError;
use crate::hours::TimeBucket;

pub const DEFAULT_DUMPS_URL: &str = "https://dumps.wikimedia.org/other/pageviews/";
pub const DEFAULT_BLOCKLIST_URL: &str =
    "https://s3.amazonaws.com/dd-interview-data/data_engineer/wikipedia/blacklist_domains_and_pages";

/// Decompressed, line-oriented dump body for one hour.
pub type DumpStream = Box<dyn Read + Send>;

/// Provides the raw traffic dump for an hour.
///
/// `scratch` is a directory private to the current run; anything placed there
/// must be released when the returned stream is dropped.
pub trait DumpSource: Send + Sync {
    fn fetch(&self, bucket: &TimeBucket, scratch: &Path) -> Result<DumpStream, SourceError>;
}

/// Provides the newline separated `"<domain> <title>"` block-list.
pub trait BlocklistSource {
    fn fetch_all(&self) -> Result<String, SourceError>;
}

pub fn http_client(timeout: Duration) -> Result<Client, SourceError> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

fn check_status(url: &Url, response: Response) -> Result<Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(status_error(url, status, response.text().unwrap_or_default()))
}

/// 404 means the resource does not exist yet; any other failure keeps its body.
fn status_error(url: &Url, status: StatusCode, body: String) -> SourceError {
    if status == StatusCode::NOT_FOUND {
        return SourceError::NotFound(url.to_string());
    }
    SourceError::Status {
        url: url.to_string(),
        status: status.as_u16(),
        body,
    }
}

/// `<base>/<YYYY>/<YYYY-MM>/pageviews-<YYYYMMDD-HH0000>.gz`
pub struct HttpDumpSource {
    client: Client,
    base_url: Url,
}

impl HttpDumpSource {
    pub fn new(client: Client, base_url: &str) -> Result<Self, SourceError> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { client, base_url })
    }

    pub fn dump_url(&self, bucket: &TimeBucket) -> Result<Url, SourceError> {
        let hour = bucket.hour();
        let relative = format!(
            "{}/{}/pageviews-{}.gz",
            hour.format("%Y"),
            hour.format("%Y-%m"),
            bucket.dump_stem()
        );
        Ok(self.base_url.join(&relative)?)
    }
}

impl DumpSource for HttpDumpSource {
    fn fetch(&self, bucket: &TimeBucket, scratch: &Path) -> Result<DumpStream, SourceError> {
        let start_time = Instant::now();
        let url = self.dump_url(bucket)?;
        info!(action = "start", component = "dump_download", hour = %bucket, url = %url, "Downloading dump");

        let mut response = check_status(&url, self.client.get(url.clone()).send()?)?;

        // Unlinked on creation, so the bytes go away with the handle on every path
        let mut spool = tempfile::tempfile_in(scratch)?;
        let bytes = response.copy_to(&mut spool)?;
        spool.rewind()?;

        info!(
            action = "complete",
            component = "dump_download",
            hour = %bucket,
            bytes,
            duration_ms = start_time.elapsed().as_millis(),
            "Dump downloaded"
        );
        Ok(Box::new(MultiGzDecoder::new(BufReader::new(spool))))
    }
}

/// Reads `pageviews-<YYYYMMDD-HH0000>.gz` files from a local directory.
pub struct LocalDumpSource {
    dir: PathBuf,
}

impl LocalDumpSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dump_path(&self, bucket: &TimeBucket) -> PathBuf {
        self.dir
            .join(format!("pageviews-{}.gz", bucket.dump_stem()))
    }
}

impl DumpSource for LocalDumpSource {
    fn fetch(&self, bucket: &TimeBucket, _scratch: &Path) -> Result<DumpStream, SourceError> {
        let path = self.dump_path(bucket);
        let file = File::open(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => SourceError::NotFound(path.display().to_string()),
            _ => SourceError::Io(e),
        })?;
        Ok(Box::new(MultiGzDecoder::new(BufReader::new(file))))
    }
}

pub struct HttpBlocklistSource {
    client: Client,
    url: Url,
}

impl HttpBlocklistSource {
    pub fn new(client: Client, url: &str) -> Result<Self, SourceError> {
        Ok(Self {
            client,
            url: Url::parse(url)?,
        })
    }
}

impl BlocklistSource for HttpBlocklistSource {
    fn fetch_all(&self) -> Result<String, SourceError> {
        info!(action = "start", component = "blocklist", url = %self.url, "Fetching blocklist");
        let response = check_status(&self.url, self.client.get(self.url.clone()).send()?)?;
        Ok(response.text()?)
    }
}

pub struct FileBlocklistSource {
    path: PathBuf,
}

impl FileBlocklistSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BlocklistSource for FileBlocklistSource {
    fn fetch_all(&self) -> Result<String, SourceError> {
        info!(action = "load", component = "blocklist", file_path = ?self.path, "Loading blocklist from file");
        fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => SourceError::NotFound(self.path.display().to_string()),
            _ => SourceError::Io(e),
        })
    }
}
