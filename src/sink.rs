use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::error::BucketError;

/// Persists one hour's finished report as a single unit.
pub trait ReportSink: Send + Sync {
    /// Returns where the report ended up.
    fn write(&self, hour_key: &str, report: &[u8]) -> Result<PathBuf, BucketError>;
}

/// One flat file per hour at `<root>/<hour_key>`.
pub struct FsReportSink {
    root: PathBuf,
}

impl FsReportSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn report_path(&self, hour_key: &str) -> PathBuf {
        self.root.join(hour_key)
    }
}

impl ReportSink for FsReportSink {
    fn write(&self, hour_key: &str, report: &[u8]) -> Result<PathBuf, BucketError> {
        let path = self.report_path(hour_key);
        let sink_error = |source| BucketError::Sink {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.root).map_err(sink_error)?;
        if path.exists() {
            warn!(action = "overwrite", component = "report_sink", path = ?path, "Report already exists, replacing it");
        }
        fs::write(&path, report).map_err(sink_error)?;

        info!(action = "complete", component = "report_sink", path = ?path, bytes = report.len(), "Report written");
        Ok(path)
    }
}
