use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BucketStats {
    pub lines: u64,
    pub records: u64,
    pub blocked: u64,
    pub malformed: u64,
    pub domains: usize,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub requested: usize,
    pub cached: Vec<String>,
    pub written: Vec<(String, PathBuf)>,
    pub failed: Vec<(String, String)>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
