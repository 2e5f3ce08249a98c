//! Run configuration for the hourly pipeline.

use std::path::PathBuf;

use crate::bucket::BucketOptions;
use crate::error::PipelineError;
use crate::record::MalformedLinePolicy;
use crate::topk::CAPACITY;

pub const DEFAULT_WORKERS: usize = 3;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Fixed number of bucket workers
    pub workers: usize,

    /// Pending hours buffered between the dispatcher and the workers.
    /// Defaults to the worker count.
    pub queue_capacity: Option<usize>,

    /// Titles retained per domain per hour
    pub top_k: usize,

    pub malformed_lines: MalformedLinePolicy,

    /// Parent directory for the run's scratch space; the system temp dir if unset
    pub scratch_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_capacity: None,
            top_k: CAPACITY,
            malformed_lines: MalformedLinePolicy::Skip,
            scratch_dir: None,
        }
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity.unwrap_or(self.workers)
    }

    pub fn bucket_options(&self) -> BucketOptions {
        BucketOptions {
            top_k: self.top_k,
            malformed_lines: self.malformed_lines,
        }
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.workers == 0 {
            return Err(PipelineError::Config("workers must be greater than 0".into()));
        }
        if self.top_k == 0 {
            return Err(PipelineError::Config("top_k must be greater than 0".into()));
        }
        if self.queue_capacity == Some(0) {
            return Err(PipelineError::Config(
                "queue_capacity must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = Some(capacity);
        self
    }

    pub fn top_k(mut self, top_k: usize) -> Self {
        self.config.top_k = top_k;
        self
    }

    pub fn malformed_lines(mut self, policy: MalformedLinePolicy) -> Self {
        self.config.malformed_lines = policy;
        self
    }

    pub fn scratch_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.scratch_dir = Some(path.into());
        self
    }

    pub fn build(self) -> PipelineConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behaviour() {
        let config = PipelineConfig::default();
        assert_eq!(config.workers, 3);
        assert_eq!(config.top_k, 25);
        assert_eq!(config.queue_capacity(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_overrides() {
        let config = PipelineConfig::builder()
            .workers(8)
            .queue_capacity(2)
            .top_k(10)
            .malformed_lines(MalformedLinePolicy::Abort)
            .build();
        assert_eq!(config.queue_capacity(), 2);
        assert_eq!(config.bucket_options().top_k, 10);
        assert_eq!(config.bucket_options().malformed_lines, MalformedLinePolicy::Abort);
    }

    #[test]
    fn rejects_zero_values() {
        for config in [
            PipelineConfig::builder().workers(0).build(),
            PipelineConfig::builder().top_k(0).build(),
            PipelineConfig::builder().queue_capacity(0).build(),
        ] {
            assert!(matches!(config.validate(), Err(PipelineError::Config(_))));
        }
    }
}
