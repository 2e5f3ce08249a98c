use std::io::BufRead;
use std::time::Instant;

use tracing::debug;

use crate::aggregate::HourlyTopK;
use crate::blocklist::BlockFilter;
use crate::error::BucketError;
use crate::record::{MalformedLinePolicy, Records};

#[derive(Debug, Clone, Copy)]
pub struct BucketOptions {
    pub top_k: usize,
    pub malformed_lines: MalformedLinePolicy,
}

impl Default for BucketOptions {
    fn default() -> Self {
        Self {
            top_k: crate::topk::CAPACITY,
            malformed_lines: MalformedLinePolicy::default(),
        }
    }
}

/// Aggregates one hour's decompressed dump stream, line by line.
///
/// Blocked pairs never reach the aggregator. The returned value owns all
/// per-hour state.
pub fn process_bucket<R: BufRead>(
    reader: R,
    filter: &BlockFilter,
    options: &BucketOptions,
) -> Result<HourlyTopK, BucketError> {
    let start_time = Instant::now();
    let mut hour = HourlyTopK::new(options.top_k);
    let mut records = Records::new(reader, options.malformed_lines);

    for record in records.by_ref() {
        let record = record?;
        hour.stats.records += 1;

        if filter.is_blocked(&record.domain, &record.title) {
            hour.stats.blocked += 1;
            continue;
        }

        hour.offer(&record);
    }

    hour.stats.lines = records.lines_read();
    hour.stats.malformed = records.malformed();

    debug!(
        action = "complete",
        component = "bucket_processor",
        lines = hour.stats.lines,
        domains = hour.domain_count(),
        duration_ms = start_time.elapsed().as_millis(),
        "Dump stream aggregated"
    );
    Ok(hour)
}
