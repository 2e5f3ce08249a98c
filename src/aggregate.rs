use std::collections::HashMap;

use crate::record::PageViewRecord;
use crate::stats::BucketStats;
use crate::topk::{Admission, BoundedTopK};

/// Per-domain top-K sets for one hour. Never shared across hours.
#[derive(Debug)]
pub struct HourlyTopK {
    capacity: usize,
    domains: HashMap<String, BoundedTopK>,
    pub(crate) stats: BucketStats,
}

impl HourlyTopK {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            domains: HashMap::new(),
            stats: BucketStats::default(),
        }
    }

    pub fn offer(&mut self, record: &PageViewRecord) -> Admission {
        if let Some(top) = self.domains.get_mut(&record.domain) {
            return top.offer(&record.title, record.views);
        }

        let mut top = BoundedTopK::new(self.capacity);
        let admission = top.offer(&record.title, record.views);
        if !top.is_empty() {
            self.domains.insert(record.domain.clone(), top);
        }
        admission
    }

    pub fn get(&self, domain: &str) -> Option<&BoundedTopK> {
        self.domains.get(domain)
    }

    pub fn domain_count(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn stats(&self) -> BucketStats {
        BucketStats {
            domains: self.domains.len(),
            ..self.stats
        }
    }

    /// Consumes the hour, yielding domains in lexicographic order.
    pub fn into_sorted_domains(self) -> Vec<(String, BoundedTopK)> {
        let mut domains: Vec<(String, BoundedTopK)> = self.domains.into_iter().collect();
        domains.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        domains
    }
}
