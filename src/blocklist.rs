use std::collections::{HashMap, HashSet};
use std::time::Instant;

use tracing::info;

use crate::error::PipelineError;

/// Read-only set of `(domain, title)` pairs excluded from aggregation.
///
/// Built once before any worker starts and only ever borrowed afterwards.
#[derive(Debug, Default, Clone)]
pub struct BlockFilter {
    titles_by_domain: HashMap<String, HashSet<String>>,
}

impl BlockFilter {
    /// Parses newline separated `"<domain> <title>"` entries.
    ///
    /// Empty lines are ignored. Any other line must split on a single space into
    /// exactly two tokens.
    pub fn parse(content: &str) -> Result<Self, PipelineError> {
        let start_time = Instant::now();
        let mut titles_by_domain: HashMap<String, HashSet<String>> = HashMap::new();

        for (line_num, line) in content.lines().enumerate() {
            if line.is_empty() {
                continue;
            }

            let mut tokens = line.split(' ');
            let (domain, title) = match (tokens.next(), tokens.next(), tokens.next()) {
                (Some(domain), Some(title), None) => (domain, title),
                _ => {
                    return Err(PipelineError::MalformedBlockEntry {
                        line: line_num + 1,
                        content: line.to_string(),
                    })
                }
            };

            titles_by_domain
                .entry(domain.to_string())
                .or_default()
                .insert(title.to_string());
        }

        let filter = Self { titles_by_domain };
        info!(
            action = "complete",
            component = "blocklist",
            domains = filter.domain_count(),
            entries = filter.len(),
            duration_ms = start_time.elapsed().as_millis(),
            "Block filter built"
        );
        Ok(filter)
    }

    pub fn is_blocked(&self, domain: &str, title: &str) -> bool {
        self.titles_by_domain
            .get(domain)
            .is_some_and(|titles| titles.contains(title))
    }

    pub fn len(&self) -> usize {
        self.titles_by_domain.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.titles_by_domain.is_empty()
    }

    pub fn domain_count(&self) -> usize {
        self.titles_by_domain.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_listed_pairs_only() {
        let filter = BlockFilter::parse("en Dog\nen Main_Page\n\nde Hund\n").unwrap();

        assert!(filter.is_blocked("en", "Dog"));
        assert!(filter.is_blocked("de", "Hund"));
        assert!(!filter.is_blocked("en", "Hund"));
        assert!(!filter.is_blocked("fr", "Dog"));
        assert_eq!(filter.len(), 3);
        assert_eq!(filter.domain_count(), 2);
    }

    #[test]
    fn duplicate_entries_collapse() {
        let filter = BlockFilter::parse("en Dog\nen Dog\n").unwrap();
        assert_eq!(filter.len(), 1);
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let filter = BlockFilter::parse("en Dog\r\nen Cat\r\n").unwrap();
        assert!(filter.is_blocked("en", "Cat"));
    }

    #[test]
    fn rejects_wrong_token_count() {
        for content in ["en\n", "en Dog extra\n", "en Dog\nen  Cat\n"] {
            match BlockFilter::parse(content) {
                Err(PipelineError::MalformedBlockEntry { .. }) => {}
                other => panic!("expected malformed entry for {content:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn reports_offending_line_number() {
        let err = BlockFilter::parse("en Dog\n\nbroken\n").unwrap_err();
        match err {
            PipelineError::MalformedBlockEntry { line, content } => {
                assert_eq!(line, 3);
                assert_eq!(content, "broken");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn empty_input_yields_empty_filter() {
        let filter = BlockFilter::parse("").unwrap();
        assert!(filter.is_empty());
        assert!(!filter.is_blocked("en", "Dog"));
    }
}
