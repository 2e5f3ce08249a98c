use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Titles retained per domain per hour unless configured otherwise.
pub const CAPACITY: usize = 25;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopKEntry {
    pub title: String,
    pub views: u64,
}

impl TopKEntry {
    pub fn new(title: impl Into<String>, views: u64) -> Self {
        Self {
            title: title.into(),
            views,
        }
    }
}

/// Result of offering a candidate to a full or partially filled [`BoundedTopK`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Inserted,
    Replaced(TopKEntry),
    Rejected,
}

/// Fixed-capacity min-oriented structure holding the highest-view titles seen so far.
///
/// Once full, a candidate is admitted only with strictly more views than the
/// current minimum, which is then evicted. Ties with the minimum are rejected.
#[derive(Debug, Clone)]
pub struct BoundedTopK {
    capacity: usize,
    heap: BinaryHeap<Reverse<Ranked>>,
}

impl BoundedTopK {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn min_views(&self) -> Option<u64> {
        self.heap.peek().map(|entry| entry.0 .0.views)
    }

    pub fn offer(&mut self, title: &str, views: u64) -> Admission {
        if self.heap.len() < self.capacity {
            self.push(title, views);
            return Admission::Inserted;
        }

        match self.min_views() {
            Some(min) if views > min => {
                let evicted = self.heap.pop().map(|Reverse(Ranked(entry))| entry);
                self.push(title, views);
                evicted.map_or(Admission::Inserted, Admission::Replaced)
            }
            _ => Admission::Rejected,
        }
    }

    /// Removes the current minimum until empty, yielding non-decreasing view counts.
    pub fn drain_ascending(mut self) -> Vec<TopKEntry> {
        let mut entries = Vec::with_capacity(self.heap.len());
        while let Some(Reverse(Ranked(entry))) = self.heap.pop() {
            entries.push(entry);
        }
        entries
    }

    fn push(&mut self, title: &str, views: u64) {
        self.heap.push(Reverse(Ranked(TopKEntry::new(title, views))));
    }
}

/// Orders by views, then by title reversed so that among equal views the
/// lexicographically smaller title ranks higher and is evicted last.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Ranked(TopKEntry);

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .views
            .cmp(&other.0.views)
            .then_with(|| other.0.title.cmp(&self.0.title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(entries: &[TopKEntry]) -> Vec<(&str, u64)> {
        entries.iter().map(|e| (e.title.as_str(), e.views)).collect()
    }

    #[test]
    fn evicts_minimum_for_strictly_larger_candidate() {
        let mut top = BoundedTopK::new(2);
        assert_eq!(top.offer("A", 5), Admission::Inserted);
        assert_eq!(top.offer("B", 10), Admission::Inserted);
        assert_eq!(top.offer("C", 7), Admission::Replaced(TopKEntry::new("A", 5)));

        let drained = top.drain_ascending();
        assert_eq!(titles(&drained), vec![("C", 7), ("B", 10)]);
    }

    #[test]
    fn rejects_ties_with_current_minimum() {
        let mut top = BoundedTopK::new(2);
        top.offer("A", 5);
        top.offer("B", 10);

        assert_eq!(top.offer("C", 5), Admission::Rejected);
        assert_eq!(top.offer("D", 1), Admission::Rejected);
        assert_eq!(top.min_views(), Some(5));
        assert_eq!(titles(&top.drain_ascending()), vec![("A", 5), ("B", 10)]);
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut top = BoundedTopK::new(CAPACITY);
        for i in 0..500u64 {
            let views = (i * 7919) % 263;
            top.offer(&format!("t{i}"), views);
            assert!(top.len() <= CAPACITY);
        }
        assert_eq!(top.len(), CAPACITY);
    }

    #[test]
    fn retains_the_largest_values() {
        let mut top = BoundedTopK::new(5);
        let values = [3u64, 99, 1, 42, 7, 64, 5, 88, 13, 2, 71];
        for (i, views) in values.iter().enumerate() {
            top.offer(&format!("t{i}"), *views);
        }

        let drained: Vec<u64> = top.drain_ascending().iter().map(|e| e.views).collect();
        assert_eq!(drained, vec![42, 64, 71, 88, 99]);
    }

    #[test]
    fn held_minimum_never_decreases_once_full() {
        let mut top = BoundedTopK::new(3);
        let mut floor = None;
        for (i, views) in [9u64, 4, 6, 4, 8, 2, 10, 7, 7, 11].iter().enumerate() {
            top.offer(&format!("t{i}"), *views);
            if top.len() == top.capacity() {
                let min = top.min_views();
                assert!(floor <= min);
                floor = min;
            }
        }
    }

    #[test]
    fn drain_is_non_decreasing() {
        let mut top = BoundedTopK::new(10);
        for (i, views) in [5u64, 3, 9, 3, 1, 9, 0, 12].iter().enumerate() {
            top.offer(&format!("t{i}"), *views);
        }
        let drained = top.drain_ascending();
        assert!(drained.windows(2).all(|w| w[0].views <= w[1].views));
    }

    #[test]
    fn equal_views_drain_with_greater_title_first() {
        let mut top = BoundedTopK::new(3);
        top.offer("b", 4);
        top.offer("a", 4);
        top.offer("c", 4);

        assert_eq!(
            titles(&top.drain_ascending()),
            vec![("c", 4), ("b", 4), ("a", 4)]
        );
    }

    #[test]
    fn equal_view_minima_evict_greatest_title() {
        let mut top = BoundedTopK::new(2);
        top.offer("a", 1);
        top.offer("z", 1);
        assert_eq!(top.offer("m", 2), Admission::Replaced(TopKEntry::new("z", 1)));
    }

    #[test]
    fn zero_capacity_rejects_everything() {
        let mut top = BoundedTopK::new(0);
        assert_eq!(top.offer("a", 100), Admission::Rejected);
        assert!(top.is_empty());
    }
}
