//! Bucket Processor Tests
//!
//! Tests verify:
//! - Block filter exclusion regardless of input order
//! - Descending per-domain output with the trailing-space line format
//! - Per-domain capacity holds for large streams
//! - Titles that are not valid UTF-8 are skipped, never rewritten

use std::io::Cursor;

use pageviews::report::render;
use pageviews::{process_bucket, BlockFilter, BoundedTopK, BucketOptions};

fn run(input: &str, blocklist: &str, top_k: usize) -> String {
    let filter = BlockFilter::parse(blocklist).unwrap();
    let options = BucketOptions {
        top_k,
        ..BucketOptions::default()
    };
    render(process_bucket(Cursor::new(input), &filter, &options).unwrap())
}

#[test]
fn test_blocked_title_never_reported() {
    assert_eq!(run("en Cat 50\nen Dog 5\n", "en Dog\n", 25), "en Cat 50 \n");
}

#[test]
fn test_blocked_title_excluded_in_any_order() {
    let lines = ["en Dog 500 0", "en Cat 50 0", "en Emu 7 0", "de Dog 9 0"];
    let mut reports = Vec::new();

    for rotation in 0..lines.len() {
        let mut rotated = lines.to_vec();
        rotated.rotate_left(rotation);
        let input: String = rotated.iter().map(|l| format!("{l}\n")).collect();
        reports.push(run(&input, "en Dog\n", 2));
    }

    for report in &reports {
        assert_eq!(report, "de Dog 9 \nen Cat 50 \nen Emu 7 \n");
    }
}

#[test]
fn test_invalid_utf8_titles_are_not_merged_or_blocked() {
    let input: &[u8] = b"en Caf\xe9 10 0\nen Caf\xff 20 0\nen Cafe 30 0\n";
    let filter = BlockFilter::parse("en Caf\u{FFFD}\n").unwrap();
    let hour = process_bucket(Cursor::new(input), &filter, &BucketOptions::default()).unwrap();

    let stats = hour.stats();
    assert_eq!(stats.lines, 3);
    assert_eq!(stats.malformed, 2);
    assert_eq!(stats.blocked, 0);
    assert_eq!(render(hour), "en Cafe 30 \n");
}

#[test]
fn test_capacity_two_scenario() {
    let mut top = BoundedTopK::new(2);
    top.offer("A", 5);
    top.offer("B", 10);
    top.offer("C", 7);

    let kept: Vec<(String, u64)> = top
        .drain_ascending()
        .into_iter()
        .rev()
        .map(|e| (e.title, e.views))
        .collect();
    assert_eq!(kept, vec![("B".to_string(), 10), ("C".to_string(), 7)]);
}

#[test]
fn test_large_stream_keeps_25_per_domain() {
    let input: String = (0..10_000u64)
        .map(|i| format!("d{} t{} {} 0\n", i % 4, i, (i * 7_919) % 10_007))
        .collect();
    let report = run(&input, "", 25);

    for domain in ["d0", "d1", "d2", "d3"] {
        let views: Vec<u64> = report
            .lines()
            .filter(|l| l.starts_with(&format!("{domain} ")))
            .map(|l| l.split(' ').nth(2).unwrap().parse().unwrap())
            .collect();
        assert_eq!(views.len(), 25);
        assert!(views.windows(2).all(|w| w[0] >= w[1]));
    }
    assert!(report.lines().all(|l| l.ends_with(' ')));
}
