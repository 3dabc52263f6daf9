//! Interaction aggregation and statistics.
//!
//! Everything here is a pure function of the interaction slice it is
//! given; nothing reads or mutates the store directly.

use crate::models::{AnalyticsSnapshot, Interaction, TestCount};
use std::collections::HashMap;

/// Name tallied for explanations that omit `test_name`.
pub const UNKNOWN_TEST: &str = "Unknown Test";

/// Default number of entries in [`AnalyticsSnapshot::common_tests`].
pub const COMMON_TESTS_LIMIT: usize = 5;

/// Compute the analytics snapshot for `interactions`.
#[allow(dead_code)]
pub fn snapshot(interactions: &[Interaction]) -> AnalyticsSnapshot {
    snapshot_with_limit(interactions, COMMON_TESTS_LIMIT)
}

/// Like [`snapshot`], keeping at most `limit` common tests.
pub fn snapshot_with_limit(interactions: &[Interaction], limit: usize) -> AnalyticsSnapshot {
    AnalyticsSnapshot {
        total_reports: interactions.len(),
        common_tests: common_tests(interactions, limit),
        avg_processing_time: average_processing_time(interactions),
    }
}

/// Count test names across all explanations, most frequent first.
///
/// Ties keep the order in which the names were first seen.
pub fn common_tests(interactions: &[Interaction], limit: usize) -> Vec<TestCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut tally: Vec<TestCount> = Vec::new();

    let names = interactions
        .iter()
        .flat_map(|i| &i.result.explanations)
        .map(|e| match e.test_name.trim() {
            "" => UNKNOWN_TEST,
            name => name,
        });

    for name in names {
        match index.get(name) {
            Some(&slot) => tally[slot].count += 1,
            None => {
                index.insert(name, tally.len());
                tally.push(TestCount {
                    test: name.to_string(),
                    count: 1,
                });
            }
        }
    }

    // sort_by_key is stable, so first-seen order survives among equal counts
    tally.sort_by_key(|t| std::cmp::Reverse(t.count));
    tally.truncate(limit);
    tally
}

/// Mean processing time in milliseconds, rounded half-up; 0 when empty.
pub fn average_processing_time(interactions: &[Interaction]) -> u64 {
    if interactions.is_empty() {
        return 0;
    }

    let total: u128 = interactions
        .iter()
        .map(|i| u128::from(i.processing_time_ms))
        .sum();
    let count = interactions.len() as u128;

    ((2 * total + count) / (2 * count)) as u64
}
