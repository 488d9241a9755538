//! Metrics registry for recordql
//!
//! - Counters only
//! - Monotonic increase
//! - Relaxed atomics: operators run single-threaded, but a registry may be
//!   shared by pipelines on different threads

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters shared by the operators of one or more pipelines
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Joins executed with the nested-loop strategy
    joins_nested_loop: AtomicU64,
    /// Joins executed with the hash strategy
    joins_hash: AtomicU64,
    /// Records emitted by joins (merged and unmatched)
    join_records_emitted: AtomicU64,
    /// Hash bucket candidates rejected by predicate re-verification
    join_candidates_rejected: AtomicU64,
    /// Group records emitted
    groups_emitted: AtomicU64,
    /// Records excluded from grouping (non-scalar key)
    group_records_dropped: AtomicU64,
    /// Records that received aggregate fields
    records_aggregated: AtomicU64,
    /// Records passed through without a usable sequence field
    aggregate_passthrough: AtomicU64,
    /// Malformed JSON Lines input skipped
    jsonl_lines_skipped: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    // Join metrics

    pub fn increment_joins_nested_loop(&self) {
        self.joins_nested_loop.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_joins_hash(&self) {
        self.joins_hash.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_join_records_emitted(&self, count: u64) {
        self.join_records_emitted.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_join_candidates_rejected(&self, count: u64) {
        self.join_candidates_rejected.fetch_add(count, Ordering::Relaxed);
    }

    // Group metrics

    pub fn add_groups_emitted(&self, count: u64) {
        self.groups_emitted.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_group_records_dropped(&self) {
        self.group_records_dropped.fetch_add(1, Ordering::Relaxed);
    }

    // Aggregate metrics

    pub fn increment_records_aggregated(&self) {
        self.records_aggregated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_aggregate_passthrough(&self) {
        self.aggregate_passthrough.fetch_add(1, Ordering::Relaxed);
    }

    // Input metrics

    pub fn increment_jsonl_lines_skipped(&self) {
        self.jsonl_lines_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            joins_nested_loop: self.joins_nested_loop.load(Ordering::Relaxed),
            joins_hash: self.joins_hash.load(Ordering::Relaxed),
            join_records_emitted: self.join_records_emitted.load(Ordering::Relaxed),
            join_candidates_rejected: self.join_candidates_rejected.load(Ordering::Relaxed),
            groups_emitted: self.groups_emitted.load(Ordering::Relaxed),
            group_records_dropped: self.group_records_dropped.load(Ordering::Relaxed),
            records_aggregated: self.records_aggregated.load(Ordering::Relaxed),
            aggregate_passthrough: self.aggregate_passthrough.load(Ordering::Relaxed),
            jsonl_lines_skipped: self.jsonl_lines_skipped.load(Ordering::Relaxed),
        }
    }

    /// Current snapshot rendered as a JSON object
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub joins_nested_loop: u64,
    pub joins_hash: u64,
    pub join_records_emitted: u64,
    pub join_candidates_rejected: u64,
    pub groups_emitted: u64,
    pub group_records_dropped: u64,
    pub records_aggregated: u64,
    pub aggregate_passthrough: u64,
    pub jsonl_lines_skipped: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        let registry = MetricsRegistry::new();
        assert_eq!(registry.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_increment_counters() {
        let registry = MetricsRegistry::new();

        registry.increment_joins_hash();
        registry.increment_joins_hash();
        registry.increment_joins_nested_loop();
        registry.add_join_records_emitted(5);
        registry.add_groups_emitted(2);
        registry.increment_group_records_dropped();
        registry.increment_records_aggregated();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.joins_hash, 2);
        assert_eq!(snapshot.joins_nested_loop, 1);
        assert_eq!(snapshot.join_records_emitted, 5);
        assert_eq!(snapshot.groups_emitted, 2);
        assert_eq!(snapshot.group_records_dropped, 1);
        assert_eq!(snapshot.records_aggregated, 1);
    }

    #[test]
    fn test_to_json() {
        let registry = MetricsRegistry::new();
        registry.add_join_records_emitted(1234);

        let parsed: serde_json::Value = serde_json::from_str(&registry.to_json()).unwrap();
        assert_eq!(parsed["join_records_emitted"], 1234);
        assert_eq!(parsed["joins_hash"], 0);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let reg = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    reg.increment_joins_hash();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.snapshot().joins_hash, 1000);
    }
}
