//! Join Invariant Tests
//!
//! Tests for join guarantees:
//! - Hash and nested-loop strategies produce identical output and order
//! - Output cardinality per join kind
//! - Right side wins on merged field collisions
//! - Unmatched records appear unmodified
//! - Empty inputs produce empty output

use std::sync::Arc;

use recordql::config::EngineConfig;
use recordql::join::{on_condition, on_fields, Join, JoinKind, JoinStrategy};
use recordql::observability::MetricsRegistry;
use recordql::pipeline::RecordFilter;
use recordql::record::{record_from_json, Record, RecordSeq};
use serde_json::json;

const ALL_KINDS: [JoinKind; 4] = [JoinKind::Inner, JoinKind::Left, JoinKind::Right, JoinKind::Full];

// =============================================================================
// Helper Functions
// =============================================================================

fn records(values: Vec<serde_json::Value>) -> Vec<Record> {
    values.iter().filter_map(record_from_json).collect()
}

fn customers() -> Vec<Record> {
    records(vec![
        json!({"id": 1, "name": "Ada"}),
        json!({"id": 2, "name": "Bo"}),
        json!({"id": 3, "name": "Cy"}),
        json!({"name": "NoId"}),
        json!({"id": "1", "name": "StringId"}),
        json!({"id": null, "name": "NullId"}),
    ])
}

fn orders() -> Vec<Record> {
    records(vec![
        json!({"id": 1, "order": "o1"}),
        json!({"id": 3, "order": "o2"}),
        json!({"id": 1, "order": "o3"}),
        json!({"id": 9, "order": "o4"}),
        json!({"order": "o5"}),
        json!({"id": null, "order": "o6"}),
        json!({"id": 1.0, "order": "o7"}),
    ])
}

fn nested_loop_config() -> EngineConfig {
    EngineConfig {
        hash_join_enabled: false,
        ..EngineConfig::default()
    }
}

fn run(join: &Join, left: Vec<Record>) -> Vec<Record> {
    join.apply(Box::new(left.into_iter())).collect()
}

fn count_pairs(left: &[Record], right: &[Record], field: &str) -> usize {
    left.iter()
        .flat_map(|l| right.iter().map(move |r| (l, r)))
        .filter(|(l, r)| {
            matches!((l.get_value(field), r.get_value(field)), (Some(a), Some(b)) if a == b)
        })
        .count()
}

// =============================================================================
// Strategy Equivalence Tests
// =============================================================================

/// Hash and nested-loop give the same records in the same order for every kind.
#[test]
fn test_strategies_equivalent_for_all_kinds() {
    for kind in ALL_KINDS {
        let right = RecordSeq::from_vec(orders());

        let hash = Join::new(right.clone(), on_fields(["id"]), kind);
        let nested = Join::new(right, on_fields(["id"]), kind).with_config(&nested_loop_config());
        assert_eq!(hash.strategy(), JoinStrategy::Hash);
        assert_eq!(nested.strategy(), JoinStrategy::NestedLoop);

        assert_eq!(
            run(&hash, customers()),
            run(&nested, customers()),
            "strategies diverged for {} join",
            kind
        );
    }
}

/// A condition equivalent to field equality gives the same output as on_fields.
#[test]
fn test_condition_predicate_matches_field_predicate() {
    let right = RecordSeq::from_vec(orders());
    let by_condition = Join::new(
        right.clone(),
        on_condition(|l: &Record, r: &Record| match (l.get_value("id"), r.get_value("id")) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }),
        JoinKind::Full,
    );
    let by_fields = Join::new(right, on_fields(["id"]), JoinKind::Full);

    assert_eq!(run(&by_condition, customers()), run(&by_fields, customers()));
}

/// Multi-field keys behave the same on both strategies.
#[test]
fn test_composite_key_equivalence() {
    let left = records(vec![
        json!({"a": 1, "b": "x", "l": 1}),
        json!({"a": 1, "b": "y", "l": 2}),
        json!({"a": 2, "b": "x", "l": 3}),
    ]);
    let right = RecordSeq::from_vec(records(vec![
        json!({"a": 1, "b": "x", "r": 1}),
        json!({"a": 2, "b": "x", "r": 2}),
        json!({"a": 2, "b": "y", "r": 3}),
    ]));

    let hash = Join::new(right.clone(), on_fields(["a", "b"]), JoinKind::Full);
    let nested =
        Join::new(right, on_fields(["a", "b"]), JoinKind::Full).with_config(&nested_loop_config());

    let out = run(&hash, left.clone());
    assert_eq!(out, run(&nested, left));
    // 2 matched pairs, 1 unmatched left, 1 unmatched right
    assert_eq!(out.len(), 4);
}

// =============================================================================
// Cardinality Tests
// =============================================================================

/// Inner join emits exactly one record per matching pair.
#[test]
fn test_inner_cardinality() {
    let join = Join::new(RecordSeq::from_vec(orders()), on_fields(["id"]), JoinKind::Inner);
    let out = run(&join, customers());

    // id 1 x2, id 3 x1, null x1
    assert_eq!(out.len(), count_pairs(&customers(), &orders(), "id"));
    assert_eq!(out.len(), 4);
}

/// Left join never loses a left record.
#[test]
fn test_left_cardinality() {
    let join = Join::new(RecordSeq::from_vec(orders()), on_fields(["id"]), JoinKind::Left);
    let out = run(&join, customers());

    assert!(out.len() >= customers().len());
    // 4 matched pairs + 3 unmatched left (Bo, NoId, StringId)
    assert_eq!(out.len(), 7);
}

/// Full join = matched pairs + unmatched left + unmatched right.
#[test]
fn test_full_cardinality() {
    let join = Join::new(RecordSeq::from_vec(orders()), on_fields(["id"]), JoinKind::Full);
    let out = run(&join, customers());

    let matched = 4;
    let unmatched_left = 3; // Bo, NoId, StringId
    let unmatched_right = 3; // o4, o5, o7
    assert_eq!(out.len(), matched + unmatched_left + unmatched_right);
}

// =============================================================================
// Merge and Shape Tests
// =============================================================================

/// On a field-name collision the right value wins.
#[test]
fn test_merge_precedence() {
    let right = RecordSeq::from_vec(records(vec![json!({"id": 1, "x": "R"})]));
    let join = Join::new(right, on_fields(["id"]), JoinKind::Inner);

    let out = run(&join, records(vec![json!({"id": 1, "x": "L"})]));
    assert_eq!(out, records(vec![json!({"id": 1, "x": "R"})]));
}

/// Unmatched left records in a left join are emitted unmodified, in place.
#[test]
fn test_left_unmatched_unmodified() {
    let right = RecordSeq::from_vec(records(vec![json!({"id": 2, "dept": "Eng"})]));
    let join = Join::new(right, on_fields(["id"]), JoinKind::Left);

    let left = records(vec![json!({"id": 1, "name": "a"}), json!({"id": 2, "name": "b"})]);
    let out = run(&join, left.clone());

    assert_eq!(out[0], left[0]);
    assert_eq!(out[1].get::<String>("dept"), Some("Eng".to_string()));
}

/// Right join emits matched pairs first, then unmatched right records unmodified.
#[test]
fn test_right_unmatched_trail() {
    let right_records = records(vec![json!({"id": 1, "r": "a"}), json!({"id": 2, "r": "b"})]);
    let join = Join::new(
        RecordSeq::from_vec(right_records.clone()),
        on_fields(["id"]),
        JoinKind::Right,
    );

    let out = run(&join, records(vec![json!({"id": 2, "l": "x"}), json!({"id": 5})]));
    assert_eq!(out.len(), 2);
    assert!(out[0].has("l") && out[0].has("r"));
    assert_eq!(out[1], right_records[0]);
}

// =============================================================================
// Empty Input and Replay Tests
// =============================================================================

/// Empty sides never fault.
#[test]
fn test_empty_inputs() {
    for kind in ALL_KINDS {
        let join = Join::new(RecordSeq::empty(), on_fields(["id"]), kind);
        assert!(run(&join, Vec::new()).is_empty());

        let with_left = run(&join, customers());
        match kind {
            JoinKind::Inner | JoinKind::Right => assert!(with_left.is_empty()),
            JoinKind::Left | JoinKind::Full => assert_eq!(with_left, customers()),
        }

        let with_right = Join::new(RecordSeq::from_vec(orders()), on_fields(["id"]), kind);
        let out = run(&with_right, Vec::new());
        match kind {
            JoinKind::Inner | JoinKind::Left => assert!(out.is_empty()),
            JoinKind::Right | JoinKind::Full => assert_eq!(out, orders()),
        }
    }
}

/// A join over a replayable right side can run repeatedly with the same result.
#[test]
fn test_join_is_reusable() {
    let metrics = Arc::new(MetricsRegistry::new());
    let join = Join::new(RecordSeq::from_vec(orders()), on_fields(["id"]), JoinKind::Left)
        .with_metrics(Arc::clone(&metrics));

    let first = run(&join, customers());
    let second = run(&join, customers());
    assert_eq!(first, second);

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.joins_hash, 2);
    assert_eq!(snapshot.join_records_emitted, 2 * first.len() as u64);
}
