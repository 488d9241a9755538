//! Equality and condition joins over record streams
//!
//! # Strategies
//!
//! - Hash: O(n+m); chosen when the predicate exposes a `KeyExtractor`
//! - Nested-loop: O(n·m); any predicate
//!
//! Both produce the same records in the same order. The right side is fully
//! materialized; right and full joins also keep a matched flag per right
//! record until the left side is exhausted.

mod join;
mod predicate;

pub use join::{full_join, inner_join, left_join, right_join, Join, JoinKind, JoinStrategy};
pub use predicate::{
    on_condition, on_fields, ConditionPredicate, FieldsPredicate, JoinKey, JoinPredicate,
    KeyExtractor,
};
