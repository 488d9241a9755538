//! Grouping of record streams
//!
//! `GroupBy` buckets by an arbitrary key function; `GroupByFields` by
//! equality of named fields. Every group is materialized in memory and its
//! members are exposed as a replayable `RecordSeq` in the sequence field,
//! ready for `Aggregate`.

mod buckets;
mod group_by;

pub use group_by::{GroupBy, GroupByFields};
