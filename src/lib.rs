//! recordql - joins, grouping and aggregation over lazy record sequences
//!
//! Records are immutable bags of dynamically-typed fields. Operators are
//! `RecordFilter`s that wrap a pull-based `RecordStream`; nothing runs until
//! the output is pulled, and dropping the output stops all work.
//!
//! ```ignore
//! use recordql::prelude::*;
//!
//! let summary = pipe(
//!     GroupByFields::new("_group", ["dept"]),
//!     Aggregate::new("_group")
//!         .with("count", count())
//!         .with("total", sum("salary")),
//! );
//! let rows: Vec<Record> = summary.apply_seq(&employees).collect();
//! ```

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod errors;
pub mod group;
pub mod join;
pub mod observability;
pub mod pipeline;
pub mod record;

/// Commonly used types and builders
pub mod prelude {
    pub use crate::aggregate::{
        aggregate_fn, avg, collect, count, first, last, max, min, sum, Aggregate, AggregateFn,
    };
    pub use crate::group::{GroupBy, GroupByFields};
    pub use crate::join::{
        full_join, inner_join, left_join, on_condition, on_fields, right_join, Join, JoinKind,
        JoinPredicate, JoinStrategy, KeyExtractor,
    };
    pub use crate::pipeline::{chain, pipe, RecordFilter};
    pub use crate::record::{Record, RecordSeq, RecordStream, Value};
}
