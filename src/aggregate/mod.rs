//! Aggregation over group records
//!
//! `Aggregate` consumes the sequence field written by the group operators and
//! replaces it with scalar summary fields computed by `AggregateFn`s.
//!
//! # Functions
//!
//! - `count`: member count (int)
//! - `sum`, `avg`: float arithmetic over numeric-convertible values
//! - `min::<T>`, `max::<T>`: ordered comparison after conversion to `T`
//! - `first`, `last`: by field presence, any type
//! - `collect`: list of present values
//! - `aggregate_fn`: any custom reduction

mod aggregate;
mod functions;

pub use aggregate::Aggregate;
pub use functions::{aggregate_fn, avg, collect, count, first, last, max, min, sum, AggregateFn};
