//! Record model for recordql
//!
//! Every operator consumes and produces sequences of `Record`s: immutable
//! bags of named, dynamically-typed values.
//!
//! # Components
//!
//! - `Value`: scalar, nested record, list, or lazy record sequence
//! - `Record` / `RecordBuilder`: immutable mapping and its builder
//! - `RecordSeq` / `RecordStream`: replayable sources and single passes
//! - `FromValue`: converting get-with-default access
//! - `ScalarKey`: hashable form of scalars for join and group buckets
//! - JSON Lines boundary for feeding records in and out

mod convert;
mod json;
mod key;
mod record;
mod seq;
mod value;

pub use convert::FromValue;
pub use json::{read_jsonl, record_from_json, value_from_json, write_jsonl, JsonLines};
pub use key::ScalarKey;
pub use record::{Record, RecordBuilder};
pub use seq::{RecordSeq, RecordStream};
pub use value::Value;
