//! Aggregation function library
//!
//! Each function reduces a group's member list to one value. Values that
//! cannot be converted to the function's working type are skipped.

use std::sync::Arc;

use crate::record::{FromValue, Record, Value};

/// A reduction of a member list into one value
pub type AggregateFn = Arc<dyn Fn(&[Record]) -> Value + Send + Sync>;

/// Wraps any reduction as an `AggregateFn`
pub fn aggregate_fn<F>(f: F) -> AggregateFn
where
    F: Fn(&[Record]) -> Value + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Number of members, as an int
pub fn count() -> AggregateFn {
    aggregate_fn(|records| Value::Int(records.len() as i64))
}

/// Float sum of the field over members convertible to f64
pub fn sum(field: impl Into<String>) -> AggregateFn {
    let field = field.into();
    aggregate_fn(move |records| {
        let total: f64 = records.iter().filter_map(|r| r.get::<f64>(&field)).sum();
        Value::Float(total)
    })
}

/// Mean over members convertible to f64; `0.0` when there are none
pub fn avg(field: impl Into<String>) -> AggregateFn {
    let field = field.into();
    aggregate_fn(move |records| {
        let (total, n) = records
            .iter()
            .filter_map(|r| r.get::<f64>(&field))
            .fold((0.0, 0u64), |(total, n), v| (total + v, n + 1));
        if n == 0 {
            Value::Float(0.0)
        } else {
            Value::Float(total / n as f64)
        }
    })
}

/// Smallest value convertible to `T`; `T::default()` when none convert
pub fn min<T>(field: impl Into<String>) -> AggregateFn
where
    T: FromValue + PartialOrd + Default + Into<Value> + 'static,
{
    let field = field.into();
    aggregate_fn(move |records| extreme::<T>(records, &field, |candidate, best| candidate < best))
}

/// Largest value convertible to `T`; `T::default()` when none convert
pub fn max<T>(field: impl Into<String>) -> AggregateFn
where
    T: FromValue + PartialOrd + Default + Into<Value> + 'static,
{
    let field = field.into();
    aggregate_fn(move |records| extreme::<T>(records, &field, |candidate, best| candidate > best))
}

fn extreme<T>(records: &[Record], field: &str, better: impl Fn(&T, &T) -> bool) -> Value
where
    T: FromValue + PartialOrd + Default + Into<Value>,
{
    records
        .iter()
        .filter_map(|r| r.get::<T>(field))
        .fold(None, |best: Option<T>, candidate| match best {
            Some(current) if !better(&candidate, &current) => Some(current),
            _ => Some(candidate),
        })
        .unwrap_or_default()
        .into()
}

/// Value of the field on the first member that has it (any type)
pub fn first(field: impl Into<String>) -> AggregateFn {
    let field = field.into();
    aggregate_fn(move |records| {
        records
            .iter()
            .find_map(|r| r.get_value(&field).cloned())
            .unwrap_or(Value::Null)
    })
}

/// Value of the field on the last member that has it (any type)
pub fn last(field: impl Into<String>) -> AggregateFn {
    let field = field.into();
    aggregate_fn(move |records| {
        records
            .iter()
            .rev()
            .find_map(|r| r.get_value(&field).cloned())
            .unwrap_or(Value::Null)
    })
}

/// Every present value of the field, in member order
pub fn collect(field: impl Into<String>) -> AggregateFn {
    let field = field.into();
    aggregate_fn(move |records| {
        Value::List(
            records
                .iter()
                .filter_map(|r| r.get_value(&field).cloned())
                .collect(),
        )
    })
}
