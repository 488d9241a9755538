//! Hashable canonical form of scalar values
//!
//! Used wherever records are bucketed by field values: hash join build and
//! probe, and field grouping. Keys are type-strict like `Value` equality:
//! `Int(1)`, `Float(1.0)` and `String("1")` are three different keys.

use std::fmt;

use chrono::{DateTime, Utc};

use super::value::Value;

/// A scalar value in hashable form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScalarKey {
    Null,
    Bool(bool),
    Int(i64),
    /// Float bit pattern, with `-0.0` folded into `0.0`
    Float(u64),
    String(String),
    Time(DateTime<Utc>),
}

impl ScalarKey {
    /// Canonical key of a scalar; `None` for records, lists and sequences
    pub fn from_value(value: &Value) -> Option<Self> {
        let key = match value {
            Value::Null => ScalarKey::Null,
            Value::Bool(b) => ScalarKey::Bool(*b),
            Value::Int(i) => ScalarKey::Int(*i),
            Value::Float(f) => {
                let f = if *f == 0.0 { 0.0 } else { *f };
                ScalarKey::Float(f.to_bits())
            }
            Value::String(s) => ScalarKey::String(s.clone()),
            Value::Time(t) => ScalarKey::Time(*t),
            Value::Record(_) | Value::List(_) | Value::Seq(_) => return None,
        };
        Some(key)
    }

    /// Converts back to the value it was built from
    pub fn to_value(&self) -> Value {
        match self {
            ScalarKey::Null => Value::Null,
            ScalarKey::Bool(b) => Value::Bool(*b),
            ScalarKey::Int(i) => Value::Int(*i),
            ScalarKey::Float(bits) => Value::Float(f64::from_bits(*bits)),
            ScalarKey::String(s) => Value::String(s.clone()),
            ScalarKey::Time(t) => Value::Time(*t),
        }
    }
}

impl fmt::Display for ScalarKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    #[test]
    fn test_type_strict_keys() {
        let int = ScalarKey::from_value(&Value::Int(1));
        let float = ScalarKey::from_value(&Value::Float(1.0));
        let string = ScalarKey::from_value(&Value::from("1"));

        assert_ne!(int, float);
        assert_ne!(int, string);
        assert_ne!(float, string);
    }

    #[test]
    fn test_negative_zero_folds() {
        assert_eq!(
            ScalarKey::from_value(&Value::Float(-0.0)),
            ScalarKey::from_value(&Value::Float(0.0))
        );
    }

    #[test]
    fn test_non_scalars_have_no_key() {
        assert!(ScalarKey::from_value(&Value::Record(Record::new())).is_none());
        assert!(ScalarKey::from_value(&Value::List(vec![])).is_none());
    }

    #[test]
    fn test_display_matches_value() {
        let key = ScalarKey::from_value(&Value::Float(2.5)).unwrap();
        assert_eq!(key.to_string(), "2.5");
        assert_eq!(key.to_value(), Value::Float(2.5));
    }
}
