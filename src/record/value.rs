//! Dynamically-typed field values

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

use super::record::Record;
use super::seq::RecordSeq;

/// A single field value.
///
/// Equality is type-strict: `Int(1)` never equals `Float(1.0)` or `String("1")`.
/// Two `Seq` values are equal only when they share the same source.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Time(DateTime<Utc>),
    /// Nested record
    Record(Record),
    /// Heterogeneous list, produced by `collect` and JSON arrays
    List(Vec<Value>),
    /// Lazy sequence of records (group members)
    Seq(RecordSeq),
}

impl Value {
    /// Returns true for `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if the value is a scalar (or null).
    ///
    /// Nested records, lists and sequences are not scalars and cannot be used
    /// as grouping or hash keys.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::Record(_) | Value::List(_) | Value::Seq(_))
    }

    /// Returns the type name used in log output
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Time(_) => "time",
            Value::Record(_) => "record",
            Value::List(_) => "list",
            Value::Seq(_) => "seq",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&RecordSeq> {
        match self {
            Value::Seq(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Seq(a), Value::Seq(b)) => a.same_source(b),
            _ => false,
        }
    }
}

/// Default textual representation.
///
/// This is the form used by join key display, string conversion and the
/// CLI's cross-field comparisons.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{}", s),
            Value::Time(t) => write!(f, "{}", t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Record(r) => {
                write!(f, "{{")?;
                for (i, (key, value)) in r.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Seq(_) => write!(f, "<seq>"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Time(v)
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Value::Record(v)
    }
}

impl From<RecordSeq> for Value {
    fn from(v: RecordSeq) -> Self {
        Value::Seq(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_strict_equality() {
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::Int(1), Value::from("1"));
        assert_eq!(Value::Int(1), Value::from(1));
        assert_eq!(Value::Null, Value::from(None::<i64>));
    }

    #[test]
    fn test_scalar_classification() {
        assert!(Value::Null.is_scalar());
        assert!(Value::from("eng").is_scalar());
        assert!(Value::Time(Utc::now()).is_scalar());
        assert!(!Value::Record(Record::new()).is_scalar());
        assert!(!Value::List(vec![]).is_scalar());
        assert!(!Value::Seq(RecordSeq::empty()).is_scalar());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Float(300.0).to_string(), "300");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::from("x").to_string(), "x");
        assert_eq!(
            Value::List(vec![Value::Int(1), Value::from("a")]).to_string(),
            "[1, a]"
        );

        let nested = Record::builder().set("a", 1).set("b", "x").build();
        assert_eq!(Value::Record(nested).to_string(), "{a: 1, b: x}");
    }

    #[test]
    fn test_seq_equality_is_identity() {
        let seq = RecordSeq::from_vec(vec![Record::new()]);
        let other = RecordSeq::from_vec(vec![Record::new()]);

        assert_eq!(Value::Seq(seq.clone()), Value::Seq(seq.clone()));
        assert_ne!(Value::Seq(seq), Value::Seq(other));
    }
}
