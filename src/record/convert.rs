//! Converting field access
//!
//! Conversions accept the canonical source types only:
//! - `i64` from int, float (truncating), decimal string, bool (0/1)
//! - `f64` from float, int (widening), numeric string
//! - `String` from any non-null value via its textual form
//! - `bool` from bool, int/float (non-zero), string (non-empty)
//! - `DateTime<Utc>` from time, RFC 3339 / SQL datetime strings, Unix seconds
//!
//! Null never converts.

use chrono::{DateTime, NaiveDateTime, Utc};

use super::record::Record;
use super::seq::RecordSeq;
use super::value::Value;

/// Types that can be read out of a `Value` with conversion
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            Value::Float(f) => Some(*f as i64),
            Value::String(s) => s.parse().ok(),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            Value::Int(i) => Some(*i != 0),
            Value::Float(f) => Some(*f != 0.0),
            Value::String(s) => Some(!s.is_empty()),
            _ => None,
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Time(t) => Some(*t),
            Value::String(s) => parse_time(s),
            Value::Int(secs) => DateTime::from_timestamp(*secs, 0),
            _ => None,
        }
    }
}

impl FromValue for Record {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_record().cloned()
    }
}

impl FromValue for RecordSeq {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_seq().cloned()
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

fn parse_time(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_int_conversions() {
        assert_eq!(i64::from_value(&Value::Float(3.9)), Some(3));
        assert_eq!(i64::from_value(&Value::from("42")), Some(42));
        assert_eq!(i64::from_value(&Value::from("4.2")), None);
        assert_eq!(i64::from_value(&Value::Bool(true)), Some(1));
        assert_eq!(i64::from_value(&Value::Null), None);
    }

    #[test]
    fn test_float_conversions() {
        assert_eq!(f64::from_value(&Value::Int(2)), Some(2.0));
        assert_eq!(f64::from_value(&Value::from("2.5")), Some(2.5));
        assert_eq!(f64::from_value(&Value::from("n/a")), None);
        assert_eq!(f64::from_value(&Value::Bool(true)), None);
    }

    #[test]
    fn test_string_conversions() {
        assert_eq!(String::from_value(&Value::Int(7)), Some("7".to_string()));
        assert_eq!(String::from_value(&Value::Null), None);
    }

    #[test]
    fn test_bool_conversions() {
        assert_eq!(bool::from_value(&Value::Int(0)), Some(false));
        assert_eq!(bool::from_value(&Value::from("yes")), Some(true));
        assert_eq!(bool::from_value(&Value::from("")), Some(false));
    }

    #[test]
    fn test_time_conversions() {
        let t = DateTime::<Utc>::from_value(&Value::from("2024-03-01T10:30:00Z")).unwrap();
        assert_eq!((t.year(), t.month(), t.day(), t.hour()), (2024, 3, 1, 10));

        let t = DateTime::<Utc>::from_value(&Value::from("2024-03-01 10:30:00")).unwrap();
        assert_eq!(t.minute(), 30);

        let t = DateTime::<Utc>::from_value(&Value::Int(0)).unwrap();
        assert_eq!(t.year(), 1970);

        assert!(DateTime::<Utc>::from_value(&Value::from("yesterday")).is_none());
    }

    #[test]
    fn test_structured_values_do_not_coerce() {
        let nested = Value::Record(Record::new());
        assert_eq!(i64::from_value(&nested), None);
        assert!(Record::from_value(&nested).is_some());
        assert!(RecordSeq::from_value(&nested).is_none());
    }
}
