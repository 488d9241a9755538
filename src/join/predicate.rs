//! Join predicates
//!
//! A predicate decides whether a left and a right record join. Predicates
//! that can reduce a record to an equality key also expose a `KeyExtractor`,
//! which lets the join use the hash strategy.
//!
//! Key extraction must agree with `matches`: two records that match must
//! produce equal keys. Equal keys are not sufficient, the join re-verifies
//! every bucket candidate with `matches`.

use std::fmt;

use crate::record::{Record, ScalarKey};

/// Decides whether two records join
pub trait JoinPredicate: Send + Sync {
    fn matches(&self, left: &Record, right: &Record) -> bool;

    /// Equality key capability; `None` forces the nested-loop strategy
    fn key_extractor(&self) -> Option<&dyn KeyExtractor> {
        None
    }
}

/// Reduces a record to its join key
pub trait KeyExtractor: Send + Sync {
    /// `None` when the record has no usable key; such a record never
    /// matches on the hash path
    fn extract_key(&self, record: &Record) -> Option<JoinKey>;
}

/// Composite equality key, one part per key field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JoinKey {
    parts: Vec<ScalarKey>,
}

impl JoinKey {
    pub fn new(parts: Vec<ScalarKey>) -> Self {
        Self { parts }
    }

    pub fn parts(&self) -> &[ScalarKey] {
        &self.parts
    }
}

/// Parts joined by `\x00`
impl fmt::Display for JoinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, "\x00")?;
            }
            write!(f, "{}", part)?;
        }
        Ok(())
    }
}

/// Equality on a list of named fields
///
/// Matches when every field is present on both sides, holds a scalar, and
/// the values are equal. Values of different types never match.
#[derive(Debug, Clone)]
pub struct FieldsPredicate {
    fields: Vec<String>,
}

impl FieldsPredicate {
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

/// Joins on equality of the named fields; eligible for the hash strategy
pub fn on_fields<I, S>(fields: I) -> FieldsPredicate
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    FieldsPredicate {
        fields: fields.into_iter().map(Into::into).collect(),
    }
}

impl JoinPredicate for FieldsPredicate {
    fn matches(&self, left: &Record, right: &Record) -> bool {
        self.fields.iter().all(|field| {
            match (left.get_value(field), right.get_value(field)) {
                (Some(l), Some(r)) => l.is_scalar() && r.is_scalar() && l == r,
                _ => false,
            }
        })
    }

    fn key_extractor(&self) -> Option<&dyn KeyExtractor> {
        Some(self)
    }
}

impl KeyExtractor for FieldsPredicate {
    fn extract_key(&self, record: &Record) -> Option<JoinKey> {
        self.fields
            .iter()
            .map(|field| record.get_value(field).and_then(ScalarKey::from_value))
            .collect::<Option<Vec<_>>>()
            .map(JoinKey::new)
    }
}

/// Arbitrary boolean join condition
pub struct ConditionPredicate<F> {
    condition: F,
}

/// Joins wherever `condition` holds; always nested-loop
pub fn on_condition<F>(condition: F) -> ConditionPredicate<F>
where
    F: Fn(&Record, &Record) -> bool + Send + Sync,
{
    ConditionPredicate { condition }
}

impl<F> JoinPredicate for ConditionPredicate<F>
where
    F: Fn(&Record, &Record) -> bool + Send + Sync,
{
    fn matches(&self, left: &Record, right: &Record) -> bool {
        (self.condition)(left, right)
    }
}
