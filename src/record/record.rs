//! Immutable records and the builder used to construct them

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::convert::FromValue;
use super::value::Value;

/// An immutable mapping from field name to value.
///
/// Fields iterate in lexicographic order. Cloning shares the underlying
/// storage; every "modifying" method returns a new record.
#[derive(Clone, Default, PartialEq)]
pub struct Record {
    fields: Arc<BTreeMap<String, Value>>,
}

impl Record {
    /// Creates an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts building a record
    pub fn builder() -> RecordBuilder {
        RecordBuilder::new()
    }

    /// Creates a record from field/value pairs
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        pairs
            .into_iter()
            .fold(RecordBuilder::new(), |b, (k, v)| b.set(k, v))
            .build()
    }

    /// Returns the raw value of a field
    pub fn get_value(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns a field converted to `T`.
    ///
    /// `None` if the field is missing or cannot be converted.
    pub fn get<T: FromValue>(&self, field: &str) -> Option<T> {
        self.fields.get(field).and_then(T::from_value)
    }

    /// Returns a field converted to `T`, or `default`
    pub fn get_or<T: FromValue>(&self, field: &str, default: T) -> T {
        self.get(field).unwrap_or(default)
    }

    /// Returns true if the field is present (even if null)
    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Field/value pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns a copy with one field set
    pub fn with(&self, field: impl Into<String>, value: impl Into<Value>) -> Record {
        let mut next = self.clone();
        Arc::make_mut(&mut next.fields).insert(field.into(), value.into());
        next
    }

    /// Returns a copy with one field removed
    pub fn without(&self, field: &str) -> Record {
        if !self.has(field) {
            return self.clone();
        }
        let mut next = self.clone();
        Arc::make_mut(&mut next.fields).remove(field);
        next
    }

    /// Copies this record's fields, then `other`'s over them.
    ///
    /// On a field-name collision `other` wins.
    pub fn merge(&self, other: &Record) -> Record {
        if other.is_empty() {
            return self.clone();
        }
        let mut fields = (*self.fields).clone();
        for (key, value) in other.fields.iter() {
            fields.insert(key.clone(), value.clone());
        }
        Record {
            fields: Arc::new(fields),
        }
    }

    /// Returns a mutable copy for building
    pub fn to_builder(&self) -> RecordBuilder {
        RecordBuilder {
            fields: (*self.fields).clone(),
        }
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.fields.iter()).finish()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record::from_pairs(iter)
    }
}

/// Mutable builder for records.
///
/// Setters mutate in place and return the builder for chaining;
/// `build()` freezes the result.
#[derive(Debug, Clone, Default)]
pub struct RecordBuilder {
    fields: BTreeMap<String, Value>,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field (chaining form)
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Sets a field in place
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Removes a field in place
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Freezes the builder into an immutable record
    pub fn build(self) -> Record {
        Record {
            fields: Arc::new(self.fields),
        }
    }
}
