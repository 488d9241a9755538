//! Aggregate operator
//!
//! For each input record: every field except the sequence field is copied.
//! If the sequence field holds a record sequence, it is materialized once and
//! each registered function writes its result under its name. Otherwise the
//! record passes through without new fields.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::pipeline::RecordFilter;
use crate::record::{Record, RecordStream, Value};

use super::functions::AggregateFn;

/// Replaces a group's sequence field with named summary values
#[derive(Clone)]
pub struct Aggregate {
    sequence_field: String,
    /// Evaluated in name order
    functions: BTreeMap<String, AggregateFn>,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl Aggregate {
    pub fn new(sequence_field: impl Into<String>) -> Self {
        Self {
            sequence_field: sequence_field.into(),
            functions: BTreeMap::new(),
            metrics: None,
        }
    }

    /// Registers `function` under `name`, replacing any previous one
    pub fn with(mut self, name: impl Into<String>, function: AggregateFn) -> Self {
        self.functions.insert(name.into(), function);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn sequence_field(&self) -> &str {
        &self.sequence_field
    }

    /// Registered result names, in evaluation order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    /// Aggregates a single record
    pub fn aggregate_record(&self, record: &Record) -> Record {
        let members = match record.get_value(&self.sequence_field) {
            Some(Value::Seq(seq)) => Some(seq.collect_vec()),
            _ => None,
        };

        let mut builder = record.to_builder();
        builder.remove(&self.sequence_field);

        match members {
            Some(members) => {
                for (name, function) in &self.functions {
                    builder.insert(name.as_str(), function(&members));
                }
                if let Some(metrics) = &self.metrics {
                    metrics.increment_records_aggregated();
                }
            }
            None => {
                if let Some(metrics) = &self.metrics {
                    metrics.increment_aggregate_passthrough();
                }
            }
        }

        builder.build()
    }
}

impl RecordFilter for Aggregate {
    fn apply(&self, input: RecordStream) -> RecordStream {
        Box::new(AggregateIter {
            op: self.clone(),
            input,
            records: 0,
            done: false,
        })
    }
}

struct AggregateIter {
    op: Aggregate,
    input: RecordStream,
    records: u64,
    done: bool,
}

impl Iterator for AggregateIter {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        if self.done {
            return None;
        }
        match self.input.next() {
            Some(record) => {
                self.records += 1;
                Some(self.op.aggregate_record(&record))
            }
            None => {
                self.done = true;
                let records = self.records.to_string();
                let functions = self.op.functions.len().to_string();
                log_event_with_fields(
                    Event::AggregateComplete,
                    &[
                        ("functions", functions.as_str()),
                        ("records", records.as_str()),
                        ("sequence_field", self.op.sequence_field.as_str()),
                    ],
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{count, sum};
    use crate::record::RecordSeq;

    fn group(dept: &str, salaries: &[i64]) -> Record {
        let members: Vec<Record> = salaries
            .iter()
            .map(|s| Record::from_pairs([("salary", *s)]))
            .collect();
        Record::builder()
            .set("dept", dept)
            .set("_group", RecordSeq::from_vec(members))
            .build()
    }

    #[test]
    fn test_replaces_sequence_field() {
        let op = Aggregate::new("_group")
            .with("count", count())
            .with("total", sum("salary"));

        let out = op.aggregate_record(&group("Eng", &[100, 200]));
        assert!(!out.has("_group"));
        assert_eq!(out.get::<String>("dept"), Some("Eng".to_string()));
        assert_eq!(out.get_value("count"), Some(&Value::Int(2)));
        assert_eq!(out.get_value("total"), Some(&Value::Float(300.0)));
    }

    #[test]
    fn test_passthrough_without_sequence() {
        let metrics = Arc::new(MetricsRegistry::new());
        let op = Aggregate::new("_group")
            .with("count", count())
            .with_metrics(Arc::clone(&metrics));

        let plain = Record::from_pairs([("dept", "Eng")]);
        let malformed = Record::from_pairs([("dept", "Ops"), ("_group", "oops")]);

        let out: Vec<Record> = op
            .apply(Box::new(vec![plain.clone(), malformed].into_iter()))
            .collect();

        assert_eq!(out[0], plain);
        assert_eq!(out[1], Record::from_pairs([("dept", "Ops")]));
        assert_eq!(metrics.snapshot().aggregate_passthrough, 2);
        assert_eq!(metrics.snapshot().records_aggregated, 0);
    }

    #[test]
    fn test_names_in_order() {
        let op = Aggregate::new("_group").with("b", count()).with("a", count());
        assert_eq!(op.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
