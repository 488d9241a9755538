//! Grouping operators
//!
//! Both operators consume their whole input on the first pull, then emit one
//! group record per distinct key in first-seen order. A group record holds
//! the key field(s) and one sequence field with the group's members.

use std::hash::Hash;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::pipeline::RecordFilter;
use crate::record::{Record, RecordBuilder, RecordStream, ScalarKey, Value};

use super::buckets::{members_value, Buckets, Deferred};

/// Groups records by the value of a key function
pub struct GroupBy<K> {
    sequence_field: String,
    key_field: String,
    key_fn: Arc<dyn Fn(&Record) -> K + Send + Sync>,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl<K> GroupBy<K>
where
    K: Hash + Eq + Clone + Into<Value> + Send + 'static,
{
    /// Group records as `{key_field: key_fn(record), sequence_field: members}`
    pub fn new(
        sequence_field: impl Into<String>,
        key_field: impl Into<String>,
        key_fn: impl Fn(&Record) -> K + Send + Sync + 'static,
    ) -> Self {
        Self {
            sequence_field: sequence_field.into(),
            key_field: key_field.into(),
            key_fn: Arc::new(key_fn),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

impl<K> Clone for GroupBy<K> {
    fn clone(&self) -> Self {
        Self {
            sequence_field: self.sequence_field.clone(),
            key_field: self.key_field.clone(),
            key_fn: Arc::clone(&self.key_fn),
            metrics: self.metrics.clone(),
        }
    }
}

impl<K> RecordFilter for GroupBy<K>
where
    K: Hash + Eq + Clone + Into<Value> + Send + 'static,
{
    fn apply(&self, input: RecordStream) -> RecordStream {
        let op = self.clone();
        Deferred::new(move || {
            let mut buckets = Buckets::new();
            let mut records = 0usize;
            for record in input {
                records += 1;
                buckets.push((op.key_fn)(&record), record);
            }

            let groups: Vec<Record> = buckets
                .into_groups()
                .into_iter()
                .map(|(key, members)| {
                    RecordBuilder::new()
                        .set(op.key_field.as_str(), key)
                        .set(op.sequence_field.as_str(), members_value(members))
                        .build()
                })
                .collect();

            report(&op.metrics, groups.len(), records, 0);
            groups
        })
    }
}

/// Groups records by equality of named fields
///
/// A key field holding a nested record, list or sequence excludes the whole
/// record. An absent key field groups as null and is written as null on the
/// group record.
#[derive(Clone)]
pub struct GroupByFields {
    sequence_field: String,
    fields: Vec<String>,
    trace: bool,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl GroupByFields {
    pub fn new<I, S>(sequence_field: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sequence_field: sequence_field.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            trace: false,
            metrics: None,
        }
    }

    /// Applies engine options (per-record trace events)
    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.trace = config.trace_operators;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Key parts for `record`, or the first field holding a non-scalar
    fn key(&self, record: &Record) -> Result<Vec<ScalarKey>, (&str, &'static str)> {
        self.fields
            .iter()
            .map(|field| match record.get_value(field) {
                None => Ok(ScalarKey::Null),
                Some(value) => {
                    ScalarKey::from_value(value).ok_or((field.as_str(), value.type_name()))
                }
            })
            .collect()
    }

    /// Group record header: key fields copied from the group's first member
    fn header(&self, first: &Record) -> RecordBuilder {
        let mut builder = RecordBuilder::new();
        for field in &self.fields {
            let value = first.get_value(field).cloned().unwrap_or(Value::Null);
            builder.insert(field.as_str(), value);
        }
        builder
    }
}

impl RecordFilter for GroupByFields {
    fn apply(&self, input: RecordStream) -> RecordStream {
        let op = self.clone();
        Deferred::new(move || {
            let mut buckets = Buckets::new();
            let mut records = 0usize;
            let mut dropped = 0usize;

            for record in input {
                records += 1;
                match op.key(&record) {
                    Ok(key) => buckets.push(key, record),
                    Err((field, type_name)) => {
                        dropped += 1;
                        if let Some(metrics) = &op.metrics {
                            metrics.increment_group_records_dropped();
                        }
                        if op.trace {
                            log_event_with_fields(
                                Event::GroupRecordDropped,
                                &[("field", field), ("type", type_name)],
                            );
                        }
                    }
                }
            }

            let groups: Vec<Record> = buckets
                .into_groups()
                .into_iter()
                .map(|(_, members)| {
                    let mut builder = match members.first() {
                        Some(first) => op.header(first),
                        None => RecordBuilder::new(),
                    };
                    builder.insert(op.sequence_field.as_str(), members_value(members));
                    builder.build()
                })
                .collect();

            report(&op.metrics, groups.len(), records, dropped);
            groups
        })
    }
}

fn report(metrics: &Option<Arc<MetricsRegistry>>, groups: usize, records: usize, dropped: usize) {
    if let Some(metrics) = metrics {
        metrics.add_groups_emitted(groups as u64);
    }
    let groups = groups.to_string();
    let records = records.to_string();
    let dropped = dropped.to_string();
    log_event_with_fields(
        Event::GroupComplete,
        &[
            ("dropped", dropped.as_str()),
            ("groups", groups.as_str()),
            ("records", records.as_str()),
        ],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{record_from_json, RecordSeq};
    use serde_json::json;

    fn input(values: Vec<serde_json::Value>) -> RecordStream {
        let records: Vec<Record> = values.iter().filter_map(record_from_json).collect();
        Box::new(records.into_iter())
    }

    fn members(group: &Record, field: &str) -> Vec<Record> {
        group
            .get::<RecordSeq>(field)
            .map(|seq| seq.collect_vec())
            .unwrap_or_default()
    }

    #[test]
    fn test_group_by_key_fn() {
        let op = GroupBy::new("people", "bracket", |r: &Record| {
            if r.get_or("age", 0i64) < 30 {
                "young"
            } else {
                "senior"
            }
        });

        let groups: Vec<Record> = op
            .apply(input(vec![
                json!({"age": 65}),
                json!({"age": 20}),
                json!({"age": 70}),
            ]))
            .collect();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].get::<String>("bracket"), Some("senior".to_string()));
        assert_eq!(members(&groups[0], "people").len(), 2);
        assert_eq!(groups[1].get::<String>("bracket"), Some("young".to_string()));
    }

    #[test]
    fn test_group_by_fields_first_seen_order() {
        let op = GroupByFields::new("_group", ["dept"]);
        let groups: Vec<Record> = op
            .apply(input(vec![
                json!({"dept": "Eng", "salary": 100}),
                json!({"dept": "Sales", "salary": 50}),
                json!({"dept": "Eng", "salary": 200}),
            ]))
            .collect();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].get::<String>("dept"), Some("Eng".to_string()));
        assert_eq!(members(&groups[0], "_group").len(), 2);
        assert_eq!(groups[1].get::<String>("dept"), Some("Sales".to_string()));
        assert_eq!(groups[0].len(), 2);
    }

    #[test]
    fn test_members_replayable() {
        let op = GroupByFields::new("_group", ["k"]);
        let groups: Vec<Record> = op.apply(input(vec![json!({"k": 1}), json!({"k": 1})])).collect();

        let seq = groups[0].get::<RecordSeq>("_group").unwrap();
        assert_eq!(seq.collect_vec().len(), 2);
        assert_eq!(seq.collect_vec().len(), 2);
    }

    #[test]
    fn test_absent_field_groups_as_null() {
        let op = GroupByFields::new("_group", ["region"]);
        let groups: Vec<Record> = op
            .apply(input(vec![json!({"x": 1}), json!({"region": null})]))
            .collect();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].get_value("region"), Some(&Value::Null));
        assert_eq!(members(&groups[0], "_group").len(), 2);
    }

    #[test]
    fn test_non_scalar_key_drops_record() {
        let metrics = Arc::new(MetricsRegistry::new());
        let config = EngineConfig {
            trace_operators: true,
            ..EngineConfig::default()
        };
        let op = GroupByFields::new("_group", ["dept"])
            .with_config(&config)
            .with_metrics(Arc::clone(&metrics));

        let groups: Vec<Record> = op
            .apply(input(vec![
                json!({"dept": {"name": "Eng"}}),
                json!({"dept": ["a"]}),
                json!({"dept": "Ops"}),
            ]))
            .collect();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].get::<String>("dept"), Some("Ops".to_string()));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.group_records_dropped, 2);
        assert_eq!(snapshot.groups_emitted, 1);
    }

    #[test]
    fn test_typed_keys_do_not_merge() {
        let op = GroupByFields::new("_group", ["k"]);
        let groups: Vec<Record> = op
            .apply(input(vec![json!({"k": 1}), json!({"k": "1"}), json!({"k": 1.5})]))
            .collect();
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn test_empty_input() {
        let op = GroupByFields::new("_group", ["k"]);
        assert_eq!(op.apply(input(vec![])).count(), 0);
    }
}
