//! JSON and JSON Lines boundary
//!
//! Incoming JSON maps onto values as follows: integers become `Int`, other
//! numbers `Float`, arrays `List`, objects nested `Record`. Serialization
//! writes times as RFC 3339 strings, materializes sequences into arrays and
//! writes non-finite floats as null.

use std::io::{self, BufRead, BufWriter, Write};
use std::sync::Arc;

use chrono::SecondsFormat;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::errors::QueryResult;
use crate::observability::{Event, Logger, MetricsRegistry};

use super::record::{Record, RecordBuilder};
use super::seq::RecordSeq;
use super::value::Value;

/// Converts a JSON value into a record value
pub fn value_from_json(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
        },
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Array(items) => Value::List(items.iter().map(value_from_json).collect()),
        JsonValue::Object(map) => {
            let mut builder = RecordBuilder::new();
            for (key, value) in map {
                builder.insert(key.clone(), value_from_json(value));
            }
            Value::Record(builder.build())
        }
    }
}

/// Converts a JSON object into a record; other JSON values are not records
pub fn record_from_json(json: &JsonValue) -> Option<Record> {
    match value_from_json(json) {
        Value::Record(record) if json.is_object() => Some(record),
        _ => None,
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            Value::Float(_) => serializer.serialize_none(),
            Value::String(s) => serializer.serialize_str(s),
            Value::Time(t) => {
                serializer.serialize_str(&t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Value::Record(r) => r.serialize(serializer),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Seq(records) => {
                let mut seq = serializer.serialize_seq(None)?;
                for record in records.iter() {
                    seq.serialize_element(&record)?;
                }
                seq.end()
            }
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Streaming JSON Lines reader.
///
/// Blank lines are ignored. Lines that are not JSON objects are skipped
/// and counted; a read error ends the stream.
pub struct JsonLines<R> {
    lines: io::Lines<R>,
    line_number: u64,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl<R: BufRead> JsonLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
            metrics: None,
        }
    }

    /// Counts skipped lines in `metrics`
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn skip_line(&self, reason: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.increment_jsonl_lines_skipped();
        }
        let line = self.line_number.to_string();
        Logger::trace(
            Event::JsonlLineSkipped.as_str(),
            &[("line", line.as_str()), ("reason", reason)],
        );
    }
}

impl<R: BufRead> Iterator for JsonLines<R> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    let error = e.to_string();
                    let line = self.line_number.to_string();
                    Logger::warn(
                        Event::JsonlReadFailed.as_str(),
                        &[("error", error.as_str()), ("line", line.as_str())],
                    );
                    return None;
                }
            };
            self.line_number += 1;

            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<JsonValue>(&line) {
                Ok(json) => match record_from_json(&json) {
                    Some(record) => return Some(record),
                    None => self.skip_line("not an object"),
                },
                Err(_) => self.skip_line("invalid json"),
            }
        }
    }
}

/// Reads JSON Lines into a single-pass sequence
pub fn read_jsonl<R>(reader: R) -> RecordSeq
where
    R: BufRead + Send + 'static,
{
    RecordSeq::once(JsonLines::new(reader))
}

/// Writes records as JSON Lines, returning the number written
pub fn write_jsonl<W, I>(writer: W, records: I) -> QueryResult<usize>
where
    W: Write,
    I: IntoIterator<Item = Record>,
{
    let mut writer = BufWriter::new(writer);
    let mut written = 0;

    for record in records {
        serde_json::to_writer(&mut writer, &record)?;
        writer.write_all(b"\n")?;
        written += 1;
    }

    writer.flush()?;
    Ok(written)
}
