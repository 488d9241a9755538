//! Ordered bucketing shared by the group operators

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use crate::record::{Record, RecordSeq, RecordStream, Value};

/// Records bucketed by key, buckets in first-seen key order
pub(crate) struct Buckets<K> {
    index: HashMap<K, usize>,
    groups: Vec<(K, Vec<Record>)>,
}

impl<K: Hash + Eq + Clone> Buckets<K> {
    pub(crate) fn new() -> Self {
        Self {
            index: HashMap::new(),
            groups: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, key: K, record: Record) {
        match self.index.get(&key) {
            Some(&slot) => self.groups[slot].1.push(record),
            None => {
                self.index.insert(key.clone(), self.groups.len());
                self.groups.push((key, vec![record]));
            }
        }
    }

    pub(crate) fn into_groups(self) -> Vec<(K, Vec<Record>)> {
        self.groups
    }
}

/// Replayable sequence over a group's members
pub(crate) fn members_value(members: Vec<Record>) -> Value {
    Value::Seq(RecordSeq::shared(Arc::new(members)))
}

type Build = Box<dyn FnOnce() -> Vec<Record> + Send>;

/// Output stream that runs `build` on the first pull
pub(crate) struct Deferred {
    build: Option<Build>,
    output: std::vec::IntoIter<Record>,
}

impl Deferred {
    pub(crate) fn new(build: impl FnOnce() -> Vec<Record> + Send + 'static) -> RecordStream {
        Box::new(Self {
            build: Some(Box::new(build)),
            output: Vec::new().into_iter(),
        })
    }
}

impl Iterator for Deferred {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        if let Some(build) = self.build.take() {
            self.output = build().into_iter();
        }
        self.output.next()
    }
}
