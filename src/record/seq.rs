//! Lazy record sequences
//!
//! A `RecordStream` is one pull-based pass over records. A `RecordSeq` is a
//! source of such passes: replayable when built over materialized records,
//! single-pass when wrapping an iterator that can only be consumed once.

use std::fmt;
use std::sync::{Arc, Mutex};

use super::record::Record;

/// One pass over a sequence of records
pub type RecordStream = Box<dyn Iterator<Item = Record> + Send>;

type Source = dyn Fn() -> RecordStream + Send + Sync;

/// A source of record streams
#[derive(Clone)]
pub struct RecordSeq {
    source: Arc<Source>,
}

impl RecordSeq {
    /// Creates a sequence that calls `f` for every pass
    pub fn from_fn<F, I>(f: F) -> Self
    where
        F: Fn() -> I + Send + Sync + 'static,
        I: IntoIterator<Item = Record>,
        I::IntoIter: Send + 'static,
    {
        Self {
            source: Arc::new(move || Box::new(f().into_iter()) as RecordStream),
        }
    }

    /// Creates a replayable sequence over materialized records
    pub fn from_vec(records: Vec<Record>) -> Self {
        Self::shared(Arc::new(records))
    }

    /// Creates a replayable sequence over shared records without copying the list
    pub fn shared(records: Arc<Vec<Record>>) -> Self {
        Self::from_fn(move || {
            let records = Arc::clone(&records);
            (0..records.len()).map(move |i| records[i].clone())
        })
    }

    /// Wraps an iterator that can only be consumed once.
    ///
    /// The first pass drains `iter`; later passes are empty.
    pub fn once<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Record>,
        I::IntoIter: Send + 'static,
    {
        let slot: Mutex<Option<RecordStream>> = Mutex::new(Some(Box::new(iter.into_iter())));
        Self {
            source: Arc::new(move || {
                slot.lock()
                    .ok()
                    .and_then(|mut guard| guard.take())
                    .unwrap_or_else(|| Box::new(std::iter::empty::<Record>()) as RecordStream)
            }),
        }
    }

    /// An empty sequence
    pub fn empty() -> Self {
        Self::from_fn(std::iter::empty::<Record>)
    }

    /// Starts a new pass
    pub fn iter(&self) -> RecordStream {
        (self.source)()
    }

    /// Materializes one pass
    pub fn collect_vec(&self) -> Vec<Record> {
        self.iter().collect()
    }

    /// Returns true if both sequences share the same source
    pub fn same_source(&self, other: &RecordSeq) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.source) as *const (),
            Arc::as_ptr(&other.source) as *const (),
        )
    }
}

impl fmt::Debug for RecordSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RecordSeq(..)")
    }
}

impl From<Vec<Record>> for RecordSeq {
    fn from(records: Vec<Record>) -> Self {
        RecordSeq::from_vec(records)
    }
}

impl<'a> IntoIterator for &'a RecordSeq {
    type Item = Record;
    type IntoIter = RecordStream;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
