//! Join operator
//!
//! # Execution
//!
//! Nothing is read until the first pull. The first pull chooses a strategy,
//! materializes the right side and (for the hash strategy) builds a bucket
//! table of right indices keyed by `JoinKey`. Left records are then streamed
//! one at a time. Both strategies visit right candidates in their original
//! order and share the same emit path, so their outputs are identical.
//!
//! # Output order
//!
//! - Matched pairs, left-major then right-minor
//! - Left join: an unmatched left record is emitted in place, unmodified
//! - Full join: unmatched left records after all matched pairs
//! - Right and full joins: unmatched right records last, in right order

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::pipeline::RecordFilter;
use crate::record::{Record, RecordSeq, RecordStream};

use super::predicate::{JoinKey, JoinPredicate};

/// Which unmatched records survive the join
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinKind::Inner => "inner",
            JoinKind::Left => "left",
            JoinKind::Right => "right",
            JoinKind::Full => "full",
        }
    }

    fn keeps_unmatched_right(&self) -> bool {
        matches!(self, JoinKind::Right | JoinKind::Full)
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How candidate pairs are found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinStrategy {
    /// Every left record is tested against every right record
    NestedLoop,
    /// Left records probe a bucket table built from the right side
    Hash,
}

impl JoinStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinStrategy::NestedLoop => "nested_loop",
            JoinStrategy::Hash => "hash",
        }
    }
}

impl fmt::Display for JoinStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Joins an incoming (left) stream with a fixed right sequence.
///
/// Merged records carry every left field, then every right field over them:
/// the right side wins on a field-name collision.
#[derive(Clone)]
pub struct Join {
    right: RecordSeq,
    predicate: Arc<dyn JoinPredicate>,
    kind: JoinKind,
    hash_enabled: bool,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl Join {
    pub fn new(right: RecordSeq, predicate: impl JoinPredicate + 'static, kind: JoinKind) -> Self {
        Self {
            right,
            predicate: Arc::new(predicate),
            kind,
            hash_enabled: true,
            metrics: None,
        }
    }

    /// Applies engine options (hash strategy on/off)
    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.hash_enabled = config.hash_join_enabled;
        self
    }

    /// Records strategy use and output counts in `metrics`
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn kind(&self) -> JoinKind {
        self.kind
    }

    /// Strategy the next execution will use
    pub fn strategy(&self) -> JoinStrategy {
        if self.hash_enabled && self.predicate.key_extractor().is_some() {
            JoinStrategy::Hash
        } else {
            JoinStrategy::NestedLoop
        }
    }
}

impl fmt::Debug for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Join")
            .field("kind", &self.kind)
            .field("strategy", &self.strategy())
            .finish()
    }
}

impl RecordFilter for Join {
    fn apply(&self, input: RecordStream) -> RecordStream {
        Box::new(JoinIter {
            join: self.clone(),
            phase: Phase::Pending(input),
            strategy: JoinStrategy::NestedLoop,
            rights: Vec::new(),
            table: None,
            matched_right: None,
            unmatched_left: Vec::new(),
            pending: VecDeque::new(),
            emitted: 0,
            rejected: 0,
        })
    }
}

/// Inner join of the incoming stream with `right`
pub fn inner_join(right: RecordSeq, predicate: impl JoinPredicate + 'static) -> Join {
    Join::new(right, predicate, JoinKind::Inner)
}

/// Left outer join of the incoming stream with `right`
pub fn left_join(right: RecordSeq, predicate: impl JoinPredicate + 'static) -> Join {
    Join::new(right, predicate, JoinKind::Left)
}

/// Right outer join of the incoming stream with `right`
pub fn right_join(right: RecordSeq, predicate: impl JoinPredicate + 'static) -> Join {
    Join::new(right, predicate, JoinKind::Right)
}

/// Full outer join of the incoming stream with `right`
pub fn full_join(right: RecordSeq, predicate: impl JoinPredicate + 'static) -> Join {
    Join::new(right, predicate, JoinKind::Full)
}

enum Phase {
    /// Not started; holds the untouched left stream
    Pending(RecordStream),
    /// Right side built; streaming left records
    Probing(RecordStream),
    /// Output fully queued
    Finished,
    /// Completion reported
    Done,
}

/// Right-side candidates for one left record
enum Candidates<'a> {
    All(std::ops::Range<usize>),
    Bucket(std::slice::Iter<'a, usize>),
}

impl Iterator for Candidates<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        match self {
            Candidates::All(range) => range.next(),
            Candidates::Bucket(iter) => iter.next().copied(),
        }
    }
}

struct JoinIter {
    join: Join,
    phase: Phase,
    strategy: JoinStrategy,
    rights: Vec<Record>,
    /// Hash strategy only: right indices per key, in right order
    table: Option<HashMap<JoinKey, Vec<usize>>>,
    /// Right and full joins only
    matched_right: Option<Vec<bool>>,
    /// Full join only
    unmatched_left: Vec<Record>,
    pending: VecDeque<Record>,
    emitted: u64,
    rejected: u64,
}

impl JoinIter {
    fn build(&mut self) {
        self.strategy = self.join.strategy();
        let kind = self.join.kind.as_str();
        let strategy = self.strategy.as_str();
        log_event_with_fields(
            Event::JoinStrategySelected,
            &[("kind", kind), ("strategy", strategy)],
        );

        if let Some(metrics) = &self.join.metrics {
            match self.strategy {
                JoinStrategy::Hash => metrics.increment_joins_hash(),
                JoinStrategy::NestedLoop => metrics.increment_joins_nested_loop(),
            }
        }

        self.rights = self.join.right.iter().collect();

        if self.strategy == JoinStrategy::Hash {
            if let Some(extractor) = self.join.predicate.key_extractor() {
                let mut table: HashMap<JoinKey, Vec<usize>> = HashMap::new();
                for (index, right) in self.rights.iter().enumerate() {
                    if let Some(key) = extractor.extract_key(right) {
                        table.entry(key).or_default().push(index);
                    }
                }
                self.table = Some(table);
            }
        }

        if self.join.kind.keeps_unmatched_right() {
            self.matched_right = Some(vec![false; self.rights.len()]);
        }

        let right_records = self.rights.len().to_string();
        let buckets = self
            .table
            .as_ref()
            .map(|t| t.len())
            .unwrap_or(0)
            .to_string();
        log_event_with_fields(
            Event::JoinBuildComplete,
            &[
                ("buckets", buckets.as_str()),
                ("right_records", right_records.as_str()),
                ("strategy", strategy),
            ],
        );
    }

    fn probe(&mut self, left: Record) {
        let predicate = &self.join.predicate;

        let candidates = match &self.table {
            Some(table) => {
                let bucket = predicate
                    .key_extractor()
                    .and_then(|extractor| extractor.extract_key(&left))
                    .and_then(|key| table.get(&key))
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                Candidates::Bucket(bucket.iter())
            }
            None => Candidates::All(0..self.rights.len()),
        };

        let mut matched = false;
        let mut rejected = 0u64;
        for index in candidates {
            let right = &self.rights[index];
            if predicate.matches(&left, right) {
                matched = true;
                if let Some(flags) = self.matched_right.as_mut() {
                    flags[index] = true;
                }
                self.pending.push_back(merge(&left, right));
            } else if self.table.is_some() {
                rejected += 1;
            }
        }

        if rejected > 0 {
            self.rejected += rejected;
            if let Some(metrics) = &self.join.metrics {
                metrics.add_join_candidates_rejected(rejected);
            }
        }

        if !matched {
            match self.join.kind {
                JoinKind::Left => self.pending.push_back(left),
                JoinKind::Full => self.unmatched_left.push(left),
                JoinKind::Inner | JoinKind::Right => {}
            }
        }
    }

    fn finish(&mut self) {
        self.pending.extend(self.unmatched_left.drain(..));

        if let Some(flags) = &self.matched_right {
            for (right, matched) in self.rights.iter().zip(flags) {
                if !matched {
                    self.pending.push_back(right.clone());
                }
            }
        }

        // Release build state early; only queued output is still needed
        self.table = None;
        self.matched_right = None;
        self.rights = Vec::new();
    }

    fn report(&self) {
        let emitted = self.emitted.to_string();
        let rejected = self.rejected.to_string();
        log_event_with_fields(
            Event::JoinComplete,
            &[
                ("emitted", emitted.as_str()),
                ("kind", self.join.kind.as_str()),
                ("rejected", rejected.as_str()),
                ("strategy", self.strategy.as_str()),
            ],
        );
    }
}

impl Iterator for JoinIter {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        loop {
            if let Some(record) = self.pending.pop_front() {
                self.emitted += 1;
                if let Some(metrics) = &self.join.metrics {
                    metrics.add_join_records_emitted(1);
                }
                return Some(record);
            }

            match std::mem::replace(&mut self.phase, Phase::Done) {
                Phase::Pending(left) => {
                    self.build();
                    self.phase = Phase::Probing(left);
                }
                Phase::Probing(mut left) => match left.next() {
                    Some(record) => {
                        self.probe(record);
                        self.phase = Phase::Probing(left);
                    }
                    None => {
                        self.finish();
                        self.phase = Phase::Finished;
                    }
                },
                Phase::Finished => {
                    self.report();
                    return None;
                }
                Phase::Done => return None,
            }
        }
    }
}

/// Left fields, then right fields over them
fn merge(left: &Record, right: &Record) -> Record {
    left.merge(right)
}
