//! Operator abstraction and composition
//!
//! Every operator is a `RecordFilter`: it turns one record stream into
//! another. Filters do no work when applied; records are pulled through the
//! returned iterator one at a time, so dropping it stops the whole pipeline.

use crate::record::{RecordSeq, RecordStream};

/// A stream-to-stream record transformation
pub trait RecordFilter: Send + Sync {
    /// Wraps `input` in this operator
    fn apply(&self, input: RecordStream) -> RecordStream;

    /// Starts a pass over `seq` and wraps it in this operator
    fn apply_seq(&self, seq: &RecordSeq) -> RecordStream {
        self.apply(seq.iter())
    }
}

/// Adapts a plain function into a filter
pub struct FnFilter<F> {
    f: F,
}

/// Wraps `f` as a `RecordFilter`
pub fn filter_fn<F>(f: F) -> FnFilter<F>
where
    F: Fn(RecordStream) -> RecordStream + Send + Sync,
{
    FnFilter { f }
}

impl<F> RecordFilter for FnFilter<F>
where
    F: Fn(RecordStream) -> RecordStream + Send + Sync,
{
    fn apply(&self, input: RecordStream) -> RecordStream {
        (self.f)(input)
    }
}

/// Filters applied in sequence; empty applies the identity
#[derive(Default)]
pub struct Chain {
    filters: Vec<Box<dyn RecordFilter>>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a filter to the end of the chain
    pub fn then(mut self, filter: impl RecordFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl RecordFilter for Chain {
    fn apply(&self, input: RecordStream) -> RecordStream {
        self.filters
            .iter()
            .fold(input, |stream, filter| filter.apply(stream))
    }
}

/// Composes two filters: `second(first(input))`
pub fn pipe(first: impl RecordFilter + 'static, second: impl RecordFilter + 'static) -> Chain {
    Chain::new().then(first).then(second)
}

/// Composes any number of filters in order
pub fn chain(filters: Vec<Box<dyn RecordFilter>>) -> Chain {
    Chain { filters }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    fn numbered(n: i64) -> RecordSeq {
        RecordSeq::from_vec((0..n).map(|i| Record::from_pairs([("n", i)])).collect())
    }

    fn keep_even() -> impl RecordFilter {
        filter_fn(|input: RecordStream| {
            Box::new(input.filter(|r| r.get::<i64>("n").unwrap_or(1) % 2 == 0)) as RecordStream
        })
    }

    fn take(n: usize) -> impl RecordFilter {
        filter_fn(move |input: RecordStream| Box::new(input.take(n)) as RecordStream)
    }

    #[test]
    fn test_empty_chain_is_identity() {
        let out: Vec<Record> = Chain::new().apply_seq(&numbered(3)).collect();
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_pipe_applies_in_order() {
        let out: Vec<Record> = pipe(keep_even(), take(2)).apply_seq(&numbered(10)).collect();
        let ns: Vec<i64> = out.iter().filter_map(|r| r.get::<i64>("n")).collect();
        assert_eq!(ns, vec![0, 2]);
    }

    #[test]
    fn test_chain_pulls_lazily_from_infinite_source() {
        let infinite = RecordSeq::from_fn(|| (0i64..).map(|i| Record::from_pairs([("n", i)])));
        let filters: Vec<Box<dyn RecordFilter>> = vec![Box::new(keep_even()), Box::new(take(3))];
        let pipeline = chain(filters);
        assert_eq!(pipeline.len(), 2);

        let out: Vec<Record> = pipeline.apply_seq(&infinite).collect();
        assert_eq!(out.len(), 3);
        assert_eq!(out[2].get::<i64>("n"), Some(4));
    }
}
