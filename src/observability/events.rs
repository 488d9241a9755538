//! Observable events for recordql
//!
//! Events are explicit and typed. Each has a stable string name that is
//! written as the `event` key of a log line.

use std::fmt;

use super::logger::Severity;

/// Observable events emitted by the operators and the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Engine configuration loaded
    ConfigLoaded,

    // Join
    /// Nested-loop or hash strategy chosen for a join execution
    JoinStrategySelected,
    /// Materialization / hash build of the join inputs finished
    JoinBuildComplete,
    /// Join output fully drained
    JoinComplete,

    // Grouping
    /// All groups emitted
    GroupComplete,
    /// Record excluded because a key field held a non-scalar value
    GroupRecordDropped,

    // Aggregation
    /// Aggregate output fully drained
    AggregateComplete,

    // JSON Lines
    /// Input line skipped (blank lines are not reported)
    JsonlLineSkipped,
    /// Reading input failed; the stream ends early
    JsonlReadFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::JoinStrategySelected => "JOIN_STRATEGY_SELECTED",
            Event::JoinBuildComplete => "JOIN_BUILD_COMPLETE",
            Event::JoinComplete => "JOIN_COMPLETE",

            Event::GroupComplete => "GROUP_COMPLETE",
            Event::GroupRecordDropped => "GROUP_RECORD_DROPPED",

            Event::AggregateComplete => "AGGREGATE_COMPLETE",

            Event::JsonlLineSkipped => "JSONL_LINE_SKIPPED",
            Event::JsonlReadFailed => "JSONL_READ_FAILED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::JsonlReadFailed => Severity::Warn,
            Event::GroupRecordDropped | Event::JsonlLineSkipped => Severity::Trace,
            Event::JoinBuildComplete | Event::JoinStrategySelected => Severity::Debug,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::JoinStrategySelected,
            Event::JoinBuildComplete,
            Event::JoinComplete,
            Event::GroupComplete,
            Event::GroupRecordDropped,
            Event::AggregateComplete,
            Event::JsonlLineSkipped,
            Event::JsonlReadFailed,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_event_severity() {
        assert_eq!(Event::JsonlReadFailed.severity(), Severity::Warn);
        assert_eq!(Event::GroupRecordDropped.severity(), Severity::Trace);
        assert_eq!(Event::JoinComplete.severity(), Severity::Info);
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::JoinComplete), "JOIN_COMPLETE");
    }
}
