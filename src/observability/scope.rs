//! ObservationScope for begin/complete logging around a unit of work
//!
//! - Logs `{name}_BEGIN` on creation
//! - Logs `{name}_COMPLETE` (with `elapsed_ms`) when completed
//! - Logs `{name}_FAILED` when failed
//! - Logs `{name}_INCOMPLETE` if dropped without either

use std::cell::Cell;
use std::time::Instant;

use super::logger::Logger;

/// A scope that logs start and completion of a unit of work
///
/// ```ignore
/// let scope = ObservationScope::new("JOIN_COMMAND");
/// // ... do work ...
/// scope.complete_with_fields(&[("records", "42")]);
/// ```
pub struct ObservationScope {
    name: String,
    completed: Cell<bool>,
    timer: Timer,
}

impl ObservationScope {
    /// Create a new observation scope, logging `{name}_BEGIN`
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Logger::info(&format!("{}_BEGIN", name), &[]);

        Self {
            name,
            completed: Cell::new(false),
            timer: Timer::new(),
        }
    }

    /// Mark the scope as successfully completed
    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    /// Mark the scope as successfully completed with additional fields
    pub fn complete_with_fields(self, fields: &[(&str, &str)]) {
        self.completed.set(true);
        let elapsed = self.timer.elapsed_ms();

        let mut all_fields: Vec<(&str, &str)> = vec![("elapsed_ms", elapsed.as_str())];
        all_fields.extend(fields.iter().copied());

        Logger::info(&format!("{}_COMPLETE", self.name), &all_fields);
    }

    /// Mark the scope as failed with a reason
    pub fn fail(self, reason: &str) {
        self.completed.set(true);
        Logger::error(&format!("{}_FAILED", self.name), &[("reason", reason)]);
    }

    pub fn is_completed(&self) -> bool {
        self.completed.get()
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        if !self.completed.get() {
            Logger::warn(
                &format!("{}_INCOMPLETE", self.name),
                &[("reason", "scope dropped without completion")],
            );
        }
    }
}

/// A simple duration timer for logging elapsed time
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed milliseconds as a string
    pub fn elapsed_ms(&self) -> String {
        self.start.elapsed().as_millis().to_string()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
