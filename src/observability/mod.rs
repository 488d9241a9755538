//! Observability subsystem for recordql
//!
//! This module provides:
//! - Structured logging (JSON lines through the `log` facade)
//! - Operator metrics
//! - Begin/complete scopes for CLI commands
//!
//! # Principles
//!
//! 1. Observability is read-only: it never changes operator output
//! 2. No background threads
//! 3. Deterministic line format
//! 4. Nothing is rendered for disabled levels
//!
//! # Usage
//!
//! ```ignore
//! use recordql::observability::{log_event_with_fields, Event, MetricsRegistry};
//!
//! log_event_with_fields(Event::JoinComplete, &[("emitted", "42")]);
//!
//! let metrics = Arc::new(MetricsRegistry::new());
//! let joined = inner_join(right, on_fields(["id"])).with_metrics(Arc::clone(&metrics));
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::{ObservationScope, Timer};

/// Log a typed event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a typed event with fields at its own severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
