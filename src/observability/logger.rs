//! Structured JSON logger for recordql
//!
//! - One log line = one event
//! - `event` first, then `severity`, then fields sorted by key
//! - Lines go through the `log` facade under the `recordql` target, so
//!   nothing is rendered unless the host enables that level

use std::fmt;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Per-record detail
    Trace = 0,
    /// Per-operator detail
    Debug = 1,
    /// Normal operations
    Info = 2,
    /// Recoverable issues
    Warn = 3,
    /// Operation failures
    Error = 4,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }

    fn level(&self) -> log::Level {
        match self {
            Severity::Trace => log::Level::Trace,
            Severity::Debug => log::Level::Debug,
            Severity::Info => log::Level::Info,
            Severity::Warn => log::Level::Warn,
            Severity::Error => log::Level::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

const TARGET: &str = "recordql";

/// A structured logger that renders JSON lines
pub struct Logger;

impl Logger {
    /// Log an event with the given severity and fields
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        let level = severity.level();
        if !log::log_enabled!(target: TARGET, level) {
            return;
        }
        let line = Self::render(severity, event, fields);
        log::log!(target: TARGET, level, "{}", line);
    }

    /// Renders one log line (without trailing newline)
    pub fn render(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
        let mut output = String::with_capacity(128);

        output.push_str("{\"event\":");
        push_json_str(&mut output, event);
        output.push_str(",\"severity\":");
        push_json_str(&mut output, severity.as_str());

        let mut sorted: Vec<&(&str, &str)> = fields.iter().collect();
        sorted.sort_by_key(|(k, _)| *k);

        for (key, value) in sorted {
            output.push(',');
            push_json_str(&mut output, key);
            output.push(':');
            push_json_str(&mut output, value);
        }

        output.push('}');
        output
    }

    pub fn trace(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Trace, event, fields);
    }

    pub fn debug(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Debug, event, fields);
    }

    pub fn info(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Info, event, fields);
    }

    pub fn warn(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, event, fields);
    }

    pub fn error(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Error, event, fields);
    }
}

fn push_json_str(output: &mut String, s: &str) {
    match serde_json::to_string(s) {
        Ok(quoted) => output.push_str(&quoted),
        Err(_) => output.push_str("\"\""),
    }
}
