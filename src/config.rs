//! Engine configuration
//!
//! A JSON file; every field is optional. Unknown fields are rejected so a
//! misspelled option fails loudly instead of silently keeping its default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{QueryError, QueryResult};
use crate::observability::{log_event_with_fields, Event};

/// Operator tuning and CLI defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Allow the hash strategy when a predicate exposes a key extractor.
    /// When false every join runs nested-loop.
    #[serde(default = "default_hash_join_enabled")]
    pub hash_join_enabled: bool,

    /// Name of the sequence field written by group-by and read by aggregate
    #[serde(default = "default_group_sequence_field")]
    pub group_sequence_field: String,

    /// Emit per-record trace events from operators
    #[serde(default)]
    pub trace_operators: bool,
}

fn default_hash_join_enabled() -> bool {
    true
}
fn default_group_sequence_field() -> String {
    "_group".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hash_join_enabled: default_hash_join_enabled(),
            group_sequence_field: default_group_sequence_field(),
            trace_operators: false,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file and validate it
    pub fn load(path: &Path) -> QueryResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            QueryError::config_invalid(format!("Failed to read config {}: {}", path.display(), e))
                .with_source(e)
        })?;

        let config = Self::from_json(&content)?;

        let path_str = path.display().to_string();
        log_event_with_fields(
            Event::ConfigLoaded,
            &[
                ("hash_join_enabled", bool_str(config.hash_join_enabled)),
                ("path", path_str.as_str()),
            ],
        );

        Ok(config)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(content: &str) -> QueryResult<Self> {
        let config: EngineConfig = serde_json::from_str(content).map_err(|e| {
            QueryError::config_invalid(format!("Invalid config JSON: {}", e)).with_source(e)
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> QueryResult<()> {
        if self.group_sequence_field.trim().is_empty() {
            return Err(QueryError::config_invalid(
                "group_sequence_field must not be empty",
            ));
        }
        Ok(())
    }
}

fn bool_str(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}
