//! JSON Lines I/O handling for the CLI
//!
//! - Input: one JSON object per line, from a file or stdin
//! - Output: one JSON object per line on stdout
//! - Malformed input lines are skipped and counted
//! - Log lines go to stderr, never mixed into output

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::observability::MetricsRegistry;
use crate::record::{write_jsonl, JsonLines, Record, RecordSeq};

use super::errors::{CliError, CliResult};

/// Opens a file, or stdin when `path` is `None` or `-`
pub fn open_input(path: Option<&Path>) -> CliResult<Box<dyn BufRead + Send>> {
    match path {
        None => Ok(Box::new(BufReader::new(io::stdin()))),
        Some(p) if p.as_os_str() == "-" => Ok(Box::new(BufReader::new(io::stdin()))),
        Some(p) => {
            let file = File::open(p).map_err(|source| CliError::Open {
                path: p.to_path_buf(),
                source,
            })?;
            Ok(Box::new(BufReader::new(file)))
        }
    }
}

/// Single-pass record sequence over JSON Lines input
pub fn read_records<R>(reader: R, metrics: &Arc<MetricsRegistry>) -> RecordSeq
where
    R: BufRead + Send + 'static,
{
    RecordSeq::once(JsonLines::new(reader).with_metrics(Arc::clone(metrics)))
}

/// Writes records as JSON Lines, returning the number written
pub fn write_records<W, I>(writer: W, records: I) -> CliResult<usize>
where
    W: Write,
    I: IntoIterator<Item = Record>,
{
    Ok(write_jsonl(writer, records)?)
}

/// Loads the configuration file if one was given
pub fn load_config(path: Option<&Path>) -> CliResult<EngineConfig> {
    match path {
        Some(p) => Ok(EngineConfig::load(p)?),
        None => Ok(EngineConfig::default()),
    }
}

/// Writes `log` records (already rendered as JSON) to stderr
struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.enabled(record.metadata()) {
            let _ = writeln!(io::stderr().lock(), "{}", record.args());
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

static STDERR_LOGGER: StderrLogger = StderrLogger;

/// Routes log lines to stderr: 0 warn, 1 info, 2 debug, 3+ trace
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    if log::set_logger(&STDERR_LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
