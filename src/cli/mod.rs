//! CLI module for recordql
//!
//! Provides command-line interface for:
//! - join: Join JSON Lines input with a right-side file
//! - group-by: Group JSON Lines input and aggregate each group

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, GroupByArgs, JoinArgs, KindArg};
pub use commands::{
    build_aggregations, build_join, execute_group_by, execute_join, group_by, join, run,
    run_command,
};
pub use errors::{CliError, CliResult};
pub use io::{init_logging, load_config, open_input, read_records, write_records};
