//! CLI argument definitions using clap
//!
//! Commands:
//! - recordql join --right <file> (--on <field>... | --left-field <f> --right-field <f>) [INPUT]
//! - recordql group-by <FIELD>... (--count <name> | --sum <field> <name> | ...)

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::join::JoinKind;

/// recordql - joins, grouping and aggregation over JSON Lines records
#[derive(Parser, Debug)]
#[command(name = "recordql")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log to stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Join JSON Lines input (left) with a JSON Lines file (right)
    Join(JoinArgs),

    /// Group JSON Lines input by fields and aggregate each group
    GroupBy(GroupByArgs),
}

#[derive(Args, Debug, Clone)]
pub struct JoinArgs {
    /// Right-side JSON Lines file
    #[arg(short, long)]
    pub right: PathBuf,

    /// Join on equality of this field (repeatable or comma separated)
    #[arg(long, value_delimiter = ',')]
    pub on: Vec<String>,

    /// Left field compared with --right-field by textual value
    #[arg(long)]
    pub left_field: Option<String>,

    /// Right field compared with --left-field by textual value
    #[arg(long)]
    pub right_field: Option<String>,

    /// Join type
    #[arg(short = 't', long = "type", value_enum, default_value_t = KindArg::Inner)]
    pub kind: KindArg,

    /// Path to engine configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Left-side JSON Lines file (stdin if omitted or "-")
    pub input: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct GroupByArgs {
    /// Fields to group by
    pub fields: Vec<String>,

    /// Count members into <NAME>
    #[arg(long, value_name = "NAME")]
    pub count: Vec<String>,

    /// Sum <FIELD> into <NAME>
    #[arg(long, num_args = 2, value_names = ["FIELD", "NAME"])]
    pub sum: Vec<String>,

    /// Average <FIELD> into <NAME>
    #[arg(long, num_args = 2, value_names = ["FIELD", "NAME"])]
    pub avg: Vec<String>,

    /// Minimum of <FIELD> into <NAME>
    #[arg(long, num_args = 2, value_names = ["FIELD", "NAME"])]
    pub min: Vec<String>,

    /// Maximum of <FIELD> into <NAME>
    #[arg(long, num_args = 2, value_names = ["FIELD", "NAME"])]
    pub max: Vec<String>,

    /// Path to engine configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// JSON Lines input file (stdin if omitted or "-")
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}

/// Join type as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Inner,
    Left,
    Right,
    Full,
}

impl From<KindArg> for JoinKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Inner => JoinKind::Inner,
            KindArg::Left => JoinKind::Left,
            KindArg::Right => JoinKind::Right,
            KindArg::Full => JoinKind::Full,
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
