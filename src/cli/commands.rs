//! CLI command implementations
//!
//! Commands are thin: they read JSON Lines, build one operator pipeline from
//! the arguments and write JSON Lines. The `execute_*` functions take their
//! input and output explicitly so they can run without a terminal.

use std::io::{self, Write};
use std::sync::Arc;

use crate::aggregate::{avg, count, max, min, sum, Aggregate, AggregateFn};
use crate::config::EngineConfig;
use crate::group::GroupByFields;
use crate::join::{on_condition, on_fields, Join, JoinKind};
use crate::observability::{MetricsRegistry, ObservationScope};
use crate::pipeline::{pipe, RecordFilter};
use crate::record::{Record, RecordSeq};

use super::args::{Cli, Command, GroupByArgs, JoinArgs};
use super::errors::{CliError, CliResult};
use super::io::{init_logging, load_config, open_input, read_records, write_records};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    init_logging(cli.verbose);
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Join(args) => join(&args),
        Command::GroupBy(args) => group_by(&args),
    }
}

/// Join stdin or a file with the right-side file and write to stdout
pub fn join(args: &JoinArgs) -> CliResult<()> {
    let scope = ObservationScope::new("JOIN_COMMAND");
    let metrics = Arc::new(MetricsRegistry::new());
    let result = join_to_stdout(args, &metrics);
    finish(scope, &metrics, result)
}

fn join_to_stdout(args: &JoinArgs, metrics: &Arc<MetricsRegistry>) -> CliResult<usize> {
    let config = load_config(args.config.as_deref())?;
    let left = read_records(open_input(args.input.as_deref())?, metrics);
    let right = read_records(open_input(Some(args.right.as_path()))?, metrics);
    execute_join(args, &config, left, right, metrics, io::stdout().lock())
}

/// Group stdin or a file, aggregate each group and write to stdout
pub fn group_by(args: &GroupByArgs) -> CliResult<()> {
    let scope = ObservationScope::new("GROUP_BY_COMMAND");
    let metrics = Arc::new(MetricsRegistry::new());
    let result = group_by_to_stdout(args, &metrics);
    finish(scope, &metrics, result)
}

fn group_by_to_stdout(args: &GroupByArgs, metrics: &Arc<MetricsRegistry>) -> CliResult<usize> {
    let config = load_config(args.config.as_deref())?;
    let input = read_records(open_input(args.input.as_deref())?, metrics);
    execute_group_by(args, &config, input, metrics, io::stdout().lock())
}

fn finish(
    scope: ObservationScope,
    metrics: &MetricsRegistry,
    result: CliResult<usize>,
) -> CliResult<()> {
    match result {
        Ok(written) => {
            let written = written.to_string();
            let snapshot = metrics.to_json();
            scope.complete_with_fields(&[
                ("metrics", snapshot.as_str()),
                ("written", written.as_str()),
            ]);
            Ok(())
        }
        Err(e) => {
            scope.fail(&e.to_string());
            Err(e)
        }
    }
}

/// Builds the join described by `args` against `right`
pub fn build_join(args: &JoinArgs, config: &EngineConfig, right: RecordSeq) -> CliResult<Join> {
    let kind = JoinKind::from(args.kind);
    let any_cross_field = args.left_field.is_some() || args.right_field.is_some();
    if !args.on.is_empty() && any_cross_field {
        return Err(CliError::ConflictingJoinCondition);
    }

    let join = match (&args.left_field, &args.right_field) {
        _ if !args.on.is_empty() => Join::new(right, on_fields(args.on.clone()), kind),
        (Some(left_field), Some(right_field)) => {
            let (left_field, right_field) = (left_field.clone(), right_field.clone());
            // Different field names: compare textual forms
            let predicate = on_condition(move |l: &Record, r: &Record| {
                match (l.get_value(&left_field), r.get_value(&right_field)) {
                    (Some(l), Some(r)) => l.to_string() == r.to_string(),
                    _ => false,
                }
            });
            Join::new(right, predicate, kind)
        }
        _ => return Err(CliError::MissingJoinCondition),
    };

    Ok(join.with_config(config))
}

/// Runs a join and writes the result, returning the number of records written
pub fn execute_join<W: Write>(
    args: &JoinArgs,
    config: &EngineConfig,
    left: RecordSeq,
    right: RecordSeq,
    metrics: &Arc<MetricsRegistry>,
    out: W,
) -> CliResult<usize> {
    let join = build_join(args, config, right)?.with_metrics(Arc::clone(metrics));
    write_records(out, join.apply_seq(&left))
}

/// Result name and function for every aggregation flag, in flag order
pub fn build_aggregations(args: &GroupByArgs) -> CliResult<Vec<(String, AggregateFn)>> {
    let mut aggregations: Vec<(String, AggregateFn)> = args
        .count
        .iter()
        .map(|name| (name.clone(), count()))
        .collect();

    let with_field = [
        (FieldAggregation::Sum, &args.sum),
        (FieldAggregation::Avg, &args.avg),
        (FieldAggregation::Min, &args.min),
        (FieldAggregation::Max, &args.max),
    ];
    for (aggregation, values) in with_field {
        for pair in values.chunks_exact(2) {
            aggregations.push((pair[1].clone(), aggregation.build(&pair[0])));
        }
    }

    if aggregations.is_empty() {
        return Err(CliError::NoAggregations);
    }
    Ok(aggregations)
}

/// Aggregations that take a field argument; min and max compare as floats
#[derive(Debug, Clone, Copy)]
enum FieldAggregation {
    Sum,
    Avg,
    Min,
    Max,
}

impl FieldAggregation {
    fn build(self, field: &str) -> AggregateFn {
        match self {
            FieldAggregation::Sum => sum(field),
            FieldAggregation::Avg => avg(field),
            FieldAggregation::Min => min::<f64>(field),
            FieldAggregation::Max => max::<f64>(field),
        }
    }
}

/// Runs group-by + aggregate and writes the result
pub fn execute_group_by<W: Write>(
    args: &GroupByArgs,
    config: &EngineConfig,
    input: RecordSeq,
    metrics: &Arc<MetricsRegistry>,
    out: W,
) -> CliResult<usize> {
    if args.fields.is_empty() {
        return Err(CliError::NoGroupFields);
    }

    let sequence_field = config.group_sequence_field.as_str();
    let group = GroupByFields::new(sequence_field, args.fields.iter().cloned())
        .with_config(config)
        .with_metrics(Arc::clone(metrics));

    let aggregate = build_aggregations(args)?
        .into_iter()
        .fold(Aggregate::new(sequence_field), |agg, (name, f)| agg.with(name, f))
        .with_metrics(Arc::clone(metrics));

    write_records(out, pipe(group, aggregate).apply_seq(&input))
}
