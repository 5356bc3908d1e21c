use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, ValueEnum};
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use tracing::{debug, warn};

use gridfilter::combinator::FilterCombinator;
use gridfilter::config::Config;
use gridfilter::core::LogicalOperator;
use gridfilter::filters::{DefaultFilterFactory, GridFilter, StrategyKind};
use gridfilter::scanner::{DistinctScan, DistinctValueScanner};
use gridfilter::view::{DataView, FrameView};

/// Filter a CSV file with per-column filter fragments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV file with a header row
    #[arg(value_name = "CSV")]
    csv: PathBuf,
    /// Column filter fragment, restored through the column's strategy. Repeatable.
    /// Example: --where "size=[size] > 10"
    #[arg(long = "where", value_name = "COLUMN=PREDICATE")]
    filters: Vec<String>,
    /// Base filter of the table
    #[arg(long = "base", value_name = "PREDICATE")]
    base: Option<String>,
    /// Override filter ANDed on top of everything else
    #[arg(long = "custom", value_name = "PREDICATE")]
    custom: Option<String>,
    /// Operator joining the column fragments (and, or)
    #[arg(long = "operator")]
    operator: Option<LogicalOperator>,
    /// Print the distinct values of a column. Repeatable.
    #[arg(long = "distinct", value_name = "COLUMN")]
    distinct: Vec<String>,
    /// Force a strategy for a column, e.g. --strategy kind=distinct. Repeatable.
    #[arg(long = "strategy", value_name = "COLUMN=KIND")]
    strategies: Vec<String>,
    /// Number of matching rows to print
    #[arg(long = "rows", default_value_t = 10)]
    rows: usize,
    /// Remember the column filters of this table between runs
    #[arg(long = "keep")]
    keep: bool,
    /// Enable file logging at the given level (overrides RUST_LOG)
    #[arg(long = "logging", value_enum)]
    logging: Option<LogLevel>,
    /// Path to a config file (layered over the default config discovery)
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum LogLevel { Error, Warn, Info, Debug, Trace }

fn split_assignment(raw: &str) -> Result<(&str, &str)> {
    raw.split_once('=')
        .map(|(column, value)| (column.trim(), value.trim()))
        .filter(|(column, _)| !column.is_empty())
        .ok_or_else(|| eyre!("Expected COLUMN=VALUE, got '{raw}'"))
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let cwd = std::env::current_dir()?;
    let log_path = cwd.join(gridfilter::logging::LOG_FILE.clone());
    let level = match args.logging {
        Some(LogLevel::Error) => Some(tracing::Level::ERROR),
        Some(LogLevel::Warn)  => Some(tracing::Level::WARN),
        Some(LogLevel::Info)  => Some(tracing::Level::INFO),
        Some(LogLevel::Debug) => Some(tracing::Level::DEBUG),
        Some(LogLevel::Trace) => Some(tracing::Level::TRACE),
        None => None,
    };
    gridfilter::logging::init_with(Some(log_path), level)?;

    let config = Config::from_path(args.config.as_ref()).wrap_err("Failed to load configuration")?;
    let mut settings = config.filters.clone();
    if args.keep {
        settings.keep_filters = true;
    }

    let view = FrameView::from_csv(&args.csv)
        .wrap_err_with(|| format!("Failed to read {}", args.csv.display()))?
        .with_case_sensitive(settings.case_sensitive);
    debug!("Loaded {} with {} rows", view.table_id(), view.row_count());

    let mut factory = DefaultFilterFactory::from_settings(&settings);
    for raw in &args.strategies {
        let (column, kind) = split_assignment(raw)?;
        let kind = StrategyKind::from_str(kind).map_err(|_| eyre!("Unknown strategy kind '{kind}'"))?;
        factory.set_override(column, kind);
    }

    let mut combinator = FilterCombinator::with_factory(view, &settings, Box::new(factory));

    let snapshot_path = config.snapshot_path();
    if args.keep && snapshot_path.exists() {
        combinator.memory_mut().load(&snapshot_path)?;
        combinator.on_data_source_changed();
    }

    combinator.begin_update();
    if let Some(operator) = args.operator {
        combinator.set_operator(operator);
    }
    for raw in &args.filters {
        let (column, predicate) = split_assignment(raw)?;
        combinator.edit_filter(column, |strategy| strategy.set_filter(predicate))?;
        if !combinator.filter(column).is_some_and(|s| s.has_filter()) {
            warn!("Filter for '{column}' was not understood: {predicate}");
            eprintln!("Ignoring filter for '{column}': {predicate}");
        }
    }
    if let Some(base) = &args.base {
        combinator.set_base_filter(base.as_str());
    }
    if let Some(custom) = &args.custom {
        combinator.set_custom_filter(custom.as_str());
    }
    combinator.end_update();
    combinator.refresh_filters();

    let scanner = DistinctValueScanner::new(settings.distinct_value_cap);
    for column in &args.distinct {
        match scanner.scan(combinator.view(), column)? {
            DistinctScan::Values { values, contains_null } => {
                println!("Distinct values of {column}:");
                for value in values {
                    println!("  {value}");
                }
                if contains_null {
                    println!("  (null)");
                }
            }
            DistinctScan::Unavailable => {
                println!("{column} has more distinct values than the configured cap");
            }
        }
    }

    let view = combinator.view();
    let predicate = view.predicate();
    println!("Filter: {}", if predicate.is_empty() { "(none)" } else { predicate });
    println!("Matching rows: {}", view.row_count());
    println!("{}", view.filtered_frame()?.head(Some(args.rows)));

    if args.keep {
        combinator.memory().save(&snapshot_path)?;
    }
    Ok(())
}
