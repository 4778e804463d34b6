//! CLI entry point for journey-history analysis.

use anyhow::{Result, anyhow};
use clap::Parser;
use journey_history::config::{DEFAULT_FOLDER, DEFAULT_PATTERN};
use journey_history::utils::{
    DURATION, END_STATION, END_TIMESTAMP, START_STATION, START_TIMESTAMP,
};
use journey_history::{
    ClassifierConfig, CorpusConfig, JourneySummary, QueryOptions, TextHistogram, analyze_with,
    query_journeys_with,
};
use polars::prelude::*;
use tracing::{debug, error};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Rail journey analysis for smart-card journey history exports",
    long_about = "Loads every CSV export in a folder whose name contains a pattern, \
                  extracts rail journeys with their durations and filters them by \
                  start and end station.\n\n\
                  EXAMPLES:\n  \
                  # All journeys in ./data/*journeys*.csv\n  \
                  journey-history\n\n  \
                  # Bank to Waterloo, with a duration histogram\n  \
                  journey-history --from Bank --to Waterloo --plot\n\n  \
                  # Machine-readable summary of another folder\n  \
                  journey-history --data exports/ --pattern history --json"
)]
struct Args {
    /// Folder containing the journey history CSV exports
    #[arg(short, long, default_value = DEFAULT_FOLDER)]
    data: String,

    /// Substring a file name must contain to be loaded
    #[arg(short, long, default_value = DEFAULT_PATTERN)]
    pattern: String,

    /// Start station pattern (regular expression)
    #[arg(long, default_value = ".")]
    from: String,

    /// End station pattern (regular expression)
    #[arg(long, default_value = ".")]
    to: String,

    /// Plot a histogram of journey durations
    #[arg(long)]
    plot: bool,

    /// Suppress progress output and the station listing
    #[arg(short, long)]
    quiet: bool,

    /// Keep rows that appear identically in several files
    #[arg(long)]
    keep_duplicates: bool,

    /// Split ambiguous descriptions at the first " to " instead of failing
    #[arg(long)]
    lenient: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Output the journey summary as JSON to stdout instead of the table
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// Disabled entirely when `json_output` is set so stdout only carries JSON.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);
    debug!("{:?}", args);

    let corpus = CorpusConfig::builder()
        .folder(&args.data)
        .pattern(&args.pattern)
        .deduplicate(!args.keep_duplicates)
        .build()?;
    let classifier = ClassifierConfig {
        strict_split: !args.lenient,
    };

    let journeys = analyze_with(&corpus, &classifier).map_err(|e| {
        error!("Analysis failed [{}]: {}", e.error_code(), e);
        if e.is_user_input() {
            error!("Check --data and --pattern (currently '{}', '{}')", args.data, args.pattern);
        }
        anyhow!(e)
    })?;

    // The histogram goes to stderr when stdout is reserved for JSON
    let visualizer = if args.json {
        TextHistogram::new(std::io::stderr())
    } else {
        TextHistogram::stdout()
    };
    let options = QueryOptions::default()
        .quiet(args.quiet || args.json)
        .plot(args.plot);
    let matched = query_journeys_with(&journeys, &args.from, &args.to, options, &visualizer)?;

    let summary = JourneySummary::from_frame(&matched)?;
    if args.json {
        println!("{}", summary.to_json()?);
    } else {
        print_report(&matched, &summary)?;
    }

    Ok(())
}

/// Print the matched journeys and their summary.
fn print_report(matched: &DataFrame, summary: &JourneySummary) -> Result<()> {
    let table = matched.select([
        START_STATION,
        END_STATION,
        START_TIMESTAMP,
        END_TIMESTAMP,
        DURATION,
    ])?;

    println!("{table}");
    println!();
    println!("{summary}");
    Ok(())
}
