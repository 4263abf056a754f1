//! Biathlon Tracker CLI Application
//!
//! Command-line front end for the biathlon-core library:
//! - Loads and validates the JSON competition configuration
//! - Reads the events file
//! - Runs every event through the race interpreter
//! - Prints the race log (optional) and the final report

use anyhow::{Context, Result};
use biathlon_core::{ingest, Competition, ReportStyle};
use clap::Parser;
use std::path::PathBuf;

mod config;

/// Biathlon Tracker - Build race results from competition events
#[derive(Parser, Debug)]
#[command(name = "biathlon-tracker")]
#[command(about = "Process biathlon competition events and print the final report", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the competition configuration (JSON)
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Path to the events file
    #[arg(value_name = "EVENTS")]
    events: PathBuf,

    /// Print the race log before the report
    #[arg(long)]
    log: bool,

    /// Name every competitor status in the report instead of collapsing to "Finished"
    #[arg(long)]
    exhaustive_status: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all diagnostics except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Biathlon Tracker CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using core library v{}", biathlon_core::VERSION);

    run(&args)
}

/// Load configuration and events, process the race, print results
fn run(args: &Args) -> Result<()> {
    log::info!("Loading configuration from: {:?}", args.config);
    let config = config::load_config(&args.config)?;

    let events = ingest::read_events_file(&args.events)
        .with_context(|| format!("Failed to load events file: {:?}", args.events))?;

    let mut competition = Competition::new(config);
    competition
        .apply_all(events)
        .context("Failed to process events")?;

    if args.log {
        print!("{}", competition.event_log());
        println!();
    }

    let style = if args.exhaustive_status {
        ReportStyle::Exhaustive
    } else {
        ReportStyle::Compatible
    };
    print!("{}", competition.report(style));

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
