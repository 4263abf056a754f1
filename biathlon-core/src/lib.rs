//! Biathlon Tracker Library
//!
//! Turns a time-ordered stream of competition events into per-competitor race
//! records (laps, penalty loops, shooting accuracy, final status), a
//! human-readable race log and a final report.
//!
//! # Architecture
//!
//! - [`ingest`] reads event lines into typed [`Event`]s
//! - [`Competition`] applies events one at a time against the
//!   [`CompetitorStore`], computing lap and penalty times and emitting
//!   outgoing `Finished` / `Disqualified` events
//! - [`log_format`] renders the race log, [`report`] the final summary
//!
//! Processing is single-threaded and fail-fast: the first rejected event
//! aborts the run.
//!
//! # Example Usage
//!
//! ```no_run
//! use biathlon_core::{ingest, Competition, CompetitionConfig, ReportStyle};
//! use std::path::Path;
//!
//! let config = CompetitionConfig {
//!     laps: 2,
//!     lap_len: 3651,
//!     penalty_len: 50,
//!     firing_lines: 1,
//!     start: "09:30:00.000".to_string(),
//!     start_delta: "00:00:30.000".to_string(),
//! };
//! config.validate().unwrap();
//!
//! let events = ingest::read_events_file(Path::new("events")).unwrap();
//! let mut competition = Competition::new(config);
//! competition.apply_all(events).unwrap();
//!
//! print!("{}", competition.report(ReportStyle::default()));
//! ```

// Public modules
pub mod competitor;
pub mod config;
pub mod ingest;
pub mod interpreter;
pub mod log_format;
pub mod report;
pub mod store;
pub mod types;

// Re-export main types for convenience
pub use competitor::{Competitor, CompetitorStatus, Lap, Penalty};
pub use config::{CompetitionConfig, ConfigError};
pub use interpreter::Competition;
pub use report::ReportStyle;
pub use store::CompetitorStore;
pub use types::{
    CompetitorId, Direction, Event, EventCode, Result, Timestamp, TrackerError,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
