//! Competitor race record
//!
//! One record per registered competitor. The record only knows how to append
//! laps, penalties and shots; which event triggers what lives in the interpreter.

use crate::types::{CompetitorId, Timestamp};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a competitor currently is in the race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompetitorStatus {
    Registered,
    OnStartLine,
    Racing,
    OnFiringRange,
    OnPenaltyLaps,
    Finished,
    Disqualified,
    NotStarted,
    NotFinished,
}

impl CompetitorStatus {
    /// True once the competitor can no longer change status
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CompetitorStatus::Finished
                | CompetitorStatus::Disqualified
                | CompetitorStatus::NotFinished
        )
    }
}

impl fmt::Display for CompetitorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompetitorStatus::Registered => "Registered",
            CompetitorStatus::OnStartLine => "OnStartLine",
            CompetitorStatus::Racing => "Racing",
            CompetitorStatus::OnFiringRange => "OnFiringRange",
            CompetitorStatus::OnPenaltyLaps => "OnPenaltyLaps",
            CompetitorStatus::Finished => "Finished",
            CompetitorStatus::Disqualified => "Disqualified",
            CompetitorStatus::NotStarted => "NotStarted",
            CompetitorStatus::NotFinished => "NotFinished",
        };
        write!(f, "{}", name)
    }
}

/// A completed main lap
#[derive(Debug, Clone, PartialEq)]
pub struct Lap {
    pub duration: Duration,
    /// Average speed in meters per second
    pub speed: f64,
    /// Position of the lap in the competitor's lap list
    pub index: usize,
}

/// A completed penalty loop
#[derive(Debug, Clone, PartialEq)]
pub struct Penalty {
    pub duration: Duration,
    /// Average speed in meters per second
    pub speed: f64,
}

/// Mutable race state of a single competitor
#[derive(Debug, Clone, PartialEq)]
pub struct Competitor {
    pub id: CompetitorId,
    pub status: CompetitorStatus,
    /// Timestamp of the `Started` event
    pub actual_start: Option<Timestamp>,
    /// Start time assigned by the draw
    pub planned_start: Option<Timestamp>,
    pub laps: Vec<Lap>,
    pub penalties: Vec<Penalty>,
    /// Number of laps completed so far
    pub current_lap: usize,
    /// Accumulator the interpreter measures lap and penalty deltas against
    pub running_total: Duration,
    pub shots: u32,
    pub hits: u32,
    /// Reason given when the competitor could not continue
    pub comment: String,
}

impl Competitor {
    /// Create a freshly registered competitor
    pub fn new(id: CompetitorId) -> Self {
        Self {
            id,
            status: CompetitorStatus::Registered,
            actual_start: None,
            planned_start: None,
            laps: Vec::new(),
            penalties: Vec::new(),
            current_lap: 0,
            running_total: Duration::zero(),
            shots: 0,
            hits: 0,
            comment: String::new(),
        }
    }

    /// Append a completed lap and add its duration to the running total
    pub fn add_lap(&mut self, duration: Duration, speed: f64) {
        self.laps.push(Lap {
            duration,
            speed,
            index: self.laps.len(),
        });
        self.current_lap += 1;
        self.running_total = self.running_total + duration;
    }

    /// Append a completed penalty loop and add its duration to the running total
    pub fn add_penalty(&mut self, duration: Duration, speed: f64) {
        self.penalties.push(Penalty { duration, speed });
        self.running_total = self.running_total + duration;
    }

    pub fn record_shot(&mut self, hit: bool) {
        self.shots += 1;
        if hit {
            self.hits += 1;
        }
    }

    /// Sum of all completed lap durations
    pub fn total_lap_time(&self) -> Duration {
        self.laps
            .iter()
            .fold(Duration::zero(), |acc, lap| acc + lap.duration)
    }
}
