//! Core types for the biathlon tracker library
//!
//! This module defines the event model fed into the interpreter, the timestamp
//! helpers shared by every component, and the library error type.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp type used throughout the tracker (time of day, millisecond precision)
pub type Timestamp = NaiveTime;

/// Competitor identifier, assigned externally by the event source
pub type CompetitorId = u32;

/// Result type for tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;

/// `HH:MM:SS.mmm`, the only time format accepted on input and used on output
pub const TIME_FORMAT: &str = "%H:%M:%S%.3f";

const TIME_LEN: usize = "HH:MM:SS.mmm".len();

/// Parse a `HH:MM:SS.mmm` string into a timestamp
///
/// Exactly three fractional digits are required; `10:00:00`, `25:00:00.000`
/// and the leap second `10:00:60.000` are all rejected.
pub fn parse_timestamp(s: &str) -> Option<Timestamp> {
    if s.len() != TIME_LEN {
        return None;
    }
    NaiveTime::parse_from_str(s, TIME_FORMAT)
        .ok()
        .filter(|ts| ts.nanosecond() < 1_000_000_000)
}

/// Render a timestamp as `HH:MM:SS.mmm`
pub fn format_timestamp(ts: Timestamp) -> String {
    ts.format(TIME_FORMAT).to_string()
}

/// Errors that can occur while loading or interpreting a race
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("Invalid event on line {line}: {reason}")]
    EventFieldInvalid { line: usize, reason: String },

    #[error("Invalid event direction: {direction} event {code} for competitor {competitor}")]
    InvalidDirection {
        direction: Direction,
        code: EventCode,
        competitor: CompetitorId,
    },

    #[error("Competitor {0} not registered")]
    NotRegistered(CompetitorId),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Whether an event came from the event source or was produced by the interpreter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Incoming => write!(f, "incoming"),
            Direction::Outgoing => write!(f, "outgoing"),
        }
    }
}

/// Event codes carried on the wire
///
/// Codes 1-11 arrive from the event source, 32 and 33 are produced by the
/// interpreter. Anything else is kept as `Other` so it still lands in the
/// event history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCode {
    Registered,
    StartTimeSet,
    OnStartLine,
    Started,
    OnFiringRange,
    TargetHit,
    LeftFiringRange,
    EnteredPenaltyLaps,
    LeftPenaltyLaps,
    EndedMainLap,
    CannotContinue,
    Disqualified,
    Finished,
    Other(u32),
}

impl EventCode {
    /// Numeric code as it appears in an event line
    pub fn id(self) -> u32 {
        match self {
            EventCode::Registered => 1,
            EventCode::StartTimeSet => 2,
            EventCode::OnStartLine => 3,
            EventCode::Started => 4,
            EventCode::OnFiringRange => 5,
            EventCode::TargetHit => 6,
            EventCode::LeftFiringRange => 7,
            EventCode::EnteredPenaltyLaps => 8,
            EventCode::LeftPenaltyLaps => 9,
            EventCode::EndedMainLap => 10,
            EventCode::CannotContinue => 11,
            EventCode::Disqualified => 32,
            EventCode::Finished => 33,
            EventCode::Other(id) => id,
        }
    }

    /// True for codes the interpreter itself emits
    pub fn is_outgoing(self) -> bool {
        matches!(self, EventCode::Disqualified | EventCode::Finished)
    }
}

impl From<u32> for EventCode {
    fn from(id: u32) -> Self {
        match id {
            1 => EventCode::Registered,
            2 => EventCode::StartTimeSet,
            3 => EventCode::OnStartLine,
            4 => EventCode::Started,
            5 => EventCode::OnFiringRange,
            6 => EventCode::TargetHit,
            7 => EventCode::LeftFiringRange,
            8 => EventCode::EnteredPenaltyLaps,
            9 => EventCode::LeftPenaltyLaps,
            10 => EventCode::EndedMainLap,
            11 => EventCode::CannotContinue,
            32 => EventCode::Disqualified,
            33 => EventCode::Finished,
            other => EventCode::Other(other),
        }
    }
}

impl fmt::Display for EventCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// A single race event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Time of day the event happened
    pub timestamp: Timestamp,
    /// Source of the event
    pub direction: Direction,
    /// What happened
    pub code: EventCode,
    /// Competitor the event refers to
    pub competitor: CompetitorId,
    /// Trailing free-text field (drawn start time, range/target number, reason)
    pub extra: String,
}

impl Event {
    /// Create an event as read from the event source
    pub fn incoming(
        timestamp: Timestamp,
        code: EventCode,
        competitor: CompetitorId,
        extra: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            direction: Direction::Incoming,
            code,
            competitor,
            extra: extra.into(),
        }
    }

    /// Create an event produced by the interpreter
    pub fn outgoing(
        timestamp: Timestamp,
        code: EventCode,
        competitor: CompetitorId,
        extra: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            direction: Direction::Outgoing,
            code,
            competitor,
            extra: extra.into(),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}",
            format_timestamp(self.timestamp),
            self.code,
            self.competitor
        )?;
        if !self.extra.is_empty() {
            write!(f, " {}", self.extra)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_parsing() {
        let ts = parse_timestamp("10:00:00.000").unwrap();
        assert_eq!(ts, NaiveTime::from_hms_milli_opt(10, 0, 0, 0).unwrap());
        assert_eq!(format_timestamp(ts), "10:00:00.000");

        assert!(parse_timestamp("10:00:00").is_none());
        assert!(parse_timestamp("25:00:00.000").is_none());
        assert!(parse_timestamp("10:00:60.000").is_none());
        assert!(parse_timestamp("23:59:60.999").is_none());
        assert!(parse_timestamp("23:59:59.999").is_some());
        assert!(parse_timestamp("10:00:00.0000").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_event_code_mapping() {
        for id in (1..=11).chain([32, 33]) {
            let code = EventCode::from(id);
            assert!(!matches!(code, EventCode::Other(_)));
            assert_eq!(code.id(), id);
        }
        assert_eq!(EventCode::from(12), EventCode::Other(12));
        assert!(EventCode::Finished.is_outgoing());
        assert!(!EventCode::EndedMainLap.is_outgoing());
    }

    #[test]
    fn test_event_display() {
        let ts = parse_timestamp("09:05:59.867").unwrap();
        let event = Event::incoming(ts, EventCode::OnFiringRange, 1, "1");
        assert_eq!(event.to_string(), "[09:05:59.867] 5 1 1");

        let finished = Event::outgoing(ts, EventCode::Finished, 1, "");
        assert_eq!(finished.to_string(), "[09:05:59.867] 33 1");
    }
}
