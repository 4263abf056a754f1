//! Competition configuration
//!
//! Immutable race parameters handed to the interpreter. The application layer
//! deserializes this from JSON; the library only validates and exposes the
//! parsed time values.

use crate::types::{parse_timestamp, Timestamp, TrackerError};
use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid number of laps: {0}")]
    InvalidLaps(i64),

    #[error("invalid lap length: {0}")]
    InvalidLapLen(i64),

    #[error("invalid penalty length: {0}")]
    InvalidPenaltyLen(i64),

    #[error("invalid number of firing lines: {0}")]
    InvalidFiringLines(i64),

    #[error("invalid {field} time format: {value:?} (expected HH:MM:SS.mmm)")]
    InvalidTime { field: &'static str, value: String },
}

impl From<ConfigError> for TrackerError {
    fn from(e: ConfigError) -> Self {
        TrackerError::ConfigInvalid(e.to_string())
    }
}

/// Competition parameters
///
/// Numeric fields are signed so that a negative value in the source file is
/// reported by [`CompetitionConfig::validate`] instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionConfig {
    /// Number of main laps
    pub laps: i64,
    /// Length of one main lap (meters)
    pub lap_len: i64,
    /// Length of one penalty loop (meters)
    pub penalty_len: i64,
    /// Number of firing lines on the range
    pub firing_lines: i64,
    /// Scheduled start of the first competitor (`HH:MM:SS.mmm`)
    pub start: String,
    /// Interval between scheduled starts (`HH:MM:SS.mmm`)
    pub start_delta: String,
}

impl CompetitionConfig {
    /// Check every numeric field is positive and both time strings parse
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.laps <= 0 {
            return Err(ConfigError::InvalidLaps(self.laps));
        }
        if self.lap_len <= 0 {
            return Err(ConfigError::InvalidLapLen(self.lap_len));
        }
        if self.penalty_len <= 0 {
            return Err(ConfigError::InvalidPenaltyLen(self.penalty_len));
        }
        if self.firing_lines <= 0 {
            return Err(ConfigError::InvalidFiringLines(self.firing_lines));
        }

        self.start_time()?;
        self.start_delta()?;

        Ok(())
    }

    /// Scheduled start as a time of day
    pub fn start_time(&self) -> Result<Timestamp, ConfigError> {
        parse_timestamp(&self.start).ok_or_else(|| ConfigError::InvalidTime {
            field: "start",
            value: self.start.clone(),
        })
    }

    /// Start interval, read as a time of day and measured from midnight
    pub fn start_delta(&self) -> Result<Duration, ConfigError> {
        parse_timestamp(&self.start_delta)
            .map(|t| t.signed_duration_since(NaiveTime::MIN))
            .ok_or_else(|| ConfigError::InvalidTime {
                field: "startDelta",
                value: self.start_delta.clone(),
            })
    }

    /// Configured number of laps as a lap count
    pub fn lap_count(&self) -> usize {
        usize::try_from(self.laps).unwrap_or(0)
    }
}
