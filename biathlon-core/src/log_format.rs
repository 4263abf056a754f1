//! Race log formatting
//!
//! Renders each accepted incoming event as one human-readable line.

use crate::types::{format_timestamp, CompetitorId, Event, EventCode, Timestamp};

/// Render the log line for an incoming event
///
/// Returns `None` for codes that have no log template (outgoing and unknown codes).
pub fn format_event(event: &Event) -> Option<String> {
    let time = format_timestamp(event.timestamp);
    let id = event.competitor;
    let extra = &event.extra;

    let sentence = match event.code {
        EventCode::Registered => format!("The competitor({}) registered", id),
        EventCode::StartTimeSet => format!(
            "The start time for the competitor({}) was set by a draw to {}",
            id, extra
        ),
        EventCode::OnStartLine => format!("The competitor({}) is on the start line", id),
        EventCode::Started => format!("The competitor({}) has started", id),
        EventCode::OnFiringRange => {
            format!("The competitor({}) is on the firing range({})", id, extra)
        }
        EventCode::TargetHit => {
            format!("The target({}) has been hit by competitor({})", extra, id)
        }
        EventCode::LeftFiringRange => format!("The competitor({}) left the firing range", id),
        EventCode::EnteredPenaltyLaps => {
            format!("The competitor({}) entered the penalty laps", id)
        }
        EventCode::LeftPenaltyLaps => format!("The competitor({}) left the penalty laps", id),
        EventCode::EndedMainLap => format!("The competitor({}) ended the main lap", id),
        EventCode::CannotContinue => format!("The competitor({}) can't continue: {}", id, extra),
        EventCode::Disqualified | EventCode::Finished | EventCode::Other(_) => return None,
    };

    Some(format!("[{}] {}", time, sentence))
}

/// Line logged when a competitor completes the final lap
pub fn format_finished(timestamp: Timestamp, competitor: CompetitorId) -> String {
    format!(
        "[{}] The competitor({}) has finished",
        format_timestamp(timestamp),
        competitor
    )
}
