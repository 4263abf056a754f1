//! Event file parser
//!
//! Reads the textual event source, one event per line:
//!
//! ```text
//! [09:05:59.867] 1 1
//! [09:15:00.841] 2 1 09:30:00.000
//! [09:59:45.000] 11 1 Lost in the forest
//! ```
//!
//! Lines that do not match the grammar are skipped. Lines that match but carry
//! an unparsable timestamp or number abort the read.

use crate::types::{parse_timestamp, CompetitorId, Event, EventCode, Result, TrackerError};
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::OnceLock;

const EVENT_LINE: &str = r"\[([0-9]{2}:[0-9]{2}:[0-9]{2}\.[0-9]{3})\] ([0-9]+) ([0-9]+)(?: (.+))?";

fn event_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EVENT_LINE).expect("event line pattern is valid"))
}

/// Parse a single event line
///
/// # Returns
/// * `Ok(Some(event))` - the line matched and all fields parsed
/// * `Ok(None)` - the line does not match the event grammar
/// * `Err(EventFieldInvalid)` - the line matched but a field is out of range
pub fn parse_event_line(line: &str, line_no: usize) -> Result<Option<Event>> {
    let Some(caps) = event_line_regex().captures(line) else {
        log::debug!("Skipping malformed event line {}: {:?}", line_no, line);
        return Ok(None);
    };

    let invalid = |reason: String| TrackerError::EventFieldInvalid {
        line: line_no,
        reason,
    };

    let time = &caps[1];
    let timestamp =
        parse_timestamp(time).ok_or_else(|| invalid(format!("bad timestamp {:?}", time)))?;

    let code: u32 = caps[2]
        .parse()
        .map_err(|e| invalid(format!("bad event id {:?}: {}", &caps[2], e)))?;

    let competitor: CompetitorId = caps[3]
        .parse()
        .map_err(|e| invalid(format!("bad competitor id {:?}: {}", &caps[3], e)))?;

    let extra = caps.get(4).map(|m| m.as_str()).unwrap_or_default();

    Ok(Some(Event::incoming(
        timestamp,
        EventCode::from(code),
        competitor,
        extra,
    )))
}

/// Read every event from a line-oriented source, in order
pub fn read_events<R: BufRead>(reader: R) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    let mut skipped = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        match parse_event_line(&line, idx + 1)? {
            Some(event) => events.push(event),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        log::info!("Skipped {} malformed event lines", skipped);
    }
    log::info!("Read {} events", events.len());
    Ok(events)
}

/// Read every event from a file
pub fn read_events_file(path: &Path) -> Result<Vec<Event>> {
    log::info!("Reading events file: {:?}", path);
    let file = File::open(path)?;
    read_events(BufReader::new(file))
}
