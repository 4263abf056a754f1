//! Final report generation
//!
//! One line per competitor, rendered from the record left in the store once
//! the event stream is exhausted:
//!
//! ```text
//! [Finished] 1 [{00:29:03.872, 2.093}, {00:29:21.150, 2.071}] {{00:01:44.296, 0.481}} 4/5
//! ```

use crate::competitor::{Competitor, CompetitorStatus, Lap, Penalty};
use crate::store::CompetitorStore;
use chrono::Duration;

/// How competitor statuses are named in the report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportStyle {
    /// `NotStarted`, `NotFinished` and `Disqualified` by name, everything else `Finished`
    #[default]
    Compatible,
    /// Every status by its own name
    Exhaustive,
}

/// Format a duration as `HH:MM:SS.mmm`
///
/// Hours are not wrapped at 24. Negative durations get a leading `-`.
pub fn format_duration(d: Duration) -> String {
    let millis = d.num_milliseconds();
    let sign = if millis < 0 { "-" } else { "" };
    let millis = millis.unsigned_abs();

    let total_seconds = millis / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let ms = millis % 1000;

    format!("{}{:02}:{:02}:{:02}.{:03}", sign, hours, minutes, seconds, ms)
}

/// Status label for a report line
pub fn status_label(status: CompetitorStatus, style: ReportStyle) -> String {
    match style {
        ReportStyle::Exhaustive => status.to_string(),
        ReportStyle::Compatible => match status {
            CompetitorStatus::NotStarted => "NotStarted".to_string(),
            CompetitorStatus::NotFinished => "NotFinished".to_string(),
            CompetitorStatus::Disqualified => "Disqualified".to_string(),
            _ => "Finished".to_string(),
        },
    }
}

/// `[{HH:MM:SS.mmm, speed}, ...]` or `[]`
pub fn format_laps(laps: &[Lap]) -> String {
    let entries: Vec<String> = laps
        .iter()
        .map(|lap| format_entry(lap.duration, lap.speed))
        .collect();
    format!("[{}]", entries.join(", "))
}

/// `{{HH:MM:SS.mmm, speed}, ...}` or `{}`
pub fn format_penalties(penalties: &[Penalty]) -> String {
    let entries: Vec<String> = penalties
        .iter()
        .map(|penalty| format_entry(penalty.duration, penalty.speed))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

fn format_entry(duration: Duration, speed: f64) -> String {
    format!("{{{}, {:.3}}}", format_duration(duration), speed)
}

/// Render the report line for a single competitor
pub fn format_competitor(competitor: &Competitor, style: ReportStyle) -> String {
    format!(
        "[{}] {} {} {} {}/{}",
        status_label(competitor.status, style),
        competitor.id,
        format_laps(&competitor.laps),
        format_penalties(&competitor.penalties),
        competitor.hits,
        competitor.shots
    )
}

/// Render the whole report, one line per competitor in ascending id order
pub fn generate(store: &CompetitorStore, style: ReportStyle) -> String {
    let mut report = String::new();
    for competitor in store.iter() {
        report.push_str(&format_competitor(competitor, style));
        report.push('\n');
    }
    log::debug!("Report generated for {} competitors", store.len());
    report
}
