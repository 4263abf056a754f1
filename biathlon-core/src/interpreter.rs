//! Event interpreter
//!
//! The race state machine. Events are applied one at a time, in the order
//! given, against the competitor record store. Each accepted event produces
//! its log line, mutates the competitor's record, and may append outgoing
//! `Finished` / `Disqualified` events to the retained history.
//!
//! # Elapsed time bookkeeping
//!
//! Every competitor carries a running total used to measure lap and penalty
//! deltas. It is updated two different ways:
//! - entering the penalty laps overwrites it with the absolute time elapsed
//!   since the start
//! - completing a lap or a penalty loop adds that lap's or loop's duration
//!
//! The first lap ignores the running total and is measured from the start.
//!
//! Zero or negative elapsed time is accepted: speed is plain floating-point
//! division (`inf` or negative) and a warning is logged.

use crate::competitor::{Competitor, CompetitorStatus};
use crate::config::CompetitionConfig;
use crate::log_format;
use crate::report::{self, ReportStyle};
use crate::store::CompetitorStore;
use crate::types::{parse_timestamp, Direction, Event, EventCode, Result, Timestamp, TrackerError};
use chrono::{Duration, NaiveTime};

/// One race: configuration, competitor records, event history and race log
pub struct Competition {
    config: CompetitionConfig,
    store: CompetitorStore,
    events: Vec<Event>,
    log: Vec<String>,
}

impl Competition {
    /// Create a race from an already validated configuration
    pub fn new(config: CompetitionConfig) -> Self {
        Self {
            config,
            store: CompetitorStore::new(),
            events: Vec::new(),
            log: Vec::new(),
        }
    }

    /// Apply a single event
    ///
    /// Fails with `InvalidDirection` for outgoing events and with `NotRegistered`
    /// for any non-registration event about an unknown competitor. A failed
    /// event leaves records, history and log untouched.
    pub fn apply(&mut self, event: Event) -> Result<()> {
        if event.direction != Direction::Incoming {
            return Err(TrackerError::InvalidDirection {
                direction: event.direction,
                code: event.code,
                competitor: event.competitor,
            });
        }

        if event.code != EventCode::Registered && !self.store.contains(event.competitor) {
            return Err(TrackerError::NotRegistered(event.competitor));
        }

        log::trace!("Applying event: {}", event);

        if let Some(line) = log_format::format_event(&event) {
            self.log.push(line);
        }

        self.dispatch(&event)?;

        self.events.push(event);
        Ok(())
    }

    /// Apply every event in order, stopping at the first failure
    pub fn apply_all<I>(&mut self, events: I) -> Result<()>
    where
        I: IntoIterator<Item = Event>,
    {
        for event in events {
            self.apply(event)?;
        }
        log::info!(
            "Processed {} events for {} competitors",
            self.events.len(),
            self.store.len()
        );
        Ok(())
    }

    fn dispatch(&mut self, event: &Event) -> Result<()> {
        if event.code == EventCode::Registered {
            self.store.register(event.competitor);
            log::debug!("Competitor {} registered", event.competitor);
            return Ok(());
        }

        let lap_len = self.config.lap_len as f64;
        let penalty_len = self.config.penalty_len as f64;
        let laps = self.config.lap_count();

        let competitor = self.store.lookup_mut(event.competitor)?;
        if competitor.status.is_terminal() {
            log::warn!(
                "Competitor {}: event {} after terminal status {}",
                competitor.id,
                event.code,
                competitor.status
            );
        }

        match event.code {
            EventCode::Registered => {}
            EventCode::StartTimeSet => {
                competitor.planned_start = parse_timestamp(&event.extra);
                if competitor.planned_start.is_none() {
                    log::warn!(
                        "Competitor {}: unparsable drawn start time {:?}",
                        competitor.id,
                        event.extra
                    );
                }
            }
            EventCode::OnStartLine => {
                competitor.status = CompetitorStatus::OnStartLine;
            }
            EventCode::Started => {
                competitor.status = CompetitorStatus::Racing;
                competitor.actual_start = Some(event.timestamp);
            }
            EventCode::OnFiringRange => {
                competitor.status = CompetitorStatus::OnFiringRange;
            }
            EventCode::TargetHit => {
                competitor.record_shot(true);
            }
            EventCode::LeftFiringRange => {
                competitor.status = CompetitorStatus::Racing;
            }
            EventCode::EnteredPenaltyLaps => {
                competitor.status = CompetitorStatus::OnPenaltyLaps;
                competitor.running_total = elapsed_since_start(competitor, event.timestamp);
            }
            EventCode::LeftPenaltyLaps => {
                competitor.status = CompetitorStatus::Racing;
                let penalty_time =
                    elapsed_since_start(competitor, event.timestamp) - competitor.running_total;
                let speed = average_speed(penalty_len, penalty_time, competitor, "penalty loop");
                competitor.add_penalty(penalty_time, speed);
            }
            EventCode::EndedMainLap => {
                competitor.status = CompetitorStatus::Racing;
                let elapsed = elapsed_since_start(competitor, event.timestamp);
                let lap_time = if competitor.laps.is_empty() {
                    elapsed
                } else {
                    elapsed - competitor.running_total
                };
                let speed = average_speed(lap_len, lap_time, competitor, "lap");
                competitor.add_lap(lap_time, speed);

                if competitor.current_lap == laps {
                    competitor.status = CompetitorStatus::Finished;
                    log::debug!("Competitor {} finished", competitor.id);
                    self.events.push(Event::outgoing(
                        event.timestamp,
                        EventCode::Finished,
                        event.competitor,
                        "",
                    ));
                    self.log
                        .push(log_format::format_finished(event.timestamp, event.competitor));
                }
            }
            EventCode::CannotContinue => {
                competitor.status = CompetitorStatus::NotFinished;
                competitor.comment = event.extra.clone();
                log::debug!(
                    "Competitor {} cannot continue: {}",
                    competitor.id,
                    competitor.comment
                );
                self.events.push(Event::outgoing(
                    event.timestamp,
                    EventCode::Disqualified,
                    event.competitor,
                    event.extra.clone(),
                ));
            }
            EventCode::Disqualified | EventCode::Finished | EventCode::Other(_) => {
                log::debug!(
                    "No handler for event code {} (competitor {})",
                    event.code,
                    event.competitor
                );
            }
        }

        Ok(())
    }

    pub fn config(&self) -> &CompetitionConfig {
        &self.config
    }

    pub fn competitors(&self) -> &CompetitorStore {
        &self.store
    }

    /// Retained history: accepted incoming events and the outgoing events they produced
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn outgoing_events(&self) -> impl Iterator<Item = &Event> {
        self.events
            .iter()
            .filter(|e| e.direction == Direction::Outgoing)
    }

    /// Race log lines in processing order
    pub fn log_lines(&self) -> &[String] {
        &self.log
    }

    /// Race log as text, one line per entry
    pub fn event_log(&self) -> String {
        let mut out = String::new();
        for line in &self.log {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Final report over every registered competitor
    pub fn report(&self, style: ReportStyle) -> String {
        report::generate(&self.store, style)
    }
}

/// Time since the competitor's start; an unset start counts from midnight
fn elapsed_since_start(competitor: &Competitor, at: Timestamp) -> Duration {
    let start = competitor.actual_start.unwrap_or(NaiveTime::MIN);
    at.signed_duration_since(start)
}

/// Meters per second over `elapsed`
fn average_speed(distance: f64, elapsed: Duration, competitor: &Competitor, what: &str) -> f64 {
    let seconds = elapsed.num_milliseconds() as f64 / 1000.0;
    if seconds <= 0.0 {
        log::warn!(
            "Competitor {}: non-positive {} time {}",
            competitor.id,
            what,
            report::format_duration(elapsed)
        );
    }
    distance / seconds
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(laps: i64) -> CompetitionConfig {
        CompetitionConfig {
            laps,
            lap_len: 3500,
            penalty_len: 150,
            firing_lines: 2,
            start: "10:00:00.000".to_string(),
            start_delta: "00:01:30.000".to_string(),
        }
    }

    fn at(s: &str) -> Timestamp {
        parse_timestamp(s).unwrap()
    }

    fn incoming(time: &str, code: EventCode, extra: &str) -> Event {
        Event::incoming(at(time), code, 1, extra)
    }

    fn started(laps: i64) -> Competition {
        let mut competition = Competition::new(config(laps));
        competition
            .apply(incoming("09:00:00.000", EventCode::Registered, ""))
            .unwrap();
        competition
            .apply(incoming("10:00:00.000", EventCode::Started, ""))
            .unwrap();
        competition
    }

    #[test]
    fn test_registration() {
        let mut competition = Competition::new(config(2));
        competition
            .apply(incoming("10:00:00.000", EventCode::Registered, ""))
            .unwrap();

        let competitor = competition.competitors().lookup(1).unwrap();
        assert_eq!(competitor.status, CompetitorStatus::Registered);
        assert_eq!(competition.log_lines().len(), 1);
        assert!(competition.log_lines()[0].contains("The competitor(1) registered"));
        assert_eq!(competition.events().len(), 1);
    }

    #[test]
    fn test_start_time_set() {
        let mut competition = Competition::new(config(2));
        competition
            .apply(incoming("09:00:00.000", EventCode::Registered, ""))
            .unwrap();
        competition
            .apply(incoming("09:00:00.000", EventCode::StartTimeSet, "10:00:00.000"))
            .unwrap();

        let competitor = competition.competitors().lookup(1).unwrap();
        assert_eq!(competitor.planned_start, Some(at("10:00:00.000")));
        assert!(competition.log_lines()[1]
            .contains("The start time for the competitor(1) was set by a draw to 10:00:00.000"));
    }

    #[test]
    fn test_unparsable_start_time_is_not_fatal() {
        let mut competition = Competition::new(config(2));
        competition
            .apply(incoming("09:00:00.000", EventCode::Registered, ""))
            .unwrap();
        competition
            .apply(incoming("09:00:00.000", EventCode::StartTimeSet, "soon"))
            .unwrap();
        assert!(competition.competitors().lookup(1).unwrap().planned_start.is_none());
    }

    #[test]
    fn test_target_hit() {
        let mut competition = started(2);
        competition
            .apply(incoming("10:05:00.000", EventCode::TargetHit, "1"))
            .unwrap();

        let competitor = competition.competitors().lookup(1).unwrap();
        assert_eq!((competitor.hits, competitor.shots), (1, 1));
        assert!(competition
            .log_lines()
            .last()
            .unwrap()
            .contains("The target(1) has been hit by competitor(1)"));
    }

    #[test]
    fn test_status_transitions() {
        let mut competition = Competition::new(config(2));
        let steps = [
            (EventCode::Registered, CompetitorStatus::Registered),
            (EventCode::OnStartLine, CompetitorStatus::OnStartLine),
            (EventCode::Started, CompetitorStatus::Racing),
            (EventCode::OnFiringRange, CompetitorStatus::OnFiringRange),
            (EventCode::LeftFiringRange, CompetitorStatus::Racing),
            (EventCode::EnteredPenaltyLaps, CompetitorStatus::OnPenaltyLaps),
            (EventCode::LeftPenaltyLaps, CompetitorStatus::Racing),
        ];
        let times = [
            "09:00:00.000",
            "09:59:00.000",
            "10:00:00.000",
            "10:04:00.000",
            "10:05:00.000",
            "10:05:30.000",
            "10:06:30.000",
        ];

        for ((code, expected), time) in steps.into_iter().zip(times) {
            competition.apply(incoming(time, code, "")).unwrap();
            assert_eq!(
                competition.competitors().lookup(1).unwrap().status,
                expected,
                "after {:?}",
                code
            );
        }
    }

    #[test]
    fn test_penalty_loop_timing() {
        let mut competition = started(2);
        competition
            .apply(incoming("10:05:00.000", EventCode::EnteredPenaltyLaps, ""))
            .unwrap();
        assert_eq!(
            competition.competitors().lookup(1).unwrap().running_total,
            Duration::minutes(5)
        );

        competition
            .apply(incoming("10:06:00.000", EventCode::LeftPenaltyLaps, ""))
            .unwrap();

        let competitor = competition.competitors().lookup(1).unwrap();
        assert_eq!(competitor.penalties.len(), 1);
        assert_eq!(competitor.penalties[0].duration, Duration::minutes(1));
        assert!((competitor.penalties[0].speed - 2.5).abs() < 1e-9);
        assert_eq!(competitor.running_total, Duration::minutes(6));
    }

    #[test]
    fn test_penalty_entry_overwrites_running_total() {
        let mut competition = started(3);
        competition
            .apply(incoming("10:10:00.000", EventCode::EndedMainLap, ""))
            .unwrap();
        competition
            .apply(incoming("10:12:00.000", EventCode::EnteredPenaltyLaps, ""))
            .unwrap();

        let competitor = competition.competitors().lookup(1).unwrap();
        assert_eq!(competitor.running_total, Duration::minutes(12));
    }

    #[test]
    fn test_lap_after_penalty_between_laps() {
        let mut competition = started(3);
        for (time, code) in [
            ("10:10:00.000", EventCode::EndedMainLap),
            ("10:12:00.000", EventCode::EnteredPenaltyLaps),
            ("10:13:00.000", EventCode::LeftPenaltyLaps),
            ("10:20:00.000", EventCode::EndedMainLap),
        ] {
            competition.apply(incoming(time, code, "")).unwrap();
        }

        let competitor = competition.competitors().lookup(1).unwrap();
        assert_eq!(competitor.penalties[0].duration, Duration::minutes(1));
        assert_eq!(competitor.laps[1].duration, Duration::minutes(7));
        assert_eq!(
            report::format_competitor(competitor, ReportStyle::Compatible),
            "[Finished] 1 [{00:10:00.000, 5.833}, {00:07:00.000, 8.333}] {{00:01:00.000, 2.500}} 0/0"
        );
    }

    #[test]
    fn test_events_after_terminal_status_still_apply() {
        let mut competition = started(1);
        competition
            .apply(incoming("10:10:00.000", EventCode::EndedMainLap, ""))
            .unwrap();
        competition
            .apply(incoming("10:11:00.000", EventCode::OnFiringRange, "1"))
            .unwrap();

        let competitor = competition.competitors().lookup(1).unwrap();
        assert_eq!(competitor.status, CompetitorStatus::OnFiringRange);
        assert_eq!(competition.outgoing_events().count(), 1);
    }

    #[test]
    fn test_first_lap_ignores_running_total() {
        let mut competition = started(2);
        for (time, code) in [
            ("10:05:00.000", EventCode::EnteredPenaltyLaps),
            ("10:06:00.000", EventCode::LeftPenaltyLaps),
            ("10:10:00.000", EventCode::EndedMainLap),
            ("10:20:00.000", EventCode::EndedMainLap),
        ] {
            competition.apply(incoming(time, code, "")).unwrap();
        }

        let competitor = competition.competitors().lookup(1).unwrap();
        // First lap measured from the start, then added on top of the penalty bookkeeping
        assert_eq!(competitor.laps[0].duration, Duration::minutes(10));
        assert_eq!(competitor.laps[1].duration, Duration::minutes(4));
        assert_eq!(competitor.running_total, Duration::minutes(20));
    }

    #[test]
    fn test_finish_after_configured_laps() {
        let mut competition = started(2);
        competition
            .apply(incoming("10:10:00.000", EventCode::EndedMainLap, ""))
            .unwrap();
        assert_eq!(
            competition.competitors().lookup(1).unwrap().status,
            CompetitorStatus::Racing
        );
        assert_eq!(competition.outgoing_events().count(), 0);

        competition
            .apply(incoming("10:20:00.000", EventCode::EndedMainLap, ""))
            .unwrap();

        let competitor = competition.competitors().lookup(1).unwrap();
        assert_eq!(competitor.status, CompetitorStatus::Finished);
        assert_eq!(competitor.laps.len(), 2);

        let outgoing: Vec<_> = competition.outgoing_events().collect();
        assert_eq!(outgoing.len(), 1);
        assert_eq!(outgoing[0].code, EventCode::Finished);
        assert_eq!(outgoing[0].timestamp, at("10:20:00.000"));

        let finished_lines = competition
            .log_lines()
            .iter()
            .filter(|l| l.contains("has finished"))
            .count();
        assert_eq!(finished_lines, 1);
    }

    #[test]
    fn test_cannot_continue() {
        let mut competition = started(2);
        competition
            .apply(incoming("10:15:00.000", EventCode::CannotContinue, "Lost in the forest"))
            .unwrap();

        let competitor = competition.competitors().lookup(1).unwrap();
        assert_eq!(competitor.status, CompetitorStatus::NotFinished);
        assert_eq!(competitor.comment, "Lost in the forest");

        let outgoing: Vec<_> = competition.outgoing_events().collect();
        assert_eq!(outgoing.len(), 1);
        assert_eq!(outgoing[0].code, EventCode::Disqualified);
        assert_eq!(outgoing[0].extra, "Lost in the forest");
        assert!(competition
            .log_lines()
            .last()
            .unwrap()
            .ends_with("The competitor(1) can't continue: Lost in the forest"));
    }

    #[test]
    fn test_outgoing_event_precedes_its_trigger_in_history() {
        let mut competition = started(1);
        competition
            .apply(incoming("10:10:00.000", EventCode::EndedMainLap, ""))
            .unwrap();

        let codes: Vec<_> = competition.events().iter().map(|e| e.code).collect();
        assert_eq!(
            codes,
            vec![
                EventCode::Registered,
                EventCode::Started,
                EventCode::Finished,
                EventCode::EndedMainLap
            ]
        );
    }

    #[test]
    fn test_not_registered() {
        let mut competition = Competition::new(config(2));
        let err = competition
            .apply(incoming("10:00:00.000", EventCode::Started, ""))
            .unwrap_err();

        assert!(matches!(err, TrackerError::NotRegistered(1)));
        assert!(competition.competitors().is_empty());
        assert!(competition.log_lines().is_empty());
        assert!(competition.events().is_empty());
    }

    #[test]
    fn test_outgoing_direction_rejected() {
        let mut competition = Competition::new(config(2));
        let event = Event::outgoing(at("10:00:00.000"), EventCode::Registered, 1, "");
        let err = competition.apply(event).unwrap_err();

        assert!(matches!(err, TrackerError::InvalidDirection { competitor: 1, .. }));
        assert!(competition.competitors().is_empty());
    }

    #[test]
    fn test_unknown_code_is_kept_in_history_only() {
        let mut competition = started(2);
        let before = competition.competitors().lookup(1).unwrap().clone();
        competition
            .apply(incoming("10:01:00.000", EventCode::Other(12), "x"))
            .unwrap();

        assert_eq!(competition.competitors().lookup(1).unwrap(), &before);
        assert_eq!(competition.log_lines().len(), 2);
        assert_eq!(competition.events().len(), 3);
    }

    #[test]
    fn test_zero_length_lap_gives_infinite_speed() {
        let mut competition = started(2);
        competition
            .apply(incoming("10:00:00.000", EventCode::EndedMainLap, ""))
            .unwrap();

        let lap = &competition.competitors().lookup(1).unwrap().laps[0];
        assert_eq!(lap.duration, Duration::zero());
        assert!(lap.speed.is_infinite());
    }

    #[test]
    fn test_lap_without_start_counts_from_midnight() {
        let mut competition = Competition::new(config(2));
        competition
            .apply(incoming("00:00:00.000", EventCode::Registered, ""))
            .unwrap();
        competition
            .apply(incoming("00:10:00.000", EventCode::EndedMainLap, ""))
            .unwrap();

        let lap = &competition.competitors().lookup(1).unwrap().laps[0];
        assert_eq!(lap.duration, Duration::minutes(10));
    }

    #[test]
    fn test_event_log_text() {
        let competition = started(2);
        assert_eq!(
            competition.event_log(),
            "[09:00:00.000] The competitor(1) registered\n\
             [10:00:00.000] The competitor(1) has started\n"
        );
    }
}
