use std::{fmt, sync::mpsc};

use crate::pipeline::run::RunSummary;

/// Severity marker carried by every user-facing log line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    /// A record was written.
    Ok,
    /// A record was skipped.
    Warn,
    /// A record failed; the run continues.
    Err,
    /// An attribute resolved to no layer.
    Miss,
    /// The run ended early.
    Fatal,
    /// Informational notice (empty input, stop requests).
    Notice,
    /// The run finished every record.
    Done,
}

impl Severity {
    /// Short tag printed in brackets.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Warn => "WARN",
            Self::Err => "ERR",
            Self::Miss => "MISS",
            Self::Fatal => "FATAL",
            Self::Notice => "!",
            Self::Done => "DONE",
        }
    }
}

/// Human-readable log line, rendered as `[TAG] message`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogLine {
    /// Severity marker.
    pub severity: Severity,
    /// Message text without the tag.
    pub message: String,
}

impl LogLine {
    /// Build a line with an explicit severity.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    /// `[OK]` line.
    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(Severity::Ok, message)
    }

    /// `[WARN]` line.
    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(Severity::Warn, message)
    }

    /// `[ERR]` line.
    pub fn err(message: impl Into<String>) -> Self {
        Self::new(Severity::Err, message)
    }

    /// `[MISS]` line.
    pub fn miss(message: impl Into<String>) -> Self {
        Self::new(Severity::Miss, message)
    }

    /// `[FATAL]` line.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(Severity::Fatal, message)
    }

    /// `[!]` line.
    pub fn notice(message: impl Into<String>) -> Self {
        Self::new(Severity::Notice, message)
    }

    /// `[DONE]` line.
    pub fn done(message: impl Into<String>) -> Self {
        Self::new(Severity::Done, message)
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity.tag(), self.message)
    }
}

/// Notification sent from a run to whoever is watching it.
#[derive(Clone, Debug, PartialEq)]
pub enum RunEvent {
    /// A log line.
    Log(LogLine),
    /// Percentage of records handled so far, `0..=100`.
    Progress(u8),
    /// The run ended; always the last event.
    Finished(RunSummary),
}

/// Receiver of run notifications.
///
/// Ordering contract: events for record `i` arrive before any event for record `i + 1`, and
/// `finished` is called exactly once, last, whatever the outcome.
pub trait RunObserver {
    /// Called for every log line.
    fn log(&mut self, line: LogLine);
    /// Called after each record.
    fn progress(&mut self, percent: u8);
    /// Called once when the run ends.
    fn finished(&mut self, summary: &RunSummary);
}

impl RunObserver for mpsc::Sender<RunEvent> {
    fn log(&mut self, line: LogLine) {
        let _ = self.send(RunEvent::Log(line));
    }

    fn progress(&mut self, percent: u8) {
        let _ = self.send(RunEvent::Progress(percent));
    }

    fn finished(&mut self, summary: &RunSummary) {
        let _ = self.send(RunEvent::Finished(summary.clone()));
    }
}

/// Observer that records every event, for tests and post-run inspection.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Vec<RunEvent>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// All events in delivery order.
    pub fn events(&self) -> &[RunEvent] {
        &self.events
    }

    /// Rendered log lines in delivery order.
    pub fn lines(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RunEvent::Log(line) => Some(line.to_string()),
                _ => None,
            })
            .collect()
    }

    /// Progress values in delivery order.
    pub fn percentages(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RunEvent::Progress(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    /// Number of completion notifications received.
    pub fn finished_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, RunEvent::Finished(_)))
            .count()
    }
}

impl RunObserver for EventLog {
    fn log(&mut self, line: LogLine) {
        self.events.push(RunEvent::Log(line));
    }

    fn progress(&mut self, percent: u8) {
        self.events.push(RunEvent::Progress(percent));
    }

    fn finished(&mut self, summary: &RunSummary) {
        self.events.push(RunEvent::Finished(summary.clone()));
    }
}
