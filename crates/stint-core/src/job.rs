//! The recorded time interval at the heart of the ledger.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A single recorded work interval with an optional free-text message.
///
/// The fields are private so the `start < end` invariant cannot be
/// violated from outside: when both timestamps are present, the start
/// strictly precedes the end. Mutations that would break this are
/// silently ignored; [`Job::set_start`] and [`Job::set_end`] report via
/// their return value whether the assignment actually happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    start: Option<DateTime<Local>>,
    end: Option<DateTime<Local>>,
    message: String,
}

impl Job {
    /// Creates an empty job with no timestamps and no message.
    pub const fn new() -> Self {
        Self {
            start: None,
            end: None,
            message: String::new(),
        }
    }

    /// Creates an open job beginning at `start`.
    pub fn started(start: DateTime<Local>) -> Self {
        Self {
            start: Some(start),
            end: None,
            message: String::new(),
        }
    }

    /// Reassembles a job from stored fields, enforcing the interval
    /// invariant. Returns `None` for an end without a start or an end
    /// that does not come strictly after the start.
    pub fn from_parts(
        start: Option<DateTime<Local>>,
        end: Option<DateTime<Local>>,
        message: String,
    ) -> Option<Self> {
        match (start, end) {
            (Some(s), Some(e)) if s >= e => None,
            (None, Some(_)) => None,
            _ => Some(Self {
                start,
                end,
                message,
            }),
        }
    }

    pub const fn start(&self) -> Option<DateTime<Local>> {
        self.start
    }

    pub const fn end(&self) -> Option<DateTime<Local>> {
        self.end
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// True while no end has been recorded.
    pub const fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Sets the start, but only if it stays strictly before the current
    /// end (if any). Returns whether the value changed.
    pub fn set_start(&mut self, start: DateTime<Local>) -> bool {
        if self.end.is_some_and(|end| start >= end) {
            return false;
        }
        self.start = Some(start);
        true
    }

    /// Sets the end, but only if a start is present and strictly before
    /// it. Returns whether the value changed.
    pub fn set_end(&mut self, end: DateTime<Local>) -> bool {
        let Some(start) = self.start else {
            return false;
        };
        if end <= start {
            return false;
        }
        self.end = Some(end);
        true
    }

    /// Replaces the message wholesale.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    /// Appends to the message, separated by a newline only when there
    /// already is one.
    pub fn append_message(&mut self, text: &str) {
        if !self.message.is_empty() {
            self.message.push('\n');
        }
        self.message.push_str(text);
    }

    /// The job viewed as a closed interval, with `now` standing in for
    /// a missing end. `None` while the start is unset.
    pub fn interval(&self, now: DateTime<Local>) -> Option<(DateTime<Local>, DateTime<Local>)> {
        self.start.map(|start| (start, self.end.unwrap_or(now)))
    }

    /// Exact duration in fractional hours, measured against `now` while
    /// the job is still open. Zero while the start is unset.
    #[expect(clippy::cast_precision_loss, reason = "millisecond counts fit f64 comfortably")]
    pub fn hours_exact(&self, now: DateTime<Local>) -> f64 {
        self.interval(now)
            .map_or(0.0, |(start, end)| {
                (end - start).num_milliseconds() as f64 / 3_600_000.0
            })
    }

    /// Duration rounded to the given resolution.
    pub fn hours(&self, now: DateTime<Local>, resolution: f64) -> f64 {
        round_hours(self.hours_exact(now), resolution)
    }
}

impl Default for Job {
    fn default() -> Self {
        Self::new()
    }
}

/// Rounds fractional hours to the nearest multiple of `resolution`.
pub fn round_hours(hours: f64, resolution: f64) -> f64 {
    if resolution <= 0.0 {
        return hours;
    }
    (hours / resolution).round() * resolution
}
