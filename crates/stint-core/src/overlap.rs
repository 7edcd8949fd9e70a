//! Interval intersection between two jobs.
//!
//! Used for informational overlap warnings only; nothing here blocks or
//! corrects an edit.

use chrono::{DateTime, Local};

use crate::job::Job;

/// Computes the intersection of two jobs viewed as closed intervals
/// `[start, end-or-now]`.
///
/// Returns `None` when either job has no start yet or when the
/// intervals do not meet (lower bound past the upper bound). Touching
/// intervals yield a zero-length intersection.
pub fn intersect(
    a: &Job,
    b: &Job,
    now: DateTime<Local>,
) -> Option<(DateTime<Local>, DateTime<Local>)> {
    let (a_start, a_end) = a.interval(now)?;
    let (b_start, b_end) = b.interval(now)?;
    let start = a_start.max(b_start);
    let end = a_end.min(b_end);
    (start <= end).then_some((start, end))
}
