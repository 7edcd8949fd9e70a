//! The ordered job collection and its editing operations.
//!
//! Positions are 1-based everywhere a user sees them. At most one job
//! may be open at a time; `start` refuses to stack a second open job.

use chrono::{DateTime, Local};
use serde::Serialize;
use thiserror::Error;

use crate::job::Job;
use crate::overlap::intersect;

/// 1-based index of a job as presented to the user.
pub type Position = usize;

/// Errors for ledger operations whose preconditions do not hold.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// `end` or `append_message` was called with no job open.
    #[error("no open job")]
    NoOpenJob,

    /// `start` was called while the job at this position is still open.
    #[error("the job at position {0} is still open; end it first")]
    OpenJob(Position),

    /// A position beyond the end of the ledger.
    #[error("position {position} is out of range (the ledger has {len} jobs)")]
    OutOfRange { position: Position, len: usize },

    /// Join needs at least two distinct positions.
    #[error("join needs at least two positions")]
    TooFewPositions,

    /// The requested end is not strictly after the open job's start.
    #[error("end time is not after the start of the job at position {0}")]
    EndBeforeStart(Position),
}

/// Which jobs a query selects. The two filter kinds are mutually
/// exclusive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryFilter {
    /// Jobs whose start is at or after this timestamp.
    Since(DateTime<Local>),
    /// The last `n` jobs by position.
    Last(usize),
}

/// A selected job together with its ledger position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryItem {
    pub position: Position,
    pub job: Job,
}

/// Query outcome: the matching jobs plus their aggregate figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub jobs: Vec<QueryItem>,
    pub count: usize,
    /// Sum of the individually rounded hours of the matches.
    pub hours: f64,
}

/// A prepared join: everything needed to show a preview, ask for
/// confirmation, and then apply the merge.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinPlan {
    /// The surviving position (the smallest selected one).
    pub target: Position,
    /// The positions to remove, ascending, target excluded.
    pub removed: Vec<Position>,
    /// The merged job that will replace the target.
    pub merged: Job,
    /// Sum of the individually rounded hours before the merge.
    pub hours_before: f64,
    /// Rounded hours of the merged job.
    pub hours_after: f64,
}

impl JoinPlan {
    /// Signed hours gained (positive) or lost (negative) by rounding
    /// once instead of per job. A nonzero value here is expected, not a
    /// bug.
    pub fn hours_difference(&self) -> f64 {
        self.hours_after - self.hours_before
    }
}

/// Ordered collection of jobs in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    jobs: Vec<Job>,
}

impl Ledger {
    pub const fn new() -> Self {
        Self { jobs: Vec::new() }
    }

    pub fn from_jobs(jobs: Vec<Job>) -> Self {
        Self { jobs }
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// The job at a 1-based position.
    pub fn get(&self, position: Position) -> Result<&Job, LedgerError> {
        self.index(position).map(|i| &self.jobs[i])
    }

    /// The position of the open job, if any.
    pub fn open_position(&self) -> Option<Position> {
        self.jobs
            .iter()
            .position(|job| job.start().is_some() && job.is_open())
            .map(|i| i + 1)
    }

    /// Starts a new open job. Refuses while another job is open.
    pub fn start(&mut self, start: DateTime<Local>) -> Result<Position, LedgerError> {
        if let Some(open) = self.open_position() {
            return Err(LedgerError::OpenJob(open));
        }
        self.jobs.push(Job::started(start));
        tracing::debug!(position = self.jobs.len(), %start, "started job");
        Ok(self.jobs.len())
    }

    /// Ends the open job. The end must come strictly after its start.
    pub fn end(&mut self, end: DateTime<Local>) -> Result<Position, LedgerError> {
        let position = self.open_position().ok_or(LedgerError::NoOpenJob)?;
        let job = &mut self.jobs[position - 1];
        if !job.set_end(end) {
            return Err(LedgerError::EndBeforeStart(position));
        }
        tracing::debug!(position, %end, "ended job");
        Ok(position)
    }

    /// Appends text to the open job's message.
    pub fn append_message(&mut self, text: &str) -> Result<Position, LedgerError> {
        let position = self.open_position().ok_or(LedgerError::NoOpenJob)?;
        self.jobs[position - 1].append_message(text);
        Ok(position)
    }

    /// Removes the job at `position` if `confirmed`, returning it.
    /// Unconfirmed calls are a no-op returning `None`.
    pub fn drop_job(
        &mut self,
        position: Position,
        confirmed: bool,
    ) -> Result<Option<Job>, LedgerError> {
        let index = self.index(position)?;
        if !confirmed {
            return Ok(None);
        }
        let job = self.jobs.remove(index);
        tracing::debug!(position, "dropped job");
        Ok(Some(job))
    }

    /// Prepares a merge of the jobs at the given positions without
    /// touching the ledger. Positions are deduplicated and sorted; the
    /// smallest survives.
    pub fn plan_join(
        &self,
        positions: &[Position],
        now: DateTime<Local>,
        resolution: f64,
    ) -> Result<JoinPlan, LedgerError> {
        if positions.len() < 2 {
            return Err(LedgerError::TooFewPositions);
        }
        let mut sorted = positions.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() < 2 {
            return Err(LedgerError::TooFewPositions);
        }
        for &position in &sorted {
            self.index(position)?;
        }

        let selected: Vec<&Job> = sorted.iter().map(|&p| &self.jobs[p - 1]).collect();

        let message = selected
            .iter()
            .map(|job| job.message())
            .collect::<Vec<_>>()
            .join("\n");
        let start = selected.iter().filter_map(|job| job.start()).min();
        // Open jobs do not take part in the end comparison; with no
        // closed job among the selection the merge stays open.
        let end = selected.iter().filter_map(|job| job.end()).max();

        let mut merged = Job::new();
        if let Some(start) = start {
            merged.set_start(start);
        }
        if let Some(end) = end {
            merged.set_end(end);
        }
        merged.set_message(message);

        let hours_before = selected
            .iter()
            .map(|job| job.hours(now, resolution))
            .sum::<f64>();
        let hours_after = merged.hours(now, resolution);

        Ok(JoinPlan {
            target: sorted[0],
            removed: sorted[1..].to_vec(),
            merged,
            hours_before,
            hours_after,
        })
    }

    /// Applies a previously prepared join. Removal runs from the
    /// highest position down so pending indices stay valid.
    pub fn apply_join(&mut self, plan: &JoinPlan) {
        self.jobs[plan.target - 1] = plan.merged.clone();
        for &position in plan.removed.iter().rev() {
            self.jobs.remove(position - 1);
        }
        tracing::debug!(
            target = plan.target,
            removed = plan.removed.len(),
            "joined jobs"
        );
    }

    /// Selects jobs by filter (or all of them) and sums their rounded
    /// hours.
    pub fn query(
        &self,
        filter: Option<QueryFilter>,
        now: DateTime<Local>,
        resolution: f64,
    ) -> QueryResult {
        let jobs: Vec<QueryItem> = match filter {
            Some(QueryFilter::Since(since)) => self
                .jobs
                .iter()
                .enumerate()
                .filter(|(_, job)| job.start().is_some_and(|start| start >= since))
                .map(|(i, job)| QueryItem {
                    position: i + 1,
                    job: job.clone(),
                })
                .collect(),
            Some(QueryFilter::Last(n)) => {
                let skip = self.jobs.len().saturating_sub(n);
                self.jobs
                    .iter()
                    .enumerate()
                    .skip(skip)
                    .map(|(i, job)| QueryItem {
                        position: i + 1,
                        job: job.clone(),
                    })
                    .collect()
            }
            None => self
                .jobs
                .iter()
                .enumerate()
                .map(|(i, job)| QueryItem {
                    position: i + 1,
                    job: job.clone(),
                })
                .collect(),
        };

        // Folded from +0.0: `Sum for f64` starts at -0.0, which would
        // surface as "-0 hours" for an empty selection.
        let hours = jobs
            .iter()
            .map(|item| item.job.hours(now, resolution))
            .fold(0.0, |acc, h| acc + h);
        QueryResult {
            count: jobs.len(),
            hours,
            jobs,
        }
    }

    /// Intersections between the job at `position` and every other job,
    /// for overlap warnings.
    pub fn overlaps_at(
        &self,
        position: Position,
        now: DateTime<Local>,
    ) -> Result<Vec<(Position, (DateTime<Local>, DateTime<Local>))>, LedgerError> {
        let index = self.index(position)?;
        let job = &self.jobs[index];
        Ok(self
            .jobs
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != index)
            .filter_map(|(i, other)| intersect(job, other, now).map(|range| (i + 1, range)))
            .collect())
    }

    fn index(&self, position: Position) -> Result<usize, LedgerError> {
        if position == 0 || position > self.jobs.len() {
            return Err(LedgerError::OutOfRange {
                position,
                len: self.jobs.len(),
            });
        }
        Ok(position - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32, min: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2025, 3, day, hour, min, 0)
            .single()
            .unwrap()
    }

    fn closed(day: u32, from: u32, to: u32, message: &str) -> Job {
        Job::from_parts(
            Some(at(day, from, 0)),
            Some(at(day, to, 0)),
            message.to_string(),
        )
        .unwrap()
    }

    fn five_job_ledger() -> Ledger {
        Ledger::from_jobs(vec![
            closed(10, 8, 9, "one"),
            closed(10, 9, 10, "two"),
            closed(10, 10, 11, "three"),
            closed(11, 8, 9, "four"),
            closed(11, 9, 10, "five"),
        ])
    }

    #[test]
    fn start_refuses_over_an_open_job() {
        let mut ledger = Ledger::new();
        assert_eq!(ledger.start(at(10, 9, 0)), Ok(1));
        assert_eq!(ledger.start(at(10, 10, 0)), Err(LedgerError::OpenJob(1)));
        assert_eq!(ledger.end(at(10, 11, 0)), Ok(1));
        assert_eq!(ledger.start(at(10, 12, 0)), Ok(2));
    }

    #[test]
    fn end_without_open_job_fails() {
        let mut ledger = five_job_ledger();
        assert_eq!(ledger.end(at(12, 9, 0)), Err(LedgerError::NoOpenJob));
    }

    #[test]
    fn end_must_come_after_start() {
        let mut ledger = Ledger::new();
        ledger.start(at(10, 9, 0)).unwrap();
        assert_eq!(
            ledger.end(at(10, 8, 0)),
            Err(LedgerError::EndBeforeStart(1))
        );
        // The job is untouched and still open.
        assert_eq!(ledger.open_position(), Some(1));
        assert_eq!(ledger.end(at(10, 9, 30)), Ok(1));
    }

    #[test]
    fn drop_requires_confirmation() {
        let mut ledger = five_job_ledger();
        assert_eq!(ledger.drop_job(2, false), Ok(None));
        assert_eq!(ledger.len(), 5);
        let dropped = ledger.drop_job(2, true).unwrap().unwrap();
        assert_eq!(dropped.message(), "two");
        assert_eq!(ledger.len(), 4);
        assert_eq!(ledger.get(2).unwrap().message(), "three");
    }

    #[test]
    fn drop_out_of_range_is_an_error() {
        let mut ledger = five_job_ledger();
        assert_eq!(
            ledger.drop_job(6, true),
            Err(LedgerError::OutOfRange {
                position: 6,
                len: 5
            })
        );
        assert_eq!(
            ledger.drop_job(0, true),
            Err(LedgerError::OutOfRange {
                position: 0,
                len: 5
            })
        );
    }

    #[test]
    fn join_merges_into_the_smallest_position() {
        let mut ledger = five_job_ledger();
        let now = at(12, 12, 0);
        // Deliberately unsorted call order.
        let plan = ledger.plan_join(&[5, 2, 3], now, 0.25).unwrap();
        assert_eq!(plan.target, 2);
        assert_eq!(plan.removed, vec![3, 5]);
        assert_eq!(plan.merged.message(), "two\nthree\nfive");
        assert_eq!(plan.merged.start(), Some(at(10, 9, 0)));
        assert_eq!(plan.merged.end(), Some(at(11, 10, 0)));

        ledger.apply_join(&plan);
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.get(1).unwrap().message(), "one");
        assert_eq!(ledger.get(2).unwrap().message(), "two\nthree\nfive");
        assert_eq!(ledger.get(3).unwrap().message(), "four");
    }

    #[test]
    fn join_reports_rounding_difference() {
        // 0:40 and 0:40 round to 0.75 each (1.5 summed); merged
        // 9:00-10:20 is 1:20, rounding to 1.25.
        let ledger = Ledger::from_jobs(vec![
            Job::from_parts(Some(at(10, 9, 0)), Some(at(10, 9, 40)), "a".into()).unwrap(),
            Job::from_parts(Some(at(10, 9, 40)), Some(at(10, 10, 20)), "b".into()).unwrap(),
        ]);
        let plan = ledger.plan_join(&[1, 2], at(10, 12, 0), 0.25).unwrap();
        assert!((plan.hours_before - 1.5).abs() < 1e-9);
        assert!((plan.hours_after - 1.25).abs() < 1e-9);
        assert!((plan.hours_difference() + 0.25).abs() < 1e-9);
    }

    #[test]
    fn join_of_open_jobs_stays_open() {
        let mut ledger = Ledger::from_jobs(vec![
            Job::started(at(10, 9, 0)),
            Job::from_parts(Some(at(10, 7, 0)), None, String::new()).unwrap(),
        ]);
        let plan = ledger.plan_join(&[1, 2], at(10, 12, 0), 0.25).unwrap();
        assert!(plan.merged.is_open());
        assert_eq!(plan.merged.start(), Some(at(10, 7, 0)));
        ledger.apply_join(&plan);
        assert_eq!(ledger.open_position(), Some(1));
    }

    #[test]
    fn join_excludes_open_jobs_from_the_end_comparison() {
        let ledger = Ledger::from_jobs(vec![
            closed(10, 9, 11, "closed"),
            Job::started(at(10, 10, 0)),
        ]);
        let plan = ledger.plan_join(&[1, 2], at(12, 23, 0), 0.25).unwrap();
        assert_eq!(plan.merged.end(), Some(at(10, 11, 0)));
    }

    #[test]
    fn join_needs_two_distinct_positions() {
        let ledger = five_job_ledger();
        let now = at(12, 12, 0);
        assert_eq!(
            ledger.plan_join(&[2], now, 0.25),
            Err(LedgerError::TooFewPositions)
        );
        assert_eq!(
            ledger.plan_join(&[2, 2], now, 0.25),
            Err(LedgerError::TooFewPositions)
        );
    }

    #[test]
    fn append_message_goes_to_the_open_job() {
        let mut ledger = Ledger::new();
        ledger.start(at(10, 9, 0)).unwrap();
        ledger.append_message("first").unwrap();
        ledger.append_message("second").unwrap();
        assert_eq!(ledger.get(1).unwrap().message(), "first\nsecond");
    }

    #[test]
    fn append_message_without_open_job_fails() {
        let mut ledger = five_job_ledger();
        assert_eq!(ledger.append_message("x"), Err(LedgerError::NoOpenJob));
    }

    #[test]
    fn query_since_filters_by_start() {
        let ledger = five_job_ledger();
        let result = ledger.query(Some(QueryFilter::Since(at(11, 0, 0))), at(12, 12, 0), 0.25);
        assert_eq!(result.count, 2);
        assert_eq!(
            result.jobs.iter().map(|i| i.position).collect::<Vec<_>>(),
            vec![4, 5]
        );
        assert!((result.hours - 2.0).abs() < 1e-9);
    }

    #[test]
    fn query_last_takes_the_tail() {
        let ledger = five_job_ledger();
        let result = ledger.query(Some(QueryFilter::Last(3)), at(12, 12, 0), 0.25);
        assert_eq!(
            result.jobs.iter().map(|i| i.position).collect::<Vec<_>>(),
            vec![3, 4, 5]
        );
        let empty = ledger.query(Some(QueryFilter::Last(0)), at(12, 12, 0), 0.25);
        assert_eq!(empty.count, 0);
        let all = ledger.query(Some(QueryFilter::Last(99)), at(12, 12, 0), 0.25);
        assert_eq!(all.count, 5);
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "exact zero intended")]
    fn empty_query_total_is_positive_zero() {
        let ledger = Ledger::new();
        let result = ledger.query(None, at(12, 12, 0), 0.25);
        assert_eq!(result.count, 0);
        assert!(
            result.hours == 0.0 && result.hours.is_sign_positive(),
            "hours rendered as {}",
            result.hours
        );
    }

    #[test]
    fn query_without_filter_returns_everything() {
        let ledger = five_job_ledger();
        let result = ledger.query(None, at(12, 12, 0), 0.25);
        assert_eq!(result.count, 5);
        assert!((result.hours - 5.0).abs() < 1e-9);
    }

    #[test]
    fn overlaps_at_reports_intersections() {
        let ledger = Ledger::from_jobs(vec![
            closed(10, 9, 12, "a"),
            closed(10, 11, 13, "b"),
            closed(10, 13, 14, "c"),
        ]);
        let overlaps = ledger.overlaps_at(1, at(10, 23, 0)).unwrap();
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].0, 2);
        assert_eq!(overlaps[0].1, (at(10, 11, 0), at(10, 12, 0)));
    }
}
