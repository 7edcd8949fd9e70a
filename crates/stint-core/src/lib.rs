//! Core domain logic for the stint work-time ledger.
//!
//! This crate contains the fundamental types and logic for:
//! - Jobs: recorded work intervals with the `start < end` invariant
//! - Time parsing: the shorthand expressions accepted on the command line
//! - Ledger edits: start/end, join, drop, and queries over the job list
//! - Records: the one-line-per-job storage format
//! - Reports: calendar-grid aggregation of recorded hours

pub mod job;
pub mod ledger;
pub mod overlap;
pub mod record;
pub mod report;
pub mod settings;
pub mod timeparse;

pub use job::{Job, round_hours};
pub use ledger::{
    JoinPlan, Ledger, LedgerError, Position, QueryFilter, QueryItem, QueryResult,
};
pub use overlap::intersect;
pub use record::RecordError;
pub use report::{DayCell, MonthGrid, Report, WeekRow, aggregate};
pub use settings::{DEFAULT_RESOLUTION, Settings};
pub use timeparse::{ParseError, parse_time_expr};
