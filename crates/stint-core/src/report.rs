//! Calendar-grid aggregation of recorded hours.
//!
//! A job contributes its rounded hours to the calendar day of its
//! start; jobs spanning midnight are not split. The output is plain
//! structured data, leaving layout to the caller.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Local, NaiveDate};
use serde::Serialize;

use crate::job::Job;
use crate::settings::Settings;

/// One day slot in a week row. `hours` is `None` for days without any
/// recorded work.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayCell {
    pub day: u32,
    pub hours: Option<f64>,
}

/// Seven slots from Sunday through Saturday plus the week's subtotal.
/// Slots outside the month are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekRow {
    pub days: [Option<DayCell>; 7],
    pub hours: f64,
}

/// All weeks of one calendar month that saw recorded work.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<WeekRow>,
    pub hours: f64,
    pub pay: Option<f64>,
}

/// The full report: months in chronological order plus grand totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub months: Vec<MonthGrid>,
    pub job_count: usize,
    pub hours: f64,
    pub pay: Option<f64>,
}

/// Aggregates jobs into per-month calendar grids. Jobs without a start
/// are skipped; open jobs are measured against `now`.
pub fn aggregate(jobs: &[Job], now: DateTime<Local>, settings: &Settings) -> Report {
    let mut days: BTreeMap<(i32, u32), BTreeMap<u32, f64>> = BTreeMap::new();
    let mut job_count = 0;
    for job in jobs {
        let Some(start) = job.start() else { continue };
        job_count += 1;
        let date = start.date_naive();
        *days
            .entry((date.year(), date.month()))
            .or_default()
            .entry(date.day())
            .or_insert(0.0) += job.hours(now, settings.resolution);
    }

    let months: Vec<MonthGrid> = days
        .into_iter()
        .map(|((year, month), day_hours)| month_grid(year, month, &day_hours, settings))
        .collect();

    // Folded from +0.0: `Sum for f64` starts at -0.0, which would
    // surface as "-0 hours" for an empty ledger.
    let hours = months.iter().map(|m| m.hours).fold(0.0, |acc, h| acc + h);
    Report {
        job_count,
        hours,
        pay: settings.rate.map(|rate| rate * hours),
        months,
    }
}

fn month_grid(
    year: i32,
    month: u32,
    day_hours: &BTreeMap<u32, f64>,
    settings: &Settings,
) -> MonthGrid {
    let mut weeks = Vec::new();
    let mut row = [None; 7];
    let mut row_hours = 0.0;
    let mut row_used = false;

    for day in 1..=31 {
        // Day numbers beyond the month's length simply do not exist.
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            continue;
        };
        let column = date.weekday().num_days_from_sunday() as usize;
        let hours = day_hours.get(&day).copied();
        row[column] = Some(DayCell { day, hours });
        row_hours += hours.unwrap_or(0.0);
        row_used = true;
        if column == 6 {
            weeks.push(WeekRow {
                days: row,
                hours: row_hours,
            });
            row = [None; 7];
            row_hours = 0.0;
            row_used = false;
        }
    }
    if row_used {
        weeks.push(WeekRow {
            days: row,
            hours: row_hours,
        });
    }

    let hours = day_hours.values().fold(0.0, |acc, h| acc + h);
    MonthGrid {
        year,
        month,
        weeks,
        hours,
        pay: settings.rate.map(|rate| rate * hours),
    }
}
