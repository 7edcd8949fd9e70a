//! Plain-text rendering of jobs, listings, and the calendar report.

use std::fmt::Write as _;

use chrono::{DateTime, Local};
use stint_core::{JoinPlan, QueryItem, QueryResult, Report, Settings};

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn fmt_time(t: DateTime<Local>) -> String {
    t.format("%a %b %d %Y, %H:%M").to_string()
}

/// One job as an indented block headed by its position.
pub fn format_job(item: &QueryItem, now: DateTime<Local>, settings: &Settings) -> String {
    let job = &item.job;
    let start = job.start().map_or_else(|| "-".to_string(), fmt_time);
    let end = job.end().map_or_else(|| "open".to_string(), fmt_time);
    let hours = job.hours(now, settings.resolution);

    let mut out = format!(
        "Pos: {}\n    Start: {start}\n    End:   {end}\n    Hours: {hours}",
        item.position
    );
    if let Some(rate) = settings.rate {
        let pay = rate * hours;
        let _ = write!(out, " = ${pay}");
    }
    if !job.message().is_empty() {
        out.push_str("\n    Message:");
        for line in job.message().lines() {
            let _ = write!(out, "\n        {line}");
        }
    }
    out
}

/// A listing: job blocks followed by the total line.
pub fn format_list(result: &QueryResult, now: DateTime<Local>, settings: &Settings) -> String {
    let mut out = String::new();
    for item in &result.jobs {
        out.push_str(&format_job(item, now, settings));
        out.push('\n');
    }
    let _ = write!(out, "Total: {} job(s), {} hours", result.count, result.hours);
    if let Some(rate) = settings.rate {
        let pay = rate * result.hours;
        let _ = write!(out, " = ${pay}");
    }
    out.push('\n');
    out
}

/// Preview of a join for the confirmation prompt.
pub fn format_join_plan(plan: &JoinPlan, now: DateTime<Local>, settings: &Settings) -> String {
    let positions = plan
        .removed
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let merged = QueryItem {
        position: plan.target,
        job: plan.merged.clone(),
    };
    let difference = plan.hours_difference();
    format!(
        "Joining position(s) {positions} into position {}:\n{}\n\
         Hours before: {}, after: {} ({difference:+})",
        plan.target,
        format_job(&merged, now, settings),
        plan.hours_before,
        plan.hours_after,
    )
}

/// The calendar report: one week per row, Sunday through Saturday, a
/// weekly subtotal column, and per-month and overall totals.
pub fn format_report(report: &Report) -> String {
    let mut out = String::new();
    for month in &report.months {
        let title = format!("{}/{}", month.month, month.year);
        let _ = writeln!(out, "{title:^68}");

        let _ = write!(out, "{:>3}", "Day");
        for weekday in WEEKDAYS {
            let _ = write!(out, "{weekday:>8}");
        }
        let _ = writeln!(out, "{:>8}", "Week");

        for week in &month.weeks {
            // The leading column shows the day the row starts on; a
            // partial first week leaves it blank.
            let label = week.days[0].map_or_else(String::new, |cell| cell.day.to_string());
            let _ = write!(out, "{label:>3}");
            for slot in &week.days {
                match slot {
                    None => {
                        let _ = write!(out, "{:>8}", "");
                    }
                    Some(cell) => match cell.hours {
                        None => {
                            let _ = write!(out, "{:>8}", "-");
                        }
                        Some(hours) => {
                            let _ = write!(out, "{hours:>8}");
                        }
                    },
                }
            }
            let subtotal = week.hours;
            let _ = writeln!(out, "{subtotal:>8}");
        }

        let pay = month
            .pay
            .map_or_else(String::new, |pay| format!(" = ${pay}"));
        let total = format!(
            "{} {}: {} hours{pay}",
            MONTHS[month.month as usize - 1],
            month.year,
            month.hours
        );
        let _ = writeln!(out, "{total:>67}");
        let _ = writeln!(out);
    }

    let pay = report
        .pay
        .map_or_else(String::new, |pay| format!(" = ${pay}"));
    let _ = writeln!(
        out,
        "Total: {} job(s), {} hours{pay}",
        report.job_count, report.hours
    );
    out
}
