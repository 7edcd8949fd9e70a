//! Wiring between the parsed command line and the ledger.
//!
//! All requested operations run against one loaded ledger in a fixed
//! order: join, drop, list, start, message, end, report. The ledger is
//! written back once at the end, and only if something changed.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use stint_core::{Ledger, Position, QueryFilter, QueryItem, aggregate, parse_time_expr};
use stint_store::LedgerStore;

use crate::cli::Cli;
use crate::config::Config;
use crate::prompt::Confirm;
use crate::render;

/// Executes every operation the command line asked for.
///
/// `now` and `out` are injected so tests can pin the clock and capture
/// the output.
pub fn run(
    cli: &Cli,
    config: &Config,
    confirm: &mut dyn Confirm,
    now: DateTime<Local>,
    out: &mut dyn Write,
) -> Result<()> {
    let settings = config.settings();
    let store = LedgerStore::new(&config.ledger_path);
    let mut ledger = store.load().context("failed to load the ledger")?;
    let mut dirty = false;

    if let Some(positions) = &cli.join {
        let plan = ledger.plan_join(positions, now, settings.resolution)?;
        writeln!(out, "{}", render::format_join_plan(&plan, now, &settings))?;
        if confirm.confirm("Join these jobs?")? {
            ledger.apply_join(&plan);
            dirty = true;
        } else {
            writeln!(out, "Join cancelled.")?;
        }
    }

    if let Some(position) = cli.drop {
        let item = QueryItem {
            position,
            job: ledger.get(position)?.clone(),
        };
        writeln!(out, "{}", render::format_job(&item, now, &settings))?;
        let confirmed = confirm.confirm("Drop this job?")?;
        if ledger.drop_job(position, confirmed)?.is_some() {
            dirty = true;
        } else {
            writeln!(out, "Drop cancelled.")?;
        }
    }

    if let Some(filter_text) = &cli.list {
        let filter = parse_filter(filter_text, now)?;
        let result = ledger.query(filter, now, settings.resolution);
        if cli.json {
            serde_json::to_writer_pretty(&mut *out, &result)
                .context("failed to serialize the listing")?;
            writeln!(out)?;
        } else {
            write!(out, "{}", render::format_list(&result, now, &settings))?;
        }
    }

    if let Some(expr) = &cli.start {
        let start = parse_time_expr(expr, now, false)?;
        let position = ledger.start(start)?;
        dirty = true;
        warn_overlaps(&ledger, position, now, out)?;
    }

    // The message goes in before any end so `--end --message` can
    // still reach the job it is closing.
    if let Some(text) = &cli.message {
        ledger.append_message(text)?;
        dirty = true;
    }

    if let Some(expr) = &cli.end {
        let end = parse_time_expr(expr, now, false)?;
        let position = ledger.end(end)?;
        dirty = true;
        warn_overlaps(&ledger, position, now, out)?;
    }

    if cli.report {
        let report = aggregate(ledger.jobs(), now, &settings);
        if cli.json {
            serde_json::to_writer_pretty(&mut *out, &report)
                .context("failed to serialize the report")?;
            writeln!(out)?;
        } else {
            write!(out, "{}", render::format_report(&report))?;
        }
    }

    if dirty {
        store
            .save(ledger.jobs())
            .context("failed to save the ledger")?;
    }
    Ok(())
}

/// An empty filter selects everything, a plain number the last N jobs,
/// and anything else must parse as a time expression (dates allowed).
fn parse_filter(text: &str, now: DateTime<Local>) -> Result<Option<QueryFilter>> {
    if text.is_empty() {
        return Ok(None);
    }
    if let Ok(n) = text.parse::<usize>() {
        return Ok(Some(QueryFilter::Last(n)));
    }
    let since = parse_time_expr(text, now, true).with_context(|| {
        format!("list filter {text:?} is neither a count nor a time expression")
    })?;
    Ok(Some(QueryFilter::Since(since)))
}

fn warn_overlaps(
    ledger: &Ledger,
    position: Position,
    now: DateTime<Local>,
    out: &mut dyn Write,
) -> Result<()> {
    for (other, (from, to)) in ledger.overlaps_at(position, now)? {
        // Touching intervals intersect in a single instant; that is the
        // normal back-to-back case, not an overlap worth flagging.
        if from < to {
            writeln!(
                out,
                "Warning: overlaps job at position {other} between {} and {}",
                from.format("%a %b %d %Y, %H:%M"),
                to.format("%a %b %d %Y, %H:%M"),
            )?;
        }
    }
    Ok(())
}
