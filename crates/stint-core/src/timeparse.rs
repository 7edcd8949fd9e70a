//! Temporal expression parser.
//!
//! Converts short human-typed tokens into absolute local timestamps,
//! using the caller-supplied current moment as the implicit reference.
//! Expression classes are tried in a fixed priority order and a class
//! only applies when its pattern matches the whole input:
//!
//! 1. `now`
//! 2. `H:M` with a trailing sign, relative to now (`4:10-`)
//! 3. `N` with unit `h`/`m` and a trailing sign (`1h+`)
//! 4. bare `H:M`, today at that clock time, backdated to yesterday when
//!    it would land more than half a day in the future (`14:10`)
//! 5. comma-separated date-and-time in either order, where the date is
//!    `D.M[.Y]`, `M/D/Y`, a weekday name, or `yesterday`
//!    (`8/1/,14:10`, `mon,14:10`, `yesterday,14:10`)
//!
//! Anything else is a parse failure; an expression never partially
//! succeeds. Numeric fields are digit runs that may be empty, and the
//! conversion is deliberately lenient: a missing run counts as zero
//! (`4:` is 4:00), which keeps some historical inputs like `8/1/`
//! (year zero) parseable.

use std::sync::LazyLock;

use chrono::{
    DateTime, Datelike, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime,
    TimeZone,
};
use regex::Regex;
use thiserror::Error;

/// How far in the future a bare clock time may land before it is read
/// as yesterday's, in hours.
const BACKDATE_THRESHOLD_HOURS: i64 = 12;

static REL_COLON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d*):(\d*)([+-])$").expect("valid pattern"));
static REL_UNIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d*)([hm])([+-])$").expect("valid pattern"));
static CLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d*):(\d*)$").expect("valid pattern"));
static GERMAN_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d*)\.(\d*)(?:\.(\d*))?$").expect("valid pattern"));
static ENGLISH_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d*)/(\d*)/(\d*)$").expect("valid pattern"));

const WEEKDAY_NAMES: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

/// Failures produced by [`parse_time_expr`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The input matches none of the recognized expression classes.
    #[error("unrecognized time expression {0:?}")]
    Unrecognized(String),

    /// A date token named a day that does not exist in its month/year.
    #[error("{0:?} is not a valid calendar date")]
    InvalidDate(String),

    /// A clock-time token was out of range (hours > 23 or minutes > 59).
    #[error("{0:?} is not a valid clock time")]
    InvalidClockTime(String),

    /// The named local time does not exist (DST gap with no escape).
    #[error("{0:?} does not exist in the local timezone")]
    NonexistentLocalTime(String),
}

/// Parses a temporal expression against the given current moment.
///
/// `allow_date_only` permits a bare date token without a clock time
/// (resolved at midnight); list filters use this, start/end times do
/// not.
pub fn parse_time_expr(
    text: &str,
    now: DateTime<Local>,
    allow_date_only: bool,
) -> Result<DateTime<Local>, ParseError> {
    let text = text.trim();

    if text == "now" {
        return Ok(now);
    }

    if let Some(caps) = REL_COLON_RE.captures(text) {
        let offset =
            Duration::hours(lenient_i64(&caps[1])) + Duration::minutes(lenient_i64(&caps[2]));
        return Ok(apply_sign(now, offset, &caps[3]));
    }

    if let Some(caps) = REL_UNIT_RE.captures(text) {
        let n = lenient_i64(&caps[1]);
        let offset = if &caps[2] == "h" {
            Duration::hours(n)
        } else {
            Duration::minutes(n)
        };
        return Ok(apply_sign(now, offset, &caps[3]));
    }

    if let Some(caps) = CLOCK_RE.captures(text) {
        let time = clock_time(&caps[1], &caps[2])
            .ok_or_else(|| ParseError::InvalidClockTime(text.to_string()))?;
        let today = now.date_naive();
        let candidate = resolve_local(today.and_time(time), text)?;
        if candidate - now > Duration::hours(BACKDATE_THRESHOLD_HOURS) {
            return resolve_local((today - Duration::days(1)).and_time(time), text);
        }
        return Ok(candidate);
    }

    parse_date_time_combo(text, now, allow_date_only)
}

/// Class 5: a date token, optionally paired with a clock time.
fn parse_date_time_combo(
    text: &str,
    now: DateTime<Local>,
    allow_date_only: bool,
) -> Result<DateTime<Local>, ParseError> {
    let (date_token, time_token) = match text.split_once(',') {
        Some((left, right)) => {
            let (left, right) = (left.trim(), right.trim());
            if is_date_token(left) {
                (left, right)
            } else if is_date_token(right) {
                (right, left)
            } else {
                return Err(ParseError::Unrecognized(text.to_string()));
            }
        }
        None if allow_date_only && is_date_token(text) => (text, ""),
        None => return Err(ParseError::Unrecognized(text.to_string())),
    };

    let date = resolve_date(date_token, now)?;
    let time = if time_token.is_empty() {
        NaiveTime::MIN
    } else {
        let caps = CLOCK_RE
            .captures(time_token)
            .ok_or_else(|| ParseError::Unrecognized(text.to_string()))?;
        clock_time(&caps[1], &caps[2])
            .ok_or_else(|| ParseError::InvalidClockTime(time_token.to_string()))?
    };

    resolve_local(date.and_time(time), text)
}

/// Whether the token has the shape of a date (not whether it resolves
/// to a valid calendar day).
fn is_date_token(token: &str) -> bool {
    token == "yesterday"
        || weekday_index(token).is_some()
        || GERMAN_DATE_RE.is_match(token)
        || ENGLISH_DATE_RE.is_match(token)
}

/// Resolves a date token to a calendar day relative to `now`.
fn resolve_date(token: &str, now: DateTime<Local>) -> Result<NaiveDate, ParseError> {
    let today = now.date_naive();

    if token == "yesterday" {
        return Ok(today - Duration::days(1));
    }

    if let Some(target) = weekday_index(token) {
        // Walk backward at most a week; today counts when it matches.
        for offset in 0..7 {
            let date = today - Duration::days(offset);
            if date.weekday().num_days_from_sunday() as usize == target {
                return Ok(date);
            }
        }
        return Err(ParseError::Unrecognized(token.to_string()));
    }

    if let Some(caps) = GERMAN_DATE_RE.captures(token) {
        let day = lenient_u32(&caps[1]);
        let month = lenient_u32(&caps[2]);
        let year = match caps.get(3) {
            Some(m) if !m.as_str().is_empty() => lenient_i32(m.as_str()),
            // `1.1.` and `1.1` both default the year to the current one
            _ => now.year(),
        };
        return NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| ParseError::InvalidDate(token.to_string()));
    }

    if let Some(caps) = ENGLISH_DATE_RE.captures(token) {
        let month = lenient_u32(&caps[1]);
        let day = lenient_u32(&caps[2]);
        let year = lenient_i32(&caps[3]);
        return NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| ParseError::InvalidDate(token.to_string()));
    }

    Err(ParseError::Unrecognized(token.to_string()))
}

fn weekday_index(token: &str) -> Option<usize> {
    let lower = token.to_ascii_lowercase();
    WEEKDAY_NAMES.iter().position(|name| *name == lower)
}

fn clock_time(hours: &str, minutes: &str) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(lenient_u32(hours), lenient_u32(minutes), 0)
}

fn apply_sign(now: DateTime<Local>, offset: Duration, sign: &str) -> DateTime<Local> {
    if sign == "-" { now - offset } else { now + offset }
}

/// Pins a naive local datetime to the local timezone. DST fall-back
/// ambiguity picks the earlier instant; a spring-forward gap retries an
/// hour later.
fn resolve_local(naive: NaiveDateTime, text: &str) -> Result<DateTime<Local>, ParseError> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(dt),
        LocalResult::None => Local
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .ok_or_else(|| ParseError::NonexistentLocalTime(text.to_string())),
    }
}

/// Lenient numeric conversion: anything that is not a clean number
/// (including the empty run) counts as zero.
fn lenient_u32(s: &str) -> u32 {
    s.parse().unwrap_or(0)
}

fn lenient_i32(s: &str) -> i32 {
    s.parse().unwrap_or(0)
}

fn lenient_i64(s: &str) -> i64 {
    s.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    /// Wednesday, mid-March, well away from any DST boundary.
    fn wednesday_noon() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2025, 3, 12, 12, 0, 0)
            .single()
            .unwrap()
    }

    fn parse(text: &str) -> Result<DateTime<Local>, ParseError> {
        parse_time_expr(text, wednesday_noon(), false)
    }

    #[test]
    fn literal_now_is_the_reference_moment() {
        assert_eq!(parse("now").unwrap(), wednesday_noon());
    }

    #[test]
    fn relative_colon_form_offsets_from_now() {
        let now = wednesday_noon();
        assert_eq!(
            parse("4:10-").unwrap(),
            now - Duration::hours(4) - Duration::minutes(10)
        );
        assert_eq!(parse("0:30+").unwrap(), now + Duration::minutes(30));
    }

    #[test]
    fn relative_unit_form_offsets_from_now() {
        let now = wednesday_noon();
        assert_eq!(parse("1h+").unwrap(), now + Duration::hours(1));
        assert_eq!(parse("90m-").unwrap(), now - Duration::minutes(90));
    }

    #[test]
    fn bare_clock_time_is_today() {
        let parsed = parse("14:10").unwrap();
        assert_eq!(parsed.date_naive(), wednesday_noon().date_naive());
        assert_eq!((parsed.hour(), parsed.minute()), (14, 10));
    }

    #[test]
    fn clock_time_far_in_the_future_backdates_to_yesterday() {
        let shortly_after_midnight = Local
            .with_ymd_and_hms(2025, 3, 12, 0, 30, 0)
            .single()
            .unwrap();
        let parsed = parse_time_expr("14:10", shortly_after_midnight, false).unwrap();
        assert_eq!(
            parsed.date_naive(),
            NaiveDate::from_ymd_opt(2025, 3, 11).unwrap()
        );
        assert_eq!((parsed.hour(), parsed.minute()), (14, 10));
    }

    #[test]
    fn clock_time_exactly_half_a_day_ahead_stays_today() {
        let midnight = Local
            .with_ymd_and_hms(2025, 3, 12, 0, 0, 0)
            .single()
            .unwrap();
        let parsed = parse_time_expr("12:00", midnight, false).unwrap();
        assert_eq!(parsed.date_naive(), midnight.date_naive());
    }

    #[test]
    fn empty_minutes_count_as_zero() {
        let parsed = parse("4:").unwrap();
        assert_eq!((parsed.hour(), parsed.minute()), (4, 0));
    }

    #[test]
    fn german_date_with_time() {
        let parsed = parse("1.3.2025,14:10").unwrap();
        assert_eq!(
            parsed.date_naive(),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
        assert_eq!((parsed.hour(), parsed.minute()), (14, 10));
    }

    #[test]
    fn german_date_without_year_uses_the_current_one() {
        for token in ["1.1.,12:00", "1.1,12:00"] {
            let parsed = parse(token).unwrap();
            assert_eq!(
                parsed.date_naive(),
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                "token {token:?}"
            );
        }
    }

    #[test]
    fn english_date_requires_year_and_empty_year_becomes_zero() {
        let parsed = parse("8/1/,14:10").unwrap();
        assert_eq!(
            parsed.date_naive(),
            NaiveDate::from_ymd_opt(0, 8, 1).unwrap()
        );
    }

    #[test]
    fn date_and_time_combine_in_either_order() {
        let a = parse("3/1/2025,14:10").unwrap();
        let b = parse("14:10,3/1/2025").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn missing_time_side_defaults_to_midnight() {
        let parsed = parse("10.3.2025,").unwrap();
        assert_eq!(
            parsed.date_naive(),
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
        );
        assert_eq!((parsed.hour(), parsed.minute()), (0, 0));
    }

    #[test]
    fn weekday_resolves_to_most_recent_past_occurrence() {
        // Reference is Wednesday 2025-03-12.
        let monday = parse("mon,14:10").unwrap();
        assert_eq!(
            monday.date_naive(),
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
        );
        // Today matches itself.
        let wednesday = parse("wed,9:00").unwrap();
        assert_eq!(wednesday.date_naive(), wednesday_noon().date_naive());
        // Thursday is six days back, not tomorrow.
        let thursday = parse("thu,9:00").unwrap();
        assert_eq!(
            thursday.date_naive(),
            NaiveDate::from_ymd_opt(2025, 3, 6).unwrap()
        );
    }

    #[test]
    fn yesterday_with_time() {
        let parsed = parse("yesterday,14:10").unwrap();
        assert_eq!(
            parsed.date_naive(),
            NaiveDate::from_ymd_opt(2025, 3, 11).unwrap()
        );
        assert_eq!((parsed.hour(), parsed.minute()), (14, 10));
    }

    #[test]
    fn date_only_needs_explicit_permission() {
        assert!(parse("mon").is_err());
        let parsed = parse_time_expr("mon", wednesday_noon(), true).unwrap();
        assert_eq!(
            parsed.date_naive(),
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
        );
        assert_eq!((parsed.hour(), parsed.minute()), (0, 0));
    }

    #[test]
    fn patterns_must_match_the_whole_input() {
        for text in ["14:10abc", "x14:10", "1h+2", "now-ish", "14:10:30"] {
            assert!(parse(text).is_err(), "{text:?} should not parse");
        }
    }

    #[test]
    fn garbage_is_rejected() {
        for text in ["", "later", "12", "half past nine"] {
            assert!(parse(text).is_err(), "{text:?} should not parse");
        }
    }

    #[test]
    fn out_of_range_clock_times_fail() {
        assert_eq!(
            parse("25:00"),
            Err(ParseError::InvalidClockTime("25:00".to_string()))
        );
        assert!(parse("12:75").is_err());
    }

    #[test]
    fn invalid_calendar_dates_fail() {
        assert_eq!(
            parse("30.2.2025,12:00"),
            Err(ParseError::InvalidDate("30.2.2025".to_string()))
        );
        assert!(parse("2/30/2025,12:00").is_err());
    }
}
