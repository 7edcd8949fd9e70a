//! Line-oriented job records: `start;end;message`.
//!
//! Timestamps are RFC 3339; an unset start is an empty field and a
//! missing end is the literal `open`. The message is escaped so a
//! record always stays on one line: `\` as `\\`, newline as `\n`,
//! carriage return as `\r`, and the field delimiter `;` as `\;`.
//! Timestamps never contain `;`, so splitting on the first two
//! delimiters is unambiguous.

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::job::Job;

const OPEN_MARKER: &str = "open";

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("expected three `;`-separated fields, got {0}")]
    FieldCount(usize),

    #[error("bad timestamp {value:?}")]
    Timestamp {
        value: String,
        source: chrono::ParseError,
    },

    #[error("unknown escape sequence `\\{0}`")]
    UnknownEscape(char),

    #[error("record ends in the middle of an escape sequence")]
    DanglingEscape,

    #[error("end does not come after start")]
    InvalidInterval,
}

/// Renders a job as a single record line, without trailing newline.
pub fn serialize(job: &Job) -> String {
    let start = job.start().map(|t| t.to_rfc3339()).unwrap_or_default();
    let end = job
        .end()
        .map_or_else(|| OPEN_MARKER.to_string(), |t| t.to_rfc3339());
    format!("{start};{end};{}", escape(job.message()))
}

/// Parses one record line back into a job.
pub fn deserialize(line: &str) -> Result<Job, RecordError> {
    let fields: Vec<&str> = line.splitn(3, ';').collect();
    if fields.len() != 3 {
        return Err(RecordError::FieldCount(fields.len()));
    }
    let start = parse_timestamp(fields[0])?;
    let end = if fields[1] == OPEN_MARKER {
        None
    } else {
        parse_timestamp(fields[1])?
    };
    let message = unescape(fields[2])?;
    Job::from_parts(start, end, message).ok_or(RecordError::InvalidInterval)
}

fn parse_timestamp(field: &str) -> Result<Option<DateTime<Local>>, RecordError> {
    if field.is_empty() {
        return Ok(None);
    }
    DateTime::parse_from_rfc3339(field)
        .map(|t| Some(t.with_timezone(&Local)))
        .map_err(|source| RecordError::Timestamp {
            value: field.to_string(),
            source,
        })
}

fn escape(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    for c in message.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ';' => out.push_str("\\;"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape(field: &str) -> Result<String, RecordError> {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(';') => out.push(';'),
            Some(other) => return Err(RecordError::UnknownEscape(other)),
            None => return Err(RecordError::DanglingEscape),
        }
    }
    Ok(out)
}
