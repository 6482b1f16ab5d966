use crate::models::{
    AnnotationRow, CalendarDay, DailyMatrix, DailyRow, PostCounts, Record, Report, StudentCounts,
};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::US::Eastern;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::{debug, warn};

/// Counts per student, keyed and iterated in handle order.
pub type CountsTable = BTreeMap<String, PostCounts>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SkipReason {
    #[error("malformed row: {0}")]
    Malformed(String),
    #[error("missing user")]
    MissingUser,
    #[error("no handle in user {0:?}")]
    EmptyHandle(String),
    #[error("missing created timestamp")]
    MissingCreated,
    #[error("unparsable created timestamp {0:?}")]
    BadTimestamp(String),
}

#[derive(Debug, Default)]
pub struct Normalized {
    pub records: Vec<Record>,
    pub skipped: usize,
}

/// Canonical handle from an actor string such as `acct:alice@hypothes.is`:
/// the text after the last `:`, cut at the first `@`. Strings without either
/// delimiter fall through unchanged.
pub fn extract_handle(actor: &str) -> &str {
    let tail = actor.rsplit(':').next().unwrap_or(actor);
    tail.split('@').next().unwrap_or(tail)
}

pub fn is_reply(row: &AnnotationRow) -> bool {
    row.references
        .as_ref()
        .is_some_and(|references| !references.is_empty())
}

/// Parses an ISO-8601 timestamp as a UTC instant. Offsets are honoured;
/// timestamps without one are taken to be UTC already.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
    {
        return Some(parsed.with_timezone(&Utc));
    }

    let naive = raw
        .strip_suffix('Z')
        .or_else(|| raw.strip_suffix('z'))
        .unwrap_or(raw);
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(naive, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(naive, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// Calendar day of an instant as seen on the US East Coast.
pub fn calendar_day(instant: DateTime<Utc>) -> CalendarDay {
    let local = instant.with_timezone(&Eastern);
    CalendarDay {
        month: local.month(),
        day: local.day(),
    }
}

/// Decodes one search row. A field of the wrong JSON type rejects only this
/// row, not the whole page.
pub fn decode_row(value: &Value) -> Result<AnnotationRow, SkipReason> {
    AnnotationRow::deserialize(value).map_err(|err| SkipReason::Malformed(err.to_string()))
}

pub fn to_record(value: &Value) -> Result<Record, SkipReason> {
    let row = decode_row(value)?;
    let user = row.user.as_deref().ok_or(SkipReason::MissingUser)?;
    let handle = extract_handle(user.trim());
    if handle.is_empty() {
        return Err(SkipReason::EmptyHandle(user.to_string()));
    }

    let created = row.created.as_deref().ok_or(SkipReason::MissingCreated)?;
    let created_at =
        parse_timestamp(created).ok_or_else(|| SkipReason::BadTimestamp(created.to_string()))?;

    Ok(Record {
        handle: handle.to_string(),
        created_at,
        is_reply: is_reply(&row),
    })
}

pub fn normalize_rows(rows: &[Value]) -> Normalized {
    let mut normalized = Normalized::default();
    for row in rows {
        match to_record(row) {
            Ok(record) => normalized.records.push(record),
            Err(reason) => {
                let id = row.get("id").and_then(Value::as_str).unwrap_or("-");
                warn!(id, %reason, "skipping annotation");
                normalized.skipped += 1;
            }
        }
    }
    normalized
}

pub fn aggregate_counts(records: &[Record]) -> CountsTable {
    let mut table = CountsTable::new();
    for record in records {
        let entry = table.entry(record.handle.clone()).or_default();
        if record.is_reply {
            entry.replies = entry.replies.saturating_add(1);
        } else {
            entry.annotations = entry.annotations.saturating_add(1);
        }
    }
    table
}

/// Student-by-day counts. Absent cells are filled with zero and the day
/// columns run in calendar order.
pub fn aggregate_daily(records: &[Record]) -> DailyMatrix {
    let mut cells: BTreeMap<&str, BTreeMap<CalendarDay, u64>> = BTreeMap::new();
    let mut days = BTreeSet::new();

    for record in records {
        let day = calendar_day(record.created_at);
        days.insert(day);
        let count = cells
            .entry(record.handle.as_str())
            .or_default()
            .entry(day)
            .or_insert(0);
        *count = count.saturating_add(1);
    }

    let rows = cells
        .into_iter()
        .map(|(student, by_day)| DailyRow {
            student: student.to_string(),
            counts: days
                .iter()
                .map(|day| by_day.get(day).copied().unwrap_or(0))
                .collect(),
        })
        .collect();

    DailyMatrix {
        days: days.iter().map(ToString::to_string).collect(),
        rows,
    }
}

pub fn build_report(rows: &[Value]) -> Report {
    let Normalized { records, skipped } = normalize_rows(rows);
    let counts = aggregate_counts(&records)
        .into_iter()
        .map(|(student, counts)| StudentCounts {
            student,
            annotations: counts.annotations,
            replies: counts.replies,
        })
        .collect();
    let daily = aggregate_daily(&records);

    debug!(
        records = records.len(),
        skipped,
        days = daily.days.len(),
        "built report"
    );

    Report {
        total_records: records.len(),
        skipped,
        counts,
        daily,
    }
}
