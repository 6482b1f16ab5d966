use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of the search API as it arrives on the wire. Every field is
/// optional here; `stats::normalize_rows` decides what is usable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnotationRow {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub references: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    /// Rows are decoded one at a time so a single bad row cannot sink the page.
    #[serde(default)]
    pub rows: Vec<serde_json::Value>,
}

/// A validated annotation record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub handle: String,
    pub created_at: DateTime<Utc>,
    pub is_reply: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDay {
    pub month: u32,
    pub day: u32,
}

impl fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}", self.month, self.day)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PostCounts {
    pub annotations: u64,
    pub replies: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudentCounts {
    pub student: String,
    pub annotations: u64,
    pub replies: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyRow {
    pub student: String,
    pub counts: Vec<u64>,
}

/// Dense student-by-day matrix; every row has one count per entry in `days`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DailyMatrix {
    pub days: Vec<String>,
    pub rows: Vec<DailyRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Report {
    pub total_records: usize,
    pub skipped: usize,
    pub counts: Vec<StudentCounts>,
    pub daily: DailyMatrix,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub group: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportResponse {
    pub group: String,
    pub window_start: String,
    pub window_end: String,
    pub fetch_error: Option<String>,
    #[serde(flatten)]
    pub report: Report,
}
