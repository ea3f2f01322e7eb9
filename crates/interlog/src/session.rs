//! Session records
//!
//! A session is one logged interruption: when it started, when it ended,
//! what it was about. Sessions are immutable once created.

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

/// A single logged interruption
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Opaque unique identifier
    pub id: String,
    /// Start (epoch milliseconds)
    pub start_time: i64,
    /// End (epoch milliseconds), strictly after `start_time`
    pub end_time: i64,
    /// Whole seconds between start and end, fixed at creation
    pub duration: u64,
    /// What the interruption was about
    pub note: String,
    /// Local calendar date of the start, used as the aggregation key
    pub date: NaiveDate,
}

impl Session {
    /// Create a session for the given range, or `None` if `end` is not after `start`
    pub fn new(start: DateTime<Local>, end: DateTime<Local>, note: impl Into<String>) -> Option<Self> {
        let start_time = start.timestamp_millis();
        let end_time = end.timestamp_millis();
        let span = end_time.checked_sub(start_time).filter(|span| *span > 0)?;

        Some(Self {
            id: new_id(),
            start_time,
            end_time,
            duration: (span / 1000) as u64,
            note: note.into(),
            date: start.date_naive(),
        })
    }

    /// Start as a local datetime
    pub fn start(&self) -> DateTime<Local> {
        Local
            .timestamp_millis_opt(self.start_time)
            .single()
            .unwrap_or_else(Local::now)
    }

    /// End as a local datetime
    pub fn end(&self) -> DateTime<Local> {
        Local
            .timestamp_millis_opt(self.end_time)
            .single()
            .unwrap_or_else(Local::now)
    }

    /// Duration rounded to whole minutes (what the summarizer prompt shows)
    pub fn rounded_minutes(&self) -> u64 {
        (self.duration + 30) / 60
    }

    /// First 8 characters of the id, enough to address it from the CLI
    pub fn short_id(&self) -> String {
        self.id.chars().take(8).collect()
    }

    /// Whether the stored fields still satisfy the creation invariants.
    /// Both timestamps must map to a local datetime.
    pub fn is_consistent(&self) -> bool {
        let Some(span) = self.end_time.checked_sub(self.start_time) else {
            return false;
        };

        span > 0
            && self.duration == (span / 1000) as u64
            && Local.timestamp_millis_opt(self.start_time).single().is_some()
            && Local.timestamp_millis_opt(self.end_time).single().is_some()
    }
}

/// Generate a new session identifier
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
