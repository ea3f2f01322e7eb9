//! Tracker entry form
//!
//! Holds the raw text of the start/end/topic fields, validates them on submit
//! and turns a valid entry into a [`Session`]. The form never touches stored
//! sessions; the caller hands the result to the store.

use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone};
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::session::Session;

/// Format of the datetime fields
pub const INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Also accepted when parsing input
const ALT_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"];

/// How far back the start field defaults to
pub const DEFAULT_LOOKBACK_MINUTES: i64 = 15;

/// Above this many seconds the duration preview is highlighted
pub const LONG_SESSION_SECONDS: i64 = 30 * 60;

/// Placeholder topics used when the note is left blank
pub const DEFAULT_TOPICS: &[&str] = &[
    "Complaining about the boss",
    "Showing off new cat photos",
    "What to eat for lunch (20 minutes of it)",
    "Gossip about the team next door",
    "Group order for bubble tea",
    "Sighing, meaningfully",
    "Pretending to discuss work",
    "How much the stocks lost today",
    "Complaining about overtime again",
    "\"Got a minute?\" (nothing, actually)",
    "Their kid's school drama",
    "Criticizing the office coffee",
    "Weekend plans",
    "Who is dating whom",
    "Selling me insurance I don't need",
];

/// Why a submit was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Please enter valid dates")]
    InvalidDates,

    #[error("End time must be after start time")]
    EndBeforeStart,
}

/// Which field has input focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Start,
    End,
    Note,
}

impl Field {
    pub fn next(self) -> Self {
        match self {
            Field::Start => Field::End,
            Field::End => Field::Note,
            Field::Note => Field::Start,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Field::Start => Field::Note,
            Field::End => Field::Start,
            Field::Note => Field::End,
        }
    }
}

/// Pick a uniformly random placeholder topic
pub fn random_topic() -> String {
    DEFAULT_TOPICS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Chatting")
        .to_string()
}

/// Format a datetime the way the input fields hold it
pub fn format_input(time: DateTime<Local>) -> String {
    time.format(INPUT_FORMAT).to_string()
}

/// Parse a datetime field as local time
pub fn parse_input(text: &str) -> Option<DateTime<Local>> {
    let text = text.trim();
    let naive = std::iter::once(INPUT_FORMAT)
        .chain(ALT_FORMATS)
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())?;

    // Times inside a DST gap don't exist locally
    Local.from_local_datetime(&naive).earliest()
}

/// The tracker form state
#[derive(Debug, Clone)]
pub struct TrackerForm {
    pub start: String,
    pub end: String,
    pub note: String,
    /// Topic used when `note` is blank
    pub placeholder: String,
    pub focused: Field,
}

impl TrackerForm {
    /// New form with start = 15 minutes before `now` and end = `now`
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            start: format_input(now - Duration::minutes(DEFAULT_LOOKBACK_MINUTES)),
            end: format_input(now),
            note: String::new(),
            placeholder: random_topic(),
            focused: Field::Start,
        }
    }

    /// Text of the focused field
    pub fn focused_text_mut(&mut self) -> &mut String {
        match self.focused {
            Field::Start => &mut self.start,
            Field::End => &mut self.end,
            Field::Note => &mut self.note,
        }
    }

    pub fn set_start_now(&mut self, now: DateTime<Local>) {
        self.start = format_input(now);
    }

    pub fn set_end_now(&mut self, now: DateTime<Local>) {
        self.end = format_input(now);
    }

    /// Put a fresh random topic in the note field
    pub fn randomize_topic(&mut self) {
        self.note = random_topic();
    }

    /// The note that would be saved
    pub fn effective_note(&self) -> String {
        let trimmed = self.note.trim();
        if trimmed.is_empty() {
            self.placeholder.clone()
        } else {
            trimmed.to_string()
        }
    }

    /// Seconds between start and end, or `None` while either field is unparseable
    pub fn preview_seconds(&self) -> Option<i64> {
        let start = parse_input(&self.start)?;
        let end = parse_input(&self.end)?;
        Some((end - start).num_seconds())
    }

    /// Check both fields and return the parsed range
    pub fn validate(&self) -> Result<(DateTime<Local>, DateTime<Local>), FormError> {
        let (Some(start), Some(end)) = (parse_input(&self.start), parse_input(&self.end)) else {
            return Err(FormError::InvalidDates);
        };

        if end <= start {
            return Err(FormError::EndBeforeStart);
        }

        Ok((start, end))
    }

    /// Validate and build a session. On success the form is reset for the next
    /// entry: end moves to `now`, the note clears and a new placeholder is drawn.
    /// On failure the form is left as it was.
    pub fn submit(&mut self, now: DateTime<Local>) -> Result<Session, FormError> {
        let (start, end) = self.validate()?;
        let session =
            Session::new(start, end, self.effective_note()).ok_or(FormError::EndBeforeStart)?;

        self.end = format_input(now);
        self.note.clear();
        self.placeholder = random_topic();

        Ok(session)
    }
}
