//! interlog - log interruptions, see where the time went
//!
//! Records discrete interruptions (start, end, topic), keeps them in a local
//! JSON file and turns them into statistics:
//! - Per-day totals for the last 7 active days
//! - Total count, total time, average length
//! - Optional AI commentary on the most recent sessions
//!
//! Commands:
//! - tui: Interactive Tracker / Dashboard / History views (default)
//! - add: Log an interruption
//! - history: List logged interruptions
//! - delete ID: Remove one
//! - stats: Show statistics
//! - analyze: Ask the AI consultant

pub mod app;
pub mod display;
pub mod form;
pub mod session;
pub mod stats;
pub mod store;
pub mod summarizer;
pub mod ui;

pub use form::{FormError, TrackerForm};
pub use session::Session;
pub use stats::{aggregate, DailyStat, Summary};
pub use store::SessionStore;
pub use summarizer::Summarizer;
