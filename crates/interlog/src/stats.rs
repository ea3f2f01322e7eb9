//! Session statistics
//!
//! Aggregates sessions into per-day buckets and overall totals:
//! - Daily totals for the last 7 days that have any sessions
//! - Total count and time
//! - Average session length

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::session::Session;

/// How many distinct days the daily series keeps
pub const DAILY_WINDOW: usize = 7;

/// Days above this many minutes are flagged
pub const THRESHOLD_MINUTES: f64 = 30.0;

/// Aggregate for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub total_seconds: u64,
    pub count: usize,
    /// Total minutes rounded to one decimal (chart value)
    pub minutes: f64,
    /// Whether `minutes` exceeds [`THRESHOLD_MINUTES`]
    pub over_threshold: bool,
}

impl DailyStat {
    fn new(date: NaiveDate, total_seconds: u64, count: usize) -> Self {
        let minutes = (total_seconds as f64 / 60.0 * 10.0).round() / 10.0;
        Self {
            date,
            total_seconds,
            count,
            minutes,
            over_threshold: minutes > THRESHOLD_MINUTES,
        }
    }

    /// Short chart label, e.g. "01-31"
    pub fn label(&self) -> String {
        self.date.format("%m-%d").to_string()
    }
}

/// Aggregated statistics over a session collection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    /// Oldest first, at most [`DAILY_WINDOW`] entries
    pub daily: Vec<DailyStat>,
    pub total_count: usize,
    pub total_seconds: u64,
    /// Zero when there are no sessions
    pub average_seconds: f64,
}

impl Summary {
    /// Total time in whole minutes (floored, for the KPI cards)
    pub fn total_minutes(&self) -> u64 {
        self.total_seconds / 60
    }

    /// Average session in whole minutes (floored)
    pub fn average_minutes(&self) -> u64 {
        (self.average_seconds / 60.0).floor() as u64
    }

    /// Largest daily value, for chart scaling
    pub fn max_daily_minutes(&self) -> f64 {
        self.daily.iter().map(|d| d.minutes).fold(0.0, f64::max)
    }
}

/// Compute statistics for `sessions`. Pure: same input, same output.
pub fn aggregate(sessions: &[Session]) -> Summary {
    if sessions.is_empty() {
        return Summary::default();
    }

    // date -> (seconds, count), ordered by date
    let mut buckets: BTreeMap<NaiveDate, (u64, usize)> = BTreeMap::new();
    for session in sessions {
        let entry = buckets.entry(session.date).or_default();
        entry.0 += session.duration;
        entry.1 += 1;
    }

    let skip = buckets.len().saturating_sub(DAILY_WINDOW);
    let daily = buckets
        .into_iter()
        .skip(skip)
        .map(|(date, (seconds, count))| DailyStat::new(date, seconds, count))
        .collect();

    let total_count = sessions.len();
    let total_seconds: u64 = sessions.iter().map(|s| s.duration).sum();

    Summary {
        daily,
        total_count,
        total_seconds,
        average_seconds: total_seconds as f64 / total_count as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_session(date: &str, duration: u64) -> Session {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        let start = date
            .and_hms_opt(9, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis();
        Session {
            id: crate::session::new_id(),
            start_time: start,
            end_time: start + duration as i64 * 1000,
            duration,
            note: String::new(),
            date,
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_empty_stats() {
        let summary = aggregate(&[]);
        assert_eq!(summary.total_count, 0);
        assert_eq!(summary.total_seconds, 0);
        assert_eq!(summary.average_seconds, 0.0);
        assert!(summary.daily.is_empty());
        assert_eq!(summary.average_minutes(), 0);
    }

    #[test]
    fn test_groups_by_date() {
        let sessions = vec![
            make_session("2024-01-01", 600),
            make_session("2024-01-01", 300),
            make_session("2024-01-02", 1800),
        ];

        let summary = aggregate(&sessions);
        assert_eq!(summary.daily.len(), 2);

        let first = &summary.daily[0];
        assert_eq!(first.date, day("2024-01-01"));
        assert_eq!(first.total_seconds, 900);
        assert_eq!(first.count, 2);
        assert_eq!(first.minutes, 15.0);
        assert!(!first.over_threshold);

        let second = &summary.daily[1];
        assert_eq!(second.date, day("2024-01-02"));
        assert_eq!(second.total_seconds, 1800);
        assert_eq!(second.count, 1);
        assert_eq!(second.minutes, 30.0);
        // exactly 30 is not over
        assert!(!second.over_threshold);

        assert_eq!(summary.total_count, 3);
        assert_eq!(summary.total_seconds, 2700);
        assert_eq!(summary.average_seconds, 900.0);
    }

    #[test]
    fn test_threshold_is_strict() {
        let summary = aggregate(&[make_session("2024-03-01", 1804)]);
        // 30.07 rounds to 30.1
        assert_eq!(summary.daily[0].minutes, 30.1);
        assert!(summary.daily[0].over_threshold);
    }

    #[test]
    fn test_keeps_last_seven_distinct_days() {
        // Nine days with gaps; input order is scrambled
        let dates = [
            "2024-02-10", "2024-02-01", "2024-02-03", "2024-02-05", "2024-02-02",
            "2024-02-20", "2024-02-07", "2024-02-08", "2024-02-04",
        ];
        let sessions: Vec<Session> = dates.iter().map(|d| make_session(d, 60)).collect();

        let summary = aggregate(&sessions);
        let kept: Vec<String> = summary.daily.iter().map(|d| d.date.to_string()).collect();
        assert_eq!(
            kept,
            vec![
                "2024-02-03", "2024-02-04", "2024-02-05", "2024-02-07",
                "2024-02-08", "2024-02-10", "2024-02-20",
            ]
        );
        // Totals still cover every session
        assert_eq!(summary.total_count, 9);
        assert_eq!(summary.total_seconds, 540);
    }

    #[test]
    fn test_minute_roundings_differ() {
        // 3 sessions totalling 2 690 s = 44.83 minutes
        let sessions = vec![
            make_session("2024-01-05", 1000),
            make_session("2024-01-05", 1000),
            make_session("2024-01-05", 690),
        ];
        let summary = aggregate(&sessions);

        assert_eq!(summary.daily[0].minutes, 44.8);
        assert_eq!(summary.total_minutes(), 44);
        // 896.67 s average floors to 14 minutes
        assert_eq!(summary.average_minutes(), 14);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let sessions = vec![
            make_session("2024-01-01", 100),
            make_session("2024-01-03", 2000),
        ];
        assert_eq!(aggregate(&sessions), aggregate(&sessions));
    }

    #[test]
    fn test_label() {
        let summary = aggregate(&[make_session("2024-12-31", 60)]);
        assert_eq!(summary.daily[0].label(), "12-31");
        assert_eq!(summary.max_daily_minutes(), 1.0);
    }
}
