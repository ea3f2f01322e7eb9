//! Text formatting helpers shared by the CLI and the TUI

/// Truncate `text` to at most `max` characters, marking the cut with `...`
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max <= 3 {
        return text.chars().take(max).collect();
    }
    let mut out: String = text.chars().take(max - 3).collect();
    out.push_str("...");
    out
}

/// Format a span of seconds as "Xh Ym" (used for the live duration preview)
pub fn format_hours_minutes(seconds: i64) -> String {
    if seconds < 0 {
        return "Invalid Time Range".to_string();
    }
    let hours = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    format!("{}h {}m", hours, mins)
}

/// Format a session duration as "45s" or "12m 5s"
pub fn format_minutes_seconds(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else {
        format!("{}m {}s", seconds / 60, seconds % 60)
    }
}

/// Format whole minutes as "45m" or "1h 30m"
pub fn format_minutes(minutes: u64) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer topic line", 10), "a longe...");
        assert_eq!(truncate("abcdef", 2), "ab");
        // multi-byte characters count as one
        assert_eq!(truncate("ééééé", 4), "é...");
    }

    #[test]
    fn test_format_hours_minutes() {
        assert_eq!(format_hours_minutes(900), "0h 15m");
        assert_eq!(format_hours_minutes(3725), "1h 2m");
        assert_eq!(format_hours_minutes(-1), "Invalid Time Range");
    }

    #[test]
    fn test_format_minutes_seconds() {
        assert_eq!(format_minutes_seconds(45), "45s");
        assert_eq!(format_minutes_seconds(725), "12m 5s");
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(45), "45m");
        assert_eq!(format_minutes(90), "1h 30m");
        assert_eq!(format_minutes(120), "2h 0m");
    }
}
