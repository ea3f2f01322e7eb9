//! Display and formatting for the non-interactive commands
//!
//! ASCII bar charts, KPI blocks and the history listing.

use interlog_core::format::{format_minutes, format_minutes_seconds};
use std::fmt::Write;
use std::io::IsTerminal;

use crate::session::Session;
use crate::stats::Summary;

/// ANSI color codes (only used when terminal supports it)
pub struct Colors {
    pub red: &'static str,
    pub green: &'static str,
    pub cyan: &'static str,
    pub magenta: &'static str,
    pub bold: &'static str,
    pub dim: &'static str,
    pub reset: &'static str,
}

impl Colors {
    pub fn new(color_enabled: bool) -> Self {
        if color_enabled {
            Self {
                red: "\x1b[0;31m",
                green: "\x1b[0;32m",
                cyan: "\x1b[0;36m",
                magenta: "\x1b[0;35m",
                bold: "\x1b[1m",
                dim: "\x1b[2m",
                reset: "\x1b[0m",
            }
        } else {
            Self {
                red: "",
                green: "",
                cyan: "",
                magenta: "",
                bold: "",
                dim: "",
                reset: "",
            }
        }
    }

    /// Colors when stdout is a terminal, plain text otherwise
    pub fn auto() -> Self {
        Self::new(std::io::stdout().is_terminal())
    }
}

/// Draw a simple bar chart row
pub fn draw_bar(value: f64, max: f64, width: usize) -> String {
    let max = if max <= 0.0 { 1.0 } else { max };
    let filled = ((value / max) * width as f64).round().clamp(0.0, width as f64) as usize;
    let empty = width - filled;

    format!("{}{}", "\u{2588}".repeat(filled), "\u{2591}".repeat(empty))
}

/// KPI block plus the daily chart
pub fn render_summary(summary: &Summary, colors: &Colors) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}Interruption Statistics{}", colors.bold, colors.reset);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  {}Total Time:{}       {}",
        colors.cyan,
        colors.reset,
        format_minutes(summary.total_minutes())
    );
    let _ = writeln!(
        out,
        "  {}Interruptions:{}    {}",
        colors.cyan, colors.reset, summary.total_count
    );
    let _ = writeln!(
        out,
        "  {}Average Length:{}   {} minutes",
        colors.cyan,
        colors.reset,
        summary.average_minutes()
    );

    if summary.daily.is_empty() {
        return out;
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{}Daily Minutes (last {} active days){}",
        colors.bold,
        summary.daily.len(),
        colors.reset
    );

    let max = summary.max_daily_minutes();
    for day in &summary.daily {
        let color = if day.over_threshold {
            colors.red
        } else {
            colors.magenta
        };
        let _ = writeln!(
            out,
            "  {}  {}{}{} {:>6.1}m  {}({}){}",
            day.label(),
            color,
            draw_bar(day.minutes, max, 30),
            colors.reset,
            day.minutes,
            colors.dim,
            day.count,
            colors.reset
        );
    }

    out
}

/// Sessions newest first, one per line
pub fn render_history(sessions: &[Session], limit: Option<usize>, colors: &Colors) -> String {
    let mut sorted: Vec<&Session> = sessions.iter().collect();
    sorted.sort_by(|a, b| b.start_time.cmp(&a.start_time));

    let mut out = String::new();
    for session in sorted.into_iter().take(limit.unwrap_or(usize::MAX)) {
        let start = session.start();
        let _ = writeln!(
            out,
            "{}{}{}  {}  {}-{}  {:>8}  {}",
            colors.dim,
            session.short_id(),
            colors.reset,
            start.format("%a %b %d"),
            start.format("%H:%M"),
            session.end().format("%H:%M"),
            format_minutes_seconds(session.duration),
            session.note
        );
    }
    out
}
