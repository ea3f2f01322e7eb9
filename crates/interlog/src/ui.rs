//! UI rendering

use chrono::Local;
use interlog_core::format::{format_hours_minutes, format_minutes, format_minutes_seconds, truncate};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{
        Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState,
        Tabs, Wrap,
    },
    Frame,
};

use crate::app::{Analysis, App, View};
use crate::form::{Field, LONG_SESSION_SECONDS};
use crate::stats::{aggregate, Summary};

/// Main draw function
pub fn draw(f: &mut Frame, app: &App) {
    // Create main layout: header, content, footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header + tabs
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Footer
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    match app.view {
        View::Tracker => draw_tracker(f, app, chunks[1]),
        View::Dashboard => draw_dashboard(f, app, chunks[1]),
        View::History => draw_history(f, app, chunks[1]),
    }
    draw_footer(f, app, chunks[2]);

    if app.show_help {
        draw_help_overlay(f);
    }
    if let Some(message) = &app.alert {
        draw_alert(f, message);
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, v)| Line::from(format!(" F{} {} ", i + 1, v.title())))
        .collect();
    let selected = View::ALL.iter().position(|v| *v == app.view).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Cyan).bold())
        .block(
            Block::default()
                .title(" interlog ")
                .title_style(Style::default().fg(Color::Magenta).bold())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );

    f.render_widget(tabs, area);
}

fn draw_tracker(f: &mut Frame, app: &App, area: Rect) {
    let form = &app.form;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Flash
            Constraint::Length(3), // Start
            Constraint::Length(3), // End
            Constraint::Length(3), // Duration
            Constraint::Length(3), // Topic
            Constraint::Min(0),
        ])
        .split(area);

    if let Some(flash) = &app.flash {
        let line = Line::from(Span::styled(
            format!(" {} ", flash.message),
            Style::default().fg(Color::Black).bg(Color::Green),
        ))
        .centered();
        f.render_widget(Paragraph::new(line), rows[0]);
    }

    draw_input(f, rows[1], "Start Time", &form.start, None, form.focused == Field::Start);
    draw_input(f, rows[2], "End Time", &form.end, None, form.focused == Field::End);

    let (text, color) = match form.preview_seconds() {
        Some(secs) if secs > LONG_SESSION_SECONDS => (format_hours_minutes(secs), Color::Red),
        Some(secs) => (format_hours_minutes(secs), Color::Cyan),
        None => ("--".to_string(), Color::DarkGray),
    };
    let duration = Paragraph::new(Line::from(vec![
        Span::raw(" Total Duration  "),
        Span::styled(text, Style::default().fg(color).bold()),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color)),
    );
    f.render_widget(duration, rows[3]);

    draw_input(
        f,
        rows[4],
        "Topic",
        &form.note,
        Some(&form.placeholder),
        form.focused == Field::Note,
    );
}

fn draw_input(
    f: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    placeholder: Option<&str>,
    focused: bool,
) {
    let border_color = if focused { Color::Yellow } else { Color::Blue };

    let content = if value.is_empty() {
        Span::styled(
            placeholder.unwrap_or_default().to_string(),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )
    } else {
        Span::raw(value.to_string())
    };
    let cursor = if focused { "\u{2588}" } else { "" };

    let input = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        content,
        Span::styled(cursor, Style::default().fg(Color::Yellow)),
    ]))
    .block(
        Block::default()
            .title(format!(" {} ", label))
            .title_style(Style::default().fg(border_color).bold())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color)),
    );

    f.render_widget(input, area);
}

fn draw_dashboard(f: &mut Frame, app: &App, area: Rect) {
    // Computed fresh every frame
    let summary = aggregate(app.store.sessions());

    if summary.total_count == 0 {
        let empty = Paragraph::new("No data yet. Log an interruption in the Tracker first.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(empty, area);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),      // KPIs
            Constraint::Min(8),         // Chart
            Constraint::Percentage(35), // Analysis
        ])
        .split(area);

    draw_kpis(f, &summary, rows[0]);
    draw_chart(f, &summary, rows[1]);
    draw_analysis(f, app, rows[2]);
}

fn draw_kpis(f: &mut Frame, summary: &Summary, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let cards = [
        ("Total Time", format_minutes(summary.total_minutes()), Color::Magenta),
        ("Interruptions", summary.total_count.to_string(), Color::Cyan),
        ("Average Length", format!("{} min", summary.average_minutes()), Color::Green),
    ];

    for ((label, value, color), area) in cards.into_iter().zip(cols.iter()) {
        let card = Paragraph::new(Line::from(Span::styled(value, Style::default().fg(color).bold())))
            .centered()
            .block(
                Block::default()
                    .title(format!(" {} ", label))
                    .title_style(Style::default().fg(color))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            );
        f.render_widget(card, *area);
    }
}

fn draw_chart(f: &mut Frame, summary: &Summary, area: Rect) {
    let bars: Vec<Bar> = summary
        .daily
        .iter()
        .map(|day| {
            let color = if day.over_threshold {
                Color::Red
            } else {
                Color::Blue
            };
            Bar::default()
                // tenths of a minute, so the one-decimal value keeps its resolution
                .value((day.minutes * 10.0).round() as u64)
                .text_value(format!("{:.1}", day.minutes))
                .label(Line::from(day.label()))
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(Color::White).bg(color))
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .title(" Daily Minutes (last 7 active days) ")
                .title_style(Style::default().fg(Color::Blue).bold())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(7)
        .bar_gap(2);

    f.render_widget(chart, area);
}

fn draw_analysis(f: &mut Frame, app: &App, area: Rect) {
    let (body, style) = match &app.analysis {
        Analysis::Idle if !app.summarizer_available() => (
            "AI analysis unavailable: set GEMINI_API_KEY or summarizer.api_key in config.toml"
                .to_string(),
            Style::default().fg(Color::DarkGray),
        ),
        Analysis::Idle => (
            "Press 'a' to ask the AI consultant for an analysis.".to_string(),
            Style::default().fg(Color::DarkGray),
        ),
        Analysis::Pending(_) => (
            "Consulting...".to_string(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        ),
        Analysis::Ready(text) => (text.clone(), Style::default()),
    };

    let paragraph = Paragraph::new(body)
        .style(style)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(" AI Consultant Analysis ")
                .title_style(Style::default().fg(Color::Magenta).bold())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Magenta)),
        );
    f.render_widget(paragraph, area);
}

fn draw_history(f: &mut Frame, app: &App, area: Rect) {
    let sessions = app.history();

    let block = Block::default()
        .title(format!(" History ({}) ", sessions.len()))
        .title_style(Style::default().fg(Color::Green).bold())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    if sessions.is_empty() {
        let empty = Paragraph::new("No history available.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec!["Date", "Start", "End", "Duration", "Topic"])
        .style(Style::default().fg(Color::Cyan).bold())
        .bottom_margin(1);

    // Date=12, Start=6, End=6, Duration=10, borders=2, spacing=4
    let topic_width = (area.width.saturating_sub(40) as usize).max(10);
    let today = Local::now().date_naive();

    let rows: Vec<Row> = sessions
        .iter()
        .map(|s| {
            let start = s.start();
            let date_style = if s.date == today {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(start.format("%a %b %d").to_string()).style(date_style),
                Cell::from(start.format("%H:%M").to_string()),
                Cell::from(s.end().format("%H:%M").to_string()),
                Cell::from(format_minutes_seconds(s.duration)),
                Cell::from(truncate(&s.note, topic_width)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(12), // Date
            Constraint::Length(6),  // Start
            Constraint::Length(6),  // End
            Constraint::Length(10), // Duration
            Constraint::Min(10),    // Topic
        ],
    )
    .header(header)
    .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("> ")
    .block(block);

    let mut state = TableState::default().with_selected(Some(app.selected));
    f.render_stateful_widget(table, area, &mut state);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Cyan).bold());

    let mut spans = vec![key(" F1-F3"), Span::raw(" views  ")];
    match app.view {
        View::Tracker => spans.extend([
            key("Tab"),
            Span::raw(" field  "),
            key("Enter"),
            Span::raw(" save  "),
            key("^N"),
            Span::raw(" now  "),
            key("^R"),
            Span::raw(" random topic  "),
        ]),
        View::Dashboard => spans.extend([
            key("a"),
            Span::raw(if app.is_analyzing() { " (running)  " } else { " analyze  " }),
        ]),
        View::History => spans.extend([
            key("j/k"),
            Span::raw(" move  "),
            key("x"),
            Span::raw(" delete  "),
        ]),
    }
    spans.extend([key("F4"), Span::raw(" help  ")]);
    if app.view == View::Tracker {
        spans.extend([key("^Q"), Span::raw(" quit")]);
    } else {
        spans.extend([key("Esc"), Span::raw(" quit")]);
    }

    let footer = Paragraph::new(Line::from(spans)).style(Style::default().fg(Color::DarkGray));
    f.render_widget(footer, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn draw_alert(f: &mut Frame, message: &str) {
    let popup_area = centered(f.area(), 50, 7);
    f.render_widget(Clear, popup_area);

    let text = vec![
        Line::from(""),
        Line::from(message.to_string()).centered(),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key",
            Style::default().fg(Color::DarkGray),
        ))
        .centered(),
    ];

    let popup = Paragraph::new(text).wrap(Wrap { trim: true }).block(
        Block::default()
            .title(" Oops ")
            .title_style(Style::default().fg(Color::Red).bold())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    f.render_widget(popup, popup_area);
}

fn draw_help_overlay(f: &mut Frame) {
    let popup_area = centered(f.area(), 52, 18);
    f.render_widget(Clear, popup_area);

    let entry = |k: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(k, Style::default().fg(Color::Cyan)),
            Span::raw(desc),
        ])
    };

    let help_text = vec![
        Line::from(""),
        entry("  F1 / 1 / t  ", "Tracker"),
        entry("  F2 / 2 / d  ", "Dashboard"),
        entry("  F3 / 3 / h  ", "History"),
        entry("  Tab         ", "Next view (field, in Tracker)"),
        entry("  Enter       ", "Save entry (Tracker)"),
        entry("  Ctrl+N      ", "Set focused time to now"),
        entry("  Ctrl+R      ", "Random topic"),
        entry("  a           ", "Run AI analysis (Dashboard)"),
        entry("  j/k, x      ", "Move, delete (History)"),
        entry("  F4 / ?      ", "Toggle this help (? outside Tracker)"),
        entry("  q / Esc     ", "Quit (outside Tracker)"),
        entry("  Ctrl+Q      ", "Quit from anywhere"),
        Line::from(""),
        Line::from(Span::styled(
            "Press F4 or Esc to close",
            Style::default().fg(Color::DarkGray),
        ))
        .centered(),
    ];

    let help_popup = Paragraph::new(help_text).block(
        Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(Style::default().fg(Color::Yellow).bold())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );

    f.render_widget(help_popup, popup_area);
}
