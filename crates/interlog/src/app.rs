//! Application state for the terminal UI
//!
//! Everything the views need lives in one [`App`] value owned by the event
//! loop: the store, the current view, the tracker form, the transient flash
//! and the state of the AI analysis request.

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::oneshot;

use crate::form::{Field, TrackerForm};
use crate::session::Session;
use crate::store::SessionStore;
use crate::summarizer::Summarizer;

/// How long the "saved" indicator stays visible
pub const FLASH_DURATION: Duration = Duration::from_secs(3);

/// The three top-level views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Tracker,
    Dashboard,
    History,
}

impl View {
    pub const ALL: [View; 3] = [View::Tracker, View::Dashboard, View::History];

    pub fn next(self) -> Self {
        match self {
            View::Tracker => View::Dashboard,
            View::Dashboard => View::History,
            View::History => View::Tracker,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            View::Tracker => View::History,
            View::Dashboard => View::Tracker,
            View::History => View::Dashboard,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Tracker => "Tracker",
            View::Dashboard => "Dashboard",
            View::History => "History",
        }
    }
}

/// A message that disappears on its own
#[derive(Debug, Clone)]
pub struct Flash {
    pub message: String,
    expires_at: Instant,
}

impl Flash {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Progress of the AI analysis
#[derive(Debug)]
pub enum Analysis {
    Idle,
    Pending(oneshot::Receiver<String>),
    Ready(String),
}

/// Terminal UI state
pub struct App {
    pub store: SessionStore,
    pub view: View,
    pub form: TrackerForm,
    pub flash: Option<Flash>,
    /// Blocking message shown in a popup until a key is pressed
    pub alert: Option<String>,
    pub analysis: Analysis,
    /// Index into [`App::history`]
    pub selected: usize,
    pub show_help: bool,
    pub should_quit: bool,
    summarizer: Summarizer,
    runtime: Handle,
}

impl App {
    pub fn new(store: SessionStore, summarizer: Summarizer, runtime: Handle) -> Self {
        Self {
            store,
            view: View::Tracker,
            form: TrackerForm::new(Local::now()),
            flash: None,
            alert: None,
            analysis: Analysis::Idle,
            selected: 0,
            show_help: false,
            should_quit: false,
            summarizer,
            runtime,
        }
    }

    /// Sessions newest first, as the history view lists them
    pub fn history(&self) -> Vec<&Session> {
        let mut sorted: Vec<&Session> = self.store.sessions().iter().collect();
        sorted.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        sorted
    }

    pub fn summarizer_available(&self) -> bool {
        self.summarizer.is_available()
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self.analysis, Analysis::Pending(_))
    }

    /// Show `message` for [`FLASH_DURATION`], replacing any flash still showing
    pub fn flash(&mut self, message: impl Into<String>, now: Instant) {
        self.flash = Some(Flash {
            message: message.into(),
            expires_at: now + FLASH_DURATION,
        });
    }

    /// Periodic housekeeping: expire the flash, collect a finished analysis
    pub fn tick(&mut self, now: Instant) {
        if self.flash.as_ref().is_some_and(|f| f.is_expired(now)) {
            self.flash = None;
        }
        self.poll_analysis();
    }

    /// Save the tracker form as a new session
    pub fn submit_form(&mut self, now: DateTime<Local>, instant: Instant) {
        match self.form.submit(now) {
            Ok(session) => match self.store.add(session) {
                Ok(()) => self.flash("Entry saved successfully!", instant),
                Err(e) => {
                    tracing::error!(error = %e, "failed to persist session");
                    self.alert = Some(format!("Could not save: {:#}", e));
                }
            },
            Err(e) => self.alert = Some(e.to_string()),
        }
    }

    /// Delete the session highlighted in the history view
    pub fn delete_selected(&mut self) {
        let Some(id) = self.history().get(self.selected).map(|s| s.id.clone()) else {
            return;
        };

        if let Err(e) = self.store.remove(&id) {
            tracing::error!(error = %e, "failed to persist deletion");
            self.alert = Some(format!("Could not delete: {:#}", e));
        }

        let len = self.store.sessions().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Kick off an analysis request. Returns false if one is already running.
    pub fn start_analysis(&mut self) -> bool {
        if self.is_analyzing() {
            return false;
        }

        let (tx, rx) = oneshot::channel();
        let summarizer = self.summarizer.clone();
        let sessions = self.store.sessions().to_vec();
        self.runtime.spawn(async move {
            let text = summarizer.summarize(&sessions).await;
            let _ = tx.send(text);
        });

        self.analysis = Analysis::Pending(rx);
        true
    }

    fn poll_analysis(&mut self) {
        let Analysis::Pending(rx) = &mut self.analysis else {
            return;
        };

        match rx.try_recv() {
            Ok(text) => self.analysis = Analysis::Ready(text),
            Err(oneshot::error::TryRecvError::Empty) => {}
            Err(oneshot::error::TryRecvError::Closed) => {
                tracing::warn!("analysis task ended without a result");
                self.analysis = Analysis::Idle;
            }
        }
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    /// Route a key press
    pub fn handle_key(&mut self, key: KeyEvent, now: DateTime<Local>, instant: Instant) {
        if self.alert.is_some() {
            self.alert = None;
            return;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::F(4)) {
                self.show_help = false;
            }
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => {
                self.should_quit = true;
                return;
            }
            // The tracker keeps a half-typed entry on Esc
            KeyCode::Esc if self.view != View::Tracker => {
                self.should_quit = true;
                return;
            }
            KeyCode::F(4) => {
                self.show_help = true;
                return;
            }
            KeyCode::F(1) => return self.set_view(View::Tracker),
            KeyCode::F(2) => return self.set_view(View::Dashboard),
            KeyCode::F(3) => return self.set_view(View::History),
            _ => {}
        }

        match self.view {
            View::Tracker => self.handle_tracker_key(key, ctrl, now, instant),
            View::Dashboard | View::History => self.handle_list_key(key),
        }
    }

    fn handle_tracker_key(
        &mut self,
        key: KeyEvent,
        ctrl: bool,
        now: DateTime<Local>,
        instant: Instant,
    ) {
        match key.code {
            KeyCode::Enter => self.submit_form(now, instant),
            KeyCode::Tab | KeyCode::Down => self.form.focused = self.form.focused.next(),
            KeyCode::BackTab | KeyCode::Up => self.form.focused = self.form.focused.prev(),
            KeyCode::Char('n') if ctrl => match self.form.focused {
                Field::Start => self.form.set_start_now(now),
                Field::End => self.form.set_end_now(now),
                Field::Note => {}
            },
            KeyCode::Char('r') if ctrl => self.form.randomize_topic(),
            KeyCode::Char('u') if ctrl => self.form.focused_text_mut().clear(),
            KeyCode::Backspace => {
                self.form.focused_text_mut().pop();
            }
            KeyCode::Char(c) if !ctrl => self.form.focused_text_mut().push(c),
            _ => {}
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Tab => self.view = self.view.next(),
            KeyCode::BackTab => self.view = self.view.prev(),
            KeyCode::Char('1') | KeyCode::Char('t') => self.view = View::Tracker,
            KeyCode::Char('2') | KeyCode::Char('d') => self.view = View::Dashboard,
            KeyCode::Char('3') | KeyCode::Char('h') => self.view = View::History,
            KeyCode::Char('a') if self.view == View::Dashboard => {
                if !self.start_analysis() {
                    tracing::debug!("analysis already in progress");
                }
            }
            KeyCode::Char('j') | KeyCode::Down if self.view == View::History => {
                let len = self.store.sessions().len();
                if self.selected + 1 < len {
                    self.selected += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up if self.view == View::History => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Char('x') | KeyCode::Delete if self.view == View::History => {
                self.delete_selected();
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app() -> (App, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::open(&dir.path().join("sessions.json")).unwrap();
        let app = App::new(
            store,
            Summarizer::with_generator(None, 20),
            Handle::current(),
        );
        (app, dir)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)), Local::now(), Instant::now());
        }
    }

    #[tokio::test]
    async fn test_view_switching() {
        let (mut app, _dir) = test_app();
        assert_eq!(app.view, View::Tracker);

        app.handle_key(key(KeyCode::F(2)), Local::now(), Instant::now());
        assert_eq!(app.view, View::Dashboard);
        app.handle_key(key(KeyCode::Tab), Local::now(), Instant::now());
        assert_eq!(app.view, View::History);
        app.handle_key(key(KeyCode::Char('1')), Local::now(), Instant::now());
        assert_eq!(app.view, View::Tracker);
    }

    #[tokio::test]
    async fn test_submit_saves_and_flashes() {
        let (mut app, _dir) = test_app();
        app.form.start = "2024-01-01T09:00".to_string();
        app.form.end = "2024-01-01T09:15".to_string();
        app.form.focused = Field::Note;
        type_text(&mut app, "Gossip");

        let t0 = Instant::now();
        app.handle_key(key(KeyCode::Enter), Local::now(), t0);

        assert_eq!(app.store.sessions().len(), 1);
        assert_eq!(app.store.sessions()[0].note, "Gossip");
        assert_eq!(app.store.sessions()[0].duration, 900);
        assert!(app.flash.is_some());
        assert!(app.alert.is_none());

        app.tick(t0 + FLASH_DURATION);
        assert!(app.flash.is_none());
    }

    #[tokio::test]
    async fn test_invalid_submit_alerts_without_saving() {
        let (mut app, _dir) = test_app();
        app.form.start = "2024-01-01T10:00".to_string();
        app.form.end = "2024-01-01T09:00".to_string();

        app.handle_key(key(KeyCode::Enter), Local::now(), Instant::now());
        assert!(app.store.sessions().is_empty());
        assert_eq!(
            app.alert.as_deref(),
            Some("End time must be after start time")
        );

        // any key dismisses the alert and is otherwise swallowed
        app.handle_key(key(KeyCode::Char('z')), Local::now(), Instant::now());
        assert!(app.alert.is_none());
        assert!(!app.form.note.contains('z'));
    }

    #[tokio::test]
    async fn test_flash_retrigger_supersedes() {
        let (mut app, _dir) = test_app();
        let t0 = Instant::now();

        app.flash("first", t0);
        app.flash("second", t0 + Duration::from_secs(2));

        // the first deadline has passed but the second has not
        app.tick(t0 + FLASH_DURATION);
        assert_eq!(app.flash.as_ref().map(|f| f.message.as_str()), Some("second"));

        app.tick(t0 + Duration::from_secs(5));
        assert!(app.flash.is_none());
    }

    #[tokio::test]
    async fn test_analysis_is_not_reentrant() {
        let (mut app, _dir) = test_app();

        assert!(app.start_analysis());
        assert!(app.is_analyzing());
        assert!(!app.start_analysis());

        for _ in 0..100 {
            tokio::task::yield_now().await;
            app.tick(Instant::now());
            if !app.is_analyzing() {
                break;
            }
        }

        match &app.analysis {
            Analysis::Ready(text) => assert_eq!(text, crate::summarizer::MSG_UNAVAILABLE),
            other => panic!("unexpected analysis state: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_history_delete() {
        let (mut app, _dir) = test_app();
        for (start, end) in [("2024-01-01T09:00", "2024-01-01T09:10"), ("2024-01-02T09:00", "2024-01-02T09:10")] {
            app.form.start = start.to_string();
            app.form.end = end.to_string();
            app.submit_form(Local::now(), Instant::now());
        }
        assert_eq!(app.store.sessions().len(), 2);

        app.set_view(View::History);
        // newest first; move to the older one and delete it
        app.handle_key(key(KeyCode::Char('j')), Local::now(), Instant::now());
        assert_eq!(app.selected, 1);
        app.handle_key(key(KeyCode::Char('x')), Local::now(), Instant::now());

        assert_eq!(app.store.sessions().len(), 1);
        assert_eq!(app.history()[0].date.to_string(), "2024-01-02");
        assert_eq!(app.selected, 0);
    }

    #[tokio::test]
    async fn test_ctrl_shortcuts() {
        let (mut app, _dir) = test_app();
        app.form.start.clear();
        let ctrl_n = KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL);
        app.handle_key(ctrl_n, Local::now(), Instant::now());
        assert!(crate::form::parse_input(&app.form.start).is_some());

        app.handle_key(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Local::now(),
            Instant::now(),
        );
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_esc_in_tracker_keeps_entry() {
        let (mut app, _dir) = test_app();
        app.form.focused = Field::Note;
        type_text(&mut app, "Coffee?");

        app.handle_key(key(KeyCode::Esc), Local::now(), Instant::now());
        assert!(!app.should_quit);
        assert_eq!(app.form.note, "Coffee?");

        // help opens from the tracker without touching the field
        app.handle_key(key(KeyCode::F(4)), Local::now(), Instant::now());
        assert!(app.show_help);
        app.handle_key(key(KeyCode::Esc), Local::now(), Instant::now());
        assert!(!app.show_help);
        assert!(!app.should_quit);
        assert_eq!(app.form.note, "Coffee?");

        app.handle_key(
            KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL),
            Local::now(),
            Instant::now(),
        );
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_esc_quits_outside_tracker() {
        let (mut app, _dir) = test_app();
        app.set_view(View::History);
        app.handle_key(key(KeyCode::Esc), Local::now(), Instant::now());
        assert!(app.should_quit);
    }
}
