//! Headless application state
//!
//! Owns the active session, the player's progress and the tick task that
//! refreshes live WPM. Terminal drawing lives in the binary; everything here
//! can be driven from tests through [`App::handle_event`].

use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::mpsc::Sender;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;
use crate::progress::{CompletionReport, UserProgress};
use crate::progression::session_xp_reward;
use crate::runtime::{AppEvent, TickHandle, TickTask};
use crate::session::{Session, SessionState};
use crate::texts::{Difficulty, TextCorpus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Typing,
    Results,
}

/// Whether the event loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    config: Config,
    difficulty: Difficulty,
    corpus: TextCorpus,
    custom_prompt: Option<String>,
    session: Session,
    typed: String,
    progress: UserProgress,
    last_report: Option<CompletionReport>,
    screen: Screen,
    ticks: Sender<AppEvent>,
    tick_handle: Option<TickHandle>,
}

impl App {
    /// `ticks` is where the tick task delivers `AppEvent::Tick` while a session is active
    pub fn new(
        config: Config,
        corpus: TextCorpus,
        custom_prompt: Option<String>,
        ticks: Sender<AppEvent>,
    ) -> Result<Self> {
        let difficulty = config.difficulty();
        let text = match &custom_prompt {
            Some(prompt) => prompt.clone(),
            None => corpus.select_random(difficulty)?.to_string(),
        };
        let session = Session::start(text)?;

        Ok(Self {
            config,
            difficulty,
            corpus,
            custom_prompt,
            session,
            typed: String::new(),
            progress: UserProgress::new(),
            last_report: None,
            screen: Screen::Typing,
            ticks,
            tick_handle: None,
        })
    }

    /// Replace the current session with a fresh one on a newly selected text
    pub fn new_session(&mut self) -> Result<()> {
        let text = match &self.custom_prompt {
            Some(prompt) => prompt.clone(),
            None => self.corpus.select_random(self.difficulty)?.to_string(),
        };
        self.begin(text)
    }

    /// Replace the current session with a fresh one on the same text
    pub fn restart(&mut self) -> Result<()> {
        let text = self.session.text().to_string();
        self.begin(text)
    }

    /// Move to the next difficulty and start a session on it
    pub fn cycle_difficulty(&mut self) -> Result<()> {
        self.difficulty = self.difficulty.cycle();
        self.custom_prompt = None;
        info!(difficulty = %self.difficulty, "Difficulty changed");
        self.new_session()
    }

    fn begin(&mut self, text: String) -> Result<()> {
        self.stop_ticking();
        self.session = Session::start(text)?;
        self.typed.clear();
        self.last_report = None;
        self.screen = Screen::Typing;
        Ok(())
    }

    pub fn type_char(&mut self, c: char) {
        if self.accepts_input() {
            self.typed.push(c);
            self.apply_input(Instant::now());
        }
    }

    pub fn backspace(&mut self) {
        if self.accepts_input() && self.typed.pop().is_some() {
            self.apply_input(Instant::now());
        }
    }

    fn accepts_input(&self) -> bool {
        self.screen == Screen::Typing && !self.session.has_finished()
    }

    fn apply_input(&mut self, at: Instant) {
        let was_idle = self.session.state() == SessionState::Idle;
        self.session = self.session.clone().on_input(&self.typed, at);

        match self.session.state() {
            SessionState::Active if was_idle => {
                self.tick_handle = Some(TickTask::spawn(
                    self.ticks.clone(),
                    self.config.tick_interval(),
                ));
            }
            SessionState::Finished => self.complete(),
            _ => {}
        }
    }

    fn complete(&mut self) {
        self.stop_ticking();

        let Some(result) = self.session.result().copied() else {
            return;
        };
        let progress = std::mem::take(&mut self.progress);
        let (progress, report) = progress.complete_session(&result, Local::now());
        self.progress = progress;
        self.last_report = Some(report);
        self.screen = Screen::Results;
    }

    fn stop_ticking(&mut self) {
        if let Some(mut handle) = self.tick_handle.take() {
            handle.cancel();
        }
    }

    /// Refresh elapsed time and WPM; ignored unless the session is active
    pub fn on_tick(&mut self, now: Instant) {
        if !self.session.is_active() {
            return;
        }
        if let Some(elapsed_ms) = self.session.elapsed_ms_at(now) {
            self.session = self.session.clone().tick(elapsed_ms);
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Result<Flow> {
        match event {
            AppEvent::Tick => self.on_tick(Instant::now()),
            AppEvent::Resize => {}
            AppEvent::Key(key) => return self.handle_key(key),
        }
        Ok(Flow::Continue)
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<Flow> {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return Ok(Flow::Quit);
        }

        match (self.screen, key.code) {
            (Screen::Typing, KeyCode::Char(c)) => self.type_char(c),
            (Screen::Typing, KeyCode::Backspace) => self.backspace(),
            (Screen::Typing, KeyCode::Left) => self.restart()?,
            (Screen::Typing, KeyCode::Right) => self.new_session()?,
            (Screen::Results, KeyCode::Char('r')) => self.restart()?,
            (Screen::Results, KeyCode::Char('n')) => self.new_session()?,
            (Screen::Results, KeyCode::Char('d')) => self.cycle_difficulty()?,
            (Screen::Results, KeyCode::Char('q')) => return Ok(Flow::Quit),
            (screen, code) => debug!(?screen, ?code, "Unhandled key"),
        }
        Ok(Flow::Continue)
    }

    /// XP the session would earn if it finished with the current metrics
    pub fn projected_xp(&self) -> u64 {
        let metrics = self.session.metrics();
        session_xp_reward(metrics.wpm, metrics.accuracy)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn progress(&self) -> &UserProgress {
        &self.progress
    }

    pub fn last_report(&self) -> Option<&CompletionReport> {
        self.last_report.as_ref()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn is_ticking(&self) -> bool {
        self.tick_handle.as_ref().is_some_and(TickHandle::is_running)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::AchievementId;
    use std::sync::mpsc;
    use std::time::Duration;

    fn app_with_prompt(prompt: &str) -> (App, mpsc::Receiver<AppEvent>) {
        let (tx, rx) = mpsc::channel();
        let corpus = TextCorpus::embedded().unwrap();
        let app = App::new(Config::default(), corpus, Some(prompt.to_string()), tx).unwrap();
        (app, rx)
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_new_app_is_idle() {
        let (app, _rx) = app_with_prompt("hi there");
        assert_eq!(app.screen(), Screen::Typing);
        assert_eq!(app.session().state(), SessionState::Idle);
        assert!(!app.is_ticking());
    }

    #[test]
    fn empty_custom_prompt_is_rejected() {
        let (tx, _rx) = mpsc::channel();
        let corpus = TextCorpus::embedded().unwrap();
        assert!(App::new(Config::default(), corpus, Some(String::new()), tx).is_err());
    }

    #[test]
    fn first_key_starts_ticking_and_finish_stops_it() {
        let (mut app, _rx) = app_with_prompt("ab");

        app.type_char('a');
        assert!(app.session().is_active());
        assert!(app.is_ticking());

        app.type_char('b');
        assert!(app.session().has_finished());
        assert!(!app.is_ticking());
        assert_eq!(app.screen(), Screen::Results);
    }

    #[test]
    fn finishing_updates_progress() {
        let (mut app, _rx) = app_with_prompt("ok");
        app.type_char('o');
        app.type_char('k');

        let report = app.last_report().unwrap();
        assert_eq!(report.new_achievements[0], AchievementId::FirstTest);
        assert_eq!(app.progress().total_tests, 1);
        assert_eq!(app.progress().history.len(), 1);
    }

    #[test]
    fn tick_updates_wpm_while_active() {
        let (mut app, _rx) = app_with_prompt("one two three");
        app.type_char('o');
        let started = app.session().started_at().unwrap();

        app.on_tick(started + Duration::from_secs(6));
        assert_eq!(app.session().metrics().wpm, 10);
        assert_eq!(app.session().metrics().elapsed_ms, 6_000);
    }

    #[test]
    fn stale_tick_after_finish_is_ignored() {
        let (mut app, _rx) = app_with_prompt("ab");
        app.type_char('a');
        app.type_char('b');
        let frozen = app.session().metrics();

        app.handle_event(AppEvent::Tick).unwrap();
        assert_eq!(app.session().metrics(), frozen);
    }

    #[test]
    fn backspace_reassigns_buffer() {
        let (mut app, _rx) = app_with_prompt("abc");
        app.type_char('x');
        assert_eq!(app.session().metrics().error_count, 1);

        app.handle_event(key(KeyCode::Backspace)).unwrap();
        assert_eq!(app.session().typed(), "");
        assert_eq!(app.session().metrics().error_count, 0);
        assert_eq!(app.session().metrics().accuracy, 100);
    }

    #[test]
    fn restart_keeps_text_and_resets_session() {
        let (mut app, _rx) = app_with_prompt("ab");
        app.type_char('a');
        app.type_char('b');

        app.handle_event(key(KeyCode::Char('r'))).unwrap();
        assert_eq!(app.screen(), Screen::Typing);
        assert_eq!(app.session().text(), "ab");
        assert_eq!(app.session().state(), SessionState::Idle);
        assert!(app.last_report().is_none());
        // progress survives a restart
        assert_eq!(app.progress().total_tests, 1);
    }

    #[test]
    fn new_session_mid_typing_cancels_ticks() {
        let (mut app, _rx) = app_with_prompt("abcdef");
        app.type_char('a');
        assert!(app.is_ticking());

        app.handle_event(key(KeyCode::Right)).unwrap();
        assert!(!app.is_ticking());
        assert_eq!(app.session().state(), SessionState::Idle);
    }

    #[test]
    fn cycle_difficulty_drops_custom_prompt() {
        let (mut app, _rx) = app_with_prompt("ab");
        app.type_char('a');
        app.type_char('b');

        app.handle_event(key(KeyCode::Char('d'))).unwrap();
        assert_eq!(app.difficulty(), Difficulty::Intermediate);
        let corpus = TextCorpus::embedded().unwrap();
        assert!(corpus
            .texts(Difficulty::Intermediate)
            .iter()
            .any(|t| t == app.session().text()));
    }

    #[test]
    fn escape_quits() {
        let (mut app, _rx) = app_with_prompt("ab");
        assert_eq!(app.handle_event(key(KeyCode::Esc)).unwrap(), Flow::Quit);
    }

    #[test]
    fn results_screen_ignores_typing() {
        let (mut app, _rx) = app_with_prompt("a");
        app.type_char('a');
        app.handle_event(key(KeyCode::Char('z'))).unwrap();
        assert_eq!(app.session().typed(), "a");
    }
}
