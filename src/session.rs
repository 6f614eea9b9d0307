use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

use crate::error::{KeyrankError, Result};

/// Lifecycle of a single typing attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Text selected, nothing typed yet
    Idle,
    /// First character typed, clock running
    Active,
    /// Typed length reached the text length; metrics are frozen
    Finished,
}

/// Live metrics, recomputed on every input event and tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub wpm: u32,
    /// 0 - 100
    pub accuracy: u8,
    pub error_count: usize,
    pub elapsed_ms: u64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            wpm: 0,
            accuracy: 100,
            error_count: 0,
            elapsed_ms: 0,
        }
    }
}

/// Immutable outcome of a finished session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub wpm: u32,
    pub accuracy: u8,
    pub error_count: usize,
    pub elapsed_secs: f64,
    pub text_length: usize,
}

/// Events a session reacts to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent<'a> {
    /// The whole typed buffer after an edit
    Input { value: &'a str, at: Instant },
    /// Time since the session started
    Tick { elapsed_ms: u64 },
}

/// One attempt at typing a fixed target text.
///
/// Every transition consumes the session and returns the next one, so a
/// driver can keep the previous value around or throw it away.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    text: String,
    target: Vec<char>,
    typed: String,
    /// Monotonic, so wall clock adjustments never stall the live WPM
    started_at: Option<Instant>,
    state: SessionState,
    metrics: Metrics,
    result: Option<SessionResult>,
}

/// Whitespace-delimited, non-empty tokens
pub fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

/// Mismatches between `typed` and `target`; anything typed past the end of
/// the target counts as an error.
pub fn count_errors(target: &[char], typed: &str) -> usize {
    typed
        .chars()
        .enumerate()
        .filter(|(i, c)| target.get(*i) != Some(c))
        .count()
}

/// Percentage of correct characters, rounded. Empty input is 100.
pub fn accuracy(typed_len: usize, error_count: usize) -> u8 {
    if typed_len == 0 {
        return 100;
    }
    let correct = typed_len.saturating_sub(error_count) as f64;
    (correct / typed_len as f64 * 100.0).round() as u8
}

impl Session {
    /// Begin a new session on `text`. Empty text is rejected.
    pub fn start(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.is_empty() {
            return Err(KeyrankError::EmptyText);
        }

        debug!(len = text.chars().count(), "Session started");
        Ok(Self {
            target: text.chars().collect(),
            text,
            typed: String::new(),
            started_at: None,
            state: SessionState::Idle,
            metrics: Metrics::default(),
            result: None,
        })
    }

    pub fn reduce(self, event: SessionEvent<'_>) -> Self {
        match event {
            SessionEvent::Input { value, at } => self.on_input(value, at),
            SessionEvent::Tick { elapsed_ms } => self.tick(elapsed_ms),
        }
    }

    /// Replace the typed buffer with `value` and recompute errors and accuracy.
    /// Reaching the text length finishes the session.
    pub fn on_input(mut self, value: &str, at: Instant) -> Self {
        if self.state == SessionState::Finished {
            debug!("Input after finish ignored");
            return self;
        }

        if self.state == SessionState::Idle && !value.is_empty() {
            self.state = SessionState::Active;
            self.started_at = Some(at);
            debug!("Session active");
        }

        let typed_len = value.chars().count();
        let error_count = count_errors(&self.target, value);
        self.metrics.error_count = error_count;
        self.metrics.accuracy = accuracy(typed_len, error_count);
        self.typed = value.to_string();

        if typed_len >= self.target.len() {
            self.finish()
        } else {
            self
        }
    }

    /// Refresh elapsed time and WPM. Only has an effect while active;
    /// zero elapsed time leaves WPM untouched.
    pub fn tick(mut self, elapsed_ms: u64) -> Self {
        if self.state != SessionState::Active {
            return self;
        }

        self.metrics.elapsed_ms = elapsed_ms;
        if elapsed_ms > 0 {
            let minutes = elapsed_ms as f64 / 60_000.0;
            self.metrics.wpm = (word_count(&self.typed) as f64 / minutes).round() as u32;
        }
        self
    }

    fn finish(mut self) -> Self {
        self.state = SessionState::Finished;
        let result = SessionResult {
            wpm: self.metrics.wpm,
            accuracy: self.metrics.accuracy,
            error_count: self.metrics.error_count,
            elapsed_secs: self.metrics.elapsed_ms as f64 / 1000.0,
            text_length: self.target.len(),
        };
        info!(
            wpm = result.wpm,
            accuracy = result.accuracy,
            errors = result.error_count,
            elapsed_secs = result.elapsed_secs,
            "Session finished"
        );
        self.result = Some(result);
        self
    }

    /// Milliseconds between the first keystroke and `now`, on the monotonic clock
    pub fn elapsed_ms_at(&self, now: Instant) -> Option<u64> {
        let started = self.started_at?;
        Some(now.saturating_duration_since(started).as_millis() as u64)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn has_finished(&self) -> bool {
        self.state == SessionState::Finished
    }

    /// Text length in characters
    pub fn text_len(&self) -> usize {
        self.target.len()
    }
}
