//! Cumulative player progress
//!
//! [`UserProgress`] is a plain value: completing a session consumes the old
//! progress and returns the new one together with a report of what changed.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

use crate::achievements::{self, AchievementId, CumulativeStats};
use crate::challenges::{ChallengeProgress, ChallengeStatus, DailyChallenge};
use crate::progression::{session_xp_reward, Progression};
use crate::rank::Rank;
use crate::session::SessionResult;

/// One finished session in the history list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// 1-based position in the history
    pub index: usize,
    pub wpm: u32,
    pub accuracy: u8,
    pub completed_at: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserProgress {
    pub progression: Progression,
    pub total_tests: u32,
    pub best_wpm: u32,
    pub unlocked: BTreeSet<AchievementId>,
    pub history: Vec<HistoryEntry>,
    pub challenges: ChallengeProgress,
}

/// What a completed session changed
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionReport {
    pub session_xp: u64,
    pub achievement_xp: u64,
    pub new_achievements: Vec<AchievementId>,
    pub completed_challenges: Vec<&'static DailyChallenge>,
    pub level_before: u32,
    pub level_after: u32,
    pub rank_before: &'static Rank,
    pub rank_after: &'static Rank,
    pub new_best_wpm: bool,
}

impl CompletionReport {
    pub fn total_xp(&self) -> u64 {
        self.session_xp + self.achievement_xp
    }

    pub fn leveled_up(&self) -> bool {
        self.level_after > self.level_before
    }

    pub fn ranked_up(&self) -> bool {
        self.rank_after.min_level > self.rank_before.min_level
    }
}

/// Read-only view for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub xp: u64,
    pub xp_for_level: u64,
    pub level: u32,
    pub level_progress_percent: f64,
    pub rank: &'static Rank,
    pub next_rank: Option<&'static Rank>,
    pub levels_until_next_rank: Option<u32>,
    pub total_tests: u32,
    pub best_wpm: u32,
    pub average_wpm: u32,
    pub unlocked_achievement_ids: BTreeSet<AchievementId>,
    pub history: Vec<HistoryEntry>,
    pub challenges: Vec<ChallengeStatus>,
}

impl UserProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self) -> u32 {
        self.progression.level
    }

    pub fn xp(&self) -> u64 {
        self.progression.xp
    }

    /// Fold a finished session into the progress.
    ///
    /// Order matters: the session's own XP is applied before achievements are
    /// evaluated, so level-based rules see the level it produced. Achievement
    /// XP is applied last. Challenge rewards are shown but not granted.
    pub fn complete_session(
        self,
        result: &SessionResult,
        completed_at: DateTime<Local>,
    ) -> (Self, CompletionReport) {
        let level_before = self.progression.level;
        let rank_before = self.progression.rank();

        let total_tests = self.total_tests + 1;
        let new_best_wpm = result.wpm > self.best_wpm;
        let best_wpm = self.best_wpm.max(result.wpm);

        let mut history = self.history;
        history.push(HistoryEntry {
            index: history.len() + 1,
            wpm: result.wpm,
            accuracy: result.accuracy,
            completed_at,
        });

        let session_xp = session_xp_reward(result.wpm, result.accuracy);
        let progression = self.progression.add_xp(session_xp);

        let challenges = self.challenges.record_session(result);
        let completed_challenges = challenges.newly_completed(&self.challenges);

        let evaluation = achievements::evaluate(
            result,
            &CumulativeStats {
                total_tests,
                level: progression.level,
            },
            &self.unlocked,
        );
        let progression = progression.add_xp(evaluation.xp_reward);

        info!(
            tests = total_tests,
            session_xp,
            achievement_xp = evaluation.xp_reward,
            level = progression.level,
            "Session recorded"
        );

        let report = CompletionReport {
            session_xp,
            achievement_xp: evaluation.xp_reward,
            new_achievements: evaluation.newly_unlocked,
            completed_challenges,
            level_before,
            level_after: progression.level,
            rank_before,
            rank_after: progression.rank(),
            new_best_wpm,
        };

        let progress = Self {
            progression,
            total_tests,
            best_wpm,
            unlocked: evaluation.unlocked,
            history,
            challenges,
        };

        (progress, report)
    }

    /// Rounded mean WPM over the history, 0 when empty
    pub fn average_wpm(&self) -> u32 {
        if self.history.is_empty() {
            return 0;
        }
        let sum: u64 = self.history.iter().map(|h| h.wpm as u64).sum();
        (sum as f64 / self.history.len() as f64).round() as u32
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let level = self.progression.level;
        ProgressSnapshot {
            xp: self.progression.xp,
            xp_for_level: crate::progression::xp_for_level(level),
            level,
            level_progress_percent: self.progression.level_progress_percent(),
            rank: self.progression.rank(),
            next_rank: self.progression.next_rank(),
            levels_until_next_rank: Rank::levels_until_next(level),
            total_tests: self.total_tests,
            best_wpm: self.best_wpm,
            average_wpm: self.average_wpm(),
            unlocked_achievement_ids: self.unlocked.clone(),
            history: self.history.clone(),
            challenges: self.challenges.statuses(),
        }
    }
}
