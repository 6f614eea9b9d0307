//! Daily challenges
//!
//! Counters accumulate across every recorded session. Nothing resets them at
//! a day boundary; "daily" is only the label shown to the player.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::session::SessionResult;

/// Which counter a challenge is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    WpmThreshold,
    AccuracyThreshold,
    Characters,
    Perfect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyChallenge {
    pub id: u32,
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ChallengeKind,
    pub target: u64,
    /// Minimum WPM or accuracy a session needs to count; threshold kinds only
    pub threshold: Option<u32>,
    pub xp_reward: u64,
}

impl DailyChallenge {
    /// How much one finished session adds to this challenge's counter
    pub fn contribution(&self, result: &SessionResult) -> u64 {
        let meets = |value: u32| self.threshold.map_or(true, |min| value >= min);
        match self.kind {
            ChallengeKind::WpmThreshold => u64::from(meets(result.wpm)),
            ChallengeKind::AccuracyThreshold => u64::from(meets(u32::from(result.accuracy))),
            ChallengeKind::Characters => result.text_length as u64,
            ChallengeKind::Perfect => u64::from(result.error_count == 0),
        }
    }
}

pub static DAILY_CHALLENGES: &[DailyChallenge] = &[
    DailyChallenge {
        id: 1,
        name: "Speed Run",
        description: "Complete 3 tests with 50+ WPM",
        kind: ChallengeKind::WpmThreshold,
        target: 3,
        threshold: Some(50),
        xp_reward: 100,
    },
    DailyChallenge {
        id: 2,
        name: "Precision",
        description: "Achieve 95%+ accuracy in 2 tests",
        kind: ChallengeKind::AccuracyThreshold,
        target: 2,
        threshold: Some(95),
        xp_reward: 80,
    },
    DailyChallenge {
        id: 3,
        name: "Endurance",
        description: "Type 500 characters total",
        kind: ChallengeKind::Characters,
        target: 500,
        threshold: None,
        xp_reward: 60,
    },
    DailyChallenge {
        id: 4,
        name: "Perfect Ten",
        description: "Complete a test with 0 errors",
        kind: ChallengeKind::Perfect,
        target: 1,
        threshold: None,
        xp_reward: 120,
    },
];

/// Snapshot of one challenge for display
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChallengeStatus {
    pub id: u32,
    pub name: &'static str,
    pub current_count: u64,
    pub target: u64,
    pub complete: bool,
    /// 0 - 100
    pub percent: f64,
}

/// Per-kind counters fed by finished sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChallengeProgress {
    pub tests_with_wpm: u64,
    pub tests_with_accuracy: u64,
    pub total_chars: u64,
    pub perfect_tests: u64,
}

impl ChallengeProgress {
    /// Feed one finished session to every challenge in the table
    pub fn record_session(mut self, result: &SessionResult) -> Self {
        for challenge in DAILY_CHALLENGES {
            *self.counter_mut(challenge.kind) += challenge.contribution(result);
        }
        self
    }

    fn counter_mut(&mut self, kind: ChallengeKind) -> &mut u64 {
        match kind {
            ChallengeKind::WpmThreshold => &mut self.tests_with_wpm,
            ChallengeKind::AccuracyThreshold => &mut self.tests_with_accuracy,
            ChallengeKind::Characters => &mut self.total_chars,
            ChallengeKind::Perfect => &mut self.perfect_tests,
        }
    }

    pub fn counter(&self, kind: ChallengeKind) -> u64 {
        match kind {
            ChallengeKind::WpmThreshold => self.tests_with_wpm,
            ChallengeKind::AccuracyThreshold => self.tests_with_accuracy,
            ChallengeKind::Characters => self.total_chars,
            ChallengeKind::Perfect => self.perfect_tests,
        }
    }

    pub fn is_complete(&self, challenge: &DailyChallenge) -> bool {
        self.counter(challenge.kind) >= challenge.target
    }

    pub fn status(&self, challenge: &DailyChallenge) -> ChallengeStatus {
        let current = self.counter(challenge.kind);
        ChallengeStatus {
            id: challenge.id,
            name: challenge.name,
            current_count: current,
            target: challenge.target,
            complete: current >= challenge.target,
            percent: progress_percent(current, challenge.target),
        }
    }

    pub fn statuses(&self) -> Vec<ChallengeStatus> {
        DAILY_CHALLENGES.iter().map(|c| self.status(c)).collect()
    }

    /// Challenges complete in `self` but not in `before`
    pub fn newly_completed(&self, before: &ChallengeProgress) -> Vec<&'static DailyChallenge> {
        let completed: Vec<_> = DAILY_CHALLENGES
            .iter()
            .filter(|c| self.is_complete(c) && !before.is_complete(c))
            .collect();

        for c in &completed {
            info!(challenge = c.name, "Daily challenge completed");
        }
        completed
    }
}

/// `min(current, target) / target * 100`
pub fn progress_percent(current: u64, target: u64) -> f64 {
    if target == 0 {
        return 100.0;
    }
    current.min(target) as f64 / target as f64 * 100.0
}
