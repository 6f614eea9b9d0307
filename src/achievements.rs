//! Achievement definitions and unlock evaluation
//!
//! Every achievement can be earned once. Evaluation never removes an id from
//! the unlocked set, and rules already in the set are not checked again.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

use crate::session::SessionResult;

/// Unique identifier for each achievement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    FirstTest,
    SpeedDemon,
    Perfectionist,
    Wpm80,
    Wpm100,
    Level10,
    Tests50,
}

impl AchievementId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstTest => "first_test",
            Self::SpeedDemon => "speed_demon",
            Self::Perfectionist => "perfectionist",
            Self::Wpm80 => "wpm_80",
            Self::Wpm100 => "wpm_100",
            Self::Level10 => "level_10",
            Self::Tests50 => "tests_50",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        ACHIEVEMENTS
            .iter()
            .map(|a| a.id)
            .find(|id| id.as_str() == s)
    }

    pub fn definition(&self) -> &'static Achievement {
        // every id has exactly one entry in ACHIEVEMENTS
        ACHIEVEMENTS
            .iter()
            .find(|a| a.id == *self)
            .unwrap_or(&ACHIEVEMENTS[0])
    }
}

/// Cumulative player state a rule may look at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CumulativeStats {
    pub total_tests: u32,
    pub level: u32,
}

/// Achievement metadata plus its unlock predicate
pub struct Achievement {
    pub id: AchievementId,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub xp_reward: u64,
    predicate: fn(&SessionResult, &CumulativeStats) -> bool,
}

impl std::fmt::Debug for Achievement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Achievement")
            .field("id", &self.id)
            .field("xp_reward", &self.xp_reward)
            .finish()
    }
}

impl Achievement {
    pub fn is_met(&self, result: &SessionResult, stats: &CumulativeStats) -> bool {
        (self.predicate)(result, stats)
    }
}

pub static ACHIEVEMENTS: &[Achievement] = &[
    Achievement {
        id: AchievementId::FirstTest,
        name: "First Steps",
        description: "Complete your first typing test",
        icon: "🎯",
        xp_reward: 50,
        predicate: |_, stats| stats.total_tests >= 1,
    },
    Achievement {
        id: AchievementId::SpeedDemon,
        name: "Speed Demon",
        description: "Reach 60 WPM",
        icon: "⚡",
        xp_reward: 100,
        predicate: |result, _| result.wpm >= 60,
    },
    Achievement {
        id: AchievementId::Perfectionist,
        name: "Perfectionist",
        description: "Achieve 100% accuracy",
        icon: "💎",
        xp_reward: 150,
        predicate: |result, _| result.accuracy == 100,
    },
    Achievement {
        id: AchievementId::Wpm80,
        name: "Lightning",
        description: "Reach 80 WPM",
        icon: "⚡",
        xp_reward: 300,
        predicate: |result, _| result.wpm >= 80,
    },
    Achievement {
        id: AchievementId::Wpm100,
        name: "Supersonic",
        description: "Reach 100 WPM",
        icon: "🏆",
        xp_reward: 500,
        predicate: |result, _| result.wpm >= 100,
    },
    Achievement {
        id: AchievementId::Level10,
        name: "Rising Star",
        description: "Reach level 10",
        icon: "🚀",
        xp_reward: 100,
        predicate: |_, stats| stats.level >= 10,
    },
    Achievement {
        id: AchievementId::Tests50,
        name: "Practitioner",
        description: "Complete 50 tests",
        icon: "📚",
        xp_reward: 250,
        predicate: |_, stats| stats.total_tests >= 50,
    },
];

/// Result of one evaluation pass
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Evaluation {
    /// Previously unlocked ids plus the new ones
    pub unlocked: BTreeSet<AchievementId>,
    /// Ids unlocked by this pass, in table order
    pub newly_unlocked: Vec<AchievementId>,
    /// XP the caller should grant on top of the session XP
    pub xp_reward: u64,
}

/// Check every rule not yet in `unlocked` against a finished session.
///
/// `stats.level` must be the level *after* the session's own XP was applied.
pub fn evaluate(
    result: &SessionResult,
    stats: &CumulativeStats,
    unlocked: &BTreeSet<AchievementId>,
) -> Evaluation {
    let mut evaluation = Evaluation {
        unlocked: unlocked.clone(),
        ..Default::default()
    };

    for achievement in ACHIEVEMENTS {
        if unlocked.contains(&achievement.id) || !achievement.is_met(result, stats) {
            continue;
        }

        info!(
            achievement = achievement.id.as_str(),
            xp = achievement.xp_reward,
            "Achievement unlocked"
        );
        evaluation.unlocked.insert(achievement.id);
        evaluation.newly_unlocked.push(achievement.id);
        evaluation.xp_reward += achievement.xp_reward;
    }

    evaluation
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(wpm: u32, accuracy: u8) -> SessionResult {
        SessionResult {
            wpm,
            accuracy,
            error_count: 0,
            elapsed_secs: 10.0,
            text_length: 44,
        }
    }

    fn stats(total_tests: u32, level: u32) -> CumulativeStats {
        CumulativeStats { total_tests, level }
    }

    #[test]
    fn first_session_unlocks_first_test() {
        let eval = evaluate(&result(30, 90), &stats(1, 1), &BTreeSet::new());

        assert_eq!(eval.newly_unlocked, vec![AchievementId::FirstTest]);
        assert_eq!(eval.xp_reward, 50);
        assert!(eval.unlocked.contains(&AchievementId::FirstTest));
    }

    #[test]
    fn fast_perfect_session_unlocks_several() {
        let eval = evaluate(&result(105, 100), &stats(1, 1), &BTreeSet::new());

        assert_eq!(
            eval.newly_unlocked,
            vec![
                AchievementId::FirstTest,
                AchievementId::SpeedDemon,
                AchievementId::Perfectionist,
                AchievementId::Wpm80,
                AchievementId::Wpm100,
            ]
        );
        assert_eq!(eval.xp_reward, 50 + 100 + 150 + 300 + 500);
    }

    #[test]
    fn already_unlocked_is_not_awarded_again() {
        let unlocked: BTreeSet<_> = [AchievementId::FirstTest, AchievementId::SpeedDemon].into();
        let eval = evaluate(&result(65, 90), &stats(2, 1), &unlocked);

        assert!(eval.newly_unlocked.is_empty());
        assert_eq!(eval.xp_reward, 0);
        assert_eq!(eval.unlocked, unlocked);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let session = result(85, 100);
        let cumulative = stats(50, 12);
        let first = evaluate(&session, &cumulative, &BTreeSet::new());
        let second = evaluate(&session, &cumulative, &first.unlocked);

        assert_eq!(first.unlocked.len(), ACHIEVEMENTS.len() - 1); // no 100 wpm
        assert!(second.newly_unlocked.is_empty());
        assert_eq!(second.unlocked, first.unlocked);
    }

    #[test]
    fn unlocked_set_never_shrinks() {
        let unlocked: BTreeSet<_> = [AchievementId::Wpm100].into();
        let eval = evaluate(&result(10, 50), &stats(3, 1), &unlocked);
        assert!(eval.unlocked.is_superset(&unlocked));
    }

    #[test]
    fn cumulative_rules_read_stats() {
        let eval = evaluate(&result(10, 50), &stats(50, 10), &BTreeSet::new());
        assert!(eval.newly_unlocked.contains(&AchievementId::Level10));
        assert!(eval.newly_unlocked.contains(&AchievementId::Tests50));
    }

    #[test]
    fn test_id_round_trip_through_str() {
        for a in ACHIEVEMENTS {
            assert_eq!(AchievementId::parse(a.id.as_str()), Some(a.id));
            assert_eq!(a.id.definition().name, a.name);
        }
        assert_eq!(AchievementId::parse("streak_3"), None);
    }
}
