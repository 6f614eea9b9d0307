//! XP curve and level progression
//!
//! Each level needs geometrically more XP than the one before it:
//! `xp_for_level(level) = floor(100 * 1.2^(level - 1))`.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::rank::Rank;

/// Base XP granted for any finished session
pub const SESSION_BASE_XP: u64 = 20;

/// XP needed to advance *from* `level` to the next one
pub fn xp_for_level(level: u32) -> u64 {
    let exponent = level.saturating_sub(1) as f64;
    // `as` saturates, so absurd levels clamp to u64::MAX instead of wrapping
    (100.0 * 1.2_f64.powf(exponent)).floor() as u64
}

/// Cumulative XP required to reach `level` from level 1 with zero XP
pub fn total_xp_for_level(level: u32) -> u64 {
    (1..level).map(xp_for_level).fold(0u64, u64::saturating_add)
}

/// XP earned by a finished session, before any achievement rewards
pub fn session_xp_reward(wpm: u32, accuracy: u8) -> u64 {
    let wpm_bonus = (wpm as u64 / 10) * 5;
    let accuracy_bonus = (accuracy as u64 / 10) * 3;
    SESSION_BASE_XP + wpm_bonus + accuracy_bonus
}

/// XP held towards the next level together with the current level.
///
/// Invariant: `xp < xp_for_level(level)` and `level >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progression {
    pub xp: u64,
    pub level: u32,
}

impl Default for Progression {
    fn default() -> Self {
        Self { xp: 0, level: 1 }
    }
}

impl Progression {
    /// Add XP, carrying any overflow into as many level-ups as it pays for
    pub fn add_xp(self, amount: u64) -> Self {
        let mut xp = self.xp.saturating_add(amount);
        let mut level = self.level.max(1);

        while xp >= xp_for_level(level) && level < u32::MAX {
            xp -= xp_for_level(level);
            level += 1;
        }

        if level > self.level {
            info!(
                from = self.level,
                to = level,
                gained = amount,
                "Level up"
            );
        }

        Self { xp, level }
    }

    /// XP still missing before the next level-up
    pub fn xp_to_next_level(&self) -> u64 {
        xp_for_level(self.level).saturating_sub(self.xp)
    }

    /// Progress through the current level, 0.0 - 100.0
    pub fn level_progress_percent(&self) -> f64 {
        let needed = xp_for_level(self.level);
        if needed == 0 {
            return 100.0;
        }
        (self.xp as f64 / needed as f64 * 100.0).min(100.0)
    }

    /// Total XP earned since level 1
    pub fn lifetime_xp(&self) -> u64 {
        total_xp_for_level(self.level).saturating_add(self.xp)
    }

    pub fn rank(&self) -> &'static Rank {
        Rank::for_level(self.level)
    }

    pub fn next_rank(&self) -> Option<&'static Rank> {
        Rank::next_for_level(self.level)
    }
}
