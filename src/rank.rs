//! Rank tiers
//!
//! Ranks are cosmetic and derived purely from the player's level.

use serde::Serialize;

/// A single tier of the rank table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rank {
    pub min_level: u32,
    pub name: &'static str,
    /// Hex colour, `#RRGGBB`
    pub color: &'static str,
    pub icon: &'static str,
}

/// All ranks, ascending by `min_level`. The first entry must start at level 1.
pub static RANKS: &[Rank] = &[
    Rank {
        min_level: 1,
        name: "Novice",
        color: "#6B7280",
        icon: "○",
    },
    Rank {
        min_level: 5,
        name: "Apprentice",
        color: "#10B981",
        icon: "◐",
    },
    Rank {
        min_level: 10,
        name: "Typist",
        color: "#3B82F6",
        icon: "●",
    },
    Rank {
        min_level: 20,
        name: "Swift",
        color: "#8B5CF6",
        icon: "◆",
    },
    Rank {
        min_level: 35,
        name: "Expert",
        color: "#F59E0B",
        icon: "★",
    },
    Rank {
        min_level: 50,
        name: "Master",
        color: "#EF4444",
        icon: "✦",
    },
    Rank {
        min_level: 75,
        name: "Grandmaster",
        color: "#EC4899",
        icon: "❖",
    },
    Rank {
        min_level: 100,
        name: "Legend",
        color: "#FFD700",
        icon: "✧",
    },
];

impl Rank {
    /// Highest rank whose `min_level` the given level meets
    pub fn for_level(level: u32) -> &'static Rank {
        RANKS
            .iter()
            .rev()
            .find(|r| level >= r.min_level)
            .unwrap_or(&RANKS[0])
    }

    /// First rank above the given level, `None` once the top tier is reached
    pub fn next_for_level(level: u32) -> Option<&'static Rank> {
        RANKS.iter().find(|r| r.min_level > level)
    }

    /// Levels remaining until the next rank (None at max rank)
    pub fn levels_until_next(level: u32) -> Option<u32> {
        Self::next_for_level(level).map(|r| r.min_level - level)
    }

    pub fn max_rank() -> &'static Rank {
        &RANKS[RANKS.len() - 1]
    }

    /// Parse `color` into RGB components
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        let hex = self.color.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some((r, g, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_and_starts_at_one() {
        assert_eq!(RANKS[0].min_level, 1);
        for pair in RANKS.windows(2) {
            assert!(pair[0].min_level < pair[1].min_level);
        }
    }

    #[test]
    fn test_rank_for_level() {
        assert_eq!(Rank::for_level(1).name, "Novice");
        assert_eq!(Rank::for_level(4).name, "Novice");
        assert_eq!(Rank::for_level(5).name, "Apprentice");
        assert_eq!(Rank::for_level(19).name, "Typist");
        assert_eq!(Rank::for_level(100).name, "Legend");
        assert_eq!(Rank::for_level(250).name, "Legend");
    }

    #[test]
    fn level_zero_still_resolves() {
        assert_eq!(Rank::for_level(0).name, "Novice");
    }

    #[test]
    fn test_next_rank() {
        assert_eq!(Rank::next_for_level(1).map(|r| r.name), Some("Apprentice"));
        assert_eq!(Rank::next_for_level(5).map(|r| r.name), Some("Typist"));
        assert_eq!(Rank::next_for_level(99).map(|r| r.name), Some("Legend"));
        assert_eq!(Rank::next_for_level(100), None);
    }

    #[test]
    fn current_and_next_partition_levels() {
        for level in 1..=120 {
            let current = Rank::for_level(level);
            assert!(current.min_level <= level);
            match Rank::next_for_level(level) {
                Some(next) => {
                    assert!(next.min_level > level);
                    // no tier sits between the current and the next one
                    let idx = RANKS.iter().position(|r| r == current).unwrap();
                    assert_eq!(&RANKS[idx + 1], next);
                }
                None => assert_eq!(current, Rank::max_rank()),
            }
        }
    }

    #[test]
    fn test_levels_until_next() {
        assert_eq!(Rank::levels_until_next(3), Some(2));
        assert_eq!(Rank::levels_until_next(100), None);
    }

    #[test]
    fn test_rgb() {
        assert_eq!(RANKS[7].rgb(), Some((0xFF, 0xD7, 0x00)));
        assert!(RANKS.iter().all(|r| r.rgb().is_some()));
    }
}
