//! Static phoenix rank table and threshold lookup.

/// One entry of the rank ladder. `level` is the table index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rank {
    pub name: &'static str,
    pub hours_threshold: f64,
    /// One-time level-up reward in whole coins.
    pub reward: i64,
    pub level: usize,
}

/// The full ladder, strictly increasing thresholds, level 0 at threshold 0.
pub const RANKS: [Rank; 16] = [
    Rank { name: "Ashen Egg I", hours_threshold: 0.0, reward: 0, level: 0 },
    Rank { name: "Ashen Egg II", hours_threshold: 6.0, reward: 50, level: 1 },
    Rank { name: "Ashen Egg III", hours_threshold: 12.0, reward: 100, level: 2 },
    Rank { name: "Ember Hatchling", hours_threshold: 48.0, reward: 150, level: 3 },
    Rank { name: "Flame Chick", hours_threshold: 72.0, reward: 200, level: 4 },
    Rank { name: "Spark Fledgling", hours_threshold: 120.0, reward: 300, level: 5 },
    Rank { name: "Blaze Juvenile", hours_threshold: 168.0, reward: 400, level: 6 },
    Rank { name: "Fire Dancer", hours_threshold: 240.0, reward: 500, level: 7 },
    Rank { name: "Inferno Adult", hours_threshold: 336.0, reward: 650, level: 8 },
    Rank { name: "Radiant Phoenix", hours_threshold: 504.0, reward: 800, level: 9 },
    Rank { name: "Solar Phoenix", hours_threshold: 720.0, reward: 1000, level: 10 },
    Rank { name: "Mythic Firebird", hours_threshold: 1080.0, reward: 1250, level: 11 },
    Rank { name: "Eternal Flame", hours_threshold: 1440.0, reward: 1500, level: 12 },
    Rank { name: "Celestial Phoenix", hours_threshold: 2160.0, reward: 2000, level: 13 },
    Rank { name: "Immortal Phoenix", hours_threshold: 4320.0, reward: 3000, level: 14 },
    Rank { name: "Legendary Phoenix", hours_threshold: 8760.0, reward: 5000, level: 15 },
];

/// Rank with the greatest threshold ≤ `hours`. Negative hours map to rank 0.
///
/// Scans from the highest threshold downward; total function.
pub fn rank_at(hours: f64) -> &'static Rank {
    for rank in RANKS.iter().rev() {
        if hours >= rank.hours_threshold {
            return rank;
        }
    }
    &RANKS[0]
}

/// Sum of level-up rewards for levels `(last_claimed, reached]`, ascending.
///
/// Each level is paid exactly once per streak; indexes at or beyond the table
/// length are skipped rather than panicking.
pub fn unclaimed_reward(last_claimed_level: usize, reached_level: usize) -> i64 {
    if reached_level <= last_claimed_level {
        return 0;
    }
    let mut total = 0i64;
    for level in (last_claimed_level + 1)..=reached_level {
        if level >= RANKS.len() {
            break;
        }
        total += RANKS[level].reward;
    }
    total
}
