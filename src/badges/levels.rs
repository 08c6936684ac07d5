//! XP thresholds and reader levels
//!
//! Levels 1-10 use an explicit table; beyond that the thresholds follow a
//! generative rule with a gently growing step and larger jumps at levels
//! 50, 100, 150 and 200. The level freezes at [`MAX_LEVEL`].

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Level number after which additional XP no longer raises the level.
pub const MAX_LEVEL: u32 = 1000;

/// Explicit thresholds for the first ten levels, with reader rank titles.
/// Must stay sorted by level.
static BASE_LEVELS: &[(u32, i64, &str)] = &[
    (1, 0, "New Reader"),
    (2, 100, "Page Turner"),
    (3, 250, "Story Seeker"),
    (4, 450, "Chapter Champ"),
    (5, 700, "Book Explorer"),
    (6, 1000, "Plot Detective"),
    (7, 1350, "Shelf Conqueror"),
    (8, 1750, "Story Sage"),
    (9, 2200, "Book Hero"),
    (10, 2700, "Reading Legend"),
];

/// XP gap between `level` and `level + 1` for levels past the explicit table.
fn step_after(level: u32) -> i64 {
    let mut step = 500 + 20 * (i64::from(level) - 9);
    for bump in [50u32, 100, 150, 200] {
        if level >= bump {
            step += 500;
        }
    }
    step
}

/// Precomputed thresholds for levels 1..=MAX_LEVEL (index = level - 1).
static THRESHOLDS: Lazy<Vec<i64>> = Lazy::new(|| {
    let mut thresholds: Vec<i64> = BASE_LEVELS.iter().map(|&(_, xp, _)| xp).collect();
    for level in BASE_LEVELS.len() as u32..MAX_LEVEL {
        let last = *thresholds.last().expect("base table is non-empty");
        thresholds.push(last + step_after(level));
    }
    thresholds
});

/// XP required to reach `level`. Levels above [`MAX_LEVEL`] share its threshold.
pub fn threshold(level: u32) -> i64 {
    let level = level.clamp(1, MAX_LEVEL) as usize;
    THRESHOLDS[level - 1]
}

/// Level for a cumulative XP total: the highest level whose threshold is met.
pub fn level_of(total_xp: i64) -> u32 {
    let reached = THRESHOLDS.partition_point(|&t| t <= total_xp) as u32;
    reached.max(1)
}

/// Reader rank title shown next to a level.
pub fn title_for(level: u32) -> &'static str {
    match level {
        0 | 1 => BASE_LEVELS[0].2,
        2..=10 => BASE_LEVELS[(level - 1) as usize].2,
        11..=24 => "Reading Legend",
        25..=49 => "Master Bibliophile",
        50..=99 => "Grand Librarian",
        100..=199 => "Mythic Reader",
        _ => "Eternal Bookkeeper",
    }
}

/// Derived level-progression view for a cumulative XP total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelProgress {
    pub level: u32,
    pub title: String,
    /// Threshold of the current level.
    pub current_threshold: i64,
    /// Threshold of the next level; `None` once the level is frozen.
    pub next_threshold: Option<i64>,
    /// Progress through the current level, clamped to 0-100.
    pub percentage: f64,
    pub xp_to_next: Option<i64>,
}

/// Compute the full progression view. Pure; negative totals are treated as 0.
pub fn progress(total_xp: i64) -> LevelProgress {
    let total_xp = total_xp.max(0);
    let level = level_of(total_xp);
    let current = threshold(level);
    let next = (level < MAX_LEVEL).then(|| threshold(level + 1));

    let percentage = match next {
        Some(next) if next > current => {
            let span = (next - current) as f64;
            ((total_xp - current) as f64 / span * 100.0).clamp(0.0, 100.0)
        }
        _ => 100.0,
    };

    LevelProgress {
        level,
        title: title_for(level).to_string(),
        current_threshold: current,
        next_threshold: next,
        percentage,
        xp_to_next: next.map(|n| (n - total_xp).max(0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_of_table_head() {
        assert_eq!(level_of(0), 1);
        assert_eq!(level_of(99), 1);
        assert_eq!(level_of(100), 2);
        assert_eq!(level_of(2700), 10);
        assert_eq!(level_of(2699), 9);
    }

    #[test]
    fn test_thresholds_strictly_increasing() {
        for level in 1..MAX_LEVEL {
            assert!(
                threshold(level + 1) > threshold(level),
                "threshold must grow at level {}",
                level
            );
        }
    }

    #[test]
    fn test_step_jumps() {
        // Gaps widen at the jump levels.
        let gap = |l: u32| threshold(l + 1) - threshold(l);
        assert!(gap(50) > gap(49) + 400);
        assert!(gap(100) > gap(99) + 400);
        assert!(gap(150) > gap(149) + 400);
        assert!(gap(200) > gap(199) + 400);
    }

    #[test]
    fn test_level_freezes_at_max() {
        let top = threshold(MAX_LEVEL);
        assert_eq!(level_of(top), MAX_LEVEL);
        assert_eq!(level_of(top + 1_000_000), MAX_LEVEL);
    }

    #[test]
    fn test_monotonic_level() {
        let mut last = 0;
        for xp in (0..200_000).step_by(137) {
            let level = level_of(xp);
            assert!(level >= last, "level regressed at {} xp", xp);
            last = level;
        }
    }

    #[test]
    fn test_progress_between_levels() {
        // Halfway between level 1 (0) and level 2 (100).
        let p = progress(50);
        assert_eq!(p.level, 1);
        assert_eq!(p.next_threshold, Some(100));
        assert!((p.percentage - 50.0).abs() < f64::EPSILON);
        assert_eq!(p.xp_to_next, Some(50));
    }

    #[test]
    fn test_progress_at_max_level() {
        let p = progress(threshold(MAX_LEVEL) + 5000);
        assert_eq!(p.level, MAX_LEVEL);
        assert_eq!(p.next_threshold, None);
        assert_eq!(p.percentage, 100.0);
        assert_eq!(p.xp_to_next, None);
    }

    #[test]
    fn test_negative_total_is_level_one() {
        assert_eq!(level_of(-5), 1);
        assert_eq!(progress(-5).level, 1);
    }
}
