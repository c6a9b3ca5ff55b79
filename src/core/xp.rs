//! XP to level conversion.

/// XP needed per level.
pub const XP_PER_LEVEL: u64 = 1000;

/// Level for a given XP total. Levels start at 1.
pub fn level(xp: u64) -> u64 {
    xp / XP_PER_LEVEL + 1
}

/// Fraction of the current level earned, clamped to `[0.0, 1.0]`.
pub fn progress_fraction(xp: u64) -> f64 {
    ((xp % XP_PER_LEVEL) as f64 / XP_PER_LEVEL as f64).min(1.0)
}

/// XP still needed to reach the next level.
pub fn xp_to_next_level(xp: u64) -> u64 {
    XP_PER_LEVEL - xp % XP_PER_LEVEL
}
