//! Community leaderboard.
//!
//! The learner's XP is ranked against a fixed set of rival entries. Ties keep
//! rivals ahead of the learner.

use serde::Serialize;

/// Name shown for the learner.
pub const LEARNER_NAME: &str = "You";

/// Icon shown for the learner.
pub const LEARNER_ICON: &str = "👤";

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// 1-based position.
    pub rank: usize,
    pub name: String,
    pub xp: u64,
    pub icon: String,
    /// Whether this row is the learner.
    pub is_learner: bool,
}

/// Built-in rivals as `(name, xp, icon)`.
pub static RIVALS: &[(&str, u64, &str)] = &[
    ("Erick Wambura", 15400, "🦁"),
    ("Sarah J.", 1200, "🌱"),
    ("David M.", 850, "🔥"),
    ("Amani K.", 600, "🌱"),
];

/// Rank `learner_xp` against the rivals (or alone), highest XP first.
pub fn ranking(learner_xp: u64, show_rivals: bool) -> Vec<Entry> {
    let rivals: &[(&str, u64, &str)] = if show_rivals { RIVALS } else { &[] };

    let mut rows: Vec<(String, u64, String, bool)> = rivals
        .iter()
        .map(|&(name, xp, icon)| (name.to_string(), xp, icon.to_string(), false))
        .collect();
    rows.push((
        LEARNER_NAME.to_string(),
        learner_xp,
        LEARNER_ICON.to_string(),
        true,
    ));

    // Stable sort keeps insertion order among equal XP.
    rows.sort_by(|a, b| b.1.cmp(&a.1));

    rows.into_iter()
        .enumerate()
        .map(|(i, (name, xp, icon, is_learner))| Entry {
            rank: i + 1,
            name,
            xp,
            icon,
            is_learner,
        })
        .collect()
}

/// The learner's 1-based position.
pub fn learner_rank(entries: &[Entry]) -> Option<usize> {
    entries.iter().find(|e| e.is_learner).map(|e| e.rank)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_learner_is_last() {
        let entries = ranking(0, true);
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0].name, "Erick Wambura");
        assert_eq!(learner_rank(&entries), Some(5));
    }

    #[test]
    fn test_learner_placed_by_xp() {
        let entries = ranking(900, true);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Erick Wambura", "Sarah J.", "You", "David M.", "Amani K."]
        );
        assert_eq!(learner_rank(&entries), Some(3));
    }

    #[test]
    fn test_tie_keeps_rival_ahead() {
        let entries = ranking(1200, true);
        assert_eq!(entries[1].name, "Sarah J.");
        assert_eq!(entries[2].name, LEARNER_NAME);
    }

    #[test]
    fn test_without_rivals() {
        let entries = ranking(20_000, false);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_learner);
        assert_eq!(entries[0].rank, 1);
    }

    #[test]
    fn test_ranks_are_sequential() {
        let entries = ranking(16_000, true);
        let ranks: Vec<usize> = entries.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
        assert!(entries[0].is_learner);
    }
}
