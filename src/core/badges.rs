//! Badge catalog and unlock rules.
//!
//! Rules are evaluated against the snapshot produced by the mutation that
//! triggered evaluation, with the pre-mutation snapshot available for
//! "first time" transitions.

use serde::Serialize;

use crate::core::curriculum::Curriculum;
use crate::core::progress::Progress;

/// Streak length that earns the streak badge.
pub const STREAK_MILESTONE: u32 = 3;

/// XP total that earns the level badge.
pub const XP_MILESTONE: u64 = 500;

/// A badge definition from the fixed catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

pub const FIRST_LESSON: &str = "b1-initiate";
pub const STREAK: &str = "b2-streak";
pub const FIRST_MODULE: &str = "b3-mod1";
pub const LEVEL: &str = "b4-master";
pub const FIRST_PROJECT: &str = "b5-builder";

/// Every badge, in unlock-report order.
pub static BADGES: &[Badge] = &[
    Badge {
        id: FIRST_LESSON,
        name: "Mara Initiate",
        description: "Complete your first lesson.",
        icon: "🌱",
    },
    Badge {
        id: STREAK,
        name: "Musoma Momentum",
        description: "Reach a 3-day learning streak.",
        icon: "🔥",
    },
    Badge {
        id: FIRST_MODULE,
        name: "Serengeti Scripter",
        description: "Complete the Introduction module.",
        icon: "🦁",
    },
    Badge {
        id: LEVEL,
        name: "Kilimanjaro Coder",
        description: "Reach 500 XP.",
        icon: "🗻",
    },
    Badge {
        id: FIRST_PROJECT,
        name: "Lake Victoria Builder",
        description: "Complete your first project.",
        icon: "🛠️",
    },
];

/// Look up a badge definition by id.
pub fn find(id: &str) -> Option<&'static Badge> {
    BADGES.iter().find(|b| b.id == id)
}

/// Look up a badge definition by display name.
pub fn find_by_name(name: &str) -> Option<&'static Badge> {
    BADGES.iter().find(|b| b.name == name)
}

/// Evaluates unlock rules for one curriculum.
#[derive(Debug, Clone)]
pub struct BadgeEvaluator {
    /// Lessons that make up the opening module.
    first_module: Vec<String>,
}

impl BadgeEvaluator {
    /// Create an evaluator for the given curriculum.
    pub fn new(curriculum: &Curriculum) -> Self {
        Self {
            first_module: curriculum
                .first_module_lessons()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    /// Badges whose rule holds for `next` and that `next` does not already hold.
    ///
    /// `next` must be the snapshot produced by the mutation being evaluated.
    pub fn evaluate(&self, previous: &Progress, next: &Progress) -> Vec<&'static Badge> {
        BADGES
            .iter()
            .filter(|badge| !next.has_badge(badge.id))
            .filter(|badge| self.rule_holds(badge.id, previous, next))
            .collect()
    }

    fn rule_holds(&self, id: &str, previous: &Progress, next: &Progress) -> bool {
        match id {
            FIRST_LESSON => {
                previous.completed_lessons.is_empty() && next.completed_lessons.len() == 1
            }
            STREAK => next.streak >= STREAK_MILESTONE,
            FIRST_MODULE => {
                !self.first_module.is_empty()
                    && self.first_module.iter().all(|id| next.has_lesson(id))
            }
            LEVEL => next.xp >= XP_MILESTONE,
            FIRST_PROJECT => {
                previous.completed_projects.is_empty() && next.completed_projects.len() == 1
            }
            _ => false,
        }
    }
}
