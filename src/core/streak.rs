//! Day-boundary login streak.
//!
//! Pure logic: the caller supplies today's date, nothing here reads the clock.

use chrono::NaiveDate;

/// Result of a streak evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakUpdate {
    /// Streak after evaluation.
    pub streak: u32,
    /// Date to record as the last login.
    pub last_login_date: NaiveDate,
    /// Whether the record needs to change.
    pub changed: bool,
}

/// Evaluate the streak for a session starting on `today`.
///
/// - same day: unchanged
/// - the next day: streak + 1
/// - any longer gap, or a last login in the future: restart at 1
pub fn evaluate(last_login_date: NaiveDate, today: NaiveDate, current_streak: u32) -> StreakUpdate {
    if last_login_date == today {
        return StreakUpdate {
            streak: current_streak,
            last_login_date,
            changed: false,
        };
    }

    let streak = if last_login_date.succ_opt() == Some(today) {
        current_streak.saturating_add(1).max(1)
    } else {
        1
    };

    StreakUpdate {
        streak,
        last_login_date: today,
        changed: true,
    }
}
