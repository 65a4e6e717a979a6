use chrono::NaiveDate;

use crate::types::StreakState;

/// What a user sees when asking for their streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakReport {
    pub current: u32,
    pub max: u32,
    pub active_today: bool,
}

/// Record one day of activity. Idempotent within a calendar day; +1 on a
/// consecutive day; resets to 1 after a gap of two or more days.
///
/// Days are UTC calendar dates: activity at 23:59 and again at 00:01 counts
/// as two days and extends the streak.
pub fn record_activity(streak: &mut StreakState, today: NaiveDate) {
    if streak.last_active_date == Some(today) {
        return;
    }
    let yesterday = today.pred_opt();
    if streak.last_active_date.is_some() && streak.last_active_date == yesterday {
        streak.current += 1;
    } else {
        streak.current = 1;
    }
    streak.max = streak.max.max(streak.current);
    streak.last_active_date = Some(today);
}

/// Report the streak as of `today`. A gap of more than one day reads as a
/// current streak of 0; the stored value is only corrected lazily, on the
/// next read-back or the next activity.
pub fn current_streak(streak: &StreakState, today: NaiveDate) -> StreakReport {
    let current = match streak.last_active_date {
        Some(last) if (today - last).num_days() <= 1 => streak.current,
        _ => 0,
    };
    StreakReport {
        current,
        max: streak.max,
        active_today: streak.last_active_date == Some(today),
    }
}

/// True when the stored streak has decayed and should be written back as 0.
pub fn has_decayed(streak: &StreakState, today: NaiveDate) -> bool {
    streak.current > 0 && current_streak(streak, today).current == 0
}
