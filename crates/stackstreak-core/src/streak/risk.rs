use chrono::NaiveDate;

use super::engine::StreakState;
use crate::date::days_between;

/// Whether the streak breaks unless activity is recorded today.
///
/// True exactly when advancing tomorrow without activity today would reset:
/// yesterday's activity with grace already spent, or the last chance inside
/// an unused grace window.
pub fn is_at_risk(state: &StreakState, today: NaiveDate) -> bool {
    let Some(last) = state.last_activity_date else {
        return false;
    };

    match days_between(today, last) {
        1 => state.grace_period_used,
        2 => !state.grace_period_used,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::parse_date;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn state(last: Option<&str>, grace: bool) -> StreakState {
        StreakState {
            last_activity_date: last.map(d),
            current_streak: 4,
            longest_streak: 4,
            grace_period_used: grace,
        }
    }

    #[test]
    fn no_streak_is_never_at_risk() {
        assert!(!is_at_risk(&state(None, false), d("2025-12-09")));
        assert!(!is_at_risk(&state(None, true), d("2025-12-09")));
    }

    #[test]
    fn yesterday_with_grace_spent_is_at_risk() {
        assert!(is_at_risk(&state(Some("2025-12-08"), true), d("2025-12-09")));
        assert!(!is_at_risk(&state(Some("2025-12-08"), false), d("2025-12-09")));
    }

    #[test]
    fn inside_unused_grace_window_is_at_risk() {
        assert!(is_at_risk(&state(Some("2025-12-07"), false), d("2025-12-09")));
        // Grace already spent: the streak is effectively broken, not at risk.
        assert!(!is_at_risk(&state(Some("2025-12-07"), true), d("2025-12-09")));
    }

    #[test]
    fn today_and_long_gaps_are_not_at_risk() {
        assert!(!is_at_risk(&state(Some("2025-12-09"), true), d("2025-12-09")));
        assert!(!is_at_risk(&state(Some("2025-12-06"), false), d("2025-12-09")));
        assert!(!is_at_risk(&state(Some("2025-12-10"), false), d("2025-12-09")));
    }
}
