//! Daily streak state machine.
//!
//! A streak advances at most once per calendar day. One missed day may be
//! forgiven through the grace period, which is consumed on use and restored
//! by the next consecutive-day advance or by a reset.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::badge::{first_unlockable, BadgeType};
use crate::date::days_between;

/// Persisted streak state for one user-stack pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    /// Last day the streak advanced. `None` before the first completion.
    pub last_activity_date: Option<NaiveDate>,
    pub current_streak: u32,
    /// All-time maximum of `current_streak`. Never decreases.
    pub longest_streak: u32,
    pub grace_period_used: bool,
}

/// Which branch an advance took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceKind {
    /// First completion ever.
    Started,
    /// Already recorded today; nothing changed.
    SameDay,
    /// Completed the day after the last activity.
    Consecutive,
    /// One missed day forgiven by the grace period.
    Grace,
    /// Gap too large (or grace already spent); streak restarts at 1.
    Reset,
}

/// Outcome of [`advance_streak`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakResult {
    pub new_streak: u32,
    pub new_longest_streak: u32,
    pub new_grace_period_used: bool,
    pub badge_to_unlock: Option<BadgeType>,
    pub kind: AdvanceKind,
}

impl StreakResult {
    pub fn is_new_milestone(&self) -> bool {
        self.badge_to_unlock.is_some()
    }

    /// Whether the streak count or grace flag moved.
    pub fn changed(&self) -> bool {
        self.kind != AdvanceKind::SameDay
    }

    /// The state to persist after recording activity on `today`.
    pub fn into_state(self, today: NaiveDate, previous: &StreakState) -> StreakState {
        let last_activity_date = match self.kind {
            AdvanceKind::SameDay => previous.last_activity_date,
            _ => Some(today),
        };
        StreakState {
            last_activity_date,
            current_streak: self.new_streak,
            longest_streak: self.new_longest_streak,
            grace_period_used: self.new_grace_period_used,
        }
    }
}

/// Advance `state` for activity on `today`.
///
/// Pure and total: every input maps to a result. A `today` earlier than the
/// last activity (e.g. after the user moved west across timezones) resets.
pub fn advance_streak(
    state: &StreakState,
    today: NaiveDate,
    unlocked: &HashSet<BadgeType>,
) -> StreakResult {
    let Some(last) = state.last_activity_date else {
        tracing::debug!(%today, "starting new streak");
        return StreakResult {
            new_streak: 1,
            new_longest_streak: state.longest_streak.max(1),
            new_grace_period_used: false,
            badge_to_unlock: None,
            kind: AdvanceKind::Started,
        };
    };

    let gap = days_between(today, last);

    let (new_streak, new_grace_period_used, kind) = match gap {
        0 => {
            return StreakResult {
                new_streak: state.current_streak,
                new_longest_streak: state.longest_streak,
                new_grace_period_used: state.grace_period_used,
                badge_to_unlock: None,
                kind: AdvanceKind::SameDay,
            };
        }
        1 => (
            state.current_streak.saturating_add(1),
            false,
            AdvanceKind::Consecutive,
        ),
        2 if !state.grace_period_used => (
            state.current_streak.saturating_add(1),
            true,
            AdvanceKind::Grace,
        ),
        _ => (1, false, AdvanceKind::Reset),
    };

    tracing::debug!(%today, %last, gap, ?kind, new_streak, "advanced streak");

    StreakResult {
        new_streak,
        new_longest_streak: new_streak.max(state.longest_streak),
        new_grace_period_used,
        badge_to_unlock: first_unlockable(new_streak, unlocked),
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::parse_date;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn state(last: Option<&str>, current: u32, longest: u32, grace: bool) -> StreakState {
        StreakState {
            last_activity_date: last.map(d),
            current_streak: current,
            longest_streak: longest,
            grace_period_used: grace,
        }
    }

    fn no_badges() -> HashSet<BadgeType> {
        HashSet::new()
    }

    #[test]
    fn first_activity_starts_at_one() {
        let result = advance_streak(&state(None, 0, 0, false), d("2025-01-01"), &no_badges());
        assert_eq!(result.new_streak, 1);
        assert_eq!(result.new_longest_streak, 1);
        assert!(!result.new_grace_period_used);
        assert_eq!(result.badge_to_unlock, None);
        assert_eq!(result.kind, AdvanceKind::Started);
    }

    #[test]
    fn first_activity_keeps_existing_longest() {
        let result = advance_streak(&state(None, 0, 12, true), d("2025-01-01"), &no_badges());
        assert_eq!(result.new_streak, 1);
        assert_eq!(result.new_longest_streak, 12);
        assert!(!result.new_grace_period_used);
    }

    #[test]
    fn same_day_is_a_no_op() {
        let s = state(Some("2025-12-09"), 5, 8, true);
        let result = advance_streak(&s, d("2025-12-09"), &no_badges());
        assert_eq!(result.new_streak, 5);
        assert_eq!(result.new_longest_streak, 8);
        assert!(result.new_grace_period_used);
        assert_eq!(result.badge_to_unlock, None);
        assert!(!result.changed());
        assert_eq!(result.into_state(d("2025-12-09"), &s), s);
    }

    #[test]
    fn same_day_does_not_unlock_even_when_badge_missing() {
        let s = state(Some("2025-12-09"), 7, 7, false);
        let result = advance_streak(&s, d("2025-12-09"), &no_badges());
        assert_eq!(result.badge_to_unlock, None);
    }

    #[test]
    fn consecutive_day_increments_and_unlocks_seven() {
        let result = advance_streak(
            &state(Some("2025-12-08"), 6, 6, false),
            d("2025-12-09"),
            &no_badges(),
        );
        assert_eq!(result.new_streak, 7);
        assert_eq!(result.new_longest_streak, 7);
        assert!(!result.new_grace_period_used);
        assert_eq!(result.badge_to_unlock, Some(BadgeType::Streak7));
        assert!(result.is_new_milestone());
    }

    #[test]
    fn consecutive_day_clears_used_grace() {
        let result = advance_streak(
            &state(Some("2025-12-08"), 3, 3, true),
            d("2025-12-09"),
            &no_badges(),
        );
        assert_eq!(result.new_streak, 4);
        assert!(!result.new_grace_period_used);
    }

    #[test]
    fn recorded_badge_is_not_signalled_again() {
        let unlocked: HashSet<_> = [BadgeType::Streak7].into_iter().collect();
        let result = advance_streak(
            &state(Some("2025-12-08"), 6, 6, false),
            d("2025-12-09"),
            &unlocked,
        );
        assert_eq!(result.new_streak, 7);
        assert_eq!(result.badge_to_unlock, None);
    }

    #[test]
    fn two_day_gap_uses_grace() {
        let result = advance_streak(
            &state(Some("2025-12-07"), 5, 5, false),
            d("2025-12-09"),
            &no_badges(),
        );
        assert_eq!(result.new_streak, 6);
        assert_eq!(result.new_longest_streak, 6);
        assert!(result.new_grace_period_used);
        assert_eq!(result.badge_to_unlock, None);
        assert_eq!(result.kind, AdvanceKind::Grace);
    }

    #[test]
    fn two_day_gap_with_grace_spent_resets() {
        let result = advance_streak(
            &state(Some("2025-12-07"), 5, 10, true),
            d("2025-12-09"),
            &no_badges(),
        );
        assert_eq!(result.new_streak, 1);
        assert_eq!(result.new_longest_streak, 10);
        assert!(!result.new_grace_period_used);
        assert_eq!(result.kind, AdvanceKind::Reset);
    }

    #[test]
    fn long_gap_resets() {
        let result = advance_streak(
            &state(Some("2025-12-05"), 10, 10, false),
            d("2025-12-09"),
            &no_badges(),
        );
        assert_eq!(result.new_streak, 1);
        assert_eq!(result.new_longest_streak, 10);
        assert!(!result.new_grace_period_used);
    }

    #[test]
    fn date_moving_backwards_resets() {
        let result = advance_streak(
            &state(Some("2025-12-09"), 4, 4, false),
            d("2025-12-08"),
            &no_badges(),
        );
        assert_eq!(result.new_streak, 1);
        assert_eq!(result.new_longest_streak, 4);
    }

    #[test]
    fn grace_unlocks_milestone() {
        let result = advance_streak(
            &state(Some("2025-12-07"), 29, 29, false),
            d("2025-12-09"),
            &[BadgeType::Streak7].into_iter().collect(),
        );
        assert_eq!(result.new_streak, 30);
        assert_eq!(result.badge_to_unlock, Some(BadgeType::Streak30));
    }

    #[test]
    fn into_state_moves_last_activity_to_today() {
        let previous = state(Some("2025-12-07"), 5, 5, false);
        let result = advance_streak(&previous, d("2025-12-09"), &no_badges());
        let next = result.into_state(d("2025-12-09"), &previous);
        assert_eq!(next, state(Some("2025-12-09"), 6, 6, true));
    }

    #[test]
    fn streak_saturates_instead_of_overflowing() {
        let result = advance_streak(
            &state(Some("2025-12-08"), u32::MAX, u32::MAX, false),
            d("2025-12-09"),
            &BadgeType::MILESTONES.into_iter().collect(),
        );
        assert_eq!(result.new_streak, u32::MAX);
    }
}
