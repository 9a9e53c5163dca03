//! Property tests for the streak engine, risk predicate and date arithmetic.

use std::collections::HashSet;

use chrono::NaiveDate;
use proptest::prelude::*;
use stackstreak_core::date::add_days;
use stackstreak_core::{advance_streak, days_between, is_at_risk, BadgeType, StreakState};

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (-2000i64..2000).prop_map(|offset| add_days(base(), offset).unwrap())
}

fn arb_state() -> impl Strategy<Value = StreakState> {
    (
        proptest::option::of(-400i64..400),
        0u32..150,
        0u32..150,
        any::<bool>(),
    )
        .prop_map(|(last, current, extra, grace)| StreakState {
            last_activity_date: last.map(|offset| add_days(base(), offset).unwrap()),
            current_streak: current,
            longest_streak: current + extra,
            grace_period_used: grace,
        })
}

fn arb_badges() -> impl Strategy<Value = HashSet<BadgeType>> {
    proptest::sample::subsequence(BadgeType::MILESTONES.to_vec(), 0..=3)
        .prop_map(|badges| badges.into_iter().collect())
}

/// A state plus a "today" within a few days of its last activity.
fn arb_state_and_today() -> impl Strategy<Value = (StreakState, NaiveDate)> {
    (arb_state(), -3i64..6).prop_map(|(state, gap)| {
        let anchor = state.last_activity_date.unwrap_or_else(base);
        let today = add_days(anchor, gap).unwrap();
        (state, today)
    })
}

proptest! {
    #[test]
    fn same_day_call_is_idempotent(
        (state, today) in arb_state_and_today(),
        badges in arb_badges(),
    ) {
        let first = advance_streak(&state, today, &badges);
        let persisted = first.clone().into_state(today, &state);
        let second = advance_streak(&persisted, today, &badges);

        prop_assert_eq!(second.new_streak, first.new_streak);
        prop_assert_eq!(second.new_longest_streak, first.new_longest_streak);
        prop_assert_eq!(second.new_grace_period_used, first.new_grace_period_used);
        prop_assert_eq!(second.badge_to_unlock, None);
        prop_assert_eq!(second.into_state(today, &persisted), persisted);
    }

    #[test]
    fn longest_streak_never_decreases(
        (state, today) in arb_state_and_today(),
        badges in arb_badges(),
    ) {
        let result = advance_streak(&state, today, &badges);
        prop_assert!(result.new_longest_streak >= state.longest_streak);
        prop_assert!(result.new_longest_streak >= result.new_streak);
    }

    #[test]
    fn streak_moves_by_one_or_resets(
        (state, today) in arb_state_and_today(),
        badges in arb_badges(),
    ) {
        let result = advance_streak(&state, today, &badges);
        prop_assert!(
            result.new_streak == 1
                || result.new_streak == state.current_streak
                || result.new_streak == state.current_streak + 1
        );
        if result.new_grace_period_used && !state.grace_period_used {
            let last = state.last_activity_date.unwrap();
            prop_assert_eq!(days_between(today, last), 2);
        }
    }

    #[test]
    fn grace_cannot_be_used_twice_in_a_row(
        current in 1u32..200,
        gap in 2i64..10,
        badges in arb_badges(),
    ) {
        let start = StreakState {
            last_activity_date: Some(base()),
            current_streak: current,
            longest_streak: current,
            grace_period_used: false,
        };
        let day2 = add_days(base(), 2).unwrap();
        let saved = advance_streak(&start, day2, &badges);
        prop_assert!(saved.new_grace_period_used);

        let after_grace = saved.into_state(day2, &start);
        let later = add_days(day2, gap).unwrap();
        let next = advance_streak(&after_grace, later, &badges);
        prop_assert_eq!(next.new_streak, 1);
        prop_assert!(!next.new_grace_period_used);
    }

    #[test]
    fn badge_is_lowest_missing_milestone(
        (state, today) in arb_state_and_today(),
        badges in arb_badges(),
    ) {
        let result = advance_streak(&state, today, &badges);
        if let Some(badge) = result.badge_to_unlock {
            prop_assert!(!badges.contains(&badge));
            prop_assert!(result.new_streak >= badge.threshold_days());
            for lower in BadgeType::MILESTONES
                .iter()
                .filter(|b| b.threshold_days() < badge.threshold_days())
            {
                prop_assert!(badges.contains(lower));
            }
        }
    }

    #[test]
    fn at_risk_predicts_reset_on_next_miss(
        (state, today) in arb_state_and_today(),
        badges in arb_badges(),
    ) {
        if is_at_risk(&state, today) {
            let tomorrow = add_days(today, 1).unwrap();
            let result = advance_streak(&state, tomorrow, &badges);
            prop_assert_eq!(result.new_streak, 1);
        }
    }

    #[test]
    fn days_between_is_antisymmetric(a in arb_date(), b in arb_date()) {
        prop_assert_eq!(days_between(a, b), -days_between(b, a));
        prop_assert_eq!(add_days(b, days_between(a, b)), Some(a));
    }
}

#[test]
fn bootstrap_example() {
    let result = advance_streak(
        &StreakState::default(),
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        &HashSet::new(),
    );
    assert_eq!(result.new_streak, 1);
    assert_eq!(result.new_longest_streak, 1);
    assert!(!result.new_grace_period_used);
    assert_eq!(result.badge_to_unlock, None);
}
