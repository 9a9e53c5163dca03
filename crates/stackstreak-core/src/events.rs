use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::streak::{AdvanceKind, BadgeType, StreakResult};

/// Every streak change produces one or more Events.
/// The UI layer turns them into toasts and the milestone celebration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    StreakStarted {
        stack_id: String,
        on: NaiveDate,
    },
    StreakExtended {
        stack_id: String,
        streak: u32,
        /// The missed day was forgiven by the grace period.
        used_grace: bool,
        on: NaiveDate,
    },
    StreakReset {
        stack_id: String,
        previous_streak: u32,
        on: NaiveDate,
    },
    BadgeUnlocked {
        stack_id: String,
        badge_type: BadgeType,
        label: String,
        on: NaiveDate,
    },
}

impl Event {
    /// Events describing the transition from `previous_streak` to `result`.
    /// A same-day no-op yields nothing.
    pub fn from_advance(
        stack_id: &str,
        previous_streak: u32,
        result: &StreakResult,
        on: NaiveDate,
    ) -> Vec<Event> {
        let stack_id = stack_id.to_string();
        let mut events = Vec::new();

        match result.kind {
            AdvanceKind::SameDay => return events,
            AdvanceKind::Started => events.push(Event::StreakStarted {
                stack_id: stack_id.clone(),
                on,
            }),
            AdvanceKind::Consecutive | AdvanceKind::Grace => events.push(Event::StreakExtended {
                stack_id: stack_id.clone(),
                streak: result.new_streak,
                used_grace: result.kind == AdvanceKind::Grace,
                on,
            }),
            AdvanceKind::Reset => events.push(Event::StreakReset {
                stack_id: stack_id.clone(),
                previous_streak,
                on,
            }),
        }

        if let Some(badge) = result.badge_to_unlock {
            events.push(Event::BadgeUnlocked {
                stack_id,
                badge_type: badge,
                label: badge.label().to_string(),
                on,
            });
        }

        events
    }
}
