//! Milestone badges.
//!
//! Each badge is bound to a day-count threshold. Badges are append-only per
//! user-stack pair; the engine only ever learns about recorded badges through
//! the set the caller passes in.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A streak milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BadgeType {
    #[serde(rename = "streak_7")]
    Streak7,
    #[serde(rename = "streak_30")]
    Streak30,
    #[serde(rename = "streak_100")]
    Streak100,
}

impl BadgeType {
    /// All milestones, ascending by threshold. Badge evaluation scans in this order.
    pub const MILESTONES: [BadgeType; 3] =
        [BadgeType::Streak7, BadgeType::Streak30, BadgeType::Streak100];

    /// Consecutive days required to earn the badge.
    pub fn threshold_days(&self) -> u32 {
        match self {
            BadgeType::Streak7 => 7,
            BadgeType::Streak30 => 30,
            BadgeType::Streak100 => 100,
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            BadgeType::Streak7 => "7-Day Streak",
            BadgeType::Streak30 => "30-Day Streak",
            BadgeType::Streak100 => "100-Day Streak",
        }
    }

    /// Stored identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeType::Streak7 => "streak_7",
            BadgeType::Streak30 => "streak_30",
            BadgeType::Streak100 => "streak_100",
        }
    }

    pub fn info(&self) -> BadgeInfo {
        BadgeInfo {
            badge_type: *self,
            label: self.label().to_string(),
            days: self.threshold_days(),
        }
    }
}

impl fmt::Display for BadgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BadgeType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BadgeType::MILESTONES
            .into_iter()
            .find(|badge| badge.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownBadge(s.to_string()))
    }
}

/// Serializable view of a badge for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeInfo {
    pub badge_type: BadgeType,
    pub label: String,
    pub days: u32,
}

/// The lowest milestone reached by `streak` that has not been recorded yet.
///
/// Only one badge is returned even when several thresholds qualify; the
/// caller picks up the rest on later advances.
pub fn first_unlockable(streak: u32, unlocked: &HashSet<BadgeType>) -> Option<BadgeType> {
    BadgeType::MILESTONES
        .into_iter()
        .find(|badge| streak >= badge.threshold_days() && !unlocked.contains(badge))
}

/// The next milestone still ahead of `streak`, for progress display.
pub fn next_milestone(streak: u32, unlocked: &HashSet<BadgeType>) -> Option<BadgeType> {
    BadgeType::MILESTONES
        .into_iter()
        .find(|badge| badge.threshold_days() > streak && !unlocked.contains(badge))
}
