mod badge;
mod engine;
mod risk;

pub use badge::{first_unlockable, next_milestone, BadgeInfo, BadgeType};
pub use engine::{advance_streak, AdvanceKind, StreakResult, StreakState};
pub use risk::is_at_risk;
