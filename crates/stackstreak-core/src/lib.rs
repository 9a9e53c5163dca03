//! # StackStreak Core Library
//!
//! Daily streak tracking for protocol stacks: a user completes every
//! protocol in a stack on a given day, and the stack's streak advances.
//! The CLI and any server front-end are thin layers over this crate.
//!
//! ## Architecture
//!
//! - **Date resolution**: maps an IANA timezone to "today" and does
//!   calendar-day arithmetic on zone-less dates
//! - **Streak engine**: a pure state machine deciding whether a streak
//!   continues, is saved by the one-day grace period, or resets, and which
//!   milestone badge unlocks
//! - **Risk predicate**: read-only "complete today or lose the streak" check
//! - **Tracker**: the transactional read-compute-write around the engine
//! - **Storage**: SQLite streak/badge storage and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`advance_streak`]: the streak state machine
//! - [`is_at_risk`]: at-risk classification
//! - [`StreakTracker`]: completion recording and queries
//! - [`Database`]: streak and badge persistence
//! - [`Config`]: application configuration management

pub mod date;
pub mod error;
pub mod events;
pub mod storage;
pub mod streak;
pub mod tracker;

pub use date::{days_between, parse_date, resolve_today};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use storage::{BadgeRecord, Config, Database, StreakRecord};
pub use streak::{
    advance_streak, is_at_risk, AdvanceKind, BadgeInfo, BadgeType, StreakResult, StreakState,
};
pub use tracker::{CompletionOutcome, StackStatus, StreakSummary, StreakTracker};
