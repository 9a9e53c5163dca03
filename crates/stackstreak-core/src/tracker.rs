//! Completion recording and streak queries.
//!
//! [`StreakTracker`] is the read-compute-write shell around the pure engine:
//! it loads a user-stack pair's state and badges, resolves "today", runs
//! [`advance_streak`], and persists the result in a single transaction.

use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::date::today_in;
use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::storage::{BadgeRecord, Config, Database, StreakRecord};
use crate::streak::{
    advance_streak, is_at_risk, next_milestone, BadgeInfo, BadgeType, StreakState,
};

/// Result of recording a completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionOutcome {
    pub stack_id: String,
    pub today: NaiveDate,
    pub timezone: String,
    pub streak: u32,
    pub longest_streak: u32,
    pub grace_period_used: bool,
    pub badge_unlocked: Option<BadgeType>,
    pub events: Vec<Event>,
}

/// Current standing of one stack, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackStatus {
    pub stack_id: String,
    pub today: NaiveDate,
    pub timezone: String,
    #[serde(flatten)]
    pub state: StreakState,
    pub at_risk: bool,
    pub badges: Vec<BadgeType>,
    pub next_milestone: Option<BadgeInfo>,
}

/// Best streaks across all of a user's stacks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSummary {
    /// Highest current streak on any stack.
    pub current_streak: u32,
    /// Highest longest streak on any stack.
    pub best_streak: u32,
    pub stacks: usize,
    pub badges: usize,
    pub last_activity_date: Option<NaiveDate>,
}

/// Validate a stack ID and return its canonical lowercase hyphenated form.
pub fn normalize_stack_id(stack_id: &str) -> Result<String, ValidationError> {
    let invalid = || ValidationError::InvalidStackId(stack_id.to_string());
    // Only the hyphenated form; uuid also accepts simple, braced and URN.
    if stack_id.len() != 36 {
        return Err(invalid());
    }
    let id = Uuid::try_parse(stack_id).map_err(|_| invalid())?;
    Ok(id.hyphenated().to_string())
}

pub struct StreakTracker {
    db: Database,
    config: Config,
}

impl StreakTracker {
    pub fn new(db: Database, config: Config) -> Self {
        Self { db, config }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Record that the user completed everything on a stack today.
    ///
    /// "Today" is resolved in the client's timezone when trusted, otherwise
    /// in the configured default.
    pub fn record_completion(
        &self,
        user_id: &str,
        stack_id: &str,
        client_timezone: Option<&str>,
    ) -> Result<CompletionOutcome> {
        let tz = self.config.resolve_timezone(client_timezone)?;
        let today = today_in(tz, Utc::now());
        self.record_completion_on(user_id, stack_id, tz, today)
    }

    /// [`record_completion`](Self::record_completion) with an explicit day.
    pub fn record_completion_on(
        &self,
        user_id: &str,
        stack_id: &str,
        tz: Tz,
        today: NaiveDate,
    ) -> Result<CompletionOutcome> {
        let stack_id = normalize_stack_id(stack_id)?;

        self.db.in_transaction(|db| {
            let previous = db
                .get_streak(user_id, &stack_id)?
                .map(|record| record.state)
                .unwrap_or_default();
            let unlocked = db.unlocked_badges(user_id, &stack_id)?;

            let result = advance_streak(&previous, today, &unlocked);
            let events = Event::from_advance(&stack_id, previous.current_streak, &result, today);
            let next = result.clone().into_state(today, &previous);

            let now = Utc::now();
            db.upsert_streak(user_id, &stack_id, &next, tz.name(), now)?;

            let mut badge_unlocked = result.badge_to_unlock;
            if let Some(badge) = badge_unlocked {
                if db.insert_badge(user_id, &stack_id, badge, now)? {
                    tracing::info!(user_id, stack_id = %stack_id, badge = %badge, "badge unlocked");
                } else {
                    tracing::warn!(user_id, stack_id = %stack_id, badge = %badge, "badge already recorded");
                    badge_unlocked = None;
                }
            }

            if result.changed() {
                tracing::info!(
                    user_id,
                    stack_id = %stack_id,
                    %today,
                    streak = next.current_streak,
                    kind = ?result.kind,
                    "streak advanced"
                );
            }

            Ok(CompletionOutcome {
                stack_id: stack_id.clone(),
                today,
                timezone: tz.name().to_string(),
                streak: next.current_streak,
                longest_streak: next.longest_streak,
                grace_period_used: next.grace_period_used,
                badge_unlocked,
                events: events
                    .into_iter()
                    .filter(|event| {
                        badge_unlocked.is_some() || !matches!(event, Event::BadgeUnlocked { .. })
                    })
                    .collect(),
            })
        })
    }

    /// The stored streak row, if any.
    pub fn stack_streak(&self, user_id: &str, stack_id: &str) -> Result<Option<StreakRecord>> {
        let stack_id = normalize_stack_id(stack_id)?;
        self.db.get_streak(user_id, &stack_id)
    }

    /// Standing of one stack as of now.
    ///
    /// Zone precedence: trusted client zone, then the zone stored with the
    /// streak, then the configured default.
    pub fn stack_status(
        &self,
        user_id: &str,
        stack_id: &str,
        client_timezone: Option<&str>,
    ) -> Result<StackStatus> {
        let stack_id = normalize_stack_id(stack_id)?;
        let record = self.db.get_streak(user_id, &stack_id)?;

        let has_client = client_timezone.is_some_and(|tz| !tz.trim().is_empty());
        let tz = match (&record, has_client && self.config.timezone.trust_client) {
            (Some(record), false) => crate::date::parse_timezone(&record.timezone)
                .or_else(|_| self.config.default_timezone())?,
            _ => self.config.resolve_timezone(client_timezone)?,
        };

        self.status_from(user_id, stack_id, record, tz, today_in(tz, Utc::now()))
    }

    /// [`stack_status`](Self::stack_status) with an explicit day.
    pub fn stack_status_on(
        &self,
        user_id: &str,
        stack_id: &str,
        tz: Tz,
        today: NaiveDate,
    ) -> Result<StackStatus> {
        let stack_id = normalize_stack_id(stack_id)?;
        let record = self.db.get_streak(user_id, &stack_id)?;
        self.status_from(user_id, stack_id, record, tz, today)
    }

    fn status_from(
        &self,
        user_id: &str,
        stack_id: String,
        record: Option<StreakRecord>,
        tz: Tz,
        today: NaiveDate,
    ) -> Result<StackStatus> {
        let state = record.map(|record| record.state).unwrap_or_default();
        let badges: Vec<BadgeType> = self
            .db
            .stack_badges(user_id, &stack_id)?
            .into_iter()
            .map(|record| record.badge_type)
            .collect();
        let unlocked: HashSet<BadgeType> = badges.iter().copied().collect();

        Ok(StackStatus {
            at_risk: is_at_risk(&state, today),
            next_milestone: next_milestone(state.current_streak, &unlocked).map(|b| b.info()),
            stack_id,
            today,
            timezone: tz.name().to_string(),
            state,
            badges,
        })
    }

    /// All streak rows for a user.
    pub fn user_streaks(&self, user_id: &str) -> Result<Vec<StreakRecord>> {
        self.db.user_streaks(user_id)
    }

    /// Every badge the user has earned.
    pub fn user_badges(&self, user_id: &str) -> Result<Vec<BadgeRecord>> {
        self.db.user_badges(user_id)
    }

    /// Badges earned on one stack.
    pub fn stack_badges(&self, user_id: &str, stack_id: &str) -> Result<Vec<BadgeRecord>> {
        let stack_id = normalize_stack_id(stack_id)?;
        self.db.stack_badges(user_id, &stack_id)
    }

    /// Best current and all-time streaks across the user's stacks.
    pub fn summary(&self, user_id: &str) -> Result<StreakSummary> {
        let records = self.db.user_streaks(user_id)?;
        let badges = self.db.user_badges(user_id)?;

        Ok(StreakSummary {
            current_streak: records
                .iter()
                .map(|r| r.state.current_streak)
                .max()
                .unwrap_or(0),
            best_streak: records
                .iter()
                .map(|r| r.state.longest_streak)
                .max()
                .unwrap_or(0),
            stacks: records.len(),
            badges: badges.len(),
            last_activity_date: crate::storage::database::latest_activity(&records),
        })
    }
}
