//! SQLite-based streak and badge storage.
//!
//! Provides persistent storage for:
//! - Streak state, one row per user-stack pair
//! - The append-only badge log

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::{data_dir, migrations};
use crate::date::{format_date, parse_date};
use crate::error::{DatabaseError, Result};
use crate::streak::{BadgeType, StreakState};

/// A persisted streak row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakRecord {
    pub user_id: String,
    pub stack_id: String,
    #[serde(flatten)]
    pub state: StreakState,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A persisted badge unlock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeRecord {
    pub id: i64,
    pub user_id: String,
    pub stack_id: String,
    pub badge_type: BadgeType,
    pub unlocked_at: DateTime<Utc>,
}

const STREAK_COLUMNS: &str = "user_id, stack_id, current_streak, longest_streak, \
     last_activity_date, grace_period_used, timezone, created_at, updated_at";

const BADGE_COLUMNS: &str = "id, user_id, stack_id, badge_type, unlocked_at";

/// Raw column values before domain decoding.
struct StreakRow {
    user_id: String,
    stack_id: String,
    current_streak: u32,
    longest_streak: u32,
    last_activity_date: Option<String>,
    grace_period_used: bool,
    timezone: String,
    created_at: String,
    updated_at: String,
}

impl StreakRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            user_id: row.get(0)?,
            stack_id: row.get(1)?,
            current_streak: row.get(2)?,
            longest_streak: row.get(3)?,
            last_activity_date: row.get(4)?,
            grace_period_used: row.get(5)?,
            timezone: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn decode(self) -> Result<StreakRecord, DatabaseError> {
        let corrupt = |message: String| DatabaseError::CorruptRow {
            table: "user_streaks",
            message,
        };
        let last_activity_date = self
            .last_activity_date
            .as_deref()
            .map(parse_date)
            .transpose()
            .map_err(|e| corrupt(e.to_string()))?;

        Ok(StreakRecord {
            user_id: self.user_id,
            stack_id: self.stack_id,
            state: StreakState {
                last_activity_date,
                current_streak: self.current_streak,
                longest_streak: self.longest_streak,
                grace_period_used: self.grace_period_used,
            },
            timezone: self.timezone,
            created_at: parse_timestamp(&self.created_at).map_err(corrupt)?,
            updated_at: parse_timestamp(&self.updated_at).map_err(corrupt)?,
        })
    }
}

struct BadgeRow {
    id: i64,
    user_id: String,
    stack_id: String,
    badge_type: String,
    unlocked_at: String,
}

impl BadgeRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            stack_id: row.get(2)?,
            badge_type: row.get(3)?,
            unlocked_at: row.get(4)?,
        })
    }

    fn decode(self) -> Result<BadgeRecord, DatabaseError> {
        let corrupt = |message: String| DatabaseError::CorruptRow {
            table: "user_badges",
            message,
        };
        Ok(BadgeRecord {
            id: self.id,
            user_id: self.user_id,
            stack_id: self.stack_id,
            badge_type: self
                .badge_type
                .parse()
                .map_err(|e: crate::error::ValidationError| corrupt(e.to_string()))?,
            unlocked_at: parse_timestamp(&self.unlocked_at).map_err(corrupt)?,
        })
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("bad timestamp '{s}': {e}"))
}

/// SQLite database for streak storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/stackstreak/stackstreak.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("stackstreak.db");
        Self::open_at(&path)
    }

    /// Open (or create) the database at `path`.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        // Concurrent completions wait for the writer instead of failing fast.
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(DatabaseError::from)?;
        Self::init(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Run `f` inside a `BEGIN IMMEDIATE` transaction.
    ///
    /// The write lock is taken up front, so a read-modify-write inside `f`
    /// cannot interleave with another writer. Rolls back if `f` fails.
    pub fn in_transaction<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(DatabaseError::from)?;
        match f(self) {
            Ok(value) => {
                self.conn
                    .execute_batch("COMMIT")
                    .map_err(DatabaseError::from)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = self.conn.execute_batch("ROLLBACK") {
                    tracing::warn!(error = %rollback, "rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Load the streak row for a user-stack pair.
    pub fn get_streak(&self, user_id: &str, stack_id: &str) -> Result<Option<StreakRecord>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {STREAK_COLUMNS} FROM user_streaks
                     WHERE user_id = ?1 AND stack_id = ?2"
                ),
                params![user_id, stack_id],
                StreakRow::read,
            )
            .optional()
            .map_err(DatabaseError::from)?;
        Ok(row.map(StreakRow::decode).transpose()?)
    }

    /// All streak rows for a user, ordered by stack.
    pub fn user_streaks(&self, user_id: &str) -> Result<Vec<StreakRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {STREAK_COLUMNS} FROM user_streaks
                 WHERE user_id = ?1 ORDER BY stack_id"
            ))
            .map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map(params![user_id], StreakRow::read)
            .map_err(DatabaseError::from)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(DatabaseError::from)?.decode()?);
        }
        Ok(records)
    }

    /// Insert or replace the streak state for a user-stack pair.
    ///
    /// `created_at` is kept from the first insert.
    pub fn upsert_streak(
        &self,
        user_id: &str,
        stack_id: &str,
        state: &StreakState,
        timezone: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let now = now.to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO user_streaks (user_id, stack_id, current_streak, longest_streak,
                     last_activity_date, grace_period_used, timezone, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
                 ON CONFLICT(user_id, stack_id) DO UPDATE SET
                     current_streak = excluded.current_streak,
                     longest_streak = excluded.longest_streak,
                     last_activity_date = excluded.last_activity_date,
                     grace_period_used = excluded.grace_period_used,
                     timezone = excluded.timezone,
                     updated_at = excluded.updated_at",
                params![
                    user_id,
                    stack_id,
                    state.current_streak,
                    state.longest_streak,
                    state.last_activity_date.map(format_date),
                    state.grace_period_used,
                    timezone,
                    now,
                ],
            )
            .map_err(DatabaseError::from)?;
        Ok(())
    }

    /// Badge types already recorded for a user-stack pair.
    pub fn unlocked_badges(&self, user_id: &str, stack_id: &str) -> Result<HashSet<BadgeType>> {
        Ok(self
            .stack_badges(user_id, stack_id)?
            .into_iter()
            .map(|record| record.badge_type)
            .collect())
    }

    /// Record a badge unlock. Returns `false` if it was already recorded.
    pub fn insert_badge(
        &self,
        user_id: &str,
        stack_id: &str,
        badge: BadgeType,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let inserted = self
            .conn
            .execute(
                "INSERT OR IGNORE INTO user_badges (user_id, stack_id, badge_type, unlocked_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![user_id, stack_id, badge.as_str(), now.to_rfc3339()],
            )
            .map_err(DatabaseError::from)?;
        Ok(inserted == 1)
    }

    /// Every badge a user has earned, oldest first.
    pub fn user_badges(&self, user_id: &str) -> Result<Vec<BadgeRecord>> {
        self.query_badges(
            &format!("SELECT {BADGE_COLUMNS} FROM user_badges WHERE user_id = ?1 ORDER BY id"),
            params![user_id],
        )
    }

    /// Badges earned on one stack, oldest first.
    pub fn stack_badges(&self, user_id: &str, stack_id: &str) -> Result<Vec<BadgeRecord>> {
        self.query_badges(
            &format!(
                "SELECT {BADGE_COLUMNS} FROM user_badges
                 WHERE user_id = ?1 AND stack_id = ?2 ORDER BY id"
            ),
            params![user_id, stack_id],
        )
    }

    fn query_badges(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<BadgeRecord>> {
        let mut stmt = self.conn.prepare(sql).map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map(params, BadgeRow::read)
            .map_err(DatabaseError::from)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(DatabaseError::from)?.decode()?);
        }
        Ok(records)
    }
}

/// Calendar date of the most recent activity across all of a user's stacks.
pub fn latest_activity(records: &[StreakRecord]) -> Option<NaiveDate> {
    records
        .iter()
        .filter_map(|record| record.state.last_activity_date)
        .max()
}
