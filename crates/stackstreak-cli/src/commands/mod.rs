pub mod badge;
pub mod config;
pub mod date;
pub mod streak;

use stackstreak_core::storage::{Config, Database};
use stackstreak_core::StreakTracker;

/// Open the default database with the on-disk configuration.
pub fn open_tracker() -> Result<StreakTracker, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    Ok(StreakTracker::new(db, config))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
