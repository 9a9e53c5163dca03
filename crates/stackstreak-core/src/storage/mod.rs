mod config;
pub mod database;
pub mod migrations;

pub use config::{Config, NotificationsConfig, TimezoneConfig};
pub use database::{BadgeRecord, Database, StreakRecord};

use std::path::PathBuf;

/// Returns the data directory, creating it if needed.
///
/// `STACKSTREAK_DATA_DIR` wins when set. Otherwise `~/.config/stackstreak[-dev]/`,
/// where `STACKSTREAK_ENV=dev` selects the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("STACKSTREAK_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("STACKSTREAK_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("stackstreak-dev")
            } else {
                base_dir.join("stackstreak")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
