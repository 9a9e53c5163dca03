//! Streak commands: record completions and inspect state.

use clap::Subcommand;
use stackstreak_core::parse_date;

use super::{open_tracker, print_json};

#[derive(Subcommand)]
pub enum StreakAction {
    /// Record that every protocol in a stack was completed today
    Record {
        /// User ID
        #[arg(long)]
        user: String,
        /// Stack ID (UUID)
        #[arg(long)]
        stack: String,
        /// IANA timezone of the client, e.g. "America/New_York"
        #[arg(long)]
        tz: Option<String>,
        /// Record for this day instead of today (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// Show a stack's streak, risk and next milestone
    Show {
        #[arg(long)]
        user: String,
        #[arg(long)]
        stack: String,
        #[arg(long)]
        tz: Option<String>,
    },
    /// List every streak for a user
    List {
        #[arg(long)]
        user: String,
    },
    /// Best current and all-time streaks across stacks
    Summary {
        #[arg(long)]
        user: String,
    },
}

pub fn run(action: StreakAction) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = open_tracker()?;

    match action {
        StreakAction::Record {
            user,
            stack,
            tz,
            date,
        } => {
            let outcome = match date {
                Some(date) => {
                    let today = parse_date(&date)?;
                    let tz = tracker.config().resolve_timezone(tz.as_deref())?;
                    tracker.record_completion_on(&user, &stack, tz, today)?
                }
                None => tracker.record_completion(&user, &stack, tz.as_deref())?,
            };
            if let Some(badge) = outcome.badge_unlocked {
                eprintln!("Badge unlocked: {}", badge.label());
            }
            print_json(&outcome)?;
        }
        StreakAction::Show { user, stack, tz } => {
            let status = tracker.stack_status(&user, &stack, tz.as_deref())?;
            if status.at_risk && tracker.config().notifications.streak_alerts {
                eprintln!(
                    "Streak at risk: complete today's protocols to keep your {}-day streak",
                    status.state.current_streak
                );
            }
            print_json(&status)?;
        }
        StreakAction::List { user } => {
            print_json(&tracker.user_streaks(&user)?)?;
        }
        StreakAction::Summary { user } => {
            print_json(&tracker.summary(&user)?)?;
        }
    }
    Ok(())
}
