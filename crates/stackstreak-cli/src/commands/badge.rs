use clap::Subcommand;
use stackstreak_core::BadgeType;

use super::{open_tracker, print_json};

#[derive(Subcommand)]
pub enum BadgeAction {
    /// Badges a user has earned
    List {
        #[arg(long)]
        user: String,
        /// Only badges earned on this stack
        #[arg(long)]
        stack: Option<String>,
    },
    /// All milestone badges and their thresholds
    Catalogue,
}

pub fn run(action: BadgeAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        BadgeAction::List { user, stack } => {
            let tracker = open_tracker()?;
            let badges = match stack {
                Some(stack) => tracker.stack_badges(&user, &stack)?,
                None => tracker.user_badges(&user)?,
            };
            print_json(&badges)?;
        }
        BadgeAction::Catalogue => {
            let catalogue: Vec<_> = BadgeType::MILESTONES.iter().map(BadgeType::info).collect();
            print_json(&catalogue)?;
        }
    }
    Ok(())
}
