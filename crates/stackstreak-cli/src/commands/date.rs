use clap::Subcommand;
use stackstreak_core::date::{days_between, format_date, parse_date, resolve_today, FALLBACK_TIMEZONE};

#[derive(Subcommand)]
pub enum DateAction {
    /// Print today's date in a timezone
    Today {
        /// IANA timezone (default: UTC)
        #[arg(long)]
        tz: Option<String>,
    },
    /// Print A - B in whole calendar days
    Diff {
        /// Date A (YYYY-MM-DD)
        a: String,
        /// Date B (YYYY-MM-DD)
        b: String,
    },
}

pub fn run(action: DateAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        DateAction::Today { tz } => {
            let tz = tz.as_deref().unwrap_or(FALLBACK_TIMEZONE);
            println!("{}", format_date(resolve_today(tz)?));
        }
        DateAction::Diff { a, b } => {
            println!("{}", days_between(parse_date(&a)?, parse_date(&b)?));
        }
    }
    Ok(())
}
