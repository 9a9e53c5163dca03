//! Calendar-date resolution.
//!
//! Streak bookkeeping works on naive calendar days. A timezone is only used
//! once, to decide which calendar day "now" falls on; after that every date
//! is zone-less and all arithmetic is plain day counting, so DST transitions
//! never shift a gap by an hour.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::ValidationError;

/// Wire format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Timezone used when the caller supplies none.
pub const FALLBACK_TIMEZONE: &str = "UTC";

/// Parse a strict `YYYY-MM-DD` date.
///
/// Rejects anything chrono would otherwise be lenient about (unpadded
/// fields, signs, surrounding whitespace).
pub fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    let invalid = || ValidationError::InvalidDateFormat(s.to_string());

    let bytes = s.as_bytes();
    if bytes.len() != 10 {
        return Err(invalid());
    }
    let well_formed = bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    });
    if !well_formed {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| invalid())
}

/// Render a date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse an IANA timezone identifier such as `America/New_York`.
pub fn parse_timezone(name: &str) -> Result<Tz, ValidationError> {
    name.parse::<Tz>()
        .map_err(|_| ValidationError::UnknownTimezone(name.to_string()))
}

/// Resolve an optional caller-supplied zone, falling back to UTC when it is
/// absent or blank. A present but unknown identifier is still rejected.
pub fn resolve_timezone(name: Option<&str>) -> Result<Tz, ValidationError> {
    match name.map(str::trim) {
        None | Some("") => Ok(Tz::UTC),
        Some(name) => parse_timezone(name),
    }
}

/// The calendar day `now` falls on in `tz`.
pub fn today_in(tz: Tz, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// The current calendar day in the named timezone.
pub fn resolve_today(timezone: &str) -> Result<NaiveDate, ValidationError> {
    let tz = parse_timezone(timezone)?;
    Ok(today_in(tz, Utc::now()))
}

/// `a - b` in whole calendar days.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    a.signed_duration_since(b).num_days()
}

/// Shift a date by `days`, or `None` past the representable range.
pub fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn parse_accepts_strict_dates() {
        assert_eq!(d("2025-12-09"), NaiveDate::from_ymd_opt(2025, 12, 9).unwrap());
        assert_eq!(format_date(d("2024-02-29")), "2024-02-29");
    }

    #[test]
    fn parse_rejects_loose_or_impossible_dates() {
        for bad in [
            "",
            "2025-1-01",
            "2025-01-1",
            "2025/01/01",
            " 2025-01-01",
            "2025-01-01T00:00:00Z",
            "+025-01-01",
            "2025-02-29",
            "2025-13-01",
            "abcd-ef-gh",
        ] {
            assert_eq!(
                parse_date(bad),
                Err(ValidationError::InvalidDateFormat(bad.to_string())),
                "expected rejection of {bad:?}"
            );
        }
    }

    #[test]
    fn days_between_crosses_month_and_year_boundaries() {
        assert_eq!(days_between(d("2025-03-01"), d("2025-02-28")), 1);
        assert_eq!(days_between(d("2024-02-29"), d("2024-02-28")), 1);
        assert_eq!(days_between(d("2024-03-01"), d("2024-02-28")), 2);
        assert_eq!(days_between(d("2025-01-01"), d("2024-12-31")), 1);
        assert_eq!(days_between(d("2025-12-09"), d("2025-12-09")), 0);
    }

    #[test]
    fn days_between_is_antisymmetric() {
        let a = d("2025-12-09");
        let b = d("2025-11-02");
        assert_eq!(days_between(a, b), 37);
        assert_eq!(days_between(b, a), -37);
    }

    #[test]
    fn days_between_ignores_dst_transitions() {
        // US spring-forward weekend.
        assert_eq!(days_between(d("2025-03-10"), d("2025-03-09")), 1);
        assert_eq!(days_between(d("2025-03-09"), d("2025-03-08")), 1);
    }

    #[test]
    fn today_depends_on_zone() {
        // 03:30 UTC is still the previous evening in New York.
        let now = Utc.with_ymd_and_hms(2025, 12, 9, 3, 30, 0).unwrap();
        let ny = parse_timezone("America/New_York").unwrap();
        let tokyo = parse_timezone("Asia/Tokyo").unwrap();
        assert_eq!(today_in(ny, now), d("2025-12-08"));
        assert_eq!(today_in(Tz::UTC, now), d("2025-12-09"));
        assert_eq!(today_in(tokyo, now), d("2025-12-09"));
    }

    #[test]
    fn resolve_timezone_falls_back_to_utc() {
        assert_eq!(resolve_timezone(None).unwrap(), Tz::UTC);
        assert_eq!(resolve_timezone(Some("  ")).unwrap(), Tz::UTC);
        assert_eq!(
            resolve_timezone(Some("Europe/Berlin")).unwrap(),
            chrono_tz::Europe::Berlin
        );
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        assert_eq!(
            resolve_today("Mars/Olympus_Mons"),
            Err(ValidationError::UnknownTimezone("Mars/Olympus_Mons".into()))
        );
        assert!(resolve_timezone(Some("Not/AZone")).is_err());
    }

    #[test]
    fn resolve_today_with_utc_matches_clock() {
        let before = Utc::now().date_naive();
        let today = resolve_today(FALLBACK_TIMEZONE).unwrap();
        let after = Utc::now().date_naive();
        assert!(today == before || today == after);
    }

    #[test]
    fn add_days_steps_calendar_days() {
        assert_eq!(add_days(d("2024-02-28"), 1), Some(d("2024-02-29")));
        assert_eq!(add_days(d("2025-01-01"), -1), Some(d("2024-12-31")));
        assert_eq!(add_days(NaiveDate::MAX, 1), None);
    }
}
