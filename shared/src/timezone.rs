use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::error::{Result, SharedError};

/// Korea Standard Time, UTC+9 with no daylight saving.
pub const SEOUL: Tz = chrono_tz::Asia::Seoul;

/// Parse an IANA timezone name
pub fn parse_timezone(timezone_name: &str) -> Result<Tz> {
    timezone_name
        .parse::<Tz>()
        .map_err(|_| SharedError::InvalidTimezone(timezone_name.to_string()))
}

pub fn to_seoul(utc_dt: DateTime<Utc>) -> DateTime<Tz> {
    utc_dt.with_timezone(&SEOUL)
}

/// Parse a timestamp string into an absolute instant.
///
/// Accepts RFC 3339, RFC 2822, ISO-like date-times without an offset
/// (`T` or space separated, optional fractional seconds) and bare dates.
/// Values without an offset are taken as UTC.
pub fn parse_instant(text: &str) -> Result<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, pattern) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(SharedError::InvalidDate(text.to_string()))
}
