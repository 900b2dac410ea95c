//! Conversions between clinic wall-clock values and absolute instants.
//!
//! Offsets are resolved per instant through the zone database, so a query
//! window that straddles a seasonal transition stays correct.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::models::AvailabilityError;

/// Strict `YYYY-MM-DD` parsing. Out-of-range months and days are rejected,
/// not rolled over.
pub fn parse_civil_date(raw: &str) -> Result<NaiveDate, AvailabilityError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        AvailabilityError::InvalidDate(format!("'{}' is not a valid calendar date", raw))
    })
}

/// Resolves a clinic wall-clock date and time to an absolute instant.
///
/// Returns `None` for wall-clock times a forward offset transition skips.
/// Ambiguous times (clocks rolled back) take the earlier offset.
pub fn civil_to_instant(tz: Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&date.and_time(time)) {
        LocalResult::Single(resolved) => Some(resolved.with_timezone(&Utc)),
        LocalResult::Ambiguous(earlier, _) => Some(earlier.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

pub fn instant_to_civil(tz: Tz, instant: DateTime<Utc>) -> DateTime<Tz> {
    instant.with_timezone(&tz)
}

/// The civil date an instant falls on in the clinic zone.
pub fn civil_date_of(tz: Tz, instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}
