//! Candidate slot generation and the filters that thin it out.
//!
//! All sequences are lazy and end-exclusive: a window ending at 17:00 never
//! yields a 17:00 slot.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

use super::timezone;
use crate::models::{DayOfWeek, Slot, WeeklySchedule};

/// Candidate start instants for one working block on one civil date, stepped
/// by `step` over `[start, end)`. Each instant is resolved through the zone
/// database individually; wall-clock times skipped by an offset transition
/// produce no slot.
pub fn candidate_slots(
    tz: Tz,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    step: Duration,
) -> impl Iterator<Item = Slot> {
    let closing = date.and_time(end);

    std::iter::successors(Some(date.and_time(start)), move |current| {
        Some(*current + step)
    })
    .take_while(move |civil| *civil < closing)
    .filter_map(move |civil| timezone::civil_to_instant(tz, date, civil.time()).map(Slot::new))
}

/// Candidate slots for a civil date under a weekly schedule. A weekday without
/// a working window yields an empty sequence, not an error.
pub fn day_candidates(
    tz: Tz,
    date: NaiveDate,
    schedule: &WeeklySchedule,
    step: Duration,
) -> impl Iterator<Item = Slot> {
    let window = schedule
        .window_for(DayOfWeek::from(date.weekday()))
        .map(|window| (window.start_time, window.end_time));

    window
        .into_iter()
        .flat_map(move |(start, end)| candidate_slots(tz, date, start, end, step))
}

/// Removes candidates whose start instant is already taken by a non-cancelled
/// appointment. Matching is by absolute instant, never by wall-clock display.
pub fn without_booked<'a, I>(
    slots: I,
    booked: &'a HashSet<DateTime<Utc>>,
) -> impl Iterator<Item = Slot> + 'a
where
    I: Iterator<Item = Slot> + 'a,
{
    slots.filter(move |slot| !booked.contains(&slot.instant()))
}

/// When the target date is "today" in the clinic zone, keeps only slots
/// strictly after `now`; any other date passes through untouched.
pub fn drop_elapsed<I>(
    slots: I,
    date: NaiveDate,
    now: DateTime<Utc>,
    tz: Tz,
) -> impl Iterator<Item = Slot>
where
    I: Iterator<Item = Slot>,
{
    let today = timezone::civil_date_of(tz, now);
    slots.filter(move |slot| date != today || slot.instant() > now)
}
