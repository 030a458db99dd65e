//! Mapping feed events onto the schedule shape.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use chrono_tz::Tz;
use serde::Serialize;

use super::ics::{EventTime, FeedEvent};
use crate::db::{CalendarSubscription, ScheduleEntry};
use crate::schedule::WallTime;

/// Title used when a feed event has no SUMMARY.
pub const UNTITLED_EVENT: &str = "(Sans titre)";

/// Why a feed event was not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingStart,
    MissingUid,
    DuplicateUid,
    /// The VEVENT block could not be parsed.
    Malformed,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingStart => write!(f, "event has no start"),
            SkipReason::MissingUid => write!(f, "event has no UID"),
            SkipReason::DuplicateUid => write!(f, "UID already seen in this feed"),
            SkipReason::Malformed => write!(f, "event could not be parsed"),
        }
    }
}

/// Date and times of an event on the local wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalSlot {
    pub date: NaiveDate,
    pub start_time: WallTime,
    pub end_time: WallTime,
}

/// Local wall-clock reading of a feed time.
///
/// UTC instants are shown in `tz`. Floating and TZID values keep the clock
/// reading written in the feed; all-day values start at midnight.
pub fn to_local(time: &EventTime, tz: Tz) -> NaiveDateTime {
    match time {
        EventTime::Date(date) => date.and_time(NaiveTime::MIN),
        EventTime::Utc(instant) => instant.with_timezone(&tz).naive_local(),
        EventTime::Floating(naive) => *naive,
        EventTime::Zoned { date_time, .. } => *date_time,
    }
}

/// Compute date, start and end for an event starting at `start`.
///
/// A missing end means one hour after start. When start and end format to
/// the same `HH:MM`, the end is pushed one more hour.
pub fn local_slot(start: &EventTime, end: Option<&EventTime>, tz: Tz) -> LocalSlot {
    let start = to_local(start, tz);
    let end = match end {
        Some(end) => to_local(end, tz),
        None => start
            .checked_add_signed(TimeDelta::hours(1))
            .unwrap_or(start),
    };

    let start_time = WallTime::from_naive_time(start.time());
    let mut end_time = WallTime::from_naive_time(end.time());
    if end_time == start_time {
        end_time = end_time.add_hours(1);
    }

    LocalSlot {
        date: start.date(),
        start_time,
        end_time,
    }
}

/// Build the schedule row a feed event should be stored as.
pub fn to_schedule_entry(
    event: &FeedEvent,
    subscription: &CalendarSubscription,
    tz: Tz,
    synced_at: &str,
) -> Result<ScheduleEntry, SkipReason> {
    let start = event.start.as_ref().ok_or(SkipReason::MissingStart)?;
    let uid = event.uid.as_ref().ok_or(SkipReason::MissingUid)?;
    let slot = local_slot(start, event.end.as_ref(), tz);

    Ok(ScheduleEntry {
        id: String::new(),
        owner_id: subscription.owner_id.clone(),
        title: event
            .summary
            .clone()
            .unwrap_or_else(|| UNTITLED_EVENT.to_string()),
        description: event.description.clone(),
        location: event.location.clone(),
        date: slot.date,
        start_time: slot.start_time,
        end_time: slot.end_time,
        external_source_id: Some(subscription.id.clone()),
        external_uid: Some(uid.clone()),
        last_synced_at: Some(synced_at.to_string()),
        created_at: String::new(),
    })
}
