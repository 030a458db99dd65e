//! User edit rules for schedule entries.

use chrono::NaiveDate;

use super::{ScheduleError, WallTime};
use crate::db::ScheduleEntry;

/// Partial update of a schedule entry.
///
/// `None` leaves a field alone; for optional fields `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulePatch {
    pub owner_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<WallTime>,
    pub end_time: Option<WallTime>,
}

impl SchedulePatch {
    /// Whether applying the patch would change anything besides `location`.
    fn touches_synced_fields(&self, entry: &ScheduleEntry) -> bool {
        self.owner_id.as_ref().is_some_and(|v| *v != entry.owner_id)
            || self.title.as_ref().is_some_and(|v| *v != entry.title)
            || self.description.as_ref().is_some_and(|v| *v != entry.description)
            || self.date.is_some_and(|v| v != entry.date)
            || self.start_time.is_some_and(|v| v != entry.start_time)
            || self.end_time.is_some_and(|v| v != entry.end_time)
    }

    /// Produce the updated entry, enforcing edit rules.
    ///
    /// Synced entries accept location changes only. Manual entries must keep
    /// `start_time < end_time`.
    pub fn apply(self, entry: &ScheduleEntry) -> Result<ScheduleEntry, ScheduleError> {
        if entry.is_external() && self.touches_synced_fields(entry) {
            return Err(ScheduleError::ReadOnly {
                id: entry.id.clone(),
            });
        }

        let updated = ScheduleEntry {
            owner_id: self.owner_id.unwrap_or_else(|| entry.owner_id.clone()),
            title: self.title.unwrap_or_else(|| entry.title.clone()),
            description: self.description.unwrap_or_else(|| entry.description.clone()),
            location: self.location.unwrap_or_else(|| entry.location.clone()),
            date: self.date.unwrap_or(entry.date),
            start_time: self.start_time.unwrap_or(entry.start_time),
            end_time: self.end_time.unwrap_or(entry.end_time),
            ..entry.clone()
        };

        if !updated.is_external() {
            validate_time_range(updated.start_time, updated.end_time)?;
        }

        Ok(updated)
    }
}

/// Require `start < end`.
pub fn validate_time_range(start: WallTime, end: WallTime) -> Result<(), ScheduleError> {
    if start < end {
        Ok(())
    } else {
        Err(ScheduleError::InvalidTimeRange { start, end })
    }
}

/// Synced entries are removed by reconciliation only.
pub fn ensure_deletable(entry: &ScheduleEntry) -> Result<(), ScheduleError> {
    if entry.is_external() {
        Err(ScheduleError::ReadOnly {
            id: entry.id.clone(),
        })
    } else {
        Ok(())
    }
}
