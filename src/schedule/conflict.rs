//! Overlap and back-to-back detection for schedule entries.
//!
//! Everything here is pure: entries are borrowed, never modified, and the
//! same input always yields the same flags.

use serde::Serialize;

use crate::db::ScheduleEntry;

/// Largest gap, in minutes, that still counts as back-to-back.
pub const BACK_TO_BACK_MAX_GAP_MINUTES: i32 = 30;

/// A schedule entry together with its warning flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedEntry {
    #[serde(flatten)]
    pub entry: ScheduleEntry,
    /// Another entry on the same date intersects this one (any owner).
    pub has_overlap: bool,
    /// Same owner has another entry starting or ending within 30 minutes.
    /// Never set when `has_overlap` is.
    pub has_back_to_back: bool,
}

/// Same date and the half-open intervals `[start, end)` intersect.
pub fn overlaps(a: &ScheduleEntry, b: &ScheduleEntry) -> bool {
    a.date == b.date && a.start_time < b.end_time && a.end_time > b.start_time
}

/// Same owner and date, no overlap, and one ends 0-30 minutes before the
/// other starts.
pub fn back_to_back(a: &ScheduleEntry, b: &ScheduleEntry) -> bool {
    if a.owner_id != b.owner_id || a.date != b.date || overlaps(a, b) {
        return false;
    }

    let within = |gap: i32| (0..=BACK_TO_BACK_MAX_GAP_MINUTES).contains(&gap);
    within(b.start_time.minute_of_day() - a.end_time.minute_of_day())
        || within(a.start_time.minute_of_day() - b.end_time.minute_of_day())
}

/// Flag every entry against all the others in `entries`.
///
/// Output order matches input order.
pub fn annotate(entries: &[ScheduleEntry]) -> Vec<AnnotatedEntry> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let others = || {
                entries
                    .iter()
                    .enumerate()
                    .filter(move |(j, _)| *j != i)
                    .map(|(_, other)| other)
            };

            let has_overlap = others().any(|other| overlaps(entry, other));
            let has_back_to_back = !has_overlap && others().any(|other| back_to_back(entry, other));

            AnnotatedEntry {
                entry: entry.clone(),
                has_overlap,
                has_back_to_back,
            }
        })
        .collect()
}
