//! Schedule domain logic.
//!
//! - `time`: the `WallTime` hour:minute type used by every entry
//! - `conflict`: overlap / back-to-back annotation
//! - `week`: date ranges for day, week and member views
//! - `edit`: rules for user edits of manual and synced entries

mod conflict;
mod edit;
mod error;
mod time;
mod week;

#[cfg(test)]
mod conflict_test;

pub use conflict::{
    AnnotatedEntry, BACK_TO_BACK_MAX_GAP_MINUTES, annotate, back_to_back, overlaps,
};
pub use edit::{SchedulePatch, ensure_deletable, validate_time_range};
pub use error::ScheduleError;
pub use time::WallTime;
pub use week::{ScheduleView, view_range};
