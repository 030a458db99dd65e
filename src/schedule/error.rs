use miette::Diagnostic;
use thiserror::Error;

use super::WallTime;

/// Errors raised by schedule validation and edit rules.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Invalid time '{value}': expected HH:MM")]
    #[diagnostic(code(famille::schedule::invalid_time))]
    InvalidTime { value: String },

    #[error("Start time {start} must be before end time {end}")]
    #[diagnostic(code(famille::schedule::invalid_time_range))]
    InvalidTimeRange { start: WallTime, end: WallTime },

    #[error("Schedule entry '{id}' is synced from a calendar subscription")]
    #[diagnostic(
        code(famille::schedule::read_only),
        help("Only the location of a synced entry can be changed")
    )]
    ReadOnly { id: String },
}
