//! Date ranges for schedule views.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Which slice of the calendar a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleView {
    /// Only the given date.
    #[default]
    Day,
    /// Monday to Sunday around the given date.
    Week,
    /// Everything from the given date onwards, for one member.
    Member,
}

impl fmt::Display for ScheduleView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleView::Day => write!(f, "day"),
            ScheduleView::Week => write!(f, "week"),
            ScheduleView::Member => write!(f, "member"),
        }
    }
}

impl FromStr for ScheduleView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(ScheduleView::Day),
            "week" => Ok(ScheduleView::Week),
            "member" => Ok(ScheduleView::Member),
            _ => Err(format!("Unknown schedule view: {}", s)),
        }
    }
}

/// Inclusive `(from, to)` bounds for a view anchored on `date`.
///
/// `Member` has no upper bound.
pub fn view_range(view: ScheduleView, date: NaiveDate) -> (NaiveDate, Option<NaiveDate>) {
    match view {
        ScheduleView::Day => (date, Some(date)),
        ScheduleView::Week => {
            let (monday, sunday) = week_bounds(date);
            (monday, Some(sunday))
        }
        ScheduleView::Member => (date, None),
    }
}

/// Monday and Sunday of the ISO week containing `date`.
fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let back = u64::from(date.weekday().num_days_from_monday());
    let monday = date.checked_sub_days(Days::new(back)).unwrap_or(date);
    let sunday = monday.checked_add_days(Days::new(6)).unwrap_or(monday);
    (monday, sunday)
}
