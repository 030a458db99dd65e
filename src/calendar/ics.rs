//! VEVENT extraction using the icalendar crate's parser.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{read_calendar, unfold},
};

use super::FeedError;

/// Start or end of a feed event, as written in the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventTime {
    /// `VALUE=DATE` all-day value.
    Date(NaiveDate),
    /// UTC instant (`...Z`).
    Utc(DateTime<Utc>),
    /// Wall clock without zone.
    Floating(NaiveDateTime),
    /// Wall clock in a named zone (`TZID=...`).
    Zoned { date_time: NaiveDateTime, tzid: String },
}

impl From<DatePerhapsTime> for EventTime {
    fn from(value: DatePerhapsTime) -> Self {
        match value {
            DatePerhapsTime::Date(date) => EventTime::Date(date),
            DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => EventTime::Utc(dt),
            DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => {
                EventTime::Floating(naive)
            }
            DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
                EventTime::Zoned { date_time, tzid }
            }
        }
    }
}

/// The VEVENT fields reconciliation cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEvent {
    pub uid: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
}

/// A VEVENT block the parser could not read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedEvent {
    /// UID line of the block, when one could be found.
    pub uid: Option<String>,
    pub message: String,
}

/// Parse every VEVENT in an iCalendar document.
///
/// Only a document that is not a VCALENDAR is an error. Each VEVENT block is
/// parsed on its own, so a broken block comes back as [`MalformedEvent`]
/// without affecting its neighbours. Properties with unreadable values are
/// left unset.
pub fn parse_feed(content: &str) -> Result<Vec<Result<FeedEvent, MalformedEvent>>, FeedError> {
    let unfolded = unfold(content.trim_start_matches('\u{feff}'));
    if !unfolded
        .trim_start()
        .get(..15)
        .is_some_and(|head| head.eq_ignore_ascii_case("BEGIN:VCALENDAR"))
    {
        return Err(FeedError::Parse {
            message: "document does not start with BEGIN:VCALENDAR".to_string(),
        });
    }

    Ok(vevent_blocks(&unfolded)
        .into_iter()
        .map(|block| match block {
            Ok(lines) => parse_vevent(&lines),
            Err(lines) => Err(MalformedEvent {
                uid: find_uid(&lines),
                message: "VEVENT is not terminated".to_string(),
            }),
        })
        .collect())
}

/// Split an unfolded document into VEVENT blocks, nested components
/// included. A block cut off by the end of the document is returned as `Err`.
fn vevent_blocks(unfolded: &str) -> Vec<Result<Vec<&str>, Vec<&str>>> {
    let mut blocks = Vec::new();
    let mut current: Option<Vec<&str>> = None;
    let mut depth = 0usize;

    for line in unfolded.lines().map(|l| l.trim_end_matches('\r')) {
        if line.trim().is_empty() {
            continue;
        }
        match current.as_mut() {
            None => {
                if line.eq_ignore_ascii_case("BEGIN:VEVENT") {
                    current = Some(vec![line]);
                    depth = 1;
                }
            }
            Some(lines) => {
                lines.push(line);
                if starts_with_ignore_case(line, "BEGIN:") {
                    depth += 1;
                } else if starts_with_ignore_case(line, "END:") {
                    depth -= 1;
                    if depth == 0 {
                        blocks.extend(current.take().map(Ok));
                    }
                }
            }
        }
    }

    blocks.extend(current.map(Err));
    blocks
}

fn parse_vevent(lines: &[&str]) -> Result<FeedEvent, MalformedEvent> {
    let mut block = lines.join("\r\n");
    block.push_str("\r\n");

    let malformed = |message: String| MalformedEvent {
        uid: find_uid(lines),
        message,
    };

    let calendar = read_calendar(&block).map_err(malformed)?;
    let vevent = calendar
        .components
        .iter()
        .find(|c| c.name.as_ref().eq_ignore_ascii_case("VEVENT"))
        .ok_or_else(|| MalformedEvent {
            uid: find_uid(lines),
            message: "no VEVENT component".to_string(),
        })?;

    let text = |name: &str| {
        vevent
            .find_prop(name)
            .map(|p| unescape_text(p.val.as_ref()))
            .filter(|v| !v.trim().is_empty())
    };
    let time = |name: &str| {
        vevent
            .find_prop(name)
            .and_then(|p| DatePerhapsTime::try_from(p).ok())
            .map(EventTime::from)
    };

    Ok(FeedEvent {
        uid: text("UID").map(|uid| uid.trim().to_string()),
        summary: text("SUMMARY"),
        description: text("DESCRIPTION"),
        location: text("LOCATION"),
        start: time("DTSTART"),
        end: time("DTEND"),
    })
}

/// Best-effort UID of a block, read straight from its lines.
fn find_uid(lines: &[&str]) -> Option<String> {
    lines
        .iter()
        .filter(|line| {
            starts_with_ignore_case(line, "UID:") || starts_with_ignore_case(line, "UID;")
        })
        .find_map(|line| line.split_once(':'))
        .map(|(_, value)| unescape_text(value.trim()))
        .filter(|uid| !uid.is_empty())
}

fn starts_with_ignore_case(line: &str, prefix: &str) -> bool {
    line.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Undo RFC 5545 TEXT escaping (`\n`, `\,`, `\;`, `\\`).
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
