//! Day-local wall-clock time.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ScheduleError;

const MINUTES_PER_DAY: u16 = 24 * 60;

/// Hour and minute of a day with no timezone attached.
///
/// Stored and serialized as zero-padded `HH:MM`. Ordering is by minute of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WallTime(u16);

impl WallTime {
    pub const MIDNIGHT: WallTime = WallTime(0);

    /// Build from hour (0-23) and minute (0-59).
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(WallTime((hour * 60 + minute) as u16))
        } else {
            None
        }
    }

    /// Truncate a `NaiveTime` to hour and minute.
    pub fn from_naive_time(time: NaiveTime) -> Self {
        WallTime((time.hour() * 60 + time.minute()) as u16)
    }

    pub fn hour(self) -> u32 {
        u32::from(self.0 / 60)
    }

    pub fn minute(self) -> u32 {
        u32::from(self.0 % 60)
    }

    /// Minutes elapsed since midnight.
    pub fn minute_of_day(self) -> i32 {
        i32::from(self.0)
    }

    /// Add whole hours, wrapping past midnight.
    pub fn add_hours(self, hours: u16) -> Self {
        let added = u32::from(self.0) + u32::from(hours) * 60;
        WallTime((added % u32::from(MINUTES_PER_DAY)) as u16)
    }
}

impl fmt::Display for WallTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for WallTime {
    type Err = ScheduleError;

    /// Accepts `HH:MM`, and `HH:MM:SS` with the seconds dropped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScheduleError::InvalidTime {
            value: s.to_string(),
        };

        let mut parts = s.split(':');
        let (Some(hour), Some(minute)) = (parts.next(), parts.next()) else {
            return Err(invalid());
        };
        let seconds = parts.next();
        if parts.next().is_some() {
            return Err(invalid());
        }

        let two_digits = |part: &str| -> Option<u32> {
            if part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit()) {
                part.parse().ok()
            } else {
                None
            }
        };

        if let Some(sec) = seconds
            && two_digits(sec).is_none_or(|sec| sec >= 60)
        {
            return Err(invalid());
        }

        match (two_digits(hour), two_digits(minute)) {
            (Some(h), Some(m)) => WallTime::new(h, m).ok_or_else(invalid),
            _ => Err(invalid()),
        }
    }
}

impl Serialize for WallTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WallTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_zero_padded() {
        let t: WallTime = "09:05".parse().unwrap();
        assert_eq!(t.hour(), 9);
        assert_eq!(t.minute(), 5);
        assert_eq!(t.to_string(), "09:05");
        assert_eq!(t.minute_of_day(), 545);
    }

    #[test]
    fn accepts_seconds_and_drops_them() {
        let t: WallTime = "14:30:59".parse().unwrap();
        assert_eq!(t.to_string(), "14:30");
    }

    #[test]
    fn rejects_malformed_strings() {
        for bad in ["", "9:00", "24:00", "12:60", "12", "12:00:61", "ab:cd", "12:00:00:00"] {
            assert!(bad.parse::<WallTime>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn add_hours_wraps_past_midnight() {
        let t: WallTime = "23:30".parse().unwrap();
        assert_eq!(t.add_hours(1).to_string(), "00:30");
        assert_eq!(WallTime::MIDNIGHT.add_hours(1).to_string(), "01:00");
    }

    #[test]
    fn ordering_follows_minute_of_day() {
        let a: WallTime = "08:59".parse().unwrap();
        let b: WallTime = "09:00".parse().unwrap();
        assert!(a < b);
    }

    #[test]
    fn serde_uses_hh_mm_strings() {
        let t: WallTime = "07:45".parse().unwrap();
        assert_eq!(serde_json::to_value(t).unwrap(), serde_json::json!("07:45"));
        let back: WallTime = serde_json::from_str("\"07:45:00\"").unwrap();
        assert_eq!(back, t);
        assert!(serde_json::from_str::<WallTime>("\"7h45\"").is_err());
    }
}
