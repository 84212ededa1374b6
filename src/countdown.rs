use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use thiserror::Error;

const SECS_PER_DAY: i64 = 24 * 60 * 60;

/// Time left until the application deadline, floored to whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub expired: bool,
}

impl Countdown {
    pub fn between(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let remaining_ms = (deadline - now).num_milliseconds();
        if remaining_ms <= 0 {
            return Self {
                expired: true,
                ..Self::default()
            };
        }
        let total = remaining_ms / 1000;
        Self {
            days: total / SECS_PER_DAY,
            hours: (total % SECS_PER_DAY) / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
            expired: false,
        }
    }

    pub fn until(deadline: DateTime<Utc>) -> Self {
        Self::between(deadline, Utc::now())
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

#[derive(Debug, Error)]
#[error("unrecognised deadline `{0}`; expected RFC 3339, `YYYY-MM-DDTHH:MM:SS` or `YYYY-MM-DD`")]
pub struct DeadlineError(String);

/// Parse a deadline. Values without an offset are local time; a bare date
/// means the last second of that day.
pub fn parse_deadline(input: &str) -> Result<DateTime<Utc>, DeadlineError> {
    let input = input.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Ok(parsed.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d").map(|date| {
                date.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN))
            })
        })
        .map_err(|_| DeadlineError(input.to_string()))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| DeadlineError(input.to_string()))
}
