//! Conversions from user-facing strings to protocol fields.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use sem6000_protocol::TimerTarget;

use crate::error::{SessionError, SessionResult};

/// Interpret `true`, `on` and `1` (any case) as true; everything else is false.
pub fn parse_bool(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "true" | "on" | "1")
}

/// Parse `HH:MM` or `HH:MM:SS`.
pub fn parse_time_of_day(name: &'static str, value: &str) -> SessionResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|e| invalid(name, format!("{:?} is not HH:MM[:SS] ({})", value, e)))
}

/// Minutes after midnight of an `HH:MM` string; seconds are dropped.
pub fn minutes_of_day(name: &'static str, value: &str) -> SessionResult<u16> {
    let time = parse_time_of_day(name, value)?;
    Ok((time.hour() * 60 + time.minute()) as u16)
}

/// Parse an ISO 8601 date-time (`T` or space separated) or a bare date.
pub fn parse_datetime(name: &'static str, value: &str) -> SessionResult<NaiveDateTime> {
    if let Ok(datetime) = value.parse::<NaiveDateTime>() {
        return Ok(datetime);
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(datetime);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|e| invalid(name, format!("{:?} is not an ISO date-time ({})", value, e)))
}

/// Parse a delay written as a time of day (`HH:MM[:SS]`).
pub fn parse_delay(name: &'static str, value: &str) -> SessionResult<TimeDelta> {
    let time = parse_time_of_day(name, value)?;
    Ok(TimeDelta::seconds(time.num_seconds_from_midnight() as i64))
}

/// Timer target for a timer started at `now` running for `delay`.
pub fn timer_target(now: NaiveDateTime, delay: TimeDelta) -> SessionResult<TimerTarget> {
    let at = now
        .checked_add_signed(delay)
        .ok_or_else(|| invalid("delay", format!("{} overflows the calendar", delay)))?;

    Ok(TimerTarget {
        second: at.second() as u8,
        minute: at.minute() as u8,
        hour: at.hour() as u8,
        day: at.day() as u8,
        month: at.month() as u8,
        year: at.year().rem_euclid(100) as u8,
    })
}

fn invalid(name: &'static str, reason: String) -> SessionError {
    SessionError::InvalidArgument { name, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        for value in ["true", "TRUE", "On", "1"] {
            assert!(parse_bool(value), "{value}");
        }
        for value in ["false", "off", "0", "yes", ""] {
            assert!(!parse_bool(value), "{value}");
        }
    }

    #[test]
    fn test_minutes_of_day() {
        assert_eq!(minutes_of_day("start", "06:00").unwrap(), 360);
        assert_eq!(minutes_of_day("end", "22:00").unwrap(), 1320);
        assert_eq!(minutes_of_day("end", "23:59:59").unwrap(), 1439);
        assert!(matches!(
            minutes_of_day("start", "25:00"),
            Err(SessionError::InvalidArgument { name: "start", .. })
        ));
    }

    #[test]
    fn test_parse_datetime_forms() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap();
        assert_eq!(parse_datetime("t", "2024-03-09T14:05:00").unwrap(), expected);
        assert_eq!(parse_datetime("t", "2024-03-09 14:05:00").unwrap(), expected);
        assert_eq!(parse_datetime("t", "2024-03-09T14:05").unwrap(), expected);
        assert_eq!(
            parse_datetime("t", "2024-03-09").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(0, 0, 0).unwrap()
        );
        assert!(parse_datetime("t", "yesterday").is_err());
    }

    #[test]
    fn test_timer_target_crosses_midnight() {
        let now = NaiveDate::from_ymd_opt(2024, 12, 31)
            .unwrap()
            .and_hms_opt(23, 30, 0)
            .unwrap();
        let delay = parse_delay("delay", "01:00").unwrap();
        let target = timer_target(now, delay).unwrap();
        assert_eq!(
            target,
            TimerTarget {
                second: 0,
                minute: 30,
                hour: 0,
                day: 1,
                month: 1,
                year: 25,
            }
        );
    }
}
